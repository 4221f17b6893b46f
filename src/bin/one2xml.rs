//! Decode a OneNote file and render its object tree.

use clap::{Parser, ValueEnum};
use onestore::enex;
use onestore::json::{self, JsonOptions};
use onestore::note::object::BuildOptions;
use onestore::xml::{self, XmlOptions};
use onestore::{filetime_to_unix, Notebook};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum Format {
    Xml,
    Json,
    Enex,
}

/// Convert Microsoft OneNote files to XML, JSON or ENEX.
#[derive(Parser)]
#[command(name = "one2xml", version)]
struct Args {
    /// Source `.one` or `.onetoc2` file.
    onefile: PathBuf,

    /// Output file; standard output when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "xml")]
    format: Format,

    /// Verbosity level; higher levels include layout and bookkeeping
    /// properties.
    #[arg(short, long, default_value_t = 0)]
    verbosity: u8,

    /// Emit every revision of every object space.
    #[arg(long)]
    all_revisions: bool,

    /// Attach OID attributes to object elements.
    #[arg(long)]
    include_oids: bool,

    /// Append the version history to the output.
    #[arg(long)]
    versions: bool,

    /// Only report the most recent version snapshot at or before this
    /// Unix timestamp.
    #[arg(short, long)]
    timestamp: Option<i64>,

    /// List version snapshots to standard output instead of emitting XML.
    #[arg(short = 'l', long)]
    list_revisions: bool,
}

fn run(args: &Args) -> onestore::Result<()> {
    let notebook = Notebook::open(&args.onefile)?;

    let tree = notebook.build(&BuildOptions {
        verbosity: args.verbosity,
        include_oids: args.include_oids,
    })?;

    if args.list_revisions {
        let mut versions = tree.versions();
        if let Some(timestamp) = args.timestamp {
            versions.retain(|version| filetime_to_unix(version.last_modified) <= timestamp);
            versions = versions.into_iter().last().into_iter().collect();
        }

        for version in versions {
            println!(
                "{} author={}",
                filetime_to_unix(version.last_modified),
                version.author.as_deref().unwrap_or("-"),
            );
            for (guid, (gosid, rid)) in &version.directory {
                println!("  {guid} {gosid} {rid}");
            }
        }
        return Ok(());
    }

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            emit(args, &tree, &mut out)?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            emit(args, &tree, &mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}

fn emit<W: Write>(args: &Args, tree: &onestore::ObjectTree, out: W) -> onestore::Result<()> {
    match args.format {
        Format::Xml => xml::write_tree(
            tree,
            &XmlOptions {
                verbosity: args.verbosity,
                include_oids: args.include_oids,
                all_revisions: args.all_revisions,
                include_versions: args.versions,
            },
            out,
        ),
        Format::Json => json::write_tree(
            tree,
            &JsonOptions {
                verbosity: args.verbosity,
                include_oids: args.include_oids,
                all_revisions: args.all_revisions,
                include_versions: args.versions,
            },
            out,
        ),
        Format::Enex => enex::write_tree(tree, out),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("ERROR: {error}");
            ExitCode::FAILURE
        }
    }
}
