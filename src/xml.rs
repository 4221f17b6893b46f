use crate::error::{Error, Result};
use crate::file_data;
use crate::note::object::{NodeObject, ObjectTree, TypedProperty, TypedValue};
use crate::types::filetime_to_unix;
use base64::Engine;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashSet;
use std::io::Write;

/// Rendering options for the XML emitter.
#[derive(Clone, Debug, Default)]
pub struct XmlOptions {
    /// Properties and nodes above this level are omitted.
    pub verbosity: u8,
    /// Attach `OID` attributes to object elements.
    pub include_oids: bool,
    /// Emit every revision of every object space instead of the default
    /// revision of the root space.
    pub all_revisions: bool,
    /// Append the whole-notebook version history.
    pub include_versions: bool,
}

struct XmlEmitter<'a, W: Write> {
    writer: Writer<W>,
    options: &'a XmlOptions,
    /// Hash-derived IDs of read-only objects already emitted in full.
    emitted: HashSet<String>,
}

fn xml_error(error: quick_xml::Error) -> Error {
    Error::Invalid(format!("xml write failed: {error}"))
}

/// Render a built object tree as XML.
pub fn write_tree<W: Write>(tree: &ObjectTree, options: &XmlOptions, out: W) -> Result<()> {
    let mut emitter = XmlEmitter {
        writer: Writer::new_with_indent(out, b' ', 2),
        options,
        emitted: HashSet::new(),
    };

    emitter
        .writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_error)?;

    emitter.start("OneNote", &[])?;

    if options.all_revisions {
        for space in tree.spaces.values() {
            emitter.start("ObjectSpace", &[("OSID", space.gosid.to_string())])?;
            for revision in space.revisions.values() {
                let mut attributes = vec![("RID", revision.rid.to_string())];
                if revision.encrypted {
                    attributes.push(("Encrypted", String::from("true")));
                }
                emitter.start("Revision", &attributes)?;
                for root in revision.roots.values() {
                    emitter.node(root)?;
                }
                emitter.end("Revision")?;
            }
            emitter.end("ObjectSpace")?;
        }
    } else if let Some(revision) = tree.root_space().and_then(|space| space.default_revision()) {
        for root in revision.roots.values() {
            emitter.node(root)?;
        }
    }

    if options.include_versions {
        emitter.versions(tree)?;
    }

    emitter.end("OneNote")
}

impl<W: Write> XmlEmitter<'_, W> {
    fn start(&mut self, name: &str, attributes: &[(&str, String)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for (key, value) in attributes {
            start.push_attribute((*key, value.as_str()));
        }
        self.writer
            .write_event(Event::Start(start))
            .map_err(xml_error)
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, String)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for (key, value) in attributes {
            start.push_attribute((*key, value.as_str()));
        }
        self.writer
            .write_event(Event::Empty(start))
            .map_err(xml_error)
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name, &[])?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_error)?;
        self.end(name)
    }

    /// Emit one node, deduplicating read-only objects by content hash.
    fn node(&mut self, node: &NodeObject) -> Result<()> {
        if node.min_verbosity > self.options.verbosity {
            return Ok(());
        }

        let name = node.name();

        if let Some(kind) = node.read_only_kind() {
            let id = format!("{kind}-{}", node.hash_hex());

            if !self.emitted.insert(id.clone()) {
                return self.empty(&name, &[("Ref", id)]);
            }

            return self.node_body(node, &name, Some(id));
        }

        self.node_body(node, &name, None)
    }

    fn node_body(&mut self, node: &NodeObject, name: &str, id: Option<String>) -> Result<()> {
        let mut attributes = vec![];
        if let Some(id) = id {
            attributes.push(("ID", id));
        }
        if self.options.include_oids {
            if let Some(oid) = node.oid {
                attributes.push(("OID", oid.to_string()));
            }
        }

        self.start(name, &attributes)?;

        if let Some(file_data) = &node.file_data {
            self.file_data(file_data)?;
        } else {
            for property in node.properties.values() {
                if property.min_verbosity <= self.options.verbosity {
                    self.property(property)?;
                }
            }

            if let Some(runs) = &node.text_runs {
                self.text_runs(runs)?;
            }
        }

        self.end(name)
    }

    fn property(&mut self, property: &TypedProperty) -> Result<()> {
        let name = property.name();

        match &property.value {
            TypedValue::None => self.empty(&name, &[]),
            TypedValue::Bool(value) => self.text_element(&name, if *value { "true" } else { "false" }),
            TypedValue::Uint(value) => self.text_element(&name, &value.to_string()),
            TypedValue::Bytes(bytes) => {
                let text = match property.key {
                    Some(key) if key.is_text() => property.as_str().unwrap_or_default(),
                    Some(key) if key.is_guid() => property
                        .as_guid()
                        .map(|guid| guid.to_string())
                        .unwrap_or_default(),
                    _ => bytes.iter().map(|byte| format!("{byte:02x}")).collect(),
                };
                self.text_element(&name, &text)
            }
            TypedValue::Object(None) => self.empty(&name, &[]),
            TypedValue::Object(Some(node)) => {
                self.start(&name, &[])?;
                self.node(node)?;
                self.end(&name)
            }
            TypedValue::Objects(nodes) => {
                self.start(&name, &[])?;
                for node in nodes.iter().flatten() {
                    self.node(node)?;
                }
                self.end(&name)
            }
            TypedValue::ObjectSpace(osid) => {
                self.start(&name, &[])?;
                self.empty("ObjectSpace", &[("OSID", osid.to_string())])?;
                self.end(&name)
            }
            TypedValue::ObjectSpaces(osids) => {
                self.start(&name, &[])?;
                for osid in osids {
                    self.empty("ObjectSpace", &[("OSID", osid.to_string())])?;
                }
                self.end(&name)
            }
            TypedValue::Context(ctxid) => {
                self.start(&name, &[])?;
                self.empty("ContextId", &[("CTXID", ctxid.to_string())])?;
                self.end(&name)
            }
            TypedValue::Contexts(ctxids) => {
                self.start(&name, &[])?;
                for ctxid in ctxids {
                    self.empty("ContextId", &[("CTXID", ctxid.to_string())])?;
                }
                self.end(&name)
            }
            TypedValue::Set(node) => {
                self.start(&name, &[])?;
                self.node(node)?;
                self.end(&name)
            }
            TypedValue::Sets(nodes) => {
                self.start(&name, &[])?;
                for node in nodes {
                    self.node(node)?;
                }
                self.end(&name)
            }
        }
    }

    fn text_runs(&mut self, runs: &[crate::note::text::TextRun]) -> Result<()> {
        self.start("TextRuns", &[])?;

        for run in runs {
            self.start("TextRun", &[])?;
            self.text_element("Text", &run.text)?;

            if let Some(formatting) = &run.formatting {
                self.node(formatting)?;
            }

            if let Some(data) = &run.data {
                self.start("RunData", &[])?;
                self.node(data)?;
                self.end("RunData")?;
            }

            self.end("TextRun")?;
        }

        self.end("TextRuns")
    }

    fn file_data(&mut self, data: &crate::file_data::FileData) -> Result<()> {
        if let Some(filename) = &data.filename {
            self.text_element("Filename", filename)?;

            let extension = filename
                .rfind('.')
                .map(|dot| &filename[dot..])
                .unwrap_or_default();
            if let Some(mime) = file_data::mime_type(extension) {
                self.text_element("MimeType", mime)?;
            }
        }

        if let Some(bytes) = &data.bytes {
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            self.start("Data", &[("Encoding", String::from("base64"))])?;
            self.writer
                .write_event(Event::Text(BytesText::new(&encoded)))
                .map_err(xml_error)?;
            self.end("Data")?;
        }

        Ok(())
    }

    fn versions(&mut self, tree: &ObjectTree) -> Result<()> {
        self.start("Versions", &[])?;

        for version in tree.versions() {
            let mut attributes = vec![
                (
                    "CreatedTime",
                    filetime_to_unix(version.created).to_string(),
                ),
                (
                    "LastModifiedTime",
                    filetime_to_unix(version.last_modified).to_string(),
                ),
            ];
            if let Some(author) = &version.author {
                attributes.push(("Author", author.clone()));
            }

            self.start("Version", &attributes)?;
            for (guid, (gosid, rid)) in &version.directory {
                self.empty(
                    "Page",
                    &[
                        ("GUID", guid.clone()),
                        ("OSID", gosid.to_string()),
                        ("RID", rid.to_string()),
                    ],
                )?;
            }
            self.end("Version")?;
        }

        self.end("Versions")
    }
}
