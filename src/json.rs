use crate::error::{Error, Result};
use crate::note::object::{NodeObject, ObjectTree, TypedProperty, TypedValue};
use crate::types::filetime_to_unix;
use base64::Engine;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::io::Write;

/// Rendering options for the JSON emitter.
#[derive(Clone, Debug, Default)]
pub struct JsonOptions {
    pub verbosity: u8,
    pub include_oids: bool,
    pub all_revisions: bool,
    pub include_versions: bool,
}

/// Render a built object tree as a JSON value.
pub fn tree_to_json(tree: &ObjectTree, options: &JsonOptions) -> Value {
    let mut emitted = HashSet::new();
    let mut root = Map::new();

    if options.all_revisions {
        let mut spaces = vec![];
        for space in tree.spaces.values() {
            let mut revisions = vec![];
            for revision in space.revisions.values() {
                let roots: Vec<Value> = revision
                    .roots
                    .values()
                    .map(|node| node_to_json(node, options, &mut emitted))
                    .collect();

                revisions.push(json!({
                    "rid": revision.rid.to_string(),
                    "encrypted": revision.encrypted,
                    "roots": roots,
                }));
            }
            spaces.push(json!({
                "osid": space.gosid.to_string(),
                "revisions": revisions,
            }));
        }
        root.insert("objectSpaces".to_string(), Value::Array(spaces));
    } else if let Some(revision) = tree.root_space().and_then(|space| space.default_revision()) {
        let roots: Vec<Value> = revision
            .roots
            .values()
            .map(|node| node_to_json(node, options, &mut emitted))
            .collect();
        root.insert("roots".to_string(), Value::Array(roots));
    }

    if options.include_versions {
        let versions: Vec<Value> = tree
            .versions()
            .iter()
            .map(|version| {
                let directory: Map<String, Value> = version
                    .directory
                    .iter()
                    .map(|(guid, (gosid, rid))| {
                        (
                            guid.clone(),
                            json!({
                                "osid": gosid.to_string(),
                                "rid": rid.to_string(),
                            }),
                        )
                    })
                    .collect();

                json!({
                    "created": filetime_to_unix(version.created),
                    "lastModified": filetime_to_unix(version.last_modified),
                    "author": version.author,
                    "pages": directory,
                })
            })
            .collect();
        root.insert("versions".to_string(), Value::Array(versions));
    }

    Value::Object(root)
}

/// Render a built object tree as pretty-printed JSON.
pub fn write_tree<W: Write>(tree: &ObjectTree, options: &JsonOptions, out: W) -> Result<()> {
    serde_json::to_writer_pretty(out, &tree_to_json(tree, options))
        .map_err(|error| Error::Invalid(format!("json write failed: {error}")))
}

fn node_to_json(
    node: &NodeObject,
    options: &JsonOptions,
    emitted: &mut HashSet<String>,
) -> Value {
    if node.min_verbosity > options.verbosity {
        return Value::Null;
    }

    let mut object = Map::new();
    object.insert("jcid".to_string(), Value::String(node.name()));

    if let Some(kind) = node.read_only_kind() {
        let id = format!("{kind}-{}", node.hash_hex());

        if !emitted.insert(id.clone()) {
            object.insert("ref".to_string(), Value::String(id));
            return Value::Object(object);
        }

        object.insert("id".to_string(), Value::String(id));
    }

    if options.include_oids {
        if let Some(oid) = node.oid {
            object.insert("oid".to_string(), Value::String(oid.to_string()));
        }
    }

    for property in node.properties.values() {
        if property.min_verbosity > options.verbosity {
            continue;
        }

        object.insert(
            property.name(),
            property_to_json(property, options, emitted),
        );
    }

    if let Some(runs) = &node.text_runs {
        let runs: Vec<Value> = runs
            .iter()
            .map(|run| {
                json!({
                    "text": run.text,
                    "formatting": run
                        .formatting
                        .as_ref()
                        .map(|node| node_to_json(node, options, emitted)),
                    "data": run
                        .data
                        .as_ref()
                        .map(|node| node_to_json(node, options, emitted)),
                })
            })
            .collect();
        object.insert("textRuns".to_string(), Value::Array(runs));
    }

    if let Some(data) = &node.file_data {
        object.insert(
            "fileData".to_string(),
            json!({
                "filename": data.filename,
                "bytes": data
                    .bytes
                    .as_ref()
                    .map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes)),
            }),
        );
    }

    Value::Object(object)
}

fn property_to_json(
    property: &TypedProperty,
    options: &JsonOptions,
    emitted: &mut HashSet<String>,
) -> Value {
    match &property.value {
        TypedValue::None => Value::Null,
        TypedValue::Bool(value) => Value::Bool(*value),
        TypedValue::Uint(value) => json!(value),
        TypedValue::Bytes(bytes) => match property.key {
            Some(key) if key.is_text() => json!(property.as_str().unwrap_or_default()),
            Some(key) if key.is_guid() => json!(property
                .as_guid()
                .map(|guid| guid.to_string())
                .unwrap_or_default()),
            _ => {
                let hex: String = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
                Value::String(hex)
            }
        },
        TypedValue::Object(None) => Value::Null,
        TypedValue::Object(Some(node)) => node_to_json(node, options, emitted),
        TypedValue::Objects(nodes) => Value::Array(
            nodes
                .iter()
                .flatten()
                .map(|node| node_to_json(node, options, emitted))
                .collect(),
        ),
        TypedValue::ObjectSpace(osid) => json!({ "osid": osid.to_string() }),
        TypedValue::ObjectSpaces(osids) => Value::Array(
            osids
                .iter()
                .map(|osid| json!({ "osid": osid.to_string() }))
                .collect(),
        ),
        TypedValue::Context(ctxid) => json!({ "ctxid": ctxid.to_string() }),
        TypedValue::Contexts(ctxids) => Value::Array(
            ctxids
                .iter()
                .map(|ctxid| json!({ "ctxid": ctxid.to_string() }))
                .collect(),
        ),
        TypedValue::Set(node) => node_to_json(node, options, emitted),
        TypedValue::Sets(nodes) => Value::Array(
            nodes
                .iter()
                .map(|node| node_to_json(node, options, emitted))
                .collect(),
        ),
    }
}
