use crate::error::{Error, Result};
use crate::note::nodes::{ParagraphStyle, TypedNode};
use crate::note::object::{ObjectTree, RevisionTree};
use crate::types::filetime_to_unix;
use base64::Engine;
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// An attachment referenced from a note's content by its MD5 hash.
struct Resource {
    bytes: Vec<u8>,
    mime: String,
    filename: Option<String>,
}

fn xml_error(error: quick_xml::Error) -> Error {
    Error::Invalid(format!("enex write failed: {error}"))
}

fn enex_date(filetime: u64) -> String {
    DateTime::<Utc>::from_timestamp(filetime_to_unix(filetime), 0)
        .map(|date| date.format("%Y%m%dT%H%M%SZ").to_string())
        .unwrap_or_default()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render a built object tree as an Evernote export (ENEX) document.
///
/// Every page reachable from the root section's page series becomes one
/// note; the page content is flattened to the ENML subset of HTML and
/// embedded files become note resources.
pub fn write_tree<W: Write>(tree: &ObjectTree, out: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::DocType(BytesText::new(
            "en-export SYSTEM \"http://xml.evernote.com/pub/evernote-export3.dtd\"",
        )))
        .map_err(xml_error)?;

    let mut export = BytesStart::new("en-export");
    export.push_attribute(("application", "onestore"));
    export.push_attribute(("version", env!("CARGO_PKG_VERSION")));
    writer
        .write_event(Event::Start(export))
        .map_err(xml_error)?;

    for revision in page_revisions(tree) {
        write_note(&mut writer, revision)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("en-export")))
        .map_err(xml_error)
}

/// The default revision of every page space, in notebook order. A file
/// whose root contents is itself a page yields that single page.
fn page_revisions(tree: &ObjectTree) -> Vec<&RevisionTree> {
    let revision = match tree.root_space().and_then(|space| space.default_revision()) {
        Some(revision) => revision,
        None => return vec![],
    };

    let contents = match revision.contents() {
        Some(contents) => contents,
        None => return vec![],
    };

    match TypedNode::new(contents) {
        TypedNode::Section(section) => {
            let mut pages = vec![];
            for child in &section.children {
                if let TypedNode::PageSeries(series) = child {
                    for osid in &series.child_spaces {
                        if let Some(revision) =
                            tree.space(*osid).and_then(|space| space.default_revision())
                        {
                            pages.push(revision);
                        }
                    }
                }
            }
            pages
        }
        TypedNode::Page(_) => vec![revision],
        _ => vec![],
    }
}

fn write_note<W: Write>(writer: &mut Writer<W>, revision: &RevisionTree) -> Result<()> {
    let contents = match revision.contents() {
        Some(contents) => contents,
        None => return Ok(()),
    };

    let page = match TypedNode::new(contents) {
        TypedNode::Page(page) => page,
        _ => return Ok(()),
    };

    let mut html = String::new();
    let mut resources = vec![];
    for child in &page.children {
        render_block(child, &mut html, &mut resources);
    }

    writer
        .write_event(Event::Start(BytesStart::new("note")))
        .map_err(xml_error)?;

    let title = page.title.as_deref().unwrap_or("Untitled");
    text_element(writer, "title", title)?;

    let content = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <!DOCTYPE en-note SYSTEM \"http://xml.evernote.com/pub/enml2.dtd\">\
         <en-note>{html}</en-note>"
    );
    writer
        .write_event(Event::Start(BytesStart::new("content")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::CData(BytesCData::new(content)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("content")))
        .map_err(xml_error)?;

    if let Some(timestamp) = revision.last_modified {
        text_element(writer, "created", &enex_date(timestamp))?;
        text_element(writer, "updated", &enex_date(timestamp))?;
    }

    if let Some(author) = &revision.author {
        writer
            .write_event(Event::Start(BytesStart::new("note-attributes")))
            .map_err(xml_error)?;
        text_element(writer, "author", author)?;
        writer
            .write_event(Event::End(BytesEnd::new("note-attributes")))
            .map_err(xml_error)?;
    }

    for resource in &resources {
        write_resource(writer, resource)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("note")))
        .map_err(xml_error)
}

fn write_resource<W: Write>(writer: &mut Writer<W>, resource: &Resource) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new("resource")))
        .map_err(xml_error)?;

    let mut data = BytesStart::new("data");
    data.push_attribute(("encoding", "base64"));
    writer.write_event(Event::Start(data)).map_err(xml_error)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(&resource.bytes);
    writer
        .write_event(Event::Text(BytesText::new(&encoded)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("data")))
        .map_err(xml_error)?;

    text_element(writer, "mime", &resource.mime)?;

    if let Some(filename) = &resource.filename {
        writer
            .write_event(Event::Start(BytesStart::new("resource-attributes")))
            .map_err(xml_error)?;
        text_element(writer, "file-name", filename)?;
        writer
            .write_event(Event::End(BytesEnd::new("resource-attributes")))
            .map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("resource")))
        .map_err(xml_error)
}

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)
}

/// Flatten one content node into ENML.
fn render_block(node: &TypedNode, html: &mut String, resources: &mut Vec<Resource>) {
    match node {
        TypedNode::Title(container)
        | TypedNode::Outline(container)
        | TypedNode::OutlineGroup(container) => {
            for child in &container.children {
                render_block(child, html, resources);
            }
        }
        TypedNode::OutlineElement(element) => {
            for content in &element.contents {
                render_block(content, html, resources);
            }
            for child in &element.children {
                render_block(child, html, resources);
            }
            for list in &element.list_nodes {
                render_block(list, html, resources);
            }
        }
        TypedNode::RichText(text) => {
            html.push_str("<div>");
            for run in &text.runs {
                let mut open = String::new();
                let mut close = String::new();

                if let Some(formatting) = &run.formatting {
                    let style = ParagraphStyle::from_node(formatting);
                    for (flag, tag) in [
                        (style.bold, "b"),
                        (style.italic, "i"),
                        (style.underline, "u"),
                        (style.strikethrough, "s"),
                        (style.superscript, "sup"),
                        (style.subscript, "sub"),
                    ] {
                        if flag {
                            open.push_str(&format!("<{tag}>"));
                            close.insert_str(0, &format!("</{tag}>"));
                        }
                    }
                }

                if let Some(url) = &text.hyperlink_url {
                    open.push_str(&format!("<a href=\"{}\">", escape(url)));
                    close.insert_str(0, "</a>");
                }

                html.push_str(&open);
                html.push_str(&escape(&run.text));
                html.push_str(&close);
            }
            html.push_str("</div>");
        }
        TypedNode::NumberList(list) => {
            if let Some(format) = &list.format {
                html.push_str(&escape(format));
                html.push(' ');
            }
        }
        TypedNode::Table(table) => {
            html.push_str("<table>");
            for row in &table.rows {
                if let TypedNode::TableRow(row) = row {
                    html.push_str("<tr>");
                    for cell in &row.children {
                        html.push_str("<td>");
                        if let TypedNode::TableCell(cell) = cell {
                            for child in &cell.children {
                                render_block(child, html, resources);
                            }
                        }
                        html.push_str("</td>");
                    }
                    html.push_str("</tr>");
                }
            }
            html.push_str("</table>");
        }
        TypedNode::Image(image) => {
            if let Some(bytes) = image.picture.as_ref().and_then(|data| data.bytes.clone()) {
                let mime = image
                    .picture
                    .as_ref()
                    .and_then(|data| data.filename.as_deref())
                    .and_then(extension_mime)
                    .unwrap_or("image/png");
                push_media(html, resources, bytes, mime, image.filename.clone());
            } else if let Some(alt) = &image.alt_text {
                html.push_str("<div>");
                html.push_str(&escape(alt));
                html.push_str("</div>");
            }
        }
        TypedNode::EmbeddedFile(file) => {
            if let Some(bytes) = file
                .container
                .as_ref()
                .and_then(|container| container.data.bytes.clone())
            {
                let mime = file
                    .filename
                    .as_deref()
                    .or_else(|| {
                        file.container
                            .as_ref()
                            .and_then(|container| container.data.filename.as_deref())
                    })
                    .and_then(extension_mime)
                    .unwrap_or("application/octet-stream");
                push_media(html, resources, bytes, mime, file.filename.clone());
            } else if let Some(filename) = &file.filename {
                html.push_str("<div>");
                html.push_str(&escape(filename));
                html.push_str("</div>");
            }
        }
        _ => {}
    }
}

fn extension_mime(filename: &str) -> Option<&'static str> {
    let dot = filename.rfind('.')?;
    crate::file_data::mime_type(&filename[dot..])
}

fn push_media(
    html: &mut String,
    resources: &mut Vec<Resource>,
    bytes: Vec<u8>,
    mime: &str,
    filename: Option<String>,
) {
    let hash = format!("{:x}", md5::compute(&bytes));
    html.push_str(&format!("<en-media type=\"{mime}\" hash=\"{hash}\"/>"));

    resources.push(Resource {
        bytes,
        mime: mime.to_string(),
        filename,
    });
}
