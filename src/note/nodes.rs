use crate::file_data::FileData;
use crate::note::object::{NodeObject, TypedProperty, TypedValue};
use crate::note::schema::{NotebookJcid, PropertyId};
use crate::note::text::TextRun;
use crate::types::{ExGuid, Guid};
use std::rc::Rc;

/// A JCID-specific view over a typed object.
///
/// The generic [`NodeObject`] keeps every property by name; this sum
/// type gives each known schema a record with typed fields, leaving
/// everything else reachable through the carried node.
#[derive(Debug)]
pub enum TypedNode {
    Section(Section),
    PageSeries(PageSeries),
    Page(Page),
    Title(Container),
    Outline(Container),
    OutlineGroup(Container),
    OutlineElement(OutlineElement),
    RichText(RichText),
    Image(Image),
    NumberList(NumberList),
    Table(Table),
    TableRow(Container),
    TableCell(Container),
    EmbeddedFile(EmbeddedFile),
    EmbeddedFileContainer(FileContainer),
    PictureContainer(FileContainer),
    PageManifest(Container),
    PageMetaData(PageMetaData),
    SectionMetaData(Rc<NodeObject>),
    RevisionMetaData(RevisionMetaData),
    VersionHistoryContent(Container),
    VersionProxy(VersionProxy),
    /// A read-only style object; decode fields with
    /// [`ParagraphStyle::from_node`].
    ParagraphStyle(Rc<NodeObject>),
    Author(Author),
    /// Anything without a dedicated record.
    Unknown(Rc<NodeObject>),
}

/// A node whose substance is its ordered children.
#[derive(Debug)]
pub struct Container {
    pub node: Rc<NodeObject>,
    pub children: Vec<TypedNode>,
}

#[derive(Debug)]
pub struct Section {
    pub node: Rc<NodeObject>,
    pub display_name: Option<String>,
    pub children: Vec<TypedNode>,
}

#[derive(Debug)]
pub struct PageSeries {
    pub node: Rc<NodeObject>,
    /// Object spaces of the pages in this series.
    pub child_spaces: Vec<ExGuid>,
    pub children: Vec<TypedNode>,
}

#[derive(Debug)]
pub struct Page {
    pub node: Rc<NodeObject>,
    pub title: Option<String>,
    pub level: Option<u64>,
    pub children: Vec<TypedNode>,
}

#[derive(Debug)]
pub struct OutlineElement {
    pub node: Rc<NodeObject>,
    pub child_level: Option<u64>,
    /// Content of this element (rich text, images, tables).
    pub contents: Vec<TypedNode>,
    /// Nested outline elements.
    pub children: Vec<TypedNode>,
    pub list_nodes: Vec<TypedNode>,
}

#[derive(Debug)]
pub struct RichText {
    pub node: Rc<NodeObject>,
    pub runs: Vec<TextRun>,
    pub lang_id: u32,
    pub hyperlink_url: Option<String>,
    pub paragraph_style: Option<Rc<NodeObject>>,
}

#[derive(Debug)]
pub struct Image {
    pub node: Rc<NodeObject>,
    pub alt_text: Option<String>,
    pub filename: Option<String>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub picture: Option<FileData>,
}

#[derive(Debug)]
pub struct NumberList {
    pub node: Rc<NodeObject>,
    pub format: Option<String>,
    pub font: Option<String>,
    pub restart: Option<u64>,
}

#[derive(Debug)]
pub struct Table {
    pub node: Rc<NodeObject>,
    pub row_count: Option<u64>,
    pub column_count: Option<u64>,
    pub borders_visible: bool,
    pub column_widths: Vec<f32>,
    pub rows: Vec<TypedNode>,
}

#[derive(Debug)]
pub struct EmbeddedFile {
    pub node: Rc<NodeObject>,
    pub filename: Option<String>,
    pub source_path: Option<String>,
    pub container: Option<FileContainer>,
}

/// An embedded file or picture container, already bound to its bytes.
#[derive(Debug)]
pub struct FileContainer {
    pub node: Rc<NodeObject>,
    pub data: FileData,
}

#[derive(Debug)]
pub struct PageMetaData {
    pub node: Rc<NodeObject>,
    pub entity_guid: Option<Guid>,
    pub cached_title: Option<String>,
    pub is_conflict_page: bool,
}

#[derive(Debug)]
pub struct RevisionMetaData {
    pub node: Rc<NodeObject>,
    pub last_modified: Option<u64>,
    pub author: Option<String>,
}

#[derive(Debug)]
pub struct VersionProxy {
    pub node: Rc<NodeObject>,
    /// Context label of the revision this proxy points at.
    pub context: Option<ExGuid>,
}

#[derive(Debug, Default)]
pub struct ParagraphStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub superscript: bool,
    pub subscript: bool,
    pub hidden: bool,
    pub hyperlink: bool,
    pub math_formatting: bool,
    pub font: Option<String>,
    pub font_size: Option<u64>,
    pub font_color: Option<u64>,
    pub highlight: Option<u64>,
    pub style_id: Option<String>,
}

#[derive(Debug)]
pub struct Author {
    pub node: Rc<NodeObject>,
    pub name: Option<String>,
    pub initials: Option<String>,
}

fn child_nodes(node: &Rc<NodeObject>, key: PropertyId) -> Vec<TypedNode> {
    match node.get(key).map(|property| &property.value) {
        Some(value) => value.objects().into_iter().map(TypedNode::new).collect(),
        None => vec![],
    }
}

fn container(node: &Rc<NodeObject>) -> Container {
    Container {
        node: node.clone(),
        children: child_nodes(node, PropertyId::ElementChildNodes),
    }
}

/// Interpret a byte property as a little-endian `f32` array.
fn f32_array(property: Option<&TypedProperty>) -> Vec<f32> {
    property
        .and_then(TypedProperty::as_bytes)
        .map(|bytes| {
            bytes
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
                .collect()
        })
        .unwrap_or_default()
}

impl TypedNode {
    /// Build the schema-specific view of `node` and its subtree.
    pub fn new(node: &Rc<NodeObject>) -> Self {
        let jcid = match NotebookJcid::try_from(node.jcid.0) {
            Ok(jcid) => jcid,
            Err(_) => return Self::Unknown(node.clone()),
        };

        match jcid {
            NotebookJcid::SectionNode => Self::Section(Section {
                display_name: node.str_value(PropertyId::SectionDisplayName),
                children: child_nodes(node, PropertyId::ElementChildNodes),
                node: node.clone(),
            }),
            NotebookJcid::PageSeriesNode => Self::PageSeries(PageSeries {
                child_spaces: match node
                    .get(PropertyId::ChildGraphSpaceElementNodes)
                    .map(|property| &property.value)
                {
                    Some(TypedValue::ObjectSpaces(osids)) => osids.clone(),
                    Some(TypedValue::ObjectSpace(osid)) => vec![*osid],
                    _ => vec![],
                },
                children: child_nodes(node, PropertyId::ElementChildNodes),
                node: node.clone(),
            }),
            NotebookJcid::PageNode => Self::Page(Page {
                title: node.str_value(PropertyId::CachedTitleString),
                level: node.uint_value(PropertyId::PageLevel),
                children: child_nodes(node, PropertyId::ElementChildNodes),
                node: node.clone(),
            }),
            NotebookJcid::TitleNode => Self::Title(container(node)),
            NotebookJcid::OutlineNode => Self::Outline(container(node)),
            NotebookJcid::OutlineGroup => Self::OutlineGroup(container(node)),
            NotebookJcid::OutlineElementNode => Self::OutlineElement(OutlineElement {
                child_level: node.uint_value(PropertyId::OutlineElementChildLevel),
                contents: child_nodes(node, PropertyId::ContentChildNodes),
                children: child_nodes(node, PropertyId::ElementChildNodes),
                list_nodes: child_nodes(node, PropertyId::ListNodes),
                node: node.clone(),
            }),
            NotebookJcid::RichTextOENode => Self::RichText(RichText {
                runs: node.text_runs.clone().unwrap_or_default(),
                lang_id: node
                    .uint_value(PropertyId::RichEditTextLangID)
                    .unwrap_or(1033) as u32,
                hyperlink_url: node.str_value(PropertyId::WzHyperlinkUrl),
                paragraph_style: node
                    .get(PropertyId::ParagraphStyle)
                    .and_then(TypedProperty::as_object)
                    .cloned(),
                node: node.clone(),
            }),
            NotebookJcid::ImageNode => Self::Image(Image {
                alt_text: node.str_value(PropertyId::ImageAltText),
                filename: node.str_value(PropertyId::ImageFilename),
                width: node.uint_value(PropertyId::PictureWidth),
                height: node.uint_value(PropertyId::PictureHeight),
                picture: node
                    .get(PropertyId::PictureContainer)
                    .and_then(TypedProperty::as_object)
                    .and_then(|container| container.file_data.clone()),
                node: node.clone(),
            }),
            NotebookJcid::NumberListNode => Self::NumberList(NumberList {
                format: node.str_value(PropertyId::NumberListFormat),
                font: node.str_value(PropertyId::ListFont),
                restart: node.uint_value(PropertyId::ListRestart),
                node: node.clone(),
            }),
            NotebookJcid::TableNode => Self::Table(Table {
                row_count: node.uint_value(PropertyId::RowCount),
                column_count: node.uint_value(PropertyId::ColumnCount),
                borders_visible: node
                    .get(PropertyId::TableBordersVisible)
                    .and_then(TypedProperty::as_bool)
                    .unwrap_or(true),
                column_widths: f32_array(node.get(PropertyId::TableColumnWidths)),
                rows: child_nodes(node, PropertyId::ElementChildNodes),
                node: node.clone(),
            }),
            NotebookJcid::TableRowNode => Self::TableRow(container(node)),
            NotebookJcid::TableCellNode => Self::TableCell(container(node)),
            NotebookJcid::EmbeddedFileNode => Self::EmbeddedFile(EmbeddedFile {
                filename: node.str_value(PropertyId::EmbeddedFileName),
                source_path: node.str_value(PropertyId::SourceFilepath),
                container: node
                    .get(PropertyId::EmbeddedFileContainer)
                    .and_then(TypedProperty::as_object)
                    .and_then(|container| {
                        Some(FileContainer {
                            node: container.clone(),
                            data: container.file_data.clone()?,
                        })
                    }),
                node: node.clone(),
            }),
            NotebookJcid::EmbeddedFileContainer => match &node.file_data {
                Some(data) => Self::EmbeddedFileContainer(FileContainer {
                    node: node.clone(),
                    data: data.clone(),
                }),
                None => Self::Unknown(node.clone()),
            },
            NotebookJcid::PictureContainer14 => match &node.file_data {
                Some(data) => Self::PictureContainer(FileContainer {
                    node: node.clone(),
                    data: data.clone(),
                }),
                None => Self::Unknown(node.clone()),
            },
            NotebookJcid::PageManifestNode => Self::PageManifest(Container {
                node: node.clone(),
                children: child_nodes(node, PropertyId::ContentChildNodes),
            }),
            NotebookJcid::PageMetaData | NotebookJcid::ConflictPageMetaData => {
                Self::PageMetaData(PageMetaData {
                    entity_guid: node
                        .get(PropertyId::NotebookManagementEntityGuid)
                        .and_then(TypedProperty::as_guid),
                    cached_title: node.str_value(PropertyId::CachedTitleStringFromPage),
                    is_conflict_page: node
                        .get(PropertyId::IsConflictPage)
                        .and_then(TypedProperty::as_bool)
                        .unwrap_or(false),
                    node: node.clone(),
                })
            }
            NotebookJcid::SectionMetaData => Self::SectionMetaData(node.clone()),
            NotebookJcid::RevisionMetaData | NotebookJcid::VersionHistoryMetaData => {
                Self::RevisionMetaData(RevisionMetaData {
                    last_modified: node.uint_value(PropertyId::LastModifiedTimeStamp),
                    author: node
                        .get(PropertyId::AuthorMostRecent)
                        .or_else(|| node.get(PropertyId::AuthorOriginal))
                        .and_then(TypedProperty::as_object)
                        .and_then(|author| author.str_value(PropertyId::Author)),
                    node: node.clone(),
                })
            }
            NotebookJcid::VersionHistoryContent => Self::VersionHistoryContent(container(node)),
            NotebookJcid::VersionProxy => Self::VersionProxy(VersionProxy {
                context: node
                    .get(PropertyId::VersionHistoryGraphSpaceContextNodes)
                    .and_then(TypedProperty::as_context),
                node: node.clone(),
            }),
            NotebookJcid::ParagraphStyleObject => Self::ParagraphStyle(node.clone()),
            NotebookJcid::ReadOnlyPersistablePropertyContainerForAuthor
            | NotebookJcid::ReadOnlyAuthor => Self::Author(Author {
                name: node.str_value(PropertyId::Author),
                initials: node.str_value(PropertyId::AuthorInitials),
                node: node.clone(),
            }),
            NotebookJcid::NoteTagSharedDefinitionContainer => Self::Unknown(node.clone()),
        }
    }

    /// The carried generic node.
    pub fn node(&self) -> &Rc<NodeObject> {
        match self {
            Self::Section(section) => &section.node,
            Self::PageSeries(series) => &series.node,
            Self::Page(page) => &page.node,
            Self::Title(container)
            | Self::Outline(container)
            | Self::OutlineGroup(container)
            | Self::TableRow(container)
            | Self::TableCell(container)
            | Self::PageManifest(container)
            | Self::VersionHistoryContent(container) => &container.node,
            Self::OutlineElement(element) => &element.node,
            Self::RichText(text) => &text.node,
            Self::Image(image) => &image.node,
            Self::NumberList(list) => &list.node,
            Self::Table(table) => &table.node,
            Self::EmbeddedFile(file) => &file.node,
            Self::EmbeddedFileContainer(container) | Self::PictureContainer(container) => {
                &container.node
            }
            Self::PageMetaData(meta) => &meta.node,
            Self::SectionMetaData(node) => node,
            Self::RevisionMetaData(meta) => &meta.node,
            Self::VersionProxy(proxy) => &proxy.node,
            Self::ParagraphStyle(node) => node,
            Self::Author(author) => &author.node,
            Self::Unknown(node) => node,
        }
    }
}

impl ParagraphStyle {
    pub fn from_node(node: &NodeObject) -> Self {
        let flag = |key| {
            node.get(key)
                .and_then(TypedProperty::as_bool)
                .unwrap_or(false)
        };

        Self {
            bold: flag(PropertyId::Bold),
            italic: flag(PropertyId::Italic),
            underline: flag(PropertyId::Underline),
            strikethrough: flag(PropertyId::Strikethrough),
            superscript: flag(PropertyId::Superscript),
            subscript: flag(PropertyId::Subscript),
            hidden: flag(PropertyId::Hidden),
            hyperlink: flag(PropertyId::Hyperlink),
            math_formatting: flag(PropertyId::MathFormatting),
            font: node.str_value(PropertyId::Font),
            font_size: node.uint_value(PropertyId::FontSize),
            font_color: node.uint_value(PropertyId::FontColor),
            highlight: node.uint_value(PropertyId::Highlight),
            style_id: node.str_value(PropertyId::ParagraphStyleId),
        }
    }
}
