mod common;

use common::*;
use onestore::json::{tree_to_json, JsonOptions};
use onestore::note::nodes::{ParagraphStyle, TypedNode};
use onestore::note::object::BuildOptions;
use onestore::{enex, Notebook, ObjectTree, OneStoreFile};

const G_ROOT: &str = "{11111111-2222-3333-4444-555555555555}";
const G_PAGE_SPACE: &str = "{0000000A-000A-000A-000A-00000000000A}";
const RID_ROOT: &str = "{99999999-9999-9999-9999-999999999999}";
const RID_PAGE: &str = "{00000091-0091-0091-0091-000000000091}";

const G_SECTION_OBJ: &str = "{00000001-0001-0001-0001-000000000001}";
const G_SERIES_OBJ: &str = "{00000002-0002-0002-0002-000000000002}";
const G_PAGE_OBJ: &str = "{00000003-0003-0003-0003-000000000003}";
const G_OUTLINE_OBJ: &str = "{00000004-0004-0004-0004-000000000004}";
const G_ELEMENT_OBJ: &str = "{00000005-0005-0005-0005-000000000005}";
const G_TEXT_OBJ: &str = "{00000006-0006-0006-0006-000000000006}";
const G_STYLE_OBJ: &str = "{00000007-0007-0007-0007-000000000007}";
const G_TABLE_OBJ: &str = "{00000008-0008-0008-0008-000000000008}";
const G_ROW_OBJ: &str = "{00000009-0009-0009-0009-000000000009}";
const G_CELL_OBJ: &str = "{0000000C-000C-000C-000C-00000000000C}";
const G_CELL_TEXT_OBJ: &str = "{0000000D-000D-000D-000D-00000000000D}";
const G_REVMETA_OBJ: &str = "{0000000E-000E-000E-000E-00000000000E}";

const JCID_SECTION: u32 = 0x00060007;
const JCID_PAGE_SERIES: u32 = 0x00060008;
const JCID_PAGE: u32 = 0x0006000B;
const JCID_OUTLINE: u32 = 0x0006000C;
const JCID_OUTLINE_ELEMENT: u32 = 0x0006000D;
const JCID_RICH_TEXT: u32 = 0x0006000E;
const JCID_TABLE: u32 = 0x00060022;
const JCID_TABLE_ROW: u32 = 0x00060023;
const JCID_TABLE_CELL: u32 = 0x00060024;
const JCID_PARAGRAPH_STYLE: u32 = 0x0012004D;
const JCID_REVISION_METADATA: u32 = 0x00020044;

const ELEMENT_CHILDREN: u32 = 0x24001C20;
const CONTENT_CHILDREN: u32 = 0x24001C1F;
const CHILD_GRAPH_SPACES: u32 = 0x2C001D63;
const CACHED_TITLE: u32 = 0x1C001CF3;
const TEXT_UNICODE: u32 = 0x1C001C22;
const TEXT_RUN_INDEX: u32 = 0x1C001E12;
const TEXT_RUN_FORMATTING: u32 = 0x24001E13;
const BOLD: u32 = 0x08001C04;
const ROW_COUNT: u32 = 0x14001D57;
const COLUMN_COUNT: u32 = 0x14001D58;
const LAST_MODIFIED: u32 = 0x18001D77;

const T1: u64 = 131_000_000_000_000_000;

fn compact(index: u32) -> u32 {
    (index << 8) | 1
}

fn rich_text(text: &str, style: u32) -> Vec<u8> {
    PropSet::new()
        .bytes(TEXT_UNICODE, &utf16(text))
        .bytes(TEXT_RUN_INDEX, &(text.len() as u32).to_le_bytes())
        .oid_array(TEXT_RUN_FORMATTING, &[style])
        .build()
}

fn notebook_tree() -> ObjectTree {
    let mut file = OneFile::new(SECTION);

    let root = SpaceBuilder::new(G_ROOT, 10).revision(RevisionSpec {
        rid: RID_ROOT.to_string(),
        dependent: None,
        table: vec![
            G_SECTION_OBJ.to_string(),
            G_SERIES_OBJ.to_string(),
            G_PAGE_SPACE.to_string(),
        ],
        decls: vec![
            Decl::new(
                compact(0),
                JCID_SECTION,
                PropSet::new()
                    .oid_array(ELEMENT_CHILDREN, &[compact(1)])
                    .build(),
            ),
            Decl::new(
                compact(1),
                JCID_PAGE_SERIES,
                PropSet::new()
                    .osid_array(CHILD_GRAPH_SPACES, &[compact(2)])
                    .build(),
            ),
        ],
        roots: vec![(1, compact(0))],
    });
    let root_ref = root.build(&mut file);

    let page = SpaceBuilder::new(G_PAGE_SPACE, 30).revision(RevisionSpec {
        rid: RID_PAGE.to_string(),
        dependent: None,
        table: vec![
            G_PAGE_OBJ.to_string(),
            G_OUTLINE_OBJ.to_string(),
            G_ELEMENT_OBJ.to_string(),
            G_TEXT_OBJ.to_string(),
            G_STYLE_OBJ.to_string(),
            G_TABLE_OBJ.to_string(),
            G_ROW_OBJ.to_string(),
            G_CELL_OBJ.to_string(),
            G_CELL_TEXT_OBJ.to_string(),
            G_REVMETA_OBJ.to_string(),
        ],
        decls: vec![
            Decl::new(
                compact(0),
                JCID_PAGE,
                PropSet::new()
                    .bytes(CACHED_TITLE, &utf16("My page"))
                    .oid_array(ELEMENT_CHILDREN, &[compact(1)])
                    .build(),
            ),
            Decl::new(
                compact(1),
                JCID_OUTLINE,
                PropSet::new()
                    .oid_array(ELEMENT_CHILDREN, &[compact(2)])
                    .build(),
            ),
            Decl::new(
                compact(2),
                JCID_OUTLINE_ELEMENT,
                PropSet::new()
                    .oid_array(CONTENT_CHILDREN, &[compact(3), compact(5)])
                    .build(),
            ),
            Decl::new(compact(3), JCID_RICH_TEXT, rich_text("Hello", compact(4))),
            Decl::new(
                compact(4),
                JCID_PARAGRAPH_STYLE,
                PropSet::new().bool(BOLD, true).build(),
            )
            .read_only(),
            Decl::new(
                compact(5),
                JCID_TABLE,
                PropSet::new()
                    .u32(ROW_COUNT, 1)
                    .u32(COLUMN_COUNT, 1)
                    .oid_array(ELEMENT_CHILDREN, &[compact(6)])
                    .build(),
            ),
            Decl::new(
                compact(6),
                JCID_TABLE_ROW,
                PropSet::new()
                    .oid_array(ELEMENT_CHILDREN, &[compact(7)])
                    .build(),
            ),
            Decl::new(
                compact(7),
                JCID_TABLE_CELL,
                PropSet::new()
                    .oid_array(ELEMENT_CHILDREN, &[compact(8)])
                    .build(),
            ),
            Decl::new(compact(8), JCID_RICH_TEXT, rich_text("cell", compact(4))),
            Decl::new(
                compact(9),
                JCID_REVISION_METADATA,
                PropSet::new().u64(LAST_MODIFIED, T1).build(),
            ),
        ],
        roots: vec![(1, compact(0)), (4, compact(9))],
    });
    let page_ref = page.build(&mut file);

    let image = section_file(
        file,
        &[(G_ROOT, root_ref), (G_PAGE_SPACE, page_ref)],
    );
    let store = OneStoreFile::parse(image).unwrap();

    Notebook::from_store(store, None)
        .build(&BuildOptions::default())
        .unwrap()
}

#[test]
fn typed_views_mirror_the_schema() {
    let tree = notebook_tree();

    let root = tree.root_space().unwrap().default_revision().unwrap();
    let section = match TypedNode::new(root.contents().unwrap()) {
        TypedNode::Section(section) => section,
        other => panic!("unexpected node {other:?}"),
    };

    let series = match &section.children[0] {
        TypedNode::PageSeries(series) => series,
        other => panic!("unexpected node {other:?}"),
    };
    assert_eq!(series.child_spaces.len(), 1);

    let page_space = tree.space(series.child_spaces[0]).unwrap();
    let revision = page_space.default_revision().unwrap();

    let page = match TypedNode::new(revision.contents().unwrap()) {
        TypedNode::Page(page) => page,
        other => panic!("unexpected node {other:?}"),
    };
    assert_eq!(page.title.as_deref(), Some("My page"));

    let outline = match &page.children[0] {
        TypedNode::Outline(outline) => outline,
        other => panic!("unexpected node {other:?}"),
    };

    let element = match &outline.children[0] {
        TypedNode::OutlineElement(element) => element,
        other => panic!("unexpected node {other:?}"),
    };
    assert_eq!(element.contents.len(), 2);

    let text = match &element.contents[0] {
        TypedNode::RichText(text) => text,
        other => panic!("unexpected node {other:?}"),
    };
    assert_eq!(text.runs.len(), 1);
    assert_eq!(text.runs[0].text, "Hello");

    let style = ParagraphStyle::from_node(text.runs[0].formatting.as_ref().unwrap());
    assert!(style.bold);
    assert!(!style.italic);

    let table = match &element.contents[1] {
        TypedNode::Table(table) => table,
        other => panic!("unexpected node {other:?}"),
    };
    assert_eq!(table.row_count, Some(1));
    assert_eq!(table.column_count, Some(1));

    let row = match &table.rows[0] {
        TypedNode::TableRow(row) => row,
        other => panic!("unexpected node {other:?}"),
    };
    assert!(matches!(&row.children[0], TypedNode::TableCell(_)));
}

#[test]
fn json_rendering_names_nodes_and_properties() {
    let tree = notebook_tree();

    let value = tree_to_json(&tree, &JsonOptions::default());
    let roots = value["roots"].as_array().unwrap();
    assert_eq!(roots[0]["jcid"], "SectionNode");

    let series = &roots[0]["ElementChildNodes"][0];
    assert_eq!(series["jcid"], "PageSeriesNode");
    assert!(series["ChildGraphSpaceElementNodes"][0]["osid"]
        .as_str()
        .unwrap()
        .contains(G_PAGE_SPACE));

    // All revisions reaches the page content.
    let value = tree_to_json(
        &tree,
        &JsonOptions {
            all_revisions: true,
            ..JsonOptions::default()
        },
    );
    let text = value.to_string();
    assert!(text.contains("\"CachedTitleString\":\"My page\""), "{text}");
    assert!(text.contains("\"text\":\"Hello\""), "{text}");
}

#[test]
fn enex_rendering_flattens_pages_to_notes() {
    let tree = notebook_tree();

    let mut out = vec![];
    enex::write_tree(&tree, &mut out).unwrap();
    let enex = String::from_utf8(out).unwrap();

    assert!(enex.contains("<en-export"), "{enex}");
    assert!(enex.contains("<title>My page</title>"), "{enex}");
    assert!(enex.contains("<b>Hello</b>"), "{enex}");
    assert!(
        enex.contains("<table><tr><td><div><b>cell</b></div></td></tr></table>"),
        "{enex}"
    );
    assert!(enex.contains("<created>"), "{enex}");
}
