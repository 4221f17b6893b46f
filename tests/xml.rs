mod common;

use common::*;
use onestore::note::object::BuildOptions;
use onestore::xml::{write_tree, XmlOptions};
use onestore::{Notebook, OneStoreFile};

const GOSID: &str = "{11111111-2222-3333-4444-555555555555}";
const RID: &str = "{99999999-9999-9999-9999-999999999999}";
const G_PAGE: &str = "{00000001-0001-0001-0001-000000000001}";
const G_RICH_A: &str = "{00000002-0002-0002-0002-000000000002}";
const G_RICH_B: &str = "{00000005-0005-0005-0005-000000000005}";
const G_STYLE_A: &str = "{00000003-0003-0003-0003-000000000003}";
const G_STYLE_B: &str = "{00000004-0004-0004-0004-000000000004}";

const JCID_PAGE: u32 = 0x0006000B;
const JCID_RICH_TEXT: u32 = 0x0006000E;
const JCID_PARAGRAPH_STYLE: u32 = 0x0012004D;

const CACHED_TITLE: u32 = 0x1C001CF3;
const ELEMENT_CHILDREN: u32 = 0x24001C20;
const TEXT_UNICODE: u32 = 0x1C001C22;
const TEXT_RUN_INDEX: u32 = 0x1C001E12;
const TEXT_RUN_FORMATTING: u32 = 0x24001E13;
const BOLD: u32 = 0x08001C04;

fn rich_text(text: &str, style: u32) -> Vec<u8> {
    let index = (text.len() as u32).to_le_bytes();

    PropSet::new()
        .bytes(TEXT_UNICODE, &utf16(text))
        .bytes(TEXT_RUN_INDEX, &index)
        .oid_array(TEXT_RUN_FORMATTING, &[style])
        .build()
}

fn emit(options: &XmlOptions) -> String {
    let mut file = OneFile::new(SECTION);

    let space = SpaceBuilder::new(GOSID, 10).revision(RevisionSpec {
        rid: RID.to_string(),
        dependent: None,
        table: vec![
            G_PAGE.to_string(),
            G_RICH_A.to_string(),
            G_RICH_B.to_string(),
            G_STYLE_A.to_string(),
            G_STYLE_B.to_string(),
        ],
        decls: vec![
            Decl::new(
                1,
                JCID_PAGE,
                PropSet::new()
                    .bytes(CACHED_TITLE, &utf16("Title"))
                    .oid_array(ELEMENT_CHILDREN, &[(1 << 8) | 1, (2 << 8) | 1])
                    .build(),
            ),
            Decl::new((1 << 8) | 1, JCID_RICH_TEXT, rich_text("one", (3 << 8) | 1)),
            Decl::new((2 << 8) | 1, JCID_RICH_TEXT, rich_text("two", (4 << 8) | 1)),
            // Identical styles: the emitter must dedup them by hash.
            Decl::new(
                (3 << 8) | 1,
                JCID_PARAGRAPH_STYLE,
                PropSet::new().bool(BOLD, true).build(),
            )
            .read_only(),
            Decl::new(
                (4 << 8) | 1,
                JCID_PARAGRAPH_STYLE,
                PropSet::new().bool(BOLD, true).build(),
            )
            .read_only(),
        ],
        roots: vec![(1, 1)],
    });

    let reference = space.build(&mut file);
    let store = OneStoreFile::parse(section_file(file, &[(GOSID, reference)])).unwrap();

    let tree = Notebook::from_store(store, None)
        .build(&BuildOptions {
            verbosity: options.verbosity,
            include_oids: options.include_oids,
        })
        .unwrap();

    let mut out = vec![];
    write_tree(&tree, options, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn trees_render_to_xml() {
    let xml = emit(&XmlOptions::default());

    assert!(xml.contains("<PageNode>"), "{xml}");
    assert!(xml.contains("<CachedTitleString>Title</CachedTitleString>"), "{xml}");
    assert!(xml.contains("<Text>one</Text>"), "{xml}");
    assert!(xml.contains("<Text>two</Text>"), "{xml}");
}

#[test]
fn read_only_objects_are_emitted_once() {
    let xml = emit(&XmlOptions::default());

    // One full paragraph style with an ID, one hash reference.
    assert_eq!(xml.matches("<ParagraphStyleObject ID=").count(), 1, "{xml}");
    assert_eq!(xml.matches("<ParagraphStyleObject Ref=").count(), 1, "{xml}");
}

#[test]
fn oids_are_attached_on_request() {
    let options = XmlOptions {
        include_oids: true,
        ..XmlOptions::default()
    };
    let xml = emit(&options);

    assert!(xml.contains(&format!("OID=\"{{{G_PAGE},1}}\"")), "{xml}");
}
