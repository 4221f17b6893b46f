mod common;

use common::*;
use onestore::note::object::BuildOptions;
use onestore::{
    Error, FileDataResolver, FileNodeId, Notebook, OneStoreFile,
};
use std::fs;
use std::path::PathBuf;

const GOSID: &str = "{11111111-2222-3333-4444-555555555555}";
const RID: &str = "{99999999-9999-9999-9999-999999999999}";
const G_PAGE: &str = "{00000001-0001-0001-0001-000000000001}";
const G_FILE_NODE: &str = "{00000002-0002-0002-0002-000000000002}";
const G_CONTAINER: &str = "{00000003-0003-0003-0003-000000000003}";
const STORE_GUID: &str = "{00000042-0042-0042-0042-000000000042}";

const FILE_DATA_HEADER: &str = "{BDE316E7-2665-4511-A4C4-8D4D0B7A9EAC}";
const FILE_DATA_FOOTER: &str = "{71FBA722-0F79-4A0B-BB13-899256426B24}";

const JCID_PAGE: u32 = 0x0006000B;
const JCID_EMBEDDED_FILE_NODE: u32 = 0x00060035;
const JCID_EMBEDDED_FILE_CONTAINER: u32 = 0x00080036;

const ELEMENT_CHILDREN: u32 = 0x24001C20;
const EMBEDDED_FILE_CONTAINER: u32 = 0x20001D9B;

fn tmp_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    if dir.exists() {
        fs::remove_dir_all(&dir).unwrap();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn empty_section_store() -> OneStoreFile {
    let mut file = OneFile::new(SECTION);
    let space = SpaceBuilder::new(GOSID, 10).revision(RevisionSpec {
        rid: RID.to_string(),
        dependent: None,
        table: vec![G_PAGE.to_string()],
        decls: vec![Decl::new(1, 0x00060007, PropSet::new().build())],
        roots: vec![(1, 1)],
    });
    let reference = space.build(&mut file);
    OneStoreFile::parse(section_file(file, &[(GOSID, reference)])).unwrap()
}

#[test]
fn sidecar_files_resolve_by_name_and_extension() {
    let dir = tmp_dir("sidecar_onefiles");
    fs::write(dir.join("foo.bin"), [0u8, 1, 2]).unwrap();

    let store = empty_section_store();
    let resolver = FileDataResolver::new(&store, Some(dir));

    let data = resolver.resolve("<file>foo", ".bin").unwrap();
    assert_eq!(data.filename.as_deref(), Some("foo.bin"));
    assert_eq!(data.bytes.as_deref(), Some(&[0u8, 1, 2][..]));
}

#[test]
fn missing_sidecar_files_report_the_os_error() {
    let dir = tmp_dir("missing_onefiles");

    let store = empty_section_store();
    let resolver = FileDataResolver::new(&store, Some(dir));

    assert!(matches!(
        resolver.resolve("<file>absent", ".bin"),
        Err(Error::Io(_))
    ));
}

#[test]
fn invalid_file_data_objects_have_no_bytes() {
    let store = empty_section_store();
    let resolver = FileDataResolver::new(&store, None);

    let data = resolver.resolve("<invfdo>", ".bin").unwrap();
    assert!(data.filename.is_none());
    assert!(data.bytes.is_none());
}

#[test]
fn unknown_reference_tags_are_rejected() {
    let store = empty_section_store();
    let resolver = FileDataResolver::new(&store, None);

    assert!(matches!(
        resolver.resolve("<bogus>x", ".bin"),
        Err(Error::UnrecognizedFileData(_))
    ));
}

/// A store blob: header GUID, length, reserved bytes, payload, padding
/// to 8 bytes, footer GUID.
fn store_blob(payload: &[u8]) -> Vec<u8> {
    let mut out = guid_le(FILE_DATA_HEADER).to_vec();
    out.extend((payload.len() as u64).to_le_bytes());
    out.extend([0u8; 12]);
    out.extend(payload);
    out.extend(vec![0u8; 7 & payload.len().wrapping_neg()]);
    out.extend(guid_le(FILE_DATA_FOOTER));
    out
}

fn section_with_file_data_store() -> OneStoreFile {
    let mut file = OneFile::new(SECTION);

    let space = SpaceBuilder::new(GOSID, 10).revision(RevisionSpec {
        rid: RID.to_string(),
        dependent: None,
        table: vec![G_PAGE.to_string()],
        decls: vec![Decl::new(1, 0x00060007, PropSet::new().build())],
        roots: vec![(1, 1)],
    });
    let space_ref = space.build(&mut file);

    let blob_ref = file.append(&store_blob(&[0, 1, 2]));
    let store_nodes = node(
        FileNodeId::FileDataStoreObjectReference,
        1,
        Some(blob_ref),
        &guid_le(STORE_GUID),
    );
    let store_list = file.append(&fragment(40, 0, &store_nodes, NIL_REF));

    let mut root_nodes = node(FileNodeId::ObjectSpaceManifestRoot, 0, None, &exg(GOSID, 1));
    root_nodes.extend(node(
        FileNodeId::ObjectSpaceManifestListReference,
        2,
        Some(space_ref),
        &exg(GOSID, 1),
    ));
    root_nodes.extend(node(
        FileNodeId::FileDataStoreListReference,
        2,
        Some(store_list),
        &[],
    ));
    let root_ref = file.append(&fragment(41, 0, &root_nodes, NIL_REF));

    OneStoreFile::parse(file.finish(root_ref)).unwrap()
}

#[test]
fn in_file_store_objects_resolve_by_guid() {
    let store = section_with_file_data_store();
    assert!(store
        .file_data_store()
        .contains(STORE_GUID.parse().unwrap()));

    let resolver = FileDataResolver::new(&store, None);
    let data = resolver
        .resolve(&format!("<ifndf>{STORE_GUID}"), ".bin")
        .unwrap();

    assert_eq!(data.filename.as_deref(), Some(&format!("{STORE_GUID}.bin")[..]));
    assert_eq!(data.bytes.as_deref(), Some(&[0u8, 1, 2][..]));
}

#[test]
fn embedded_files_bind_through_the_typed_tree() {
    let dir = tmp_dir("embedded_onefiles");
    fs::write(dir.join("foo.bin"), [0u8, 1, 2]).unwrap();

    let mut file = OneFile::new(SECTION);

    let space = SpaceBuilder::new(GOSID, 10).revision(RevisionSpec {
        rid: RID.to_string(),
        dependent: None,
        table: vec![
            G_PAGE.to_string(),
            G_FILE_NODE.to_string(),
            G_CONTAINER.to_string(),
        ],
        decls: vec![
            Decl::new(
                1,
                JCID_PAGE,
                PropSet::new()
                    .oid_array(ELEMENT_CHILDREN, &[(1 << 8) | 1])
                    .build(),
            ),
            Decl::new(
                (1 << 8) | 1,
                JCID_EMBEDDED_FILE_NODE,
                PropSet::new()
                    .oid(EMBEDDED_FILE_CONTAINER, (2 << 8) | 1)
                    .build(),
            ),
            Decl::file(
                (2 << 8) | 1,
                JCID_EMBEDDED_FILE_CONTAINER,
                "<file>foo",
                ".bin",
            ),
        ],
        roots: vec![(1, 1)],
    });

    let reference = space.build(&mut file);
    let store = OneStoreFile::parse(section_file(file, &[(GOSID, reference)])).unwrap();

    let tree = Notebook::from_store(store, Some(dir))
        .build(&BuildOptions::default())
        .unwrap();

    let revision = tree.root_space().unwrap().default_revision().unwrap();
    let page = revision.contents().unwrap();
    let children = page.get(onestore::note::schema::PropertyId::ElementChildNodes).unwrap();
    let file_node = children.value.objects()[0];
    assert_eq!(file_node.name(), "EmbeddedFileNode");

    let container = file_node
        .get(onestore::note::schema::PropertyId::EmbeddedFileContainer)
        .unwrap()
        .as_object()
        .unwrap();
    assert_eq!(container.name(), "EmbeddedFileContainer");

    let data = container.file_data.as_ref().unwrap();
    assert_eq!(data.filename.as_deref(), Some("foo.bin"));
    assert_eq!(data.bytes.as_deref(), Some(&[0u8, 1, 2][..]));
}

#[test]
fn notebooks_discover_the_sidecar_folder() {
    let dir = tmp_dir("discover");
    fs::write(dir.join("note.one"), {
        let mut file = OneFile::new(SECTION);
        let space = SpaceBuilder::new(GOSID, 10).revision(RevisionSpec {
            rid: RID.to_string(),
            dependent: None,
            table: vec![
                G_PAGE.to_string(),
                G_CONTAINER.to_string(),
            ],
            decls: vec![
                Decl::new(
                    1,
                    JCID_PAGE,
                    PropSet::new()
                        .oid(EMBEDDED_FILE_CONTAINER, (1 << 8) | 1)
                        .build(),
                ),
                Decl::file(
                    (1 << 8) | 1,
                    JCID_EMBEDDED_FILE_CONTAINER,
                    "<file>foo",
                    ".bin",
                ),
            ],
            roots: vec![(1, 1)],
        });
        let reference = space.build(&mut file);
        section_file(file, &[(GOSID, reference)])
    })
    .unwrap();

    let onefiles = dir.join("note_onefiles");
    fs::create_dir_all(&onefiles).unwrap();
    fs::write(onefiles.join("foo.bin"), [9u8, 8, 7]).unwrap();

    let notebook = Notebook::open(dir.join("note.one")).unwrap();
    let tree = notebook.build(&BuildOptions::default()).unwrap();

    let revision = tree.root_space().unwrap().default_revision().unwrap();
    let page = revision.contents().unwrap();
    let container = page
        .get(onestore::note::schema::PropertyId::EmbeddedFileContainer)
        .unwrap()
        .as_object()
        .unwrap();

    let data = container.file_data.as_ref().unwrap();
    assert_eq!(data.bytes.as_deref(), Some(&[9u8, 8, 7][..]));
}
