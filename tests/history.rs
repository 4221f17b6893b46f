mod common;

use common::*;
use onestore::note::object::BuildOptions;
use onestore::{Notebook, OneStoreFile};

const G_ROOT: &str = "{11111111-2222-3333-4444-555555555555}";
const G_P: &str = "{0000000A-000A-000A-000A-00000000000A}";
const G_Q: &str = "{0000000B-000B-000B-000B-00000000000B}";
const RID_ROOT: &str = "{99999999-9999-9999-9999-999999999999}";
const RID_P: &str = "{00000091-0091-0091-0091-000000000091}";
const RID_Q: &str = "{00000092-0092-0092-0092-000000000092}";
const PAGE_GUID_1: &str = "{000000AA-00AA-00AA-00AA-0000000000AA}";
const PAGE_GUID_2: &str = "{000000BB-00BB-00BB-00BB-0000000000BB}";

const G_SECTION_OBJ: &str = "{00000001-0001-0001-0001-000000000001}";
const G_SERIES_OBJ: &str = "{00000002-0002-0002-0002-000000000002}";
const G_PAGE_OBJ: &str = "{00000003-0003-0003-0003-000000000003}";
const G_META_OBJ: &str = "{00000004-0004-0004-0004-000000000004}";
const G_REVMETA_OBJ: &str = "{00000005-0005-0005-0005-000000000005}";
const G_AUTHOR_OBJ: &str = "{00000006-0006-0006-0006-000000000006}";

const JCID_SECTION: u32 = 0x00060007;
const JCID_PAGE_SERIES: u32 = 0x00060008;
const JCID_PAGE: u32 = 0x0006000B;
const JCID_PAGE_METADATA: u32 = 0x00020030;
const JCID_REVISION_METADATA: u32 = 0x00020044;
const JCID_READ_ONLY_AUTHOR: u32 = 0x00120051;

const ELEMENT_CHILDREN: u32 = 0x24001C20;
const CHILD_GRAPH_SPACES: u32 = 0x2C001D63;
const ENTITY_GUID: u32 = 0x1C001C30;
const LAST_MODIFIED: u32 = 0x18001D77;
const AUTHOR_MOST_RECENT: u32 = 0x20001D79;
const AUTHOR: u32 = 0x1C001D75;

const T1: u64 = 131_000_000_000_000_000;
const T2: u64 = 131_000_864_000_000_000;

fn root_space(list_id: u32) -> SpaceBuilder {
    SpaceBuilder::new(G_ROOT, list_id).revision(RevisionSpec {
        rid: RID_ROOT.to_string(),
        dependent: None,
        table: vec![
            G_SECTION_OBJ.to_string(),
            G_SERIES_OBJ.to_string(),
            G_P.to_string(),
            G_Q.to_string(),
        ],
        decls: vec![
            Decl::new(
                1,
                JCID_SECTION,
                PropSet::new()
                    .oid_array(ELEMENT_CHILDREN, &[(1 << 8) | 1])
                    .build(),
            ),
            Decl::new(
                (1 << 8) | 1,
                JCID_PAGE_SERIES,
                PropSet::new()
                    .osid_array(CHILD_GRAPH_SPACES, &[(2 << 8) | 1, (3 << 8) | 1])
                    .build(),
            ),
        ],
        roots: vec![(1, 1)],
    })
}

fn page_space(
    gosid: &str,
    rid: &str,
    page_guid: &str,
    timestamp: u64,
    author: &str,
    list_id: u32,
) -> SpaceBuilder {
    SpaceBuilder::new(gosid, list_id).revision(RevisionSpec {
        rid: rid.to_string(),
        dependent: None,
        table: vec![
            G_PAGE_OBJ.to_string(),
            G_META_OBJ.to_string(),
            G_REVMETA_OBJ.to_string(),
            G_AUTHOR_OBJ.to_string(),
        ],
        decls: vec![
            Decl::new(1, JCID_PAGE, PropSet::new().build()),
            Decl::new(
                (1 << 8) | 1,
                JCID_PAGE_METADATA,
                PropSet::new()
                    .bytes(ENTITY_GUID, &guid_le(page_guid))
                    .build(),
            ),
            Decl::new(
                (2 << 8) | 1,
                JCID_REVISION_METADATA,
                PropSet::new()
                    .u64(LAST_MODIFIED, timestamp)
                    .oid(AUTHOR_MOST_RECENT, (3 << 8) | 1)
                    .build(),
            ),
            Decl::new(
                (3 << 8) | 1,
                JCID_READ_ONLY_AUTHOR,
                PropSet::new().bytes(AUTHOR, &utf16(author)).build(),
            )
            .read_only(),
        ],
        roots: vec![(1, 1), (2, (1 << 8) | 1), (4, (2 << 8) | 1)],
    })
}

fn notebook_image(page_guid_q: &str) -> Vec<u8> {
    let mut file = OneFile::new(SECTION);

    let root_ref = root_space(10).build(&mut file);
    let p_ref = page_space(G_P, RID_P, PAGE_GUID_1, T1, "alice", 30).build(&mut file);
    let q_ref = page_space(G_Q, RID_Q, page_guid_q, T2, "bob", 50).build(&mut file);

    section_file(
        file,
        &[(G_ROOT, root_ref), (G_P, p_ref), (G_Q, q_ref)],
    )
}

#[test]
fn snapshots_accumulate_pages_over_time() {
    let store = OneStoreFile::parse(notebook_image(PAGE_GUID_2)).unwrap();
    let tree = Notebook::from_store(store, None)
        .build(&BuildOptions::default())
        .unwrap();

    let versions = tree.versions();
    assert_eq!(versions.len(), 2);

    // Only the first page exists at the first instant.
    assert_eq!(versions[0].last_modified, T1);
    assert_eq!(versions[0].directory.len(), 1);
    assert_eq!(versions[0].author.as_deref(), Some("alice"));
    let (guid, (gosid, rid)) = versions[0].directory.iter().next().unwrap();
    assert_eq!(guid, PAGE_GUID_1);
    assert_eq!(*gosid, onestore::ExGuid::new(G_P.parse().unwrap(), 1));
    assert_eq!(*rid, onestore::ExGuid::new(RID_P.parse().unwrap(), 1));

    // The second instant adds the second page.
    assert_eq!(versions[1].last_modified, T2);
    assert_eq!(versions[1].directory.len(), 2);
    assert_eq!(versions[1].author.as_deref(), Some("bob"));
    assert!(versions[1].directory.contains_key(PAGE_GUID_2));

    // Timestamps never decrease.
    assert!(versions.windows(2).all(|w| w[0].last_modified <= w[1].last_modified));
}

#[test]
fn page_metadata_feeds_the_revision_tree() {
    let store = OneStoreFile::parse(notebook_image(PAGE_GUID_2)).unwrap();
    let tree = Notebook::from_store(store, None)
        .build(&BuildOptions::default())
        .unwrap();

    let p = tree
        .space(onestore::ExGuid::new(G_P.parse().unwrap(), 1))
        .unwrap();
    let revision = p.default_revision().unwrap();

    assert_eq!(revision.last_modified, Some(T1));
    assert_eq!(revision.page_guid.as_deref(), Some(PAGE_GUID_1));
    assert_eq!(revision.author.as_deref(), Some("alice"));
}

#[test]
fn duplicate_page_guids_keep_the_newest_revision() {
    // Both pages carry the same persistent GUID.
    let store = OneStoreFile::parse(notebook_image(PAGE_GUID_1)).unwrap();
    let tree = Notebook::from_store(store, None)
        .build(&BuildOptions::default())
        .unwrap();

    let versions = tree.versions();
    assert_eq!(versions.len(), 2);

    // The newer revision supersedes the older one under the same key.
    assert_eq!(versions[1].directory.len(), 1);
    let (_, (_, rid)) = versions[1].directory.iter().next().unwrap();
    assert_eq!(*rid, onestore::ExGuid::new(RID_Q.parse().unwrap(), 1));

    // Adjacent snapshots always differ.
    let listings: Vec<Vec<_>> = versions
        .iter()
        .map(|version| {
            let mut listing: Vec<_> = version.directory.iter().collect();
            listing.sort_by(|a, b| a.0.cmp(b.0));
            listing
        })
        .collect();
    assert_ne!(listings[0], listings[1]);
}

#[test]
fn topology_timestamps_substitute_for_missing_metadata() {
    const TOPOLOGY: u32 = 0x18001C65;

    let mut file = OneFile::new(SECTION);

    // A page space without a revision metadata root; the timestamp comes
    // from the contents tree.
    let space = SpaceBuilder::new(G_P, 10).revision(RevisionSpec {
        rid: RID_P.to_string(),
        dependent: None,
        table: vec![G_PAGE_OBJ.to_string()],
        decls: vec![Decl::new(
            1,
            JCID_PAGE,
            PropSet::new().u64(TOPOLOGY, T2).build(),
        )],
        roots: vec![(1, 1)],
    });

    let reference = space.build(&mut file);
    let store = OneStoreFile::parse(section_file(file, &[(G_P, reference)])).unwrap();
    let tree = Notebook::from_store(store, None)
        .build(&BuildOptions::default())
        .unwrap();

    let revision = tree.root_space().unwrap().default_revision().unwrap();
    assert_eq!(revision.last_modified, Some(T2));
}
