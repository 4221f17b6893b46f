use crate::note::object::{ObjectTree, RevisionTree, TypedValue};
use crate::note::schema::PropertyId;
use crate::types::ExGuid;
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// One whole-notebook snapshot of the version history.
#[derive(Clone, Debug)]
pub struct Version {
    /// Page GUID to `(gosid, rid)`, in notebook page order. Colliding
    /// GUIDs are disambiguated with `-1`, `-2`, … suffixes.
    pub directory: IndexMap<String, (ExGuid, ExGuid)>,
    pub created: u64,
    pub last_modified: u64,
    pub author: Option<String>,
}

/// Build the ordered sequence of whole-notebook snapshots.
///
/// Page object spaces are discovered through the root space's page
/// series; the union of their version timestamps forms the snapshot
/// instants, and each snapshot takes every page's most recent version
/// at or before that instant.
pub(crate) fn versions(tree: &ObjectTree) -> Vec<Version> {
    let index_revision = tree
        .root_space()
        .and_then(|space| space.default_revision());

    let index_root = match index_revision.and_then(RevisionTree::contents) {
        Some(root) => root,
        None => return vec![],
    };

    let mut page_gosids: Vec<ExGuid> = vec![];
    let mut timestamps = BTreeSet::new();

    if let Some(series_list) = index_root.get(PropertyId::ElementChildNodes) {
        for series in series_list.value.objects() {
            let children = match series
                .get(PropertyId::ChildGraphSpaceElementNodes)
                .map(|property| &property.value)
            {
                Some(TypedValue::ObjectSpaces(osids)) => osids.clone(),
                Some(TypedValue::ObjectSpace(osid)) => vec![*osid],
                _ => continue,
            };

            for osid in children {
                let space = match tree.space(osid) {
                    Some(space) => space,
                    None => continue,
                };

                if !page_gosids.contains(&osid) {
                    page_gosids.push(osid);
                    timestamps.extend(space.version_timestamps());
                }
            }
        }
    }

    let mut versions: Vec<Version> = vec![];
    let mut prev_listing: Vec<(String, ExGuid)> = vec![];

    for &timestamp in &timestamps {
        let mut revisions: Vec<&RevisionTree> = page_gosids
            .iter()
            .filter_map(|gosid| tree.space(*gosid)?.version_at(timestamp))
            .collect();

        if revisions.is_empty() {
            continue;
        }

        revisions.sort_by_key(|revision| revision.last_modified);
        let newest = revisions[revisions.len() - 1];
        let author = newest.author.clone();
        let version_timestamp = newest.last_modified.unwrap_or(0);

        let directory = snapshot_directory(&revisions);

        // Sorted by GUID for comparison against the previous snapshot.
        let mut listing: Vec<(String, ExGuid)> = directory
            .iter()
            .map(|(guid, revision)| (guid.clone(), revision.rid))
            .collect();
        listing.sort();

        if listing == prev_listing {
            continue;
        }

        let directory: IndexMap<String, (ExGuid, ExGuid)> = directory
            .into_iter()
            .map(|(guid, revision)| (guid, (revision.gosid, revision.rid)))
            .collect();

        let collapse = versions.last().is_some_and(|last| {
            last.last_modified == version_timestamp
                && !matches!(
                    (&last.author, &author),
                    (Some(a), Some(b)) if a != b
                )
        });

        if collapse {
            let last = versions.last_mut().unwrap();
            last.directory = directory;
            last.last_modified = version_timestamp;
        } else {
            versions.push(Version {
                directory,
                created: version_timestamp,
                last_modified: version_timestamp,
                author,
            });
        }

        prev_listing = listing;
    }

    versions
}

/// Key a snapshot by page GUID, resolving collisions and keeping the
/// notebook's page order.
fn snapshot_directory<'a>(
    revisions: &[&'a RevisionTree],
) -> IndexMap<String, &'a RevisionTree> {
    let mut directory: IndexMap<String, &RevisionTree> = IndexMap::new();

    for &revision in revisions {
        let guid = revision
            .page_guid
            .clone()
            .unwrap_or_else(|| revision.rid.to_string());

        let previous = match directory.get(&guid) {
            None => {
                directory.insert(guid, revision);
                continue;
            }
            Some(previous) => *previous,
        };

        if previous.last_modified < revision.last_modified {
            directory.insert(guid.clone(), revision);

            // The newer revision supersedes the stale suffix entries.
            for i in 1..100 {
                let extended = format!("{guid}-{i}");
                if directory.shift_remove(&extended).is_none() {
                    break;
                }
            }
        } else if !std::ptr::eq(previous, revision) {
            for i in 1..100 {
                let extended = format!("{guid}-{i}");
                if !directory.contains_key(&extended) {
                    directory.insert(extended, revision);
                    break;
                }
            }
        }
    }

    // Present pages in object space order.
    directory.sort_by(|_, a, _, b| a.os_index.cmp(&b.os_index));
    directory
}
