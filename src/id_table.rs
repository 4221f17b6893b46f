use crate::error::{Error, Result};
use crate::file_node::FileNode;
use crate::node_list::FileNodeList;
use crate::types::{CompactId, ExGuid, Guid};
use std::collections::HashMap;

/// A global identification table: the index → GUID mapping CompactIDs
/// resolve through.
///
/// Revisions and object groups each carry their own table; a revision's
/// table may remap or bulk-copy entries from its dependency's table.
#[derive(Clone, Default, Debug)]
pub struct GlobalIdTable {
    guids: HashMap<u32, Guid>,
}

impl GlobalIdTable {
    /// Accumulate entries from `list` until the table end node.
    ///
    /// The caller has already consumed the table start node. `previous`
    /// is the dependency revision's committed table, the source for
    /// remap and copy entries.
    pub fn read(list: &mut FileNodeList, previous: Option<&GlobalIdTable>) -> Result<Self> {
        let mut guids = HashMap::new();

        loop {
            let node = list.next_node()?.ok_or_else(|| {
                Error::Invalid(String::from("file node list ended inside a global ID table"))
            })?;

            match node {
                FileNode::GlobalIdTableEntry { index, guid } => {
                    guids.insert(index, guid);
                }
                FileNode::GlobalIdTableEntry2 {
                    index_map_from,
                    index_map_to,
                } => {
                    guids.insert(index_map_to, Self::previous(previous, index_map_from)?);
                }
                FileNode::GlobalIdTableEntry3 {
                    copy_from_start,
                    entries_to_copy,
                    copy_to_start,
                } => {
                    for i in 0..entries_to_copy {
                        guids.insert(
                            copy_to_start + i,
                            Self::previous(previous, copy_from_start + i)?,
                        );
                    }
                }
                FileNode::GlobalIdTableEnd => break,
                // The table sits in the middle of a node stream, so the
                // list's allowed set cannot catch strays on its own.
                other => {
                    return Err(Error::UnexpectedFileNode(other.id(), "global ID table"));
                }
            }
        }

        Ok(Self { guids })
    }

    fn previous(previous: Option<&GlobalIdTable>, index: u32) -> Result<Guid> {
        previous
            .and_then(|table| table.guids.get(&index))
            .copied()
            .ok_or_else(|| {
                Error::Invalid(format!(
                    "global ID table copies missing previous entry {index}"
                ))
            })
    }

    /// Resolve a CompactID against this table.
    pub fn resolve(&self, id: CompactId) -> Result<ExGuid> {
        let guid = self.guids.get(&id.guid_index()).copied().ok_or_else(|| {
            Error::Invalid(format!("compact ID {id} not in the global ID table"))
        })?;

        Ok(ExGuid::new(guid, id.n()))
    }
}
