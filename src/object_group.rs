use crate::error::{Error, Result};
use crate::file_node::{AllowedNodes, FileNode, FileNodeId};
use crate::id_table::GlobalIdTable;
use crate::node_list::FileNodeList;
use crate::prop::read_object_prop_set;
use crate::revision::{Object, ObjectData};
use crate::types::{ChunkRef, CompactId, ExGuid, Jcid};

const OBJECT_GROUP_NODES: AllowedNodes = AllowedNodes {
    context: "object group",
    ids: &[
        FileNodeId::ObjectGroupStart,
        FileNodeId::GlobalIdTableStart2,
        FileNodeId::GlobalIdTableEntry,
        FileNodeId::GlobalIdTableEnd,
        FileNodeId::DataSignatureGroupDefinition,
        FileNodeId::ObjectDeclaration2RefCount,
        FileNodeId::ObjectDeclaration2LargeRefCount,
        FileNodeId::ReadOnlyObjectDeclaration2RefCount,
        FileNodeId::ReadOnlyObjectDeclaration2LargeRefCount,
        FileNodeId::ObjectDeclarationFileData3RefCount,
        FileNodeId::ObjectDeclarationFileData3LargeRefCount,
        FileNodeId::ObjectGroupEnd,
    ],
};

/// An object group: a bracketed run of object declarations with its own
/// global ID table.
#[derive(Debug)]
pub struct ObjectGroup {
    pub ogid: ExGuid,
    pub data_signature: Option<ExGuid>,
    /// Objects declared by this group, in declaration order. The
    /// enclosing revision merges these into its object table.
    pub objects: Vec<(ExGuid, Object)>,
    pub(crate) id_table: GlobalIdTable,
}

impl ObjectGroup {
    /// Parse the group's file node list.
    ///
    /// With `decode` cleared (encrypted revisions) declarations are
    /// walked for their structure but no property set blob is read.
    pub fn read(data: &[u8], list: ChunkRef, decode: bool) -> Result<Self> {
        let mut nodes = FileNodeList::new(data, list, Some(OBJECT_GROUP_NODES));

        let ogid = match nodes.next_node()? {
            Some(FileNode::ObjectGroupStart { ogid }) => ogid,
            _ => {
                return Err(Error::Invalid(String::from(
                    "object group list does not begin with a group start node",
                )))
            }
        };

        match nodes.next_node()? {
            Some(FileNode::GlobalIdTableStart2) => {}
            _ => {
                return Err(Error::Invalid(format!(
                    "object group {ogid} does not begin with a global ID table"
                )))
            }
        }

        let id_table = GlobalIdTable::read(&mut nodes, None)?;

        let mut group = Self {
            ogid,
            data_signature: None,
            objects: vec![],
            id_table,
        };

        loop {
            let node = nodes.next_node()?.ok_or_else(|| {
                Error::Invalid(format!("object group {ogid} is missing its end node"))
            })?;

            match node {
                FileNode::ObjectGroupEnd => break,
                FileNode::DataSignatureGroupDefinition { signature } => {
                    group.data_signature = Some(signature);
                }
                FileNode::ObjectDeclaration2RefCount { blob, body, .. }
                | FileNode::ObjectDeclaration2LargeRefCount { blob, body, .. } => {
                    if body.jcid.is_read_only() {
                        return Err(Error::Invalid(format!(
                            "object declaration with read-only {:?}",
                            body.jcid
                        )));
                    }
                    group.declare(data, blob, body.coid, body.jcid, decode)?;
                }
                FileNode::ReadOnlyObjectDeclaration2RefCount { blob, body, .. }
                | FileNode::ReadOnlyObjectDeclaration2LargeRefCount { blob, body, .. } => {
                    group.declare(data, blob, body.coid, body.jcid, decode)?;
                }
                FileNode::ObjectDeclarationFileData3RefCount {
                    coid,
                    jcid,
                    file_data_reference,
                    extension,
                    ..
                }
                | FileNode::ObjectDeclarationFileData3LargeRefCount {
                    coid,
                    jcid,
                    file_data_reference,
                    extension,
                    ..
                } => {
                    if !jcid.is_file_data() {
                        return Err(Error::Invalid(format!(
                            "file data declaration with non-file-data {jcid:?}"
                        )));
                    }

                    if decode {
                        let oid = group.id_table.resolve(coid)?;
                        group.objects.push((
                            oid,
                            Object {
                                jcid,
                                data: ObjectData::FileData {
                                    reference: file_data_reference,
                                    extension,
                                },
                            },
                        ));
                    }
                }
                other => {
                    return Err(Error::UnexpectedFileNode(other.id(), "object group"));
                }
            }
        }

        Ok(group)
    }

    fn declare(
        &mut self,
        data: &[u8],
        blob: ChunkRef,
        coid: CompactId,
        jcid: Jcid,
        decode: bool,
    ) -> Result<()> {
        if !decode {
            return Ok(());
        }

        let oid = self.id_table.resolve(coid)?;
        let set = read_object_prop_set(data, blob, jcid, &self.id_table)?;

        self.objects.push((
            oid,
            Object {
                jcid,
                data: ObjectData::PropertySet(set),
            },
        ));

        Ok(())
    }

    /// Resolve a CompactID against this group's table.
    pub fn resolve(&self, id: CompactId) -> Result<ExGuid> {
        self.id_table.resolve(id)
    }
}
