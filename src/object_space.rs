use crate::error::{Error, Result};
use crate::file_node::{AllowedNodes, FileNode, FileNodeId};
use crate::node_list::FileNodeList;
use crate::onestore::FileType;
use crate::revision::{Object, Revision};
use crate::types::{ChunkRef, ExGuid};
use indexmap::IndexMap;
use tracing::debug;

const OBJECT_SPACE_NODES: AllowedNodes = AllowedNodes {
    context: "object space manifest list",
    ids: &[
        FileNodeId::ObjectSpaceManifestListStart,
        FileNodeId::RevisionManifestListReference,
    ],
};

const SECTION_REVISION_LIST_NODES: AllowedNodes = AllowedNodes {
    context: "revision manifest list",
    ids: &[
        FileNodeId::RevisionManifestListStart,
        FileNodeId::RevisionRoleDeclaration,
        FileNodeId::RevisionRoleAndContextDeclaration,
        FileNodeId::RevisionManifestStart6,
        FileNodeId::RevisionManifestStart7,
        FileNodeId::ObjectGroupListReference,
        FileNodeId::ObjectInfoDependencyOverrides,
        FileNodeId::RootObjectReference2,
        FileNodeId::RootObjectReference3,
        FileNodeId::GlobalIdTableStart,
        FileNodeId::GlobalIdTableStart2,
        FileNodeId::GlobalIdTableEntry,
        FileNodeId::GlobalIdTableEnd,
        FileNodeId::DataSignatureGroupDefinition,
        FileNodeId::ObjectDataEncryptionKeyV2,
        FileNodeId::RevisionManifestEnd,
    ],
};

const TOC2_REVISION_LIST_NODES: AllowedNodes = AllowedNodes {
    context: "revision manifest list",
    ids: &[
        FileNodeId::RevisionManifestListStart,
        FileNodeId::RevisionRoleDeclaration,
        FileNodeId::RevisionManifestStart4,
        FileNodeId::ObjectInfoDependencyOverrides,
        FileNodeId::RootObjectReference2,
        FileNodeId::GlobalIdTableStart,
        FileNodeId::GlobalIdTableEntry,
        FileNodeId::GlobalIdTableEntry2,
        FileNodeId::GlobalIdTableEntry3,
        FileNodeId::GlobalIdTableEnd,
        FileNodeId::DataSignatureGroupDefinition,
        FileNodeId::ObjectDeclarationWithRefCount,
        FileNodeId::ObjectDeclarationWithRefCount2,
        FileNodeId::ObjectRevisionWithRefCount,
        FileNodeId::ObjectRevisionWithRefCount2,
        FileNodeId::RevisionManifestEnd,
    ],
};

/// A namespace of revisions describing one logical document unit.
#[derive(Debug)]
pub struct ObjectSpace {
    pub gosid: ExGuid,
    revisions: IndexMap<ExGuid, Revision>,
    /// `(gctxid, revision role)` labels to revision IDs; the default
    /// context is `(nil, 1)`.
    contexts: IndexMap<(ExGuid, u32), ExGuid>,
}

impl ObjectSpace {
    pub(crate) fn read(data: &[u8], file_type: FileType, list: ChunkRef) -> Result<Self> {
        let mut nodes = FileNodeList::new(data, list, Some(OBJECT_SPACE_NODES));

        let gosid = match nodes.next_node()? {
            Some(FileNode::ObjectSpaceManifestListStart { gosid }) => gosid,
            _ => {
                return Err(Error::Invalid(String::from(
                    "object space list does not begin with a manifest list start node",
                )))
            }
        };

        debug!(%gosid, "reading object space");

        // Only the last revision manifest list reference is valid.
        let mut manifest_list = None;
        while let Some(node) = nodes.next_node()? {
            match node {
                FileNode::RevisionManifestListReference { list } => manifest_list = Some(list),
                other => {
                    return Err(Error::UnexpectedFileNode(
                        other.id(),
                        "object space manifest list",
                    ));
                }
            }
        }

        let manifest_list = manifest_list.ok_or_else(|| {
            Error::Invalid(format!(
                "object space {gosid} has no revision manifest list reference"
            ))
        })?;

        let mut space = Self {
            gosid,
            revisions: IndexMap::new(),
            contexts: IndexMap::new(),
        };
        space.read_revisions(data, file_type, manifest_list)?;

        Ok(space)
    }

    fn read_revisions(
        &mut self,
        data: &[u8],
        file_type: FileType,
        list: ChunkRef,
    ) -> Result<()> {
        let allowed = match file_type {
            FileType::Section => SECTION_REVISION_LIST_NODES,
            FileType::Toc2 => TOC2_REVISION_LIST_NODES,
        };
        let mut nodes = FileNodeList::new(data, list, Some(allowed));

        match nodes.next_node()? {
            Some(FileNode::RevisionManifestListStart { gosid, .. }) => {
                if gosid != self.gosid {
                    return Err(Error::Invalid(format!(
                        "revision manifest list for {gosid} referenced from object space {}",
                        self.gosid
                    )));
                }
            }
            _ => {
                return Err(Error::Invalid(format!(
                    "revision manifest list of object space {} does not begin with a start node",
                    self.gosid
                )))
            }
        }

        while let Some(node) = nodes.next_node()? {
            match node {
                FileNode::RevisionManifestStart4 { .. }
                | FileNode::RevisionManifestStart6 { .. }
                | FileNode::RevisionManifestStart7 { .. } => {
                    // Register the start node's own role/context label
                    // before the manifest body is consumed.
                    let (rid, role, gctxid) = match &node {
                        FileNode::RevisionManifestStart4 {
                            rid,
                            revision_role,
                            ..
                        }
                        | FileNode::RevisionManifestStart6 {
                            rid,
                            revision_role,
                            ..
                        } => (*rid, *revision_role, ExGuid::NIL),
                        FileNode::RevisionManifestStart7 {
                            rid,
                            revision_role,
                            gctxid,
                            ..
                        } => (*rid, *revision_role, *gctxid),
                        _ => unreachable!(),
                    };

                    let revision = Revision::read(data, &mut nodes, node, &self.revisions)?;
                    self.revisions.insert(revision.rid, revision);
                    self.contexts.insert((gctxid, role), rid);
                }
                FileNode::RevisionRoleDeclaration { rid, revision_role } => {
                    self.contexts.insert((ExGuid::NIL, revision_role), rid);
                }
                FileNode::RevisionRoleAndContextDeclaration {
                    rid,
                    revision_role,
                    gctxid,
                } => {
                    self.contexts.insert((gctxid, revision_role), rid);
                }
                other => {
                    return Err(Error::UnexpectedFileNode(
                        other.id(),
                        "revision manifest list",
                    ));
                }
            }
        }

        if self.revisions.is_empty() {
            return Err(Error::Invalid(format!(
                "object space {} has no revisions",
                self.gosid
            )));
        }

        Ok(())
    }

    pub fn revision(&self, rid: ExGuid) -> Option<&Revision> {
        self.revisions.get(&rid)
    }

    pub fn revisions(&self) -> impl Iterator<Item = &Revision> {
        self.revisions.values()
    }

    /// The revision a `(gctxid, role)` context label points at.
    pub fn context_rid(&self, gctxid: ExGuid, role: u32) -> Option<ExGuid> {
        self.contexts.get(&(gctxid, role)).copied()
    }

    /// The current snapshot: the revision of the default context.
    pub fn default_rid(&self) -> Option<ExGuid> {
        self.context_rid(ExGuid::NIL, 1)
    }

    pub fn contexts(&self) -> impl Iterator<Item = (&(ExGuid, u32), &ExGuid)> {
        self.contexts.iter()
    }

    /// Look up an object visible to `rid`, following the dependency
    /// chain of shadowed revisions.
    pub fn object(&self, rid: ExGuid, oid: ExGuid) -> Option<&Object> {
        let mut next = Some(rid);

        while let Some(rid) = next {
            let revision = self.revisions.get(&rid)?;
            if let Some(object) = revision.objects.get(&oid) {
                return Some(object);
            }
            next = revision.rid_dependent;
        }

        None
    }
}
