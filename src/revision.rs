use crate::error::{Error, Result};
use crate::file_node::FileNode;
use crate::id_table::GlobalIdTable;
use crate::node_list::FileNodeList;
use crate::object_group::ObjectGroup;
use crate::prop::{read_object_prop_set, PropertySet};
use crate::types::{ExGuid, Jcid};
use indexmap::IndexMap;
use tracing::{trace, warn};

/// An object's payload: a property set, or a reference to out-of-line
/// file data.
#[derive(Clone, Debug)]
pub enum ObjectData {
    PropertySet(PropertySet),
    FileData { reference: String, extension: String },
}

/// One declared object within a revision.
#[derive(Clone, Debug)]
pub struct Object {
    pub jcid: Jcid,
    pub data: ObjectData,
}

impl Object {
    pub fn prop_set(&self) -> Option<&PropertySet> {
        match &self.data {
            ObjectData::PropertySet(set) => Some(set),
            ObjectData::FileData { .. } => None,
        }
    }

    fn raw(&self) -> Option<&[u8]> {
        self.prop_set().and_then(|set| set.raw.as_deref())
    }
}

/// One committed state of an object space.
///
/// A dependent revision shadows its dependency: object lookups fall
/// through to the dependency chain rather than copying tables (see
/// [`crate::object_space::ObjectSpace::object`]).
#[derive(Debug)]
pub struct Revision {
    pub rid: ExGuid,
    pub rid_dependent: Option<ExGuid>,
    pub revision_role: u32,
    /// `2` marks the revision as encrypted; its property sets are left
    /// undecoded.
    pub odcs_default: u16,
    pub time_creation: Option<u64>,
    pub gctxid: Option<ExGuid>,
    pub data_signature: Option<ExGuid>,
    /// Objects declared by this revision itself.
    pub objects: IndexMap<ExGuid, Object>,
    /// Root object per role, dependency roots inherited.
    pub root_objects: IndexMap<u32, ExGuid>,
    pub object_groups: IndexMap<ExGuid, ObjectGroup>,
    pub(crate) id_table: GlobalIdTable,
}

/// Root object roles.
pub mod root_role {
    /// Page, section or TOC contents.
    pub const CONTENTS: u32 = 1;
    pub const PAGE_METADATA: u32 = 2;
    pub const REVISION_METADATA: u32 = 4;
}

impl Revision {
    pub fn is_encrypted(&self) -> bool {
        self.odcs_default == 2
    }

    pub fn root_object_id(&self, role: u32) -> Option<ExGuid> {
        self.root_objects.get(&role).copied()
    }

    /// Construct a revision from its start node through
    /// `RevisionManifestEnd`. Previously built revisions of the same
    /// object space supply the dependency.
    pub(crate) fn read(
        data: &[u8],
        nodes: &mut FileNodeList,
        start: FileNode,
        revisions: &IndexMap<ExGuid, Revision>,
    ) -> Result<Self> {
        let (rid, rid_dependent, time_creation, revision_role, odcs_default, gctxid) = match start {
            FileNode::RevisionManifestStart4 {
                rid,
                rid_dependent,
                time_creation,
                revision_role,
                odcs_default,
            } => (
                rid,
                rid_dependent,
                Some(time_creation),
                revision_role,
                odcs_default,
                None,
            ),
            FileNode::RevisionManifestStart6 {
                rid,
                rid_dependent,
                revision_role,
                odcs_default,
            } => (rid, rid_dependent, None, revision_role, odcs_default, None),
            FileNode::RevisionManifestStart7 {
                rid,
                rid_dependent,
                revision_role,
                odcs_default,
                gctxid,
            } => (
                rid,
                rid_dependent,
                None,
                revision_role,
                odcs_default,
                Some(gctxid),
            ),
            other => {
                return Err(Error::UnexpectedFileNode(other.id(), "revision manifest"));
            }
        };

        trace!(%rid, ?rid_dependent, odcs_default, "reading revision manifest");

        let rid_dependent = (!rid_dependent.is_nil()).then_some(rid_dependent);

        let mut revision = Self {
            rid,
            rid_dependent,
            revision_role,
            odcs_default,
            time_creation,
            gctxid,
            data_signature: None,
            objects: IndexMap::new(),
            root_objects: IndexMap::new(),
            object_groups: IndexMap::new(),
            id_table: GlobalIdTable::default(),
        };

        // A dependent revision may appear anywhere after its dependency,
        // not necessarily right behind it.
        let dependency = match rid_dependent {
            Some(dep_rid) => {
                let dependency = revisions
                    .get(&dep_rid)
                    .ok_or(Error::RevisionMismatch(dep_rid))?;

                if dependency.odcs_default != odcs_default {
                    return Err(Error::Invalid(format!(
                        "revision {rid} odcsDefault {odcs_default} differs from dependency's {}",
                        dependency.odcs_default
                    )));
                }

                revision.root_objects = dependency.root_objects.clone();
                revision.id_table = dependency.id_table.clone();
                Some(dependency)
            }
            None => None,
        };

        let encrypted = revision.is_encrypted();
        if encrypted {
            warn!(%rid, "encrypted revision; object contents left undecoded");
        }

        // Nodes before the revision's own global ID table.
        loop {
            let node = Self::manifest_node(nodes, rid)?;

            match node {
                FileNode::RevisionManifestEnd => return Ok(revision),
                FileNode::GlobalIdTableStart { .. } | FileNode::GlobalIdTableStart2 => break,
                FileNode::ObjectDataEncryptionKeyV2 { .. } => {}
                FileNode::ObjectGroupListReference { list, ogid } => {
                    let group = ObjectGroup::read(data, list, !encrypted)?;
                    if group.ogid != ogid {
                        return Err(Error::Invalid(format!(
                            "object group {} does not match its reference {ogid}",
                            group.ogid
                        )));
                    }

                    for (oid, object) in group.objects.iter() {
                        revision.add_object(*oid, object.clone(), revisions)?;
                    }
                    revision.object_groups.insert(ogid, group);
                }
                FileNode::ObjectInfoDependencyOverrides { blob, .. } => {
                    // Reference counts don't matter to a reader; out-of-line
                    // override data is left where it is.
                    if !blob.is_nil() {
                        trace!(%rid, "skipping out-of-line dependency overrides");
                    }
                }
                FileNode::RootObjectReference2 {
                    coid_root,
                    root_role,
                } => {
                    let group = revision.object_groups.last().map(|(_, group)| group);
                    let oid = group
                        .ok_or_else(|| {
                            Error::Invalid(format!(
                                "root object CompactID in revision {rid} before any object group"
                            ))
                        })?
                        .resolve(coid_root)?;
                    revision.root_objects.insert(root_role, oid);
                }
                other => {
                    return Err(Error::UnexpectedFileNode(other.id(), "revision manifest"));
                }
            }
        }

        let previous = dependency.map(|dependency| &dependency.id_table);
        revision.id_table = GlobalIdTable::read(nodes, previous)?;

        // Nodes after the table: root references, direct declarations and
        // object revisions.
        loop {
            let node = Self::manifest_node(nodes, rid)?;

            match node {
                FileNode::RevisionManifestEnd => break,
                FileNode::ObjectInfoDependencyOverrides { blob, .. } => {
                    if !blob.is_nil() {
                        trace!(%rid, "skipping out-of-line dependency overrides");
                    }
                }
                FileNode::RootObjectReference3 {
                    oid_root,
                    root_role,
                } => {
                    revision.root_objects.insert(root_role, oid_root);
                }
                // Tolerated after the table even though the documentation
                // only lists it before; the revision table is active here.
                FileNode::RootObjectReference2 {
                    coid_root,
                    root_role,
                } => {
                    warn!(%rid, "root object CompactID after the revision's global ID table");
                    let oid = revision.id_table.resolve(coid_root)?;
                    revision.root_objects.insert(root_role, oid);
                }
                FileNode::DataSignatureGroupDefinition { signature } => {
                    revision.data_signature = Some(signature);
                }
                FileNode::ObjectDeclarationWithRefCount { object, body, .. }
                | FileNode::ObjectDeclarationWithRefCount2 { object, body, .. } => {
                    if encrypted {
                        continue;
                    }

                    let oid = revision.id_table.resolve(body.coid)?;
                    let set = read_object_prop_set(data, object, body.jcid, &revision.id_table)?;
                    revision.add_object(
                        oid,
                        Object {
                            jcid: body.jcid,
                            data: ObjectData::PropertySet(set),
                        },
                        revisions,
                    )?;
                }
                FileNode::ObjectRevisionWithRefCount { object, coid, .. }
                | FileNode::ObjectRevisionWithRefCount2 { object, coid, .. } => {
                    if encrypted {
                        continue;
                    }

                    let oid = revision.id_table.resolve(coid)?;

                    // The JCID is inherited from the prior definition.
                    let jcid = revision
                        .chain_object(oid, revisions)
                        .ok_or(Error::ObjectNotFound { oid, rid })?
                        .jcid;

                    let set = read_object_prop_set(data, object, jcid, &revision.id_table)?;
                    revision.add_object(
                        oid,
                        Object {
                            jcid,
                            data: ObjectData::PropertySet(set),
                        },
                        revisions,
                    )?;
                }
                other => {
                    return Err(Error::UnexpectedFileNode(other.id(), "revision manifest"));
                }
            }
        }

        Ok(revision)
    }

    fn manifest_node(nodes: &mut FileNodeList, rid: ExGuid) -> Result<FileNode> {
        nodes.next_node()?.ok_or_else(|| {
            Error::Invalid(format!("file node list ended inside revision manifest {rid}"))
        })
    }

    /// Find `oid` in this revision or its dependency chain.
    fn chain_object<'r>(
        &'r self,
        oid: ExGuid,
        revisions: &'r IndexMap<ExGuid, Revision>,
    ) -> Option<&'r Object> {
        if let Some(object) = self.objects.get(&oid) {
            return Some(object);
        }

        let mut rid = self.rid_dependent;
        while let Some(dep_rid) = rid {
            let revision = revisions.get(&dep_rid)?;
            if let Some(object) = revision.objects.get(&oid) {
                return Some(object);
            }
            rid = revision.rid_dependent;
        }

        None
    }

    /// Add an object, enforcing that read-only redefinitions are
    /// byte-identical to any prior definition.
    fn add_object(
        &mut self,
        oid: ExGuid,
        object: Object,
        revisions: &IndexMap<ExGuid, Revision>,
    ) -> Result<()> {
        if object.jcid.is_read_only() {
            if let Some(previous) = self.chain_object(oid, revisions) {
                if !previous.jcid.is_read_only() || previous.raw() != object.raw() {
                    return Err(Error::Invalid(format!(
                        "read-only object {oid} redefined with different content"
                    )));
                }
            }
        }

        self.objects.insert(oid, object);
        Ok(())
    }
}
