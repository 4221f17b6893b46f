use crate::error::{Error, Result};
use crate::reader::Reader;
use crate::types::{read_prefixed_utf16, ChunkRef, CompactId, ExGuid, Guid, Jcid};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// On-disk file node IDs.
///
/// Names follow [MS-ONESTORE] §2.4.3 with the `FND`/`FNDX` suffixes
/// dropped.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum FileNodeId {
    ObjectSpaceManifestRoot = 0x004,
    ObjectSpaceManifestListReference = 0x008,
    ObjectSpaceManifestListStart = 0x00C,
    RevisionManifestListReference = 0x010,
    RevisionManifestListStart = 0x014,
    RevisionManifestStart4 = 0x01B,
    RevisionManifestEnd = 0x01C,
    RevisionManifestStart6 = 0x01E,
    RevisionManifestStart7 = 0x01F,
    GlobalIdTableStart = 0x021,
    GlobalIdTableStart2 = 0x022,
    GlobalIdTableEntry = 0x024,
    GlobalIdTableEntry2 = 0x025,
    GlobalIdTableEntry3 = 0x026,
    GlobalIdTableEnd = 0x028,
    ObjectDeclarationWithRefCount = 0x02D,
    ObjectDeclarationWithRefCount2 = 0x02E,
    ObjectRevisionWithRefCount = 0x041,
    ObjectRevisionWithRefCount2 = 0x042,
    RootObjectReference2 = 0x059,
    RootObjectReference3 = 0x05A,
    RevisionRoleDeclaration = 0x05C,
    RevisionRoleAndContextDeclaration = 0x05D,
    ObjectDeclarationFileData3RefCount = 0x072,
    ObjectDeclarationFileData3LargeRefCount = 0x073,
    ObjectDataEncryptionKeyV2 = 0x07C,
    ObjectInfoDependencyOverrides = 0x084,
    DataSignatureGroupDefinition = 0x08C,
    FileDataStoreListReference = 0x090,
    FileDataStoreObjectReference = 0x094,
    ObjectDeclaration2RefCount = 0x0A4,
    ObjectDeclaration2LargeRefCount = 0x0A5,
    ObjectGroupListReference = 0x0B0,
    ObjectGroupStart = 0x0B4,
    ObjectGroupEnd = 0x0B8,
    HashedChunkDescriptor2 = 0x0C2,
    ReadOnlyObjectDeclaration2RefCount = 0x0C4,
    ReadOnlyObjectDeclaration2LargeRefCount = 0x0C5,
    ChunkTerminator = 0x0FF,
}

impl FileNodeId {
    /// Base type declared for the variant: 0 carries no chunk reference,
    /// 1 references a data blob, 2 references another file node list.
    fn base_type(self) -> u8 {
        use FileNodeId::*;

        match self {
            ObjectSpaceManifestListReference
            | RevisionManifestListReference
            | FileDataStoreListReference
            | ObjectGroupListReference => 2,
            ObjectDeclarationWithRefCount
            | ObjectDeclarationWithRefCount2
            | ObjectRevisionWithRefCount
            | ObjectRevisionWithRefCount2
            | ObjectDataEncryptionKeyV2
            | ObjectInfoDependencyOverrides
            | FileDataStoreObjectReference
            | ObjectDeclaration2RefCount
            | ObjectDeclaration2LargeRefCount
            | HashedChunkDescriptor2
            | ReadOnlyObjectDeclaration2RefCount
            | ReadOnlyObjectDeclaration2LargeRefCount => 1,
            _ => 0,
        }
    }
}

/// The set of file nodes a list context accepts.
#[derive(Clone, Copy)]
pub struct AllowedNodes {
    pub context: &'static str,
    pub ids: &'static [FileNodeId],
}

/// Body shared by the `ObjectDeclarationWithRefCount` variants.
///
/// The on-disk form stores only a 10-bit JCID index, implying a plain
/// property set; the index is required to be 1.
#[derive(Clone, Copy, Debug)]
pub struct ObjectDeclarationBody {
    pub coid: CompactId,
    pub jcid: Jcid,
    pub odcs: u16,
    pub has_oid_references: bool,
    pub has_osid_references: bool,
}

impl ObjectDeclarationBody {
    fn read(r: &mut Reader) -> Result<Self> {
        let coid = CompactId::read(r)?;

        let word = r.u16()?;
        let index = word & 0x3FF;
        if index != 1 {
            return Err(Error::Invalid(format!(
                "object declaration JCID index {index}, expected 1"
            )));
        }
        let odcs = word & 0x3C00;

        let flags = r.u32()?;

        Ok(Self {
            coid,
            jcid: Jcid(index as u32 | 0x20000),
            odcs,
            has_oid_references: flags & 1 != 0,
            has_osid_references: flags & 2 != 0,
        })
    }
}

/// Body shared by the `ObjectDeclaration2` and `ReadOnlyObjectDeclaration2`
/// variants.
#[derive(Clone, Copy, Debug)]
pub struct ObjectDeclaration2Body {
    pub coid: CompactId,
    pub jcid: Jcid,
    pub has_oid_references: bool,
    pub has_osid_references: bool,
}

impl ObjectDeclaration2Body {
    fn read(r: &mut Reader) -> Result<Self> {
        let coid = CompactId::read(r)?;
        let jcid = Jcid::read(r)?;
        let flags = r.u8()?;

        Ok(Self {
            coid,
            jcid,
            has_oid_references: flags & 1 != 0,
            has_osid_references: flags & 2 != 0,
        })
    }
}

/// One reference count override.
#[derive(Clone, Copy, Debug)]
pub struct DependencyOverride {
    pub coid: CompactId,
    pub c_ref: u32,
}

/// Inline payload of `ObjectInfoDependencyOverrides`.
#[derive(Clone, Debug)]
pub struct DependencyOverrides {
    pub crc: u32,
    pub overrides: Vec<DependencyOverride>,
}

impl DependencyOverrides {
    fn read(r: &mut Reader) -> Result<Self> {
        let c_8bit = r.u32()?;
        let c_32bit = r.u32()?;
        let crc = r.u32()?;

        let mut overrides = Vec::with_capacity((c_8bit + c_32bit) as usize);

        for _ in 0..c_8bit {
            let coid = CompactId::read(r)?;
            let c_ref = r.u8()? as u32;
            overrides.push(DependencyOverride { coid, c_ref });
        }

        for _ in 0..c_32bit {
            let coid = CompactId::read(r)?;
            let c_ref = r.u32()?;
            overrides.push(DependencyOverride { coid, c_ref });
        }

        Ok(Self { crc, overrides })
    }
}

/// A decoded file node.
#[derive(Clone, Debug)]
pub enum FileNode {
    ObjectSpaceManifestRoot {
        gosid_root: ExGuid,
    },
    ObjectSpaceManifestListReference {
        list: ChunkRef,
        gosid: ExGuid,
    },
    ObjectSpaceManifestListStart {
        gosid: ExGuid,
    },
    RevisionManifestListReference {
        list: ChunkRef,
    },
    RevisionManifestListStart {
        gosid: ExGuid,
        n_instance: u32,
    },
    RevisionManifestStart4 {
        rid: ExGuid,
        rid_dependent: ExGuid,
        time_creation: u64,
        revision_role: u32,
        odcs_default: u16,
    },
    RevisionManifestEnd,
    RevisionManifestStart6 {
        rid: ExGuid,
        rid_dependent: ExGuid,
        revision_role: u32,
        odcs_default: u16,
    },
    RevisionManifestStart7 {
        rid: ExGuid,
        rid_dependent: ExGuid,
        revision_role: u32,
        odcs_default: u16,
        gctxid: ExGuid,
    },
    GlobalIdTableStart {
        reserved: u8,
    },
    GlobalIdTableStart2,
    GlobalIdTableEntry {
        index: u32,
        guid: Guid,
    },
    GlobalIdTableEntry2 {
        index_map_from: u32,
        index_map_to: u32,
    },
    GlobalIdTableEntry3 {
        copy_from_start: u32,
        entries_to_copy: u32,
        copy_to_start: u32,
    },
    GlobalIdTableEnd,
    ObjectDeclarationWithRefCount {
        object: ChunkRef,
        body: ObjectDeclarationBody,
        c_ref: u32,
    },
    ObjectDeclarationWithRefCount2 {
        object: ChunkRef,
        body: ObjectDeclarationBody,
        c_ref: u32,
    },
    ObjectRevisionWithRefCount {
        object: ChunkRef,
        coid: CompactId,
        has_oid_references: bool,
        has_osid_references: bool,
        c_ref: u32,
    },
    ObjectRevisionWithRefCount2 {
        object: ChunkRef,
        coid: CompactId,
        has_oid_references: bool,
        has_osid_references: bool,
        c_ref: u32,
    },
    RootObjectReference2 {
        coid_root: CompactId,
        root_role: u32,
    },
    RootObjectReference3 {
        oid_root: ExGuid,
        root_role: u32,
    },
    RevisionRoleDeclaration {
        rid: ExGuid,
        revision_role: u32,
    },
    RevisionRoleAndContextDeclaration {
        rid: ExGuid,
        revision_role: u32,
        gctxid: ExGuid,
    },
    ObjectDeclarationFileData3RefCount {
        coid: CompactId,
        jcid: Jcid,
        c_ref: u32,
        file_data_reference: String,
        extension: String,
    },
    ObjectDeclarationFileData3LargeRefCount {
        coid: CompactId,
        jcid: Jcid,
        c_ref: u32,
        file_data_reference: String,
        extension: String,
    },
    ObjectDataEncryptionKeyV2 {
        blob: ChunkRef,
    },
    ObjectInfoDependencyOverrides {
        blob: ChunkRef,
        overrides: Option<DependencyOverrides>,
    },
    DataSignatureGroupDefinition {
        signature: ExGuid,
    },
    FileDataStoreListReference {
        list: ChunkRef,
    },
    FileDataStoreObjectReference {
        blob: ChunkRef,
        guid_reference: Guid,
    },
    ObjectDeclaration2RefCount {
        blob: ChunkRef,
        body: ObjectDeclaration2Body,
        c_ref: u32,
    },
    ObjectDeclaration2LargeRefCount {
        blob: ChunkRef,
        body: ObjectDeclaration2Body,
        c_ref: u32,
    },
    ObjectGroupListReference {
        list: ChunkRef,
        ogid: ExGuid,
    },
    ObjectGroupStart {
        ogid: ExGuid,
    },
    ObjectGroupEnd,
    HashedChunkDescriptor2 {
        blob: ChunkRef,
        guid_hash: Guid,
    },
    ReadOnlyObjectDeclaration2RefCount {
        blob: ChunkRef,
        body: ObjectDeclaration2Body,
        c_ref: u32,
        md5_hash: [u8; 16],
    },
    ReadOnlyObjectDeclaration2LargeRefCount {
        blob: ChunkRef,
        body: ObjectDeclaration2Body,
        c_ref: u32,
        md5_hash: [u8; 16],
    },
    ChunkTerminator,
}

impl FileNode {
    /// Decode one file node, or `None` when the valid bit is clear and the
    /// list ends here.
    pub fn read(r: &mut Reader, allowed: Option<&AllowedNodes>) -> Result<Option<Self>> {
        let start_offset = r.offset();
        let header = r.u32()?;

        if header & 0x8000_0000 == 0 {
            return Ok(None);
        }

        let raw_id = (header & 0x3FF) as u16;
        let size = ((header >> 10) & 0x1FFF) as usize;
        let stp_format = ((header >> 23) & 0x3) as u8;
        let cb_format = ((header >> 25) & 0x3) as u8;
        let base_type = ((header >> 27) & 0xF) as u8;

        let id = FileNodeId::try_from(raw_id).map_err(|_| Error::UnrecognizedFileNode(raw_id))?;

        if id.base_type() != base_type {
            return Err(Error::BaseTypeMismatch {
                id,
                expected: id.base_type(),
                actual: base_type,
            });
        }

        if let Some(allowed) = allowed {
            if id != FileNodeId::ChunkTerminator && !allowed.ids.contains(&id) {
                return Err(Error::UnexpectedFileNode(id, allowed.context));
            }
        }

        let reference = if base_type == 0 {
            ChunkRef::NIL
        } else {
            ChunkRef::read(r, stp_format, cb_format)?
        };

        let node = Self::read_body(id, reference, r)?;

        if start_offset + size != r.offset() {
            return Err(Error::Invalid(format!(
                "file node {id:?} declared {size} bytes, read {}",
                r.offset() - start_offset
            )));
        }

        Ok(Some(node))
    }

    fn read_body(id: FileNodeId, reference: ChunkRef, r: &mut Reader) -> Result<Self> {
        let node = match id {
            FileNodeId::ObjectSpaceManifestRoot => Self::ObjectSpaceManifestRoot {
                gosid_root: ExGuid::read(r)?,
            },
            FileNodeId::ObjectSpaceManifestListReference => Self::ObjectSpaceManifestListReference {
                list: reference,
                gosid: ExGuid::read(r)?,
            },
            FileNodeId::ObjectSpaceManifestListStart => Self::ObjectSpaceManifestListStart {
                gosid: ExGuid::read(r)?,
            },
            FileNodeId::RevisionManifestListReference => {
                Self::RevisionManifestListReference { list: reference }
            }
            FileNodeId::RevisionManifestListStart => Self::RevisionManifestListStart {
                gosid: ExGuid::read(r)?,
                n_instance: r.u32()?,
            },
            FileNodeId::RevisionManifestStart4 => Self::RevisionManifestStart4 {
                rid: ExGuid::read(r)?,
                rid_dependent: ExGuid::read(r)?,
                time_creation: r.u64()?,
                revision_role: r.u32()?,
                odcs_default: r.u16()?,
            },
            FileNodeId::RevisionManifestEnd => Self::RevisionManifestEnd,
            FileNodeId::RevisionManifestStart6 => Self::RevisionManifestStart6 {
                rid: ExGuid::read(r)?,
                rid_dependent: ExGuid::read(r)?,
                revision_role: r.u32()?,
                odcs_default: r.u16()?,
            },
            FileNodeId::RevisionManifestStart7 => Self::RevisionManifestStart7 {
                rid: ExGuid::read(r)?,
                rid_dependent: ExGuid::read(r)?,
                revision_role: r.u32()?,
                odcs_default: r.u16()?,
                gctxid: ExGuid::read(r)?,
            },
            FileNodeId::GlobalIdTableStart => Self::GlobalIdTableStart { reserved: r.u8()? },
            FileNodeId::GlobalIdTableStart2 => Self::GlobalIdTableStart2,
            FileNodeId::GlobalIdTableEntry => Self::GlobalIdTableEntry {
                index: r.u32()?,
                guid: Guid::read(r)?,
            },
            FileNodeId::GlobalIdTableEntry2 => Self::GlobalIdTableEntry2 {
                index_map_from: r.u32()?,
                index_map_to: r.u32()?,
            },
            FileNodeId::GlobalIdTableEntry3 => Self::GlobalIdTableEntry3 {
                copy_from_start: r.u32()?,
                entries_to_copy: r.u32()?,
                copy_to_start: r.u32()?,
            },
            FileNodeId::GlobalIdTableEnd => Self::GlobalIdTableEnd,
            FileNodeId::ObjectDeclarationWithRefCount => Self::ObjectDeclarationWithRefCount {
                object: reference,
                body: ObjectDeclarationBody::read(r)?,
                c_ref: r.u8()? as u32,
            },
            FileNodeId::ObjectDeclarationWithRefCount2 => Self::ObjectDeclarationWithRefCount2 {
                object: reference,
                body: ObjectDeclarationBody::read(r)?,
                c_ref: r.u32()?,
            },
            FileNodeId::ObjectRevisionWithRefCount => {
                let coid = CompactId::read(r)?;
                let flags = r.u8()?;

                Self::ObjectRevisionWithRefCount {
                    object: reference,
                    coid,
                    has_oid_references: flags & 1 != 0,
                    has_osid_references: flags & 2 != 0,
                    c_ref: (flags >> 2) as u32,
                }
            }
            FileNodeId::ObjectRevisionWithRefCount2 => {
                let coid = CompactId::read(r)?;
                let flags = r.u32()?;

                Self::ObjectRevisionWithRefCount2 {
                    object: reference,
                    coid,
                    has_oid_references: flags & 1 != 0,
                    has_osid_references: flags & 2 != 0,
                    c_ref: r.u32()?,
                }
            }
            FileNodeId::RootObjectReference2 => Self::RootObjectReference2 {
                coid_root: CompactId::read(r)?,
                root_role: r.u32()?,
            },
            FileNodeId::RootObjectReference3 => Self::RootObjectReference3 {
                oid_root: ExGuid::read(r)?,
                root_role: r.u32()?,
            },
            FileNodeId::RevisionRoleDeclaration => Self::RevisionRoleDeclaration {
                rid: ExGuid::read(r)?,
                revision_role: r.u32()?,
            },
            FileNodeId::RevisionRoleAndContextDeclaration => {
                Self::RevisionRoleAndContextDeclaration {
                    rid: ExGuid::read(r)?,
                    revision_role: r.u32()?,
                    gctxid: ExGuid::read(r)?,
                }
            }
            FileNodeId::ObjectDeclarationFileData3RefCount => {
                let coid = CompactId::read(r)?;
                let jcid = Jcid::read(r)?;
                let c_ref = r.u8()? as u32;

                Self::ObjectDeclarationFileData3RefCount {
                    coid,
                    jcid,
                    c_ref,
                    file_data_reference: read_prefixed_utf16(r)?,
                    extension: read_prefixed_utf16(r)?,
                }
            }
            FileNodeId::ObjectDeclarationFileData3LargeRefCount => {
                let coid = CompactId::read(r)?;
                let jcid = Jcid::read(r)?;
                let c_ref = r.u32()?;

                Self::ObjectDeclarationFileData3LargeRefCount {
                    coid,
                    jcid,
                    c_ref,
                    file_data_reference: read_prefixed_utf16(r)?,
                    extension: read_prefixed_utf16(r)?,
                }
            }
            FileNodeId::ObjectDataEncryptionKeyV2 => {
                Self::ObjectDataEncryptionKeyV2 { blob: reference }
            }
            FileNodeId::ObjectInfoDependencyOverrides => {
                let overrides = if reference.is_nil() {
                    Some(DependencyOverrides::read(r)?)
                } else {
                    None
                };

                Self::ObjectInfoDependencyOverrides {
                    blob: reference,
                    overrides,
                }
            }
            FileNodeId::DataSignatureGroupDefinition => Self::DataSignatureGroupDefinition {
                signature: ExGuid::read(r)?,
            },
            FileNodeId::FileDataStoreListReference => {
                Self::FileDataStoreListReference { list: reference }
            }
            FileNodeId::FileDataStoreObjectReference => Self::FileDataStoreObjectReference {
                blob: reference,
                guid_reference: Guid::read(r)?,
            },
            FileNodeId::ObjectDeclaration2RefCount => Self::ObjectDeclaration2RefCount {
                blob: reference,
                body: ObjectDeclaration2Body::read(r)?,
                c_ref: r.u8()? as u32,
            },
            FileNodeId::ObjectDeclaration2LargeRefCount => Self::ObjectDeclaration2LargeRefCount {
                blob: reference,
                body: ObjectDeclaration2Body::read(r)?,
                c_ref: r.u32()?,
            },
            FileNodeId::ObjectGroupListReference => Self::ObjectGroupListReference {
                list: reference,
                ogid: ExGuid::read(r)?,
            },
            FileNodeId::ObjectGroupStart => Self::ObjectGroupStart {
                ogid: ExGuid::read(r)?,
            },
            FileNodeId::ObjectGroupEnd => Self::ObjectGroupEnd,
            FileNodeId::HashedChunkDescriptor2 => Self::HashedChunkDescriptor2 {
                blob: reference,
                guid_hash: Guid::read(r)?,
            },
            FileNodeId::ReadOnlyObjectDeclaration2RefCount => {
                let body = ObjectDeclaration2Body::read(r)?;
                let c_ref = r.u8()? as u32;
                Self::read_only_declaration(reference, body, c_ref, r, false)?
            }
            FileNodeId::ReadOnlyObjectDeclaration2LargeRefCount => {
                let body = ObjectDeclaration2Body::read(r)?;
                let c_ref = r.u32()?;
                Self::read_only_declaration(reference, body, c_ref, r, true)?
            }
            FileNodeId::ChunkTerminator => Self::ChunkTerminator,
        };

        Ok(node)
    }

    fn read_only_declaration(
        blob: ChunkRef,
        body: ObjectDeclaration2Body,
        c_ref: u32,
        r: &mut Reader,
        large: bool,
    ) -> Result<Self> {
        if !body.jcid.is_property_set() || !body.jcid.is_read_only() {
            return Err(Error::Invalid(format!(
                "read-only object declaration with non-read-only {:?}",
                body.jcid
            )));
        }

        let md5_hash = r.bytes_array()?;

        Ok(if large {
            Self::ReadOnlyObjectDeclaration2LargeRefCount {
                blob,
                body,
                c_ref,
                md5_hash,
            }
        } else {
            Self::ReadOnlyObjectDeclaration2RefCount {
                blob,
                body,
                c_ref,
                md5_hash,
            }
        })
    }

    /// The ID this node was decoded from.
    pub fn id(&self) -> FileNodeId {
        match self {
            Self::ObjectSpaceManifestRoot { .. } => FileNodeId::ObjectSpaceManifestRoot,
            Self::ObjectSpaceManifestListReference { .. } => {
                FileNodeId::ObjectSpaceManifestListReference
            }
            Self::ObjectSpaceManifestListStart { .. } => FileNodeId::ObjectSpaceManifestListStart,
            Self::RevisionManifestListReference { .. } => FileNodeId::RevisionManifestListReference,
            Self::RevisionManifestListStart { .. } => FileNodeId::RevisionManifestListStart,
            Self::RevisionManifestStart4 { .. } => FileNodeId::RevisionManifestStart4,
            Self::RevisionManifestEnd => FileNodeId::RevisionManifestEnd,
            Self::RevisionManifestStart6 { .. } => FileNodeId::RevisionManifestStart6,
            Self::RevisionManifestStart7 { .. } => FileNodeId::RevisionManifestStart7,
            Self::GlobalIdTableStart { .. } => FileNodeId::GlobalIdTableStart,
            Self::GlobalIdTableStart2 => FileNodeId::GlobalIdTableStart2,
            Self::GlobalIdTableEntry { .. } => FileNodeId::GlobalIdTableEntry,
            Self::GlobalIdTableEntry2 { .. } => FileNodeId::GlobalIdTableEntry2,
            Self::GlobalIdTableEntry3 { .. } => FileNodeId::GlobalIdTableEntry3,
            Self::GlobalIdTableEnd => FileNodeId::GlobalIdTableEnd,
            Self::ObjectDeclarationWithRefCount { .. } => FileNodeId::ObjectDeclarationWithRefCount,
            Self::ObjectDeclarationWithRefCount2 { .. } => {
                FileNodeId::ObjectDeclarationWithRefCount2
            }
            Self::ObjectRevisionWithRefCount { .. } => FileNodeId::ObjectRevisionWithRefCount,
            Self::ObjectRevisionWithRefCount2 { .. } => FileNodeId::ObjectRevisionWithRefCount2,
            Self::RootObjectReference2 { .. } => FileNodeId::RootObjectReference2,
            Self::RootObjectReference3 { .. } => FileNodeId::RootObjectReference3,
            Self::RevisionRoleDeclaration { .. } => FileNodeId::RevisionRoleDeclaration,
            Self::RevisionRoleAndContextDeclaration { .. } => {
                FileNodeId::RevisionRoleAndContextDeclaration
            }
            Self::ObjectDeclarationFileData3RefCount { .. } => {
                FileNodeId::ObjectDeclarationFileData3RefCount
            }
            Self::ObjectDeclarationFileData3LargeRefCount { .. } => {
                FileNodeId::ObjectDeclarationFileData3LargeRefCount
            }
            Self::ObjectDataEncryptionKeyV2 { .. } => FileNodeId::ObjectDataEncryptionKeyV2,
            Self::ObjectInfoDependencyOverrides { .. } => FileNodeId::ObjectInfoDependencyOverrides,
            Self::DataSignatureGroupDefinition { .. } => FileNodeId::DataSignatureGroupDefinition,
            Self::FileDataStoreListReference { .. } => FileNodeId::FileDataStoreListReference,
            Self::FileDataStoreObjectReference { .. } => FileNodeId::FileDataStoreObjectReference,
            Self::ObjectDeclaration2RefCount { .. } => FileNodeId::ObjectDeclaration2RefCount,
            Self::ObjectDeclaration2LargeRefCount { .. } => {
                FileNodeId::ObjectDeclaration2LargeRefCount
            }
            Self::ObjectGroupListReference { .. } => FileNodeId::ObjectGroupListReference,
            Self::ObjectGroupStart { .. } => FileNodeId::ObjectGroupStart,
            Self::ObjectGroupEnd => FileNodeId::ObjectGroupEnd,
            Self::HashedChunkDescriptor2 { .. } => FileNodeId::HashedChunkDescriptor2,
            Self::ReadOnlyObjectDeclaration2RefCount { .. } => {
                FileNodeId::ReadOnlyObjectDeclaration2RefCount
            }
            Self::ReadOnlyObjectDeclaration2LargeRefCount { .. } => {
                FileNodeId::ReadOnlyObjectDeclaration2LargeRefCount
            }
            Self::ChunkTerminator => FileNodeId::ChunkTerminator,
        }
    }
}
