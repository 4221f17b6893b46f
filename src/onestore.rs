use crate::error::{Error, Result};
use crate::file_data::FileDataStore;
use crate::file_node::{AllowedNodes, FileNode, FileNodeId};
use crate::header::Header;
use crate::node_list::FileNodeList;
use crate::object_space::ObjectSpace;
use crate::reader::Reader;
use crate::types::{ExGuid, Guid};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use tracing::debug;
use uuid::uuid;

/// File type GUID of a `.one` section file.
pub const SECTION_FILE_TYPE: Guid =
    Guid::from_uuid(uuid!("7B5C52E4-D88C-4DA7-AEB1-5378D02996D3"));

/// File type GUID of a `.onetoc2` table of contents file.
pub const TOC2_FILE_TYPE: Guid = Guid::from_uuid(uuid!("43FF2FA1-EFD9-4C76-9EE2-10EA5722765F"));

/// The two recognized revision store flavors.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FileType {
    /// A notebook section (`.one`).
    Section,
    /// A notebook table of contents (`.onetoc2`).
    Toc2,
}

const SECTION_ROOT_NODES: AllowedNodes = AllowedNodes {
    context: "root file node list",
    ids: &[
        FileNodeId::ObjectSpaceManifestRoot,
        FileNodeId::ObjectSpaceManifestListReference,
        FileNodeId::FileDataStoreListReference,
    ],
};

const TOC2_ROOT_NODES: AllowedNodes = AllowedNodes {
    context: "root file node list",
    ids: &[
        FileNodeId::ObjectSpaceManifestRoot,
        FileNodeId::ObjectSpaceManifestListReference,
    ],
};

/// A fully loaded revision store file.
pub struct OneStoreFile {
    data: Vec<u8>,
    header: Header,
    file_type: FileType,
    root_gosid: ExGuid,
    object_spaces: IndexMap<ExGuid, ObjectSpace>,
    file_data: FileDataStore,
}

impl OneStoreFile {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::parse(fs::read(path)?)
    }

    /// Parse a revision store image.
    pub fn parse(data: Vec<u8>) -> Result<Self> {
        let mut r = Reader::new(&data);
        let header = Header::read(&mut r.extract(Header::SIZE)?)?;

        let file_type = if header.guid_file_type == SECTION_FILE_TYPE {
            FileType::Section
        } else if header.guid_file_type == TOC2_FILE_TYPE {
            FileType::Toc2
        } else {
            return Err(Error::UnrecognizedFileFormat(header.guid_file_type));
        };

        debug!(?file_type, file_size = data.len(), "parsing revision store");

        let allowed = match file_type {
            FileType::Section => SECTION_ROOT_NODES,
            FileType::Toc2 => TOC2_ROOT_NODES,
        };

        let mut root_gosid = None;
        let mut space_references = vec![];
        let mut file_data = FileDataStore::default();

        let mut nodes =
            FileNodeList::new(&data, header.fcr_file_node_list_root, Some(allowed));
        while let Some(node) = nodes.next_node()? {
            match node {
                FileNode::ObjectSpaceManifestRoot { gosid_root } => {
                    if root_gosid.replace(gosid_root).is_some() {
                        return Err(Error::Invalid(String::from(
                            "more than one root object space declaration",
                        )));
                    }
                }
                FileNode::ObjectSpaceManifestListReference { list, gosid } => {
                    space_references.push((gosid, list));
                }
                FileNode::FileDataStoreListReference { list } => {
                    file_data = FileDataStore::read(&data, list)?;
                }
                _ => unreachable!("filtered by the allowed node set"),
            }
        }

        let root_gosid = root_gosid.ok_or_else(|| {
            Error::Invalid(String::from("missing root object space declaration"))
        })?;

        let mut object_spaces = IndexMap::with_capacity(space_references.len());
        for (gosid, list) in space_references {
            let space = ObjectSpace::read(&data, file_type, list)?;
            if space.gosid != gosid {
                return Err(Error::Invalid(format!(
                    "object space {} does not match its reference {gosid}",
                    space.gosid
                )));
            }
            object_spaces.insert(gosid, space);
        }

        if object_spaces.is_empty() {
            return Err(Error::Invalid(String::from("file contains no object spaces")));
        }

        Ok(Self {
            data,
            header,
            file_type,
            root_gosid,
            object_spaces,
            file_data,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn is_section(&self) -> bool {
        self.file_type == FileType::Section
    }

    pub fn is_toc2(&self) -> bool {
        self.file_type == FileType::Toc2
    }

    /// The object space holding the section or TOC root.
    pub fn root_object_space_id(&self) -> ExGuid {
        self.root_gosid
    }

    pub fn object_spaces(&self) -> impl Iterator<Item = (ExGuid, &ObjectSpace)> {
        self.object_spaces.iter().map(|(gosid, space)| (*gosid, space))
    }

    pub fn object_space(&self, gosid: ExGuid) -> Option<&ObjectSpace> {
        self.object_spaces.get(&gosid)
    }

    pub fn file_data_store(&self) -> &FileDataStore {
        &self.file_data
    }

    /// The raw file image; chunk references index into this.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
