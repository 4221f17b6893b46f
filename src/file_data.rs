use crate::error::{Error, Result};
use crate::file_node::{AllowedNodes, FileNode, FileNodeId};
use crate::node_list::FileNodeList;
use crate::onestore::OneStoreFile;
use crate::types::{ChunkRef, Guid};
use indexmap::IndexMap;
use std::fs;
use std::path::PathBuf;
use tracing::warn;
use uuid::uuid;

const FILE_DATA_STORE_LIST_NODES: AllowedNodes = AllowedNodes {
    context: "file data store list",
    ids: &[FileNodeId::FileDataStoreObjectReference],
};

const FILE_DATA_HEADER: Guid = Guid::from_uuid(uuid!("BDE316E7-2665-4511-A4C4-8D4D0B7A9EAC"));
const FILE_DATA_FOOTER: Guid = Guid::from_uuid(uuid!("71FBA722-0F79-4A0B-BB13-899256426B24"));

/// The in-file attachment store of a section file: GUID-keyed blobs.
#[derive(Default, Debug)]
pub struct FileDataStore {
    entries: IndexMap<Guid, ChunkRef>,
}

impl FileDataStore {
    pub(crate) fn read(data: &[u8], list: ChunkRef) -> Result<Self> {
        let mut entries = IndexMap::new();

        let mut nodes = FileNodeList::new(data, list, Some(FILE_DATA_STORE_LIST_NODES));
        while let Some(node) = nodes.next_node()? {
            if let FileNode::FileDataStoreObjectReference {
                blob,
                guid_reference,
            } = node
            {
                entries.insert(guid_reference, blob);
            }
        }

        Ok(Self { entries })
    }

    pub fn contains(&self, guid: Guid) -> bool {
        self.entries.contains_key(&guid)
    }

    pub fn guids(&self) -> impl Iterator<Item = Guid> + '_ {
        self.entries.keys().copied()
    }

    /// Extract the blob stored under `guid`.
    pub fn get(&self, data: &[u8], guid: Guid) -> Result<Vec<u8>> {
        let blob = self.entries.get(&guid).ok_or_else(|| {
            Error::Invalid(format!("file data object {guid} not in the store"))
        })?;

        let mut r = blob.reader(data)?;

        let header = Guid::read(&mut r)?;
        if header != FILE_DATA_HEADER {
            return Err(Error::Invalid(format!(
                "file data object {guid} has header GUID {header}"
            )));
        }

        let length = r.u64()? as usize;
        r.skip(12)?; // unused + reserved
        let bytes = r.bytes(length)?.to_vec();

        // The payload is padded to 8 bytes before the footer.
        r.skip(7 & length.wrapping_neg())?;

        let footer = Guid::read(&mut r)?;
        if footer != FILE_DATA_FOOTER {
            return Err(Error::Invalid(format!(
                "file data object {guid} has footer GUID {footer}"
            )));
        }

        Ok(bytes)
    }
}

/// A resolved attachment payload.
#[derive(Clone, Debug, Default)]
pub struct FileData {
    /// File name carrying the original extension, when the reference is
    /// valid.
    pub filename: Option<String>,
    pub bytes: Option<Vec<u8>>,
}

/// Binds file data references to bytes, from the in-file store or the
/// sidecar `<section>_onefiles/` folder.
pub struct FileDataResolver<'a> {
    store: &'a OneStoreFile,
    onefiles_dir: Option<PathBuf>,
}

impl<'a> FileDataResolver<'a> {
    pub fn new(store: &'a OneStoreFile, onefiles_dir: Option<PathBuf>) -> Self {
        Self {
            store,
            onefiles_dir,
        }
    }

    /// Resolve a declaration's reference string and extension.
    pub fn resolve(&self, reference: &str, extension: &str) -> Result<FileData> {
        if let Some(name) = reference.strip_prefix("<file>") {
            let filename = format!("{name}{extension}");

            let bytes = match &self.onefiles_dir {
                Some(dir) => Some(fs::read(dir.join(&filename))?),
                None => {
                    warn!(%filename, "no onefiles folder to resolve file reference");
                    None
                }
            };

            return Ok(FileData {
                filename: Some(filename),
                bytes,
            });
        }

        if let Some(guid) = reference.strip_prefix("<ifndf>") {
            let guid: Guid = guid.parse()?;

            return Ok(FileData {
                filename: Some(format!("{guid}{extension}")),
                bytes: Some(self.store.file_data_store().get(self.store.data(), guid)?),
            });
        }

        if reference.starts_with("<invfdo>") {
            return Ok(FileData::default());
        }

        Err(Error::UnrecognizedFileData(reference.to_string()))
    }
}

/// MIME type for an attachment extension.
pub fn mime_type(extension: &str) -> Option<&'static str> {
    let extension = extension.strip_prefix('.').unwrap_or(extension);

    Some(match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "emf" => "image/emf",
        "wmf" => "image/wmf",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "txt" => "text/plain",
        "htm" | "html" => "text/html",
        "xml" => "text/xml",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "wma" => "audio/x-ms-wma",
        "mp4" => "video/mp4",
        "avi" => "video/x-msvideo",
        "wmv" => "video/x-ms-wmv",
        _ => return None,
    })
}
