use crate::file_node::FileNodeId;
use crate::types::{ExGuid, Guid};
use std::io;
use thiserror::Error;

/// Errors produced while decoding a revision store file.
#[derive(Debug, Error)]
pub enum Error {
    /// A reader ran out of bytes in the middle of a field.
    #[error("unexpected end of data: wanted {wanted} bytes, {remaining} remaining")]
    Truncated { wanted: usize, remaining: usize },

    /// The header's file type GUID is neither a section nor a table of contents.
    #[error("unrecognized file type {0}")]
    UnrecognizedFileFormat(Guid),

    /// A file node header carries an unknown node ID.
    #[error("unrecognized file node ID {0:#05X}")]
    UnrecognizedFileNode(u16),

    /// A file node's base type disagrees with its declared variant.
    #[error("file node {id:?} expects base type {expected}, got {actual}")]
    BaseTypeMismatch {
        id: FileNodeId,
        expected: u8,
        actual: u8,
    },

    /// A file node appeared in a list that forbids it.
    #[error("file node {0:?} not allowed in {1}")]
    UnexpectedFileNode(FileNodeId, &'static str),

    /// A property header carries a data type outside the known set.
    #[error("unrecognized data type {data_type:#04X} in property {prop_id:#010X}")]
    UnrecognizedPropertyDataType { data_type: u8, prop_id: u32 },

    /// An object reference loops back to an object still being built.
    #[error("circular reference between objects {0} and {1}")]
    CircularObjectReference(ExGuid, ExGuid),

    /// A property references an object missing from the revision and its ancestors.
    #[error("object {oid} not found in revision {rid}")]
    ObjectNotFound { oid: ExGuid, rid: ExGuid },

    /// A revision depends on a revision that is not in its object space.
    #[error("dependency revision {0} not present")]
    RevisionMismatch(ExGuid),

    /// A file data reference string starts with an unknown tag.
    #[error("unrecognized file data reference {0:?}")]
    UnrecognizedFileData(String),

    /// Malformed caller-supplied input.
    #[error("{0}")]
    Argument(String),

    /// Structurally invalid data: bad magic, size mismatch, phantom index.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result of decoding a revision store file.
pub type Result<T> = std::result::Result<T, Error>;
