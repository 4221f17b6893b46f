//! A Microsoft OneNote revision store (.one / .onetoc2) file reader.
//!
//! The storage layer decodes the OneStore container: the chunked file
//! image, file node lists, object spaces, revisions and property sets.
//! The [`note`] layer materializes the decoded property sets into a
//! typed tree of pages, outlines, text runs and embedded files, which
//! the emitters traverse.

/// Error handling types.
pub mod error;

/// Typed object tree, text runs and version history.
pub mod note {
    pub mod history;
    pub mod nodes;
    pub mod object;
    pub mod schema;
    pub mod text;
}

/// Evernote export (ENEX) rendering of a built object tree.
pub mod enex;
/// JSON rendering of a built object tree.
pub mod json;
/// XML rendering of a built object tree.
pub mod xml;

mod file_data;
mod file_node;
mod header;
mod id_table;
mod node_list;
mod object_group;
mod object_space;
mod onestore;
mod prop;
mod reader;
mod revision;
mod types;

pub use error::{Error, Result};
pub use file_data::{mime_type, FileData, FileDataResolver, FileDataStore};
pub use file_node::{AllowedNodes, FileNode, FileNodeId};
pub use header::Header;
pub use id_table::GlobalIdTable;
pub use node_list::FileNodeList;
pub use note::nodes::TypedNode;
pub use note::object::{BuildOptions, Notebook, NodeObject, ObjectTree, RevisionTree, SpaceTree};
pub use object_group::ObjectGroup;
pub use object_space::ObjectSpace;
pub use onestore::{FileType, OneStoreFile, SECTION_FILE_TYPE, TOC2_FILE_TYPE};
pub use prop::{Property, PropertySet, PropertyValue};
pub use reader::Reader;
pub use revision::{root_role, Object, ObjectData, Revision};
pub use types::{
    filetime_to_unix, time32_to_unix, utf16_str, ChunkRef, CompactId, ExGuid, Guid, Jcid,
};
