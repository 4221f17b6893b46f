use crate::error::{Error, Result};
use crate::file_node::{AllowedNodes, FileNode, FileNodeId};
use crate::reader::Reader;
use crate::types::ChunkRef;

const FRAGMENT_MAGIC: u64 = 0xA456_7AB1_F5F7_F4C4;
const FRAGMENT_FOOTER: u64 = 0x8BC2_15C3_8233_BA4B;

/// Walker over a possibly fragmented file node list.
///
/// Fragments share a list ID and carry consecutive sequence numbers
/// starting at 0; each ends with a reference to the next fragment and a
/// fixed footer. The node stream stops at a chunk terminator, at a node
/// with a clear valid bit, or when fewer than 4 bytes remain before the
/// fragment trailer.
pub struct FileNodeList<'a> {
    data: &'a [u8],
    next_fragment: ChunkRef,
    body: Option<Reader<'a>>,
    list_id: Option<u32>,
    sequence: u32,
    allowed: Option<AllowedNodes>,
    finished: bool,
}

impl<'a> FileNodeList<'a> {
    pub fn new(data: &'a [u8], start: ChunkRef, allowed: Option<AllowedNodes>) -> Self {
        Self {
            data,
            next_fragment: start,
            body: None,
            list_id: None,
            sequence: 0,
            allowed,
            finished: false,
        }
    }

    /// Decode the next node, crossing fragment boundaries as needed.
    pub fn next_node(&mut self) -> Result<Option<FileNode>> {
        loop {
            if self.finished {
                return Ok(None);
            }

            let body = match &mut self.body {
                Some(body) if body.remaining() >= 4 => body,
                _ => {
                    if !self.load_fragment()? {
                        self.finished = true;
                        return Ok(None);
                    }
                    continue;
                }
            };

            match FileNode::read(body, self.allowed.as_ref())? {
                None => {
                    // Invalid data begun; the list ends without a terminator.
                    self.finished = true;
                    return Ok(None);
                }
                Some(node) if node.id() == FileNodeId::ChunkTerminator => {
                    if self.next_fragment.is_nil() {
                        return Err(Error::Invalid(String::from(
                            "chunk terminator without a next fragment",
                        )));
                    }
                    self.body = None;
                }
                Some(node) => return Ok(Some(node)),
            }
        }
    }

    fn load_fragment(&mut self) -> Result<bool> {
        if self.next_fragment.is_nil() {
            return Ok(false);
        }

        let mut r = self.next_fragment.reader(self.data)?;

        let magic = r.u64()?;
        if magic != FRAGMENT_MAGIC {
            return Err(Error::Invalid(format!(
                "bad file node list magic {magic:#018X}"
            )));
        }

        let list_id = r.u32()?;
        let sequence = r.u32()?;

        match self.list_id {
            None => {
                if sequence != 0 {
                    return Err(Error::Invalid(format!(
                        "file node list starts at fragment sequence {sequence}"
                    )));
                }
                self.list_id = Some(list_id);
            }
            Some(expected) => {
                if list_id != expected {
                    return Err(Error::Invalid(format!(
                        "fragment list ID {list_id} does not match {expected}"
                    )));
                }
                if sequence != self.sequence + 1 {
                    return Err(Error::Invalid(format!(
                        "fragment sequence {sequence} after {}",
                        self.sequence
                    )));
                }
            }
        }
        self.sequence = sequence;

        let mut trailer = r.tail(20)?;
        self.next_fragment = ChunkRef::read_64x32(&mut trailer)?;

        let footer = trailer.u64()?;
        if footer != FRAGMENT_FOOTER {
            return Err(Error::Invalid(format!(
                "bad file node list footer {footer:#018X}"
            )));
        }

        self.body = Some(r);
        Ok(true)
    }
}

impl Iterator for FileNodeList<'_> {
    type Item = Result<FileNode>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_node().transpose()
    }
}
