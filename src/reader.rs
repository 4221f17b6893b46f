use crate::error::{Error, Result};
use std::mem::size_of;

/// Cursor over an immutable byte slab.
///
/// Every structure in a revision store file is addressed by an absolute
/// `(stp, cb)` chunk reference, so sub-readers are plain views into the
/// one buffer loaded at open time.
#[derive(Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

macro_rules! impl_read_num {
    ($($type:ident),+) => {
        $(
            pub fn $type(&mut self) -> Result<$type> {
                let bytes = self.bytes(size_of::<$type>())?;
                Ok($type::from_le_bytes(bytes.try_into().unwrap()))
            }
        )+
    };
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset from the start of this reader's view.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::Truncated {
                wanted: n,
                remaining: self.remaining(),
            });
        }

        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn bytes_array<const S: usize>(&mut self) -> Result<[u8; S]> {
        Ok(self.bytes(S)?.try_into().unwrap())
    }

    impl_read_num!(u8, u16, u32, u64);

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.bytes(n)?;
        Ok(())
    }

    /// Read a `u32` without advancing.
    pub fn peek_u32(&mut self) -> Result<u32> {
        let value = self.u32()?;
        self.pos -= 4;
        Ok(value)
    }

    /// Sub-reader over the next `n` bytes, advancing past them.
    pub fn extract(&mut self, n: usize) -> Result<Reader<'a>> {
        Ok(Reader::new(self.bytes(n)?))
    }

    /// Sub-reader over the last `n` bytes of the view, which are removed
    /// from this reader.
    pub fn tail(&mut self, n: usize) -> Result<Reader<'a>> {
        if n > self.remaining() {
            return Err(Error::Truncated {
                wanted: n,
                remaining: self.remaining(),
            });
        }

        let split = self.buf.len() - n;
        let tail = Reader::new(&self.buf[split..]);
        self.buf = &self.buf[..split];
        Ok(tail)
    }
}
