use crate::error::{Error, Result};
use crate::reader::Reader;
use std::fmt::{self, Debug, Display};
use std::str::FromStr;
use uuid::Uuid;

/// A 16-byte GUID, stored in the file in little-endian field order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Guid(Uuid);

impl Guid {
    pub const NIL: Self = Self(Uuid::nil());

    pub(crate) const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self(Uuid::from_bytes_le(r.bytes_array()?)))
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Big-endian field bytes, used for content hashing.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Uuid::encode_buffer();
        f.write_str(self.0.braced().encode_upper(&mut buf))
    }
}

impl Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for Guid {
    type Err = Error;

    /// Parse the canonical curly-brace form `{XXXXXXXX-XXXX-...}`.
    fn from_str(s: &str) -> Result<Self> {
        let inner = s
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| Error::Argument(format!("invalid GUID: {s}")))?;

        match Uuid::try_parse(inner) {
            Ok(uuid) if inner.len() == 36 => Ok(Self(uuid)),
            _ => Err(Error::Argument(format!("invalid GUID: {s}"))),
        }
    }
}

/// A GUID extended with a 32-bit sequence number, forming a unique identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExGuid {
    pub guid: Guid,
    pub n: u32,
}

impl ExGuid {
    pub const NIL: Self = Self {
        guid: Guid::NIL,
        n: 0,
    };

    pub fn new(guid: Guid, n: u32) -> Self {
        Self { guid, n }
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        let guid = Guid::read(r)?;
        let n = r.u32()?;
        Ok(Self { guid, n })
    }

    pub fn is_nil(&self) -> bool {
        self.guid.is_nil() && self.n == 0
    }
}

impl Display for ExGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{}}}", self.guid, self.n)
    }
}

impl Debug for ExGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A short local reference to an `ExGuid`, resolved through the enclosing
/// global identification table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CompactId(u32);

impl CompactId {
    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self(r.u32()?))
    }

    /// The `ExGuid.n` value.
    pub fn n(self) -> u32 {
        self.0 & 0xFF
    }

    /// Index into the global identification table.
    pub fn guid_index(self) -> u32 {
        self.0 >> 8
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Display for CompactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}},{}", self.guid_index(), self.n())
    }
}

/// A 32-bit schema tag identifying a property set's type and traits.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Jcid(pub u32);

impl Jcid {
    /// A bare property set, as implied by single-index declarations.
    pub const PROPERTY_SET: Self = Self(0x0002_0000);

    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self(r.u32()?))
    }

    /// The 16-bit schema identity.
    pub fn index(self) -> u16 {
        self.0 as u16
    }

    pub fn is_binary(self) -> bool {
        self.0 & 0x10000 != 0
    }

    pub fn is_property_set(self) -> bool {
        self.0 & 0x20000 != 0
    }

    pub fn is_graph_node(self) -> bool {
        self.0 & 0x40000 != 0
    }

    pub fn is_file_data(self) -> bool {
        self.0 & 0x80000 != 0
    }

    pub fn is_read_only(self) -> bool {
        self.0 & 0x100000 != 0
    }
}

impl Debug for Jcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Jcid({:#08X})", self.0)
    }
}

/// An absolute `(stp, cb)` byte range within the file.
///
/// References come in four position and four size encodings; all are
/// normalized to 64-bit on read, including the Nil sentinel.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChunkRef {
    pub stp: u64,
    pub cb: u64,
}

impl ChunkRef {
    pub const NIL: Self = Self {
        stp: u64::MAX,
        cb: 0,
    };

    /// Read with the encoding selected by a file node header's
    /// `stpFormat` and `cbFormat` bits.
    pub fn read(r: &mut Reader, stp_format: u8, cb_format: u8) -> Result<Self> {
        let stp = match stp_format {
            0 => r.u64()?,
            1 => r.u32()? as u64,
            2 => r.u16()? as u64 * 8,
            _ => r.u32()? as u64 * 8,
        };

        let cb = match cb_format {
            0 => r.u32()? as u64,
            1 => r.u64()?,
            2 => r.u8()? as u64 * 8,
            _ => r.u16()? as u64 * 8,
        };

        let mut reference = Self { stp, cb };

        if cb == 0 {
            let nil_stp = match stp_format {
                1 => stp == u32::MAX as u64,
                2 => stp == u16::MAX as u64 * 8,
                3 => stp == u32::MAX as u64 * 8,
                _ => false,
            };

            if nil_stp {
                reference.stp = u64::MAX;
            }
        }

        Ok(reference)
    }

    /// 8-byte `FileChunkReference32`.
    pub fn read_32(r: &mut Reader) -> Result<Self> {
        let stp = r.u32()? as u64;
        let cb = r.u32()? as u64;

        if cb == 0 && stp == u32::MAX as u64 {
            return Ok(Self::NIL);
        }

        Ok(Self { stp, cb })
    }

    /// 12-byte `FileChunkReference64x32`.
    pub fn read_64x32(r: &mut Reader) -> Result<Self> {
        let stp = r.u64()?;
        let cb = r.u32()? as u64;
        Ok(Self { stp, cb })
    }

    /// 16-byte `FileChunkReference64`.
    pub fn read_64(r: &mut Reader) -> Result<Self> {
        let stp = r.u64()?;
        let cb = r.u64()?;
        Ok(Self { stp, cb })
    }

    pub fn is_nil(&self) -> bool {
        self.stp == u64::MAX && self.cb == 0
    }

    pub fn is_zero(&self) -> bool {
        self.stp == 0 && self.cb == 0
    }

    /// Reader over the referenced byte range.
    pub fn reader<'a>(&self, data: &'a [u8]) -> Result<Reader<'a>> {
        usize::try_from(self.stp)
            .ok()
            .and_then(|stp| Some(stp..stp.checked_add(usize::try_from(self.cb).ok()?)?))
            .and_then(|range| data.get(range))
            .map(Reader::new)
            .ok_or_else(|| Error::Invalid(format!("chunk reference {self} out of bounds")))
    }
}

impl Display for ChunkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}:{:X}", self.stp, self.cb)
    }
}

/// Decode UTF-16LE bytes, tolerating isolated surrogates and stopping at
/// an embedded NUL.
pub fn utf16_str(bytes: &[u8]) -> String {
    let mut out = String::new();
    let mut units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));

    while let Some(unit) = units.next() {
        let code = if (0xD800..=0xDFFF).contains(&unit) {
            if unit >= 0xDC00 {
                // Isolated low surrogate.
                continue;
            }

            let low = match units.next() {
                Some(low) => low,
                None => break,
            };

            if !(0xDC00..=0xDFFF).contains(&low) {
                continue;
            }

            0x10000 + (((unit - 0xD800) as u32) << 10 | (low - 0xDC00) as u32)
        } else {
            unit as u32
        };

        if code == 0 {
            break;
        }

        out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    out
}

/// Read a `StringInStorageBuffer`: a character count followed by that many
/// UTF-16 code units.
pub fn read_prefixed_utf16(r: &mut Reader) -> Result<String> {
    let cch = r.u32()? as usize;
    Ok(utf16_str(r.bytes(cch * 2)?))
}

/// Seconds between 1601-01-01 and the Unix epoch.
const FILETIME_UNIX_OFFSET: i64 = 11_644_473_600;

/// Seconds between the Unix epoch and 1980-01-01.
const TIME32_UNIX_OFFSET: i64 = 315_532_800;

/// Convert a FILETIME (100 ns ticks since 1601-01-01) to Unix seconds.
pub fn filetime_to_unix(filetime: u64) -> i64 {
    (filetime / 10_000_000) as i64 - FILETIME_UNIX_OFFSET
}

/// Convert a Time32 (seconds since 1980-01-01) to Unix seconds.
pub fn time32_to_unix(time32: u32) -> i64 {
    time32 as i64 + TIME32_UNIX_OFFSET
}
