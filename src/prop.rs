use crate::error::{Error, Result};
use crate::id_table::GlobalIdTable;
use crate::reader::Reader;
use crate::types::{ChunkRef, CompactId, ExGuid, Jcid};
use indexmap::IndexMap;

/// Property data types, encoded in bits 26..31 of a property header.
pub mod data_type {
    pub const NO_DATA: u8 = 0x01;
    pub const BOOL: u8 = 0x02;
    pub const ONE_BYTE: u8 = 0x03;
    pub const TWO_BYTES: u8 = 0x04;
    pub const FOUR_BYTES: u8 = 0x05;
    pub const EIGHT_BYTES: u8 = 0x06;
    pub const PREFIXED_BYTES: u8 = 0x07;
    pub const OBJECT_ID: u8 = 0x08;
    pub const OBJECT_ID_ARRAY: u8 = 0x09;
    pub const OBJECT_SPACE_ID: u8 = 0x0A;
    pub const OBJECT_SPACE_ID_ARRAY: u8 = 0x0B;
    pub const CONTEXT_ID: u8 = 0x0C;
    pub const CONTEXT_ID_ARRAY: u8 = 0x0D;
    pub const PROPERTY_VALUE_ARRAY: u8 = 0x10;
    pub const PROPERTY_SET: u8 = 0x11;
}

/// A decoded property value.
#[derive(Clone, Debug)]
pub enum PropertyValue {
    NoData,
    /// Carried entirely in the header's value bit.
    Bool(bool),
    /// 1, 2, 4 or 8 inline bytes; the width is the property's data type.
    Uint(u64),
    /// Length-prefixed raw bytes.
    Bytes(Vec<u8>),
    /// A CompactID from the OIDs stream; `None` for the zero CompactID.
    ObjectId(Option<ExGuid>),
    ObjectIds(Vec<Option<ExGuid>>),
    ObjectSpaceId(ExGuid),
    ObjectSpaceIds(Vec<ExGuid>),
    ContextId(ExGuid),
    ContextIds(Vec<ExGuid>),
    /// Array of nested property sets.
    PropertyValues(Vec<PropertySet>),
    /// One nested property set.
    PropertySet(Box<PropertySet>),
}

/// One property: a 26-bit identity plus its decoded value.
#[derive(Clone, Debug)]
pub struct Property {
    /// Property header word without the value bit; this includes the data
    /// type bits and is the key emitters match on.
    pub id: u32,
    pub data_type: u8,
    pub value: PropertyValue,
}

impl Property {
    fn read(header: u32, r: &mut Reader, streams: &mut IdStreams) -> Result<Self> {
        let id = header & 0x7FFF_FFFF;
        let data_type = ((header >> 26) & 0x1F) as u8;

        let value = match data_type {
            data_type::NO_DATA => PropertyValue::NoData,
            data_type::BOOL => PropertyValue::Bool(header & 0x8000_0000 != 0),
            data_type::ONE_BYTE => PropertyValue::Uint(r.u8()? as u64),
            data_type::TWO_BYTES => PropertyValue::Uint(r.u16()? as u64),
            data_type::FOUR_BYTES => PropertyValue::Uint(r.u32()? as u64),
            data_type::EIGHT_BYTES => PropertyValue::Uint(r.u64()?),
            data_type::PREFIXED_BYTES => {
                let length = r.u32()? as usize;
                PropertyValue::Bytes(r.bytes(length)?.to_vec())
            }
            data_type::OBJECT_ID => PropertyValue::ObjectId(streams.next_oid()?),
            data_type::OBJECT_ID_ARRAY => {
                let count = r.u32()?;
                let mut oids = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    oids.push(streams.next_oid()?);
                }
                PropertyValue::ObjectIds(oids)
            }
            data_type::OBJECT_SPACE_ID => PropertyValue::ObjectSpaceId(streams.next_osid()?),
            data_type::OBJECT_SPACE_ID_ARRAY => {
                let count = r.u32()?;
                let mut osids = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    osids.push(streams.next_osid()?);
                }
                PropertyValue::ObjectSpaceIds(osids)
            }
            data_type::CONTEXT_ID => PropertyValue::ContextId(streams.next_ctxid()?),
            data_type::CONTEXT_ID_ARRAY => {
                let count = r.u32()?;
                let mut ctxids = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    ctxids.push(streams.next_ctxid()?);
                }
                PropertyValue::ContextIds(ctxids)
            }
            data_type::PROPERTY_VALUE_ARRAY => {
                let count = r.u32()?;
                let mut sets = Vec::with_capacity(count as usize);

                if count != 0 {
                    let inner = r.u32()?;
                    let inner_type = ((inner >> 26) & 0x1F) as u8;
                    if inner_type != data_type::PROPERTY_SET {
                        return Err(Error::Invalid(format!(
                            "property value array with element type {inner_type:#04X}"
                        )));
                    }

                    for _ in 0..count {
                        sets.push(PropertySet::read(r, Jcid::PROPERTY_SET, streams)?);
                    }
                }

                PropertyValue::PropertyValues(sets)
            }
            data_type::PROPERTY_SET => PropertyValue::PropertySet(Box::new(PropertySet::read(
                r,
                Jcid::PROPERTY_SET,
                streams,
            )?)),
            _ => {
                return Err(Error::UnrecognizedPropertyDataType {
                    data_type,
                    prop_id: id,
                })
            }
        };

        Ok(Self {
            id,
            data_type,
            value,
        })
    }
}

/// A decoded property set: a schema tag plus its properties in on-disk
/// order.
#[derive(Clone, Debug)]
pub struct PropertySet {
    pub jcid: Jcid,
    pub properties: IndexMap<u32, Property>,
    /// Original blob bytes, retained for read-only objects so
    /// redefinitions can be checked for byte equality.
    pub raw: Option<Vec<u8>>,
}

impl PropertySet {
    fn read(r: &mut Reader, jcid: Jcid, streams: &mut IdStreams) -> Result<Self> {
        let c_properties = r.u16()? as usize;
        let mut headers = r.extract(4 * c_properties)?;

        let mut properties = IndexMap::with_capacity(c_properties);
        for _ in 0..c_properties {
            let header = headers.u32()?;
            let property = Property::read(header, r, streams)?;
            properties.insert(property.id, property);
        }

        Ok(Self {
            jcid,
            properties,
            raw: None,
        })
    }

    pub fn get(&self, id: u32) -> Option<&Property> {
        self.properties.get(&id)
    }
}

/// The three CompactID streams at the head of a property set blob,
/// pre-resolved against the active global ID table.
///
/// Properties consume entries in declaration order; the counts must
/// balance exactly once the top-level set is read.
struct IdStreams {
    oids: std::vec::IntoIter<Option<ExGuid>>,
    osids: std::vec::IntoIter<ExGuid>,
    ctxids: std::vec::IntoIter<ExGuid>,
}

impl IdStreams {
    fn next_oid(&mut self) -> Result<Option<ExGuid>> {
        self.oids
            .next()
            .ok_or_else(|| Error::Invalid(String::from("OIDs stream exhausted")))
    }

    fn next_osid(&mut self) -> Result<ExGuid> {
        self.osids
            .next()
            .ok_or_else(|| Error::Invalid(String::from("OSIDs stream exhausted")))
    }

    fn next_ctxid(&mut self) -> Result<ExGuid> {
        self.ctxids
            .next()
            .ok_or_else(|| Error::Invalid(String::from("ContextIDs stream exhausted")))
    }

    fn finish(self) -> Result<()> {
        let left = self.oids.len() + self.osids.len() + self.ctxids.len();
        if left != 0 {
            return Err(Error::Invalid(format!(
                "{left} stream entries not consumed by properties"
            )));
        }
        Ok(())
    }
}

struct StreamHeader {
    count: u32,
    extended_streams_present: bool,
    osid_stream_not_present: bool,
}

impl StreamHeader {
    fn read(r: &mut Reader) -> Result<Self> {
        let header = r.u32()?;

        Ok(Self {
            count: header & 0x00FF_FFFF,
            extended_streams_present: header & 0x4000_0000 != 0,
            osid_stream_not_present: header & 0x8000_0000 != 0,
        })
    }
}

/// Parse an object's property set blob.
///
/// The blob starts with the OIDs stream, optionally followed by the
/// OSIDs and ContextIDs streams, then the property set body.
pub fn read_object_prop_set(
    data: &[u8],
    blob: ChunkRef,
    jcid: Jcid,
    table: &GlobalIdTable,
) -> Result<PropertySet> {
    let mut r = blob.reader(data)?;

    let raw = if jcid.is_read_only() {
        Some(r.clone().bytes(r.remaining())?.to_vec())
    } else {
        None
    };

    let oids_header = StreamHeader::read(&mut r)?;
    let mut oids = Vec::with_capacity(oids_header.count as usize);
    for _ in 0..oids_header.count {
        let id = CompactId::read(&mut r)?;
        oids.push(if id.is_zero() {
            None
        } else {
            Some(table.resolve(id)?)
        });
    }

    let mut osids = Vec::new();
    let mut ctxids = Vec::new();

    if !oids_header.osid_stream_not_present {
        let osids_header = StreamHeader::read(&mut r)?;
        for _ in 0..osids_header.count {
            osids.push(table.resolve(CompactId::read(&mut r)?)?);
        }

        if osids_header.extended_streams_present {
            let ctxids_header = StreamHeader::read(&mut r)?;
            for _ in 0..ctxids_header.count {
                ctxids.push(table.resolve(CompactId::read(&mut r)?)?);
            }
        }
    }

    let mut streams = IdStreams {
        oids: oids.into_iter(),
        osids: osids.into_iter(),
        ctxids: ctxids.into_iter(),
    };

    let mut set = PropertySet::read(&mut r, jcid, &mut streams)?;
    streams.finish()?;

    set.raw = raw;
    Ok(set)
}
