//! Constant pool parsing and lookup.
//!
//! The pool is parsed in one pass into a positional entry table; `Long` and `Double`
//! occupy two slots per the class file format, with the second slot recorded as
//! [`PoolEntry::Unusable`]. Lookups resolve indirections (`Class` -> `Utf8`,
//! member refs -> `NameAndType` -> `Utf8`) with full bounds and tag checking so that
//! malformed indices surface as [`crate::Error::Malformed`] instead of panics.

use crate::codec::io::{read_bytes_at, read_u16_at, read_u32_at, read_u8_at};
use crate::Result;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

/// One parsed constant pool slot.
///
/// Only the entry kinds the structural summary needs retain their payload; value
/// constants are recorded as presence-only so the positional indexing stays correct.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PoolEntry {
    /// Modified-UTF8 text. Decoded leniently as UTF-8; lone surrogates are replaced.
    Utf8(String),
    /// A class reference pointing at a `Utf8` name slot.
    Class(u16),
    /// A field reference: class slot + name-and-type slot.
    FieldRef(u16, u16),
    /// A method reference: class slot + name-and-type slot.
    MethodRef(u16, u16),
    /// An interface method reference: class slot + name-and-type slot.
    InterfaceMethodRef(u16, u16),
    /// A name/descriptor pair of `Utf8` slots.
    NameAndType(u16, u16),
    /// A `Dynamic` or `InvokeDynamic` entry, retaining its `NameAndType` slot.
    Dynamic(u16),
    /// Any other valid entry kind (values and method handles).
    Other,
    /// Slot 0, or the second slot of a `Long`/`Double`.
    Unusable,
}

/// Positional constant pool table.
#[derive(Debug)]
pub(crate) struct ConstantPool {
    entries: Vec<PoolEntry>,
}

impl ConstantPool {
    /// Parse `count - 1` entries (slot 0 is reserved) starting at `offset`.
    pub(crate) fn parse(data: &[u8], offset: &mut usize, count: u16) -> Result<Self> {
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(PoolEntry::Unusable);
        let mut index = 1u16;
        while index < count {
            let tag = read_u8_at(data, offset)?;
            let entry = match tag {
                TAG_UTF8 => {
                    let len = read_u16_at(data, offset)? as usize;
                    let raw = read_bytes_at(data, offset, len)?;
                    PoolEntry::Utf8(decode_modified_utf8(raw))
                }
                TAG_INTEGER | TAG_FLOAT => {
                    read_u32_at(data, offset)?;
                    PoolEntry::Other
                }
                TAG_LONG | TAG_DOUBLE => {
                    read_u32_at(data, offset)?;
                    read_u32_at(data, offset)?;
                    entries.push(PoolEntry::Other);
                    index += 1;
                    if index >= count {
                        return Err(malformed_error!(
                            "wide constant at pool slot {} overruns the pool",
                            index - 1
                        ));
                    }
                    PoolEntry::Unusable
                }
                TAG_CLASS => PoolEntry::Class(read_u16_at(data, offset)?),
                TAG_STRING | TAG_METHOD_TYPE | TAG_MODULE | TAG_PACKAGE => {
                    read_u16_at(data, offset)?;
                    PoolEntry::Other
                }
                TAG_FIELDREF => {
                    PoolEntry::FieldRef(read_u16_at(data, offset)?, read_u16_at(data, offset)?)
                }
                TAG_METHODREF => {
                    PoolEntry::MethodRef(read_u16_at(data, offset)?, read_u16_at(data, offset)?)
                }
                TAG_INTERFACE_METHODREF => PoolEntry::InterfaceMethodRef(
                    read_u16_at(data, offset)?,
                    read_u16_at(data, offset)?,
                ),
                TAG_NAME_AND_TYPE => {
                    PoolEntry::NameAndType(read_u16_at(data, offset)?, read_u16_at(data, offset)?)
                }
                TAG_METHOD_HANDLE => {
                    read_u8_at(data, offset)?;
                    read_u16_at(data, offset)?;
                    PoolEntry::Other
                }
                TAG_DYNAMIC | TAG_INVOKE_DYNAMIC => {
                    read_u16_at(data, offset)?; // bootstrap method index
                    PoolEntry::Dynamic(read_u16_at(data, offset)?)
                }
                _ => {
                    return Err(malformed_error!(
                        "unknown constant pool tag {} at slot {}",
                        tag,
                        index
                    ))
                }
            };
            entries.push(entry);
            index += 1;
        }
        Ok(Self { entries })
    }

    /// Number of slots, including slot 0.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, index: u16) -> Option<&PoolEntry> {
        self.entries.get(index as usize)
    }

    /// Resolve a `Utf8` slot.
    pub(crate) fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index) {
            Some(PoolEntry::Utf8(text)) => Ok(text),
            _ => Err(malformed_error!("pool slot {} is not a Utf8 entry", index)),
        }
    }

    /// Resolve a `Class` slot to its internal name.
    pub(crate) fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index) {
            Some(PoolEntry::Class(name_index)) => self.utf8(*name_index),
            _ => Err(malformed_error!("pool slot {} is not a Class entry", index)),
        }
    }

    /// Resolve a `NameAndType` slot to its `(name, descriptor)` pair.
    pub(crate) fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index) {
            Some(PoolEntry::NameAndType(name_index, descriptor_index)) => {
                Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?))
            }
            _ => Err(malformed_error!(
                "pool slot {} is not a NameAndType entry",
                index
            )),
        }
    }

    /// Iterate all slots with their indices.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (u16, &PoolEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (index as u16, entry))
    }
}

/// Decode modified UTF-8 as used by the class file format.
///
/// Real modified UTF-8 differs from standard UTF-8 only for `\0` and supplementary
/// characters; both are rare in symbol names, so a lossy standard decode is sufficient
/// for structural purposes while never failing on obfuscated garbage names.
fn decode_modified_utf8(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}
