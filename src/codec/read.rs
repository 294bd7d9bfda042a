//! Structural class file parsing.
//!
//! Produces the [`ClassFile`] intermediate: the constant pool, the top-level shape, and
//! the byte spans of every attribute. The spans are what make byte-surgical sanitation
//! and patching possible; the summary handed to [`crate::artifact::ClassArtifact`] is a
//! projection of this structure.
//!
//! Two modes:
//! - **strict**: any structural violation is an error; used for normal ingestion.
//! - **lenient**: an attribute whose declared length overruns the input, or whose name
//!   slot is not a `Utf8` entry, is recorded as invalid (with a clamped span) instead of
//!   failing the parse; used by the repair step to locate what to cut.

use std::ops::Range;
use std::sync::Arc;

use crate::artifact::{AccessFlags, ClassArtifact, Member};
use crate::codec::io::{read_u16_at, read_u32_at};
use crate::codec::pool::ConstantPool;
use crate::Result;

/// Class file magic number.
pub const CLASS_MAGIC: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

/// Lowest supported major version (Java 1.0).
pub const MIN_MAJOR_VERSION: u16 = 45;

/// One attribute occurrence with its byte spans.
#[derive(Debug, Clone)]
pub(crate) struct AttributeInfo {
    /// Attribute name, empty when the name slot was unresolvable (lenient mode only).
    pub name: String,
    /// Full span: name index, length field, and payload.
    pub span: Range<usize>,
    /// Payload span only.
    pub data: Range<usize>,
    /// Whether the attribute was structurally sound.
    pub valid: bool,
}

/// One field or method with its attribute list.
#[derive(Debug, Clone)]
pub(crate) struct RawMember {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
    pub attributes: Vec<AttributeInfo>,
    /// Offset of this member's `attributes_count` field.
    pub attributes_count_offset: usize,
}

/// Parsed class file structure with byte spans retained.
#[derive(Debug)]
pub(crate) struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub pool: ConstantPool,
    pub access: u16,
    pub name: String,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<RawMember>,
    pub methods: Vec<RawMember>,
    pub attributes: Vec<AttributeInfo>,
    /// Offset of the class-level `attributes_count` field.
    pub attributes_count_offset: usize,
    /// One past the last structurally-owned byte; anything beyond is trailing garbage.
    pub end: usize,
}

/// Quick sanity gate: does this byte payload plausibly hold a class file?
///
/// Checks magic, a generous minimum length, a sane version number, and a minimally
/// populated constant pool. Mach-O universal binaries share the `CAFEBABE` magic, which
/// is why the magic alone is not trusted.
#[must_use]
pub fn is_class_candidate(data: &[u8]) -> bool {
    if data.len() <= 16 || data[..4] != CLASS_MAGIC {
        return false;
    }
    let major = u16::from_be_bytes([data[6], data[7]]);
    if major < MIN_MAJOR_VERSION {
        return false;
    }
    // The smallest real class names itself and its supertype: 4 pool entries.
    let pool_count = u16::from_be_bytes([data[8], data[9]]);
    pool_count >= 4
}

/// Whether the payload begins with the class file magic.
#[must_use]
pub fn matches_class_magic(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == CLASS_MAGIC
}

impl ClassFile {
    /// Parse a class file. See the module docs for strict vs lenient semantics.
    pub(crate) fn parse(data: &[u8], lenient: bool) -> Result<Self> {
        if data.is_empty() {
            return Err(crate::Error::Empty);
        }
        if !matches_class_magic(data) {
            return Err(malformed_error!("missing class file magic"));
        }
        let mut offset = 4;
        let minor_version = read_u16_at(data, &mut offset)?;
        let major_version = read_u16_at(data, &mut offset)?;
        if major_version < MIN_MAJOR_VERSION {
            return Err(malformed_error!(
                "unsupported class file major version {}",
                major_version
            ));
        }
        let pool_count = read_u16_at(data, &mut offset)?;
        let pool = ConstantPool::parse(data, &mut offset, pool_count)?;

        let access = read_u16_at(data, &mut offset)?;
        let this_class = read_u16_at(data, &mut offset)?;
        let super_class = read_u16_at(data, &mut offset)?;
        let name = pool.class_name(this_class)?.to_string();
        let super_name = if super_class == 0 {
            None
        } else {
            Some(pool.class_name(super_class)?.to_string())
        };

        let interface_count = read_u16_at(data, &mut offset)?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            let index = read_u16_at(data, &mut offset)?;
            interfaces.push(pool.class_name(index)?.to_string());
        }

        let fields = Self::parse_members(data, &mut offset, &pool, lenient)?;
        let methods = Self::parse_members(data, &mut offset, &pool, lenient)?;

        let attributes_count_offset = offset;
        let attributes = Self::parse_attributes(data, &mut offset, &pool, lenient)?;

        Ok(Self {
            minor_version,
            major_version,
            pool,
            access,
            name,
            super_name,
            interfaces,
            fields,
            methods,
            attributes,
            attributes_count_offset,
            end: offset,
        })
    }

    fn parse_members(
        data: &[u8],
        offset: &mut usize,
        pool: &ConstantPool,
        lenient: bool,
    ) -> Result<Vec<RawMember>> {
        let count = read_u16_at(data, offset)?;
        let mut members = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let access = read_u16_at(data, offset)?;
            let name = pool.utf8(read_u16_at(data, offset)?)?.to_string();
            let descriptor = pool.utf8(read_u16_at(data, offset)?)?.to_string();
            let attributes_count_offset = *offset;
            let attributes = Self::parse_attributes(data, offset, pool, lenient)?;
            members.push(RawMember {
                access,
                name,
                descriptor,
                attributes,
                attributes_count_offset,
            });
        }
        Ok(members)
    }

    fn parse_attributes(
        data: &[u8],
        offset: &mut usize,
        pool: &ConstantPool,
        lenient: bool,
    ) -> Result<Vec<AttributeInfo>> {
        let count = read_u16_at(data, offset)?;
        let mut attributes = Vec::with_capacity(count.min(64) as usize);
        for _ in 0..count {
            let start = *offset;
            let name_index = read_u16_at(data, offset)?;
            let length = read_u32_at(data, offset)? as usize;
            let data_start = *offset;
            let name = pool.utf8(name_index).map(str::to_string);

            let overruns = data_start
                .checked_add(length)
                .map_or(true, |end| end > data.len());
            if overruns {
                if !lenient {
                    return Err(crate::Error::OutOfBounds);
                }
                // Clamp to end of input; the list cannot be walked further.
                *offset = data.len();
                attributes.push(AttributeInfo {
                    name: name.unwrap_or_default(),
                    span: start..data.len(),
                    data: data_start..data.len(),
                    valid: false,
                });
                break;
            }
            let data_end = data_start + length;
            *offset = data_end;

            match name {
                Ok(name) => attributes.push(AttributeInfo {
                    name,
                    span: start..data_end,
                    data: data_start..data_end,
                    valid: true,
                }),
                Err(err) if !lenient => return Err(err),
                Err(_) => attributes.push(AttributeInfo {
                    name: String::new(),
                    span: start..data_end,
                    data: data_start..data_end,
                    valid: false,
                }),
            }
        }
        Ok(attributes)
    }

    /// Project the parsed structure into an immutable artifact.
    pub(crate) fn summarize(&self, bytes: Arc<[u8]>) -> ClassArtifact {
        let to_members = |raw: &[RawMember]| {
            raw.iter()
                .map(|member| {
                    Member::new(
                        member.name.clone(),
                        member.descriptor.clone(),
                        AccessFlags::from_bits_retain(member.access),
                    )
                })
                .collect()
        };
        ClassArtifact::from_parts(
            self.name.clone(),
            self.super_name.clone(),
            self.interfaces.clone(),
            AccessFlags::from_bits_retain(self.access),
            to_members(&self.fields),
            to_members(&self.methods),
            self.attributes
                .iter()
                .map(|attribute| attribute.name.clone())
                .collect(),
            bytes,
        )
    }
}

/// Decode raw bytes into a [`ClassArtifact`] with a strict structural parse.
///
/// # Errors
/// [`crate::Error::Malformed`] or [`crate::Error::OutOfBounds`] on any structural
/// violation; [`crate::Error::Empty`] on empty input.
pub fn read_class(bytes: &[u8]) -> Result<ClassArtifact> {
    let class_file = ClassFile::parse(bytes, false)?;
    Ok(class_file.summarize(Arc::from(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{ClassBuilder, MethodBody};

    #[test]
    fn test_round_trip_summary() {
        let bytes = ClassBuilder::new("com/example/Foo")
            .super_name("com/example/Base")
            .interface("java/io/Serializable")
            .access(AccessFlags::PUBLIC | AccessFlags::SUPER)
            .field(AccessFlags::PRIVATE, "count", "I")
            .method(AccessFlags::PUBLIC, "run", "()V", MethodBody::NoOp)
            .build();
        let artifact = read_class(&bytes).unwrap();
        assert_eq!(artifact.name(), "com/example/Foo");
        assert_eq!(artifact.super_name(), Some("com/example/Base"));
        assert_eq!(artifact.interfaces(), ["java/io/Serializable".to_string()]);
        assert_eq!(artifact.fields().len(), 1);
        assert_eq!(artifact.fields()[0].descriptor, "I");
        assert_eq!(artifact.methods().len(), 1);
        assert!(artifact.access().contains(AccessFlags::PUBLIC));
    }

    #[test]
    fn test_not_a_class() {
        assert!(read_class(b"PK\x03\x04not a class").is_err());
        assert!(matches!(read_class(b""), Err(crate::Error::Empty)));
    }

    #[test]
    fn test_candidate_gate() {
        let bytes = ClassBuilder::new("A").build();
        assert!(is_class_candidate(&bytes));

        // Mach-O style: right magic, absurd version.
        let mut fake = bytes.clone();
        fake[6] = 0;
        fake[7] = 2;
        assert!(!is_class_candidate(&fake));
        assert!(!is_class_candidate(b"\xCA\xFE\xBA\xBE"));
    }

    #[test]
    fn test_strict_rejects_attribute_overrun() {
        let mut bytes = ClassBuilder::new("A").build();
        // Append a class-level attribute header whose length points past the end.
        let count_offset = bytes.len() - 2;
        bytes[count_offset..].copy_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(&1u16.to_be_bytes()); // name index (whatever Utf8 is at 1)
        bytes.extend_from_slice(&0xFFFF_u32.to_be_bytes());
        assert!(ClassFile::parse(&bytes, false).is_err());
        // Lenient mode records it instead.
        let class_file = ClassFile::parse(&bytes, true).unwrap();
        assert_eq!(class_file.attributes.len(), 1);
        assert!(!class_file.attributes[0].valid);
    }
}
