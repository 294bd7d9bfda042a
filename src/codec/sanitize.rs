//! Byte-surgical attribute removal.
//!
//! Both repairs here cut whole attributes out of the original bytes instead of
//! re-encoding the class: bytecode offsets are constant-pool-relative, so a rebuild
//! would have to rewrite every `Code` body, while splicing spans out and fixing the
//! affected `attributes_count` fields leaves everything else byte-identical.

use crate::codec::io::read_u16_at;
use crate::codec::read::ClassFile;
use crate::codec::signature;
use crate::Result;

/// One attribute scheduled for removal.
struct Removal {
    /// Byte span of the whole attribute (name index through payload end).
    start: usize,
    end: usize,
    /// Offset of the `attributes_count` field that must be decremented.
    count_offset: usize,
}

/// Remove the scheduled attributes and fix their count fields.
fn splice(data: &[u8], mut removals: Vec<Removal>) -> Result<Vec<u8>> {
    let mut patched = data.to_vec();
    for removal in &removals {
        let mut at = removal.count_offset;
        let count = read_u16_at(&patched, &mut at)?;
        let count = count.checked_sub(1).ok_or_else(|| {
            malformed_error!(
                "attribute count at offset {} underflowed during repair",
                removal.count_offset
            )
        })?;
        patched[removal.count_offset..removal.count_offset + 2]
            .copy_from_slice(&count.to_be_bytes());
    }
    removals.sort_by_key(|removal| removal.start);
    let mut out = Vec::with_capacity(patched.len());
    let mut cursor = 0;
    for removal in &removals {
        if removal.start < cursor || removal.end > patched.len() {
            return Err(crate::Error::OutOfBounds);
        }
        out.extend_from_slice(&patched[cursor..removal.start]);
        cursor = removal.end;
    }
    out.extend_from_slice(&patched[cursor..]);
    Ok(out)
}

/// Strip `Signature` attributes whose content does not satisfy the generic signature
/// grammar. Returns `None` when every signature was already valid.
///
/// # Errors
/// Propagates parse errors; the input must already be a structurally valid class.
pub fn strip_invalid_signatures(data: &[u8]) -> Result<Option<Vec<u8>>> {
    let class_file = ClassFile::parse(data, false)?;
    let mut removals = Vec::new();

    let mut collect = |attributes: &[crate::codec::read::AttributeInfo],
                       count_offset: usize,
                       validate: fn(&str) -> bool| {
        for attribute in attributes {
            if attribute.name != "Signature" {
                continue;
            }
            let resolved = {
                let mut at = attribute.data.start;
                read_u16_at(data, &mut at)
                    .ok()
                    .filter(|_| attribute.data.len() == 2)
                    .and_then(|index| class_file.pool.utf8(index).ok())
            };
            // An unresolvable signature slot is as bad as an ungrammatical one.
            if !resolved.map_or(false, validate) {
                removals.push(Removal {
                    start: attribute.span.start,
                    end: attribute.span.end,
                    count_offset,
                });
            }
        }
    };

    collect(
        &class_file.attributes,
        class_file.attributes_count_offset,
        signature::is_valid_class_signature,
    );
    for field in &class_file.fields {
        collect(
            &field.attributes,
            field.attributes_count_offset,
            signature::is_valid_field_signature,
        );
    }
    for method in &class_file.methods {
        collect(
            &method.attributes,
            method.attributes_count_offset,
            signature::is_valid_method_signature,
        );
    }

    if removals.is_empty() {
        return Ok(None);
    }
    let repaired = splice(data, removals)?;
    ClassFile::parse(&repaired, false)?;
    Ok(Some(repaired))
}

/// Repair a class that fails a strict parse by cutting the structurally invalid
/// attributes found by a lenient parse and dropping trailing garbage.
///
/// # Errors
/// Fails when even the lenient parse cannot walk the input, or when the repaired bytes
/// still do not parse strictly.
pub fn patch_class(data: &[u8]) -> Result<Vec<u8>> {
    let class_file = ClassFile::parse(data, true)?;
    let mut removals = Vec::new();

    for attribute in &class_file.attributes {
        if !attribute.valid {
            removals.push(Removal {
                start: attribute.span.start,
                end: attribute.span.end,
                count_offset: class_file.attributes_count_offset,
            });
        }
    }
    for member in class_file.fields.iter().chain(&class_file.methods) {
        for attribute in &member.attributes {
            if !attribute.valid {
                removals.push(Removal {
                    start: attribute.span.start,
                    end: attribute.span.end,
                    count_offset: member.attributes_count_offset,
                });
            }
        }
    }

    let end = class_file.end;
    let mut repaired = splice(data, removals)?;
    if end < data.len() {
        let trailing = data.len() - end;
        repaired.truncate(repaired.len() - trailing);
    }
    ClassFile::parse(&repaired, false)?;
    Ok(repaired)
}
