//! Referenced-symbol extraction.
//!
//! Walks the bytecode of every `Code` attribute and records each member access, call,
//! and type use together with how it was used, then sweeps the constant pool for types
//! that never appear in an instruction operand: class-literal constants, exception
//! handler catch types, and the descriptors of dynamic call sites. Phantom synthesis
//! consumes these to decide what shape a missing type must have.

use crate::codec::descriptor;
use crate::codec::io::{read_u16_at, read_u32_at};
use crate::codec::pool::{ConstantPool, PoolEntry};
use crate::codec::read::ClassFile;
use crate::Result;

/// How a symbol was used at its reference site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// `getstatic`
    GetStatic,
    /// `putstatic`
    PutStatic,
    /// `getfield`
    GetField,
    /// `putfield`
    PutField,
    /// `invokevirtual`
    InvokeVirtual,
    /// `invokespecial`
    InvokeSpecial,
    /// `invokestatic`
    InvokeStatic,
    /// `invokeinterface`
    InvokeInterface,
    /// A bare type mention (`new`, `anewarray`, `checkcast`, `instanceof`).
    TypeUse,
}

impl RefKind {
    /// Whether this usage implies the member is static.
    #[must_use]
    pub fn is_static_use(self) -> bool {
        matches!(self, Self::GetStatic | Self::PutStatic | Self::InvokeStatic)
    }

    /// Whether this usage names a field.
    #[must_use]
    pub fn is_field_use(self) -> bool {
        matches!(
            self,
            Self::GetStatic | Self::PutStatic | Self::GetField | Self::PutField
        )
    }

    /// Whether this usage names a method.
    #[must_use]
    pub fn is_method_use(self) -> bool {
        matches!(
            self,
            Self::InvokeVirtual | Self::InvokeSpecial | Self::InvokeStatic | Self::InvokeInterface
        )
    }
}

/// One symbol reference found in a method body.
///
/// For [`RefKind::TypeUse`] only `owner` is meaningful; `name` and `descriptor` are
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolRef {
    /// Usage kind at the reference site.
    pub kind: RefKind,
    /// Internal name of the owning (or mentioned) class.
    pub owner: String,
    /// Member name, empty for type uses.
    pub name: String,
    /// Member descriptor, empty for type uses.
    pub descriptor: String,
}

impl SymbolRef {
    /// A member reference.
    #[must_use]
    pub fn member(
        kind: RefKind,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// A bare type use.
    #[must_use]
    pub fn type_use(owner: impl Into<String>) -> Self {
        Self {
            kind: RefKind::TypeUse,
            owner: owner.into(),
            name: String::new(),
            descriptor: String::new(),
        }
    }

    /// Class names this reference drags in beyond its owner (from the descriptor).
    #[must_use]
    pub fn descriptor_class_names(&self) -> Vec<String> {
        descriptor::referenced_class_names(&self.descriptor)
    }
}

/// Extract every symbol reference from a parsed class.
///
/// Member references come from the bytecode walk; the constant pool sweep then picks up
/// types whose only mention is a `Class` constant (class literals, catch types) or a
/// dynamic call-site descriptor. A pool entry with dangling indirections contributes
/// nothing rather than failing the whole scan. Duplicate sites collapse to one entry.
/// Array owners (`[Lfoo/Bar;`) are unwrapped to their element class; primitive-array
/// type uses are dropped.
///
/// # Errors
/// [`crate::Error::Malformed`] when a reference instruction points at a pool slot of
/// the wrong kind, [`crate::Error::OutOfBounds`] when a body is truncated.
pub(crate) fn referenced_symbols(data: &[u8], class_file: &ClassFile) -> Result<Vec<SymbolRef>> {
    let mut refs = Vec::new();
    for method in &class_file.methods {
        for attribute in &method.attributes {
            if attribute.valid && attribute.name == "Code" {
                walk_code(&data[attribute.data.clone()], &class_file.pool, &mut refs)?;
            }
        }
    }
    for (_, entry) in class_file.pool.iter() {
        match entry {
            PoolEntry::Class(name_index) => {
                if let Ok(name) = class_file.pool.utf8(*name_index) {
                    if let Some(name) = element_class(name) {
                        refs.push(SymbolRef::type_use(name));
                    }
                }
            }
            PoolEntry::Dynamic(nat_index) => {
                if let Ok((_, descriptor)) = class_file.pool.name_and_type(*nat_index) {
                    for name in descriptor::referenced_class_names(descriptor) {
                        refs.push(SymbolRef::type_use(name));
                    }
                }
            }
            _ => {}
        }
    }
    refs.sort_by(|a, b| {
        (&a.owner, &a.name, &a.descriptor, a.kind as u8)
            .cmp(&(&b.owner, &b.name, &b.descriptor, b.kind as u8))
    });
    refs.dedup();
    Ok(refs)
}

/// Walk one `Code` attribute payload.
fn walk_code(data: &[u8], pool: &ConstantPool, refs: &mut Vec<SymbolRef>) -> Result<()> {
    let mut offset = 0;
    read_u16_at(data, &mut offset)?; // max_stack
    read_u16_at(data, &mut offset)?; // max_locals
    let code_length = read_u32_at(data, &mut offset)? as usize;
    let code_start = offset;
    let code_end = code_start
        .checked_add(code_length)
        .filter(|&end| end <= data.len())
        .ok_or(crate::Error::OutOfBounds)?;
    let code = &data[code_start..code_end];

    let mut pc = 0usize;
    while pc < code.len() {
        let opcode = code[pc];
        match opcode {
            // getstatic..invokeinterface all carry a pool index at pc+1.
            0xB2..=0xB9 => {
                let mut at = pc + 1;
                let index = read_u16_at(code, &mut at)?;
                push_member_ref(pool, index, opcode, refs)?;
            }
            // new, anewarray, checkcast, instanceof
            0xBB | 0xBD | 0xC0 | 0xC1 => {
                let mut at = pc + 1;
                let index = read_u16_at(code, &mut at)?;
                push_type_use(pool, index, refs)?;
            }
            // multianewarray
            0xC5 => {
                let mut at = pc + 1;
                let index = read_u16_at(code, &mut at)?;
                push_type_use(pool, index, refs)?;
            }
            _ => {}
        }
        pc = pc
            .checked_add(instruction_length(code, pc)?)
            .ok_or(crate::Error::OutOfBounds)?;
    }
    Ok(())
}

fn push_member_ref(
    pool: &ConstantPool,
    index: u16,
    opcode: u8,
    refs: &mut Vec<SymbolRef>,
) -> Result<()> {
    let kind = match opcode {
        0xB2 => RefKind::GetStatic,
        0xB3 => RefKind::PutStatic,
        0xB4 => RefKind::GetField,
        0xB5 => RefKind::PutField,
        0xB6 => RefKind::InvokeVirtual,
        0xB7 => RefKind::InvokeSpecial,
        0xB8 => RefKind::InvokeStatic,
        _ => RefKind::InvokeInterface,
    };
    let (class_index, nat_index) = match pool.get(index) {
        Some(PoolEntry::FieldRef(class, nat))
        | Some(PoolEntry::MethodRef(class, nat))
        | Some(PoolEntry::InterfaceMethodRef(class, nat)) => (*class, *nat),
        _ => {
            return Err(malformed_error!(
                "reference instruction points at non-reference pool slot {}",
                index
            ))
        }
    };
    let owner = pool.class_name(class_index)?;
    let (name, descriptor) = pool.name_and_type(nat_index)?;
    if let Some(owner) = element_class(owner) {
        refs.push(SymbolRef::member(kind, owner, name, descriptor));
    }
    Ok(())
}

fn push_type_use(pool: &ConstantPool, index: u16, refs: &mut Vec<SymbolRef>) -> Result<()> {
    let name = pool.class_name(index)?;
    if let Some(name) = element_class(name) {
        refs.push(SymbolRef::type_use(name));
    }
    Ok(())
}

/// Unwrap array type names to their element class; `None` for primitive arrays.
fn element_class(name: &str) -> Option<&str> {
    if !name.starts_with('[') {
        return Some(name);
    }
    let stripped = name.trim_start_matches('[');
    stripped
        .strip_prefix('L')
        .and_then(|rest| rest.strip_suffix(';'))
}

/// Byte length of the instruction at `pc`, including the opcode.
fn instruction_length(code: &[u8], pc: usize) -> Result<usize> {
    let opcode = code[pc];
    let length = match opcode {
        // wide: doubled operand width; wide iinc has four operand bytes plus the form.
        0xC4 => {
            let modified = *code.get(pc + 1).ok_or(crate::Error::OutOfBounds)?;
            if modified == 0x84 {
                6
            } else {
                4
            }
        }
        // tableswitch: padding to 4-byte alignment, default, low, high, then jumps.
        0xAA => {
            let pad = (4 - ((pc + 1) % 4)) % 4;
            let mut at = pc + 1 + pad + 4; // skip default
            let low = read_u32_at(code, &mut at)? as i32;
            let high = read_u32_at(code, &mut at)? as i32;
            if high < low {
                return Err(malformed_error!("tableswitch range {}..{} is inverted", low, high));
            }
            let jumps = (high as i64 - low as i64 + 1) as usize;
            1 + pad + 12 + jumps * 4
        }
        // lookupswitch: padding, default, npairs, then pairs.
        0xAB => {
            let pad = (4 - ((pc + 1) % 4)) % 4;
            let mut at = pc + 1 + pad + 4; // skip default
            let npairs = read_u32_at(code, &mut at)? as usize;
            1 + pad + 8 + npairs * 8
        }
        _ => 1 + operand_bytes(opcode),
    };
    Ok(length)
}

/// Fixed operand byte counts for every non-variable-length opcode.
fn operand_bytes(opcode: u8) -> usize {
    match opcode {
        // bipush, ldc, loads/stores with index, newarray, ret
        0x10 | 0x12 | 0x15..=0x19 | 0x36..=0x3A | 0xA9 | 0xBC => 1,
        // sipush, ldc_w, ldc2_w, iinc, branches, gotos, jsr, field refs and plain
        // invokes, new/anewarray/checkcast/instanceof, ifnull/ifnonnull
        0x11 | 0x13 | 0x14 | 0x84 | 0x99..=0xA8 | 0xB2..=0xB8 | 0xBB | 0xBD | 0xC0 | 0xC1
        | 0xC6 | 0xC7 => 2,
        // multianewarray
        0xC5 => 3,
        // invokeinterface (index, count, zero), invokedynamic, goto_w, jsr_w
        0xB9 | 0xBA | 0xC8 | 0xC9 => 4,
        _ => 0,
    }
}
