//! Minimal class file construction.
//!
//! [`ClassBuilder`] emits structurally valid class files from a declared shape: used by
//! phantom synthesis (missing types with no-op members), export hollowing (re-emitting a
//! class with empty bodies), and the test factories. It deliberately supports only what
//! those callers need; it is not a general assembler.

use std::collections::HashMap;

use crate::artifact::{AccessFlags, Member, ROOT_OBJECT};
use crate::codec::descriptor;
use crate::codec::refs::{RefKind, SymbolRef};

/// Default major version emitted (Java 8).
pub const DEFAULT_MAJOR_VERSION: u16 = 52;

/// How a built method gets its body.
#[derive(Debug, Clone)]
pub enum MethodBody {
    /// No `Code` attribute at all (abstract and native methods).
    None,
    /// A minimal no-op body returning the zero value of the return type.
    NoOp,
    /// A body that touches each given symbol once, then returns.
    ///
    /// Emitted instructions are structurally parseable but make no attempt at
    /// verifiability; this variant exists so reference-extraction inputs can be built
    /// without a full assembler.
    Refs(Vec<SymbolRef>),
}

/// Builder for a minimal class file.
///
/// ```rust,ignore
/// let bytes = ClassBuilder::new("com/example/Gen")
///     .access(AccessFlags::PUBLIC | AccessFlags::SUPER)
///     .method(AccessFlags::PUBLIC, "run", "()V", MethodBody::NoOp)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    access: AccessFlags,
    minor_version: u16,
    major_version: u16,
    fields: Vec<Member>,
    methods: Vec<(Member, MethodBody)>,
    attributes: Vec<String>,
}

impl ClassBuilder {
    /// Start a builder for the given internal name.
    ///
    /// Defaults: superclass `java/lang/Object` (none when building the root type itself),
    /// `public super` access, Java 8 version.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let super_name = if name == ROOT_OBJECT {
            None
        } else {
            Some(ROOT_OBJECT.to_string())
        };
        Self {
            name,
            super_name,
            interfaces: Vec::new(),
            access: AccessFlags::PUBLIC | AccessFlags::SUPER,
            minor_version: 0,
            major_version: DEFAULT_MAJOR_VERSION,
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Set the superclass internal name.
    #[must_use]
    pub fn super_name(mut self, super_name: impl Into<String>) -> Self {
        self.super_name = Some(super_name.into());
        self
    }

    /// Add an implemented interface.
    #[must_use]
    pub fn interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    /// Set the class access flags.
    #[must_use]
    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    /// Set the emitted class file version.
    #[must_use]
    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major_version = major;
        self.minor_version = minor;
        self
    }

    /// Add a field.
    #[must_use]
    pub fn field(mut self, access: AccessFlags, name: &str, descriptor: &str) -> Self {
        self.fields.push(Member::new(name, descriptor, access));
        self
    }

    /// Add a method with the given body strategy.
    #[must_use]
    pub fn method(
        mut self,
        access: AccessFlags,
        name: &str,
        descriptor: &str,
        body: MethodBody,
    ) -> Self {
        self.methods
            .push((Member::new(name, descriptor, access), body));
        self
    }

    /// Add a zero-length named class attribute (provenance markers).
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    /// Serialize the class file.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let mut pool = PoolWriter::default();
        let this_class = pool.class(&self.name);
        let super_class = self.super_name.as_deref().map(|name| pool.class(name));
        let interfaces: Vec<u16> = self
            .interfaces
            .iter()
            .map(|name| pool.class(name))
            .collect();

        struct BuiltMember {
            access: u16,
            name_index: u16,
            descriptor_index: u16,
            code: Option<Vec<u8>>,
        }

        let fields: Vec<BuiltMember> = self
            .fields
            .iter()
            .map(|field| BuiltMember {
                access: field.access.bits(),
                name_index: pool.utf8(&field.name),
                descriptor_index: pool.utf8(&field.descriptor),
                code: None,
            })
            .collect();

        let code_attribute_name = if self.methods.iter().any(|(_, body)| !matches!(body, MethodBody::None)) {
            Some(pool.utf8("Code"))
        } else {
            None
        };

        let methods: Vec<BuiltMember> = self
            .methods
            .iter()
            .map(|(method, body)| BuiltMember {
                access: method.access.bits(),
                name_index: pool.utf8(&method.name),
                descriptor_index: pool.utf8(&method.descriptor),
                code: build_code(&mut pool, &method.descriptor, body),
            })
            .collect();

        let attribute_names: Vec<u16> = self
            .attributes
            .iter()
            .map(|name| pool.utf8(name))
            .collect();

        let mut out = Vec::with_capacity(256 + pool.buffer.len());
        out.extend_from_slice(&super::read::CLASS_MAGIC);
        out.extend_from_slice(&self.minor_version.to_be_bytes());
        out.extend_from_slice(&self.major_version.to_be_bytes());
        out.extend_from_slice(&pool.count.to_be_bytes());
        out.extend_from_slice(&pool.buffer);
        out.extend_from_slice(&self.access.bits().to_be_bytes());
        out.extend_from_slice(&this_class.to_be_bytes());
        out.extend_from_slice(&super_class.unwrap_or(0).to_be_bytes());
        out.extend_from_slice(&(interfaces.len() as u16).to_be_bytes());
        for interface in &interfaces {
            out.extend_from_slice(&interface.to_be_bytes());
        }

        for members in [&fields, &methods] {
            out.extend_from_slice(&(members.len() as u16).to_be_bytes());
            for member in members.iter() {
                out.extend_from_slice(&member.access.to_be_bytes());
                out.extend_from_slice(&member.name_index.to_be_bytes());
                out.extend_from_slice(&member.descriptor_index.to_be_bytes());
                match (&member.code, code_attribute_name) {
                    (Some(code), Some(name_index)) => {
                        out.extend_from_slice(&1u16.to_be_bytes());
                        out.extend_from_slice(&name_index.to_be_bytes());
                        out.extend_from_slice(&(code.len() as u32).to_be_bytes());
                        out.extend_from_slice(code);
                    }
                    _ => out.extend_from_slice(&0u16.to_be_bytes()),
                }
            }
        }

        out.extend_from_slice(&(attribute_names.len() as u16).to_be_bytes());
        for name_index in &attribute_names {
            out.extend_from_slice(&name_index.to_be_bytes());
            out.extend_from_slice(&0u32.to_be_bytes());
        }
        out
    }
}

/// Build the payload of a `Code` attribute, or `None` for body-less methods.
fn build_code(pool: &mut PoolWriter, descriptor: &str, body: &MethodBody) -> Option<Vec<u8>> {
    let mut code = Vec::new();
    match body {
        MethodBody::None => return None,
        MethodBody::NoOp => {}
        MethodBody::Refs(refs) => {
            for symbol in refs {
                match symbol.kind {
                    RefKind::GetStatic | RefKind::PutStatic | RefKind::GetField | RefKind::PutField => {
                        let index = pool.field_ref(&symbol.owner, &symbol.name, &symbol.descriptor);
                        code.push(match symbol.kind {
                            RefKind::GetStatic => 0xB2,
                            RefKind::PutStatic => 0xB3,
                            RefKind::GetField => 0xB4,
                            _ => 0xB5,
                        });
                        code.extend_from_slice(&index.to_be_bytes());
                    }
                    RefKind::InvokeVirtual | RefKind::InvokeSpecial | RefKind::InvokeStatic => {
                        let index =
                            pool.method_ref(&symbol.owner, &symbol.name, &symbol.descriptor, false);
                        code.push(match symbol.kind {
                            RefKind::InvokeVirtual => 0xB6,
                            RefKind::InvokeSpecial => 0xB7,
                            _ => 0xB8,
                        });
                        code.extend_from_slice(&index.to_be_bytes());
                    }
                    RefKind::InvokeInterface => {
                        let index =
                            pool.method_ref(&symbol.owner, &symbol.name, &symbol.descriptor, true);
                        code.push(0xB9);
                        code.extend_from_slice(&index.to_be_bytes());
                        let count = 1 + descriptor::argument_slots(&symbol.descriptor).min(254);
                        code.push(count as u8);
                        code.push(0);
                    }
                    RefKind::TypeUse => {
                        let index = pool.class(&symbol.owner);
                        code.push(0xBB); // new
                        code.extend_from_slice(&index.to_be_bytes());
                    }
                }
            }
        }
    }
    // Terminate with the zero-value return for the declared return type.
    match descriptor::return_type(descriptor).unwrap_or("V").as_bytes() {
        [b'V', ..] => code.push(0xB1),
        [b'J', ..] => code.extend_from_slice(&[0x09, 0xAD]),
        [b'F', ..] => code.extend_from_slice(&[0x0B, 0xAE]),
        [b'D', ..] => code.extend_from_slice(&[0x0E, 0xAF]),
        [b'L', ..] | [b'[', ..] => code.extend_from_slice(&[0x01, 0xB0]),
        _ => code.extend_from_slice(&[0x03, 0xAC]),
    }

    let max_locals = 1 + descriptor::argument_slots(descriptor) as u16;
    let mut attribute = Vec::with_capacity(12 + code.len());
    attribute.extend_from_slice(&4u16.to_be_bytes()); // max_stack
    attribute.extend_from_slice(&max_locals.to_be_bytes());
    attribute.extend_from_slice(&(code.len() as u32).to_be_bytes());
    attribute.extend_from_slice(&code);
    attribute.extend_from_slice(&0u16.to_be_bytes()); // exception table
    attribute.extend_from_slice(&0u16.to_be_bytes()); // code attributes
    Some(attribute)
}

#[derive(PartialEq, Eq, Hash)]
enum PoolKey {
    Utf8(String),
    Class(String),
    NameAndType(String, String),
    FieldRef(String, String, String),
    MethodRef(String, String, String),
    InterfaceMethodRef(String, String, String),
}

/// Interning serializer for constant pool entries.
#[derive(Default)]
struct PoolWriter {
    buffer: Vec<u8>,
    lookup: HashMap<PoolKey, u16>,
    /// Pool count field value: one past the last used slot, starting at 1.
    count: u16,
}

impl PoolWriter {
    fn next_index(&mut self) -> u16 {
        if self.count == 0 {
            self.count = 1;
        }
        let index = self.count;
        self.count += 1;
        index
    }

    fn utf8(&mut self, text: &str) -> u16 {
        if let Some(&index) = self.lookup.get(&PoolKey::Utf8(text.to_string())) {
            return index;
        }
        let index = self.next_index();
        self.buffer.push(1);
        self.buffer
            .extend_from_slice(&(text.len() as u16).to_be_bytes());
        self.buffer.extend_from_slice(text.as_bytes());
        self.lookup.insert(PoolKey::Utf8(text.to_string()), index);
        index
    }

    fn class(&mut self, name: &str) -> u16 {
        if let Some(&index) = self.lookup.get(&PoolKey::Class(name.to_string())) {
            return index;
        }
        let name_index = self.utf8(name);
        let index = self.next_index();
        self.buffer.push(7);
        self.buffer.extend_from_slice(&name_index.to_be_bytes());
        self.lookup.insert(PoolKey::Class(name.to_string()), index);
        index
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let key = PoolKey::NameAndType(name.to_string(), descriptor.to_string());
        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let index = self.next_index();
        self.buffer.push(12);
        self.buffer.extend_from_slice(&name_index.to_be_bytes());
        self.buffer
            .extend_from_slice(&descriptor_index.to_be_bytes());
        self.lookup.insert(key, index);
        index
    }

    fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let key = PoolKey::FieldRef(owner.to_string(), name.to_string(), descriptor.to_string());
        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }
        let class_index = self.class(owner);
        let nat_index = self.name_and_type(name, descriptor);
        let index = self.next_index();
        self.buffer.push(9);
        self.buffer.extend_from_slice(&class_index.to_be_bytes());
        self.buffer.extend_from_slice(&nat_index.to_be_bytes());
        self.lookup.insert(key, index);
        index
    }

    fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str, interface: bool) -> u16 {
        let key = if interface {
            PoolKey::InterfaceMethodRef(owner.to_string(), name.to_string(), descriptor.to_string())
        } else {
            PoolKey::MethodRef(owner.to_string(), name.to_string(), descriptor.to_string())
        };
        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }
        let class_index = self.class(owner);
        let nat_index = self.name_and_type(name, descriptor);
        let index = self.next_index();
        self.buffer.push(if interface { 11 } else { 10 });
        self.buffer.extend_from_slice(&class_index.to_be_bytes());
        self.buffer.extend_from_slice(&nat_index.to_be_bytes());
        self.lookup.insert(key, index);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::read_class;

    #[test]
    fn test_minimal_class_parses() {
        let bytes = ClassBuilder::new("gen/Empty").build();
        let artifact = read_class(&bytes).unwrap();
        assert_eq!(artifact.name(), "gen/Empty");
        assert_eq!(artifact.super_name(), Some(ROOT_OBJECT));
        assert!(artifact.methods().is_empty());
    }

    #[test]
    fn test_root_object_has_no_super() {
        let bytes = ClassBuilder::new(ROOT_OBJECT).build();
        let artifact = read_class(&bytes).unwrap();
        assert!(artifact.super_name().is_none());
        assert!(artifact.is_root_object());
    }

    #[test]
    fn test_interface_shape() {
        let bytes = ClassBuilder::new("gen/Api")
            .access(AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT)
            .method(
                AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
                "call",
                "()I",
                MethodBody::None,
            )
            .build();
        let artifact = read_class(&bytes).unwrap();
        assert!(artifact.is_interface());
        assert_eq!(artifact.methods()[0].name, "call");
    }

    #[test]
    fn test_named_attribute_round_trips() {
        let bytes = ClassBuilder::new("gen/Tagged").attribute("PhantomGenerated").build();
        let artifact = read_class(&bytes).unwrap();
        assert!(artifact.has_attribute("PhantomGenerated"));
    }

    #[test]
    fn test_all_return_shapes_parse() {
        let mut builder = ClassBuilder::new("gen/Returns");
        for (name, descriptor) in [
            ("v", "()V"),
            ("i", "()I"),
            ("j", "()J"),
            ("f", "()F"),
            ("d", "()D"),
            ("a", "()Ljava/lang/Object;"),
            ("arr", "()[I"),
        ] {
            builder = builder.method(AccessFlags::PUBLIC, name, descriptor, MethodBody::NoOp);
        }
        let artifact = read_class(&builder.build()).unwrap();
        assert_eq!(artifact.methods().len(), 7);
    }
}
