//! Class hollowing.
//!
//! Rebuilds a class keeping its declared surface (name, hierarchy, access flags, every
//! field and method signature) while replacing each method body with a minimal zero
//! return. Used by exports meant for API inspection where the implementation must not
//! leave the workspace.

use crate::artifact::AccessFlags;
use crate::codec::read::ClassFile;
use crate::codec::write::{ClassBuilder, MethodBody};
use crate::Result;

/// Rebuild `data` with hollowed method bodies.
///
/// Abstract and native methods stay body-less as they were. The original class file
/// version is preserved so hollowed output targets the same runtime.
///
/// # Errors
/// Propagates strict parse errors from the input.
pub fn hollow_class(data: &[u8]) -> Result<Vec<u8>> {
    let class_file = ClassFile::parse(data, false)?;
    let mut builder = ClassBuilder::new(class_file.name.clone())
        .access(AccessFlags::from_bits_retain(class_file.access))
        .version(class_file.major_version, class_file.minor_version);
    if let Some(super_name) = &class_file.super_name {
        builder = builder.super_name(super_name.clone());
    }
    for interface in &class_file.interfaces {
        builder = builder.interface(interface.clone());
    }
    for field in &class_file.fields {
        builder = builder.field(
            AccessFlags::from_bits_retain(field.access),
            &field.name,
            &field.descriptor,
        );
    }
    for method in &class_file.methods {
        let access = AccessFlags::from_bits_retain(method.access);
        let body = if access.is_abstract() || access.is_native() {
            MethodBody::None
        } else {
            MethodBody::NoOp
        };
        builder = builder.method(access, &method.name, &method.descriptor, body);
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::read_class;

    #[test]
    fn test_surface_preserved_bodies_dropped() {
        let original = ClassBuilder::new("com/example/Impl")
            .super_name("com/example/Base")
            .interface("java/lang/Runnable")
            .version(61, 0)
            .field(AccessFlags::PRIVATE | AccessFlags::FINAL, "state", "J")
            .method(AccessFlags::PUBLIC, "call", "(I)Ljava/lang/String;", MethodBody::NoOp)
            .method(
                AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
                "todo",
                "()V",
                MethodBody::None,
            )
            .build();
        let hollowed = hollow_class(&original).unwrap();

        let before = read_class(&original).unwrap();
        let after = read_class(&hollowed).unwrap();
        assert_eq!(after.name(), before.name());
        assert_eq!(after.super_name(), before.super_name());
        assert_eq!(after.interfaces(), before.interfaces());
        assert_eq!(after.fields(), before.fields());
        assert_eq!(after.methods(), before.methods());

        let parsed = ClassFile::parse(&hollowed, false).unwrap();
        assert_eq!(parsed.major_version, 61);
        // The abstract method carries no Code attribute.
        assert!(parsed.methods[1].attributes.is_empty());
        assert!(!parsed.methods[0].attributes.is_empty());
    }
}
