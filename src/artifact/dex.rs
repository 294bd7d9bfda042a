use std::sync::Arc;

use crate::artifact::{AccessFlags, Member};

/// An immutable class artifact decoded from a dex container.
///
/// Carries the same structural shape as [`crate::artifact::ClassArtifact`] plus a
/// back-reference to the dex container entry it was decoded from, so the exporter can
/// re-encode each container with its own class set.
///
/// Dex containers are opaque to the workspace core; instances of this type are produced
/// by a [`crate::workspace::DexCodec`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexClassArtifact {
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    access: AccessFlags,
    fields: Vec<Member>,
    methods: Vec<Member>,
    bytes: Arc<[u8]>,
    dex_path: String,
}

impl DexClassArtifact {
    /// Create a dex class artifact from decoded structural data.
    ///
    /// `dex_path` is the container entry (e.g. `classes2.dex`) the class belongs to;
    /// `bytes` is the codec's serialized form of this single class definition.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        super_name: Option<String>,
        interfaces: Vec<String>,
        access: AccessFlags,
        fields: Vec<Member>,
        methods: Vec<Member>,
        bytes: Arc<[u8]>,
        dex_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            super_name,
            interfaces,
            access,
            fields,
            methods,
            bytes,
            dex_path: dex_path.into(),
        }
    }

    /// Class internal name in dex form without the `L...;` wrapping, e.g. `com/example/Main`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Superclass internal name. `None` only for the root object type.
    #[must_use]
    pub fn super_name(&self) -> Option<&str> {
        self.super_name.as_deref()
    }

    /// Implemented interface internal names, in declaration order.
    #[must_use]
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Class access and modifier flags.
    #[must_use]
    pub fn access(&self) -> AccessFlags {
        self.access
    }

    /// Declared fields.
    #[must_use]
    pub fn fields(&self) -> &[Member] {
        &self.fields
    }

    /// Declared methods.
    #[must_use]
    pub fn methods(&self) -> &[Member] {
        &self.methods
    }

    /// Serialized class definition bytes, in the owning codec's format.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Container entry path this class was decoded from.
    #[must_use]
    pub fn dex_path(&self) -> &str {
        &self.dex_path
    }
}
