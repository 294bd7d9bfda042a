use std::sync::Arc;

use crate::artifact::{AccessFlags, Member, ROOT_OBJECT};
use crate::Result;

/// An immutable JVM class artifact.
///
/// Pairs the class internal name with its raw byte payload and the structural summary
/// decoded from those bytes: superclass, interfaces, access flags, and field/method
/// signatures. The summary is derived purely from the payload at construction time; to
/// change any of it, decode new bytes and `put` the result into the owning table.
///
/// Cloning is cheap: the payload is shared behind an [`Arc`].
///
/// # Examples
///
/// ```rust,ignore
/// use jarscope::artifact::ClassArtifact;
///
/// let artifact = ClassArtifact::read(&bytes)?;
/// println!("{} extends {:?}", artifact.name(), artifact.super_name());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassArtifact {
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    access: AccessFlags,
    fields: Vec<Member>,
    methods: Vec<Member>,
    attributes: Vec<String>,
    bytes: Arc<[u8]>,
}

impl ClassArtifact {
    /// Decode a class artifact from raw class file bytes.
    ///
    /// Performs a strict structural parse; malformed input is rejected here and must go
    /// through the recovery pipeline's patching step instead.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] or [`crate::Error::OutOfBounds`] when the bytes
    /// do not form a structurally valid class file.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        crate::codec::read_class(bytes)
    }

    /// Assemble an artifact from an already-decoded summary. Codec internal.
    pub(crate) fn from_parts(
        name: String,
        super_name: Option<String>,
        interfaces: Vec<String>,
        access: AccessFlags,
        fields: Vec<Member>,
        methods: Vec<Member>,
        attributes: Vec<String>,
        bytes: Arc<[u8]>,
    ) -> Self {
        Self {
            name,
            super_name,
            interfaces,
            access,
            fields,
            methods,
            attributes,
            bytes,
        }
    }

    /// Class internal name, e.g. `com/example/Main`.
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

    /// Names of class-level attributes, in file order.
    ///
    /// Used to recognize provenance markers such as the phantom-generated tag.
    #[must_use]
    pub fn attribute_names(&self) -> &[String] {
        &self.attributes
    }

    /// Raw class file payload.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the raw payload.
    #[must_use]
    pub fn bytes_arc(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Whether this artifact describes an interface.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access.is_interface()
    }

    /// Whether this artifact is the root object type.
    #[must_use]
    pub fn is_root_object(&self) -> bool {
        self.name == ROOT_OBJECT
    }

    /// Whether a class-level attribute with the given name is present.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    /// Whether this class was synthesized by phantom generation.
    #[must_use]
    pub fn is_phantom(&self) -> bool {
        self.has_attribute(crate::phantom::PHANTOM_ATTRIBUTE)
    }
}
