use bitflags::bitflags;

bitflags! {
    /// JVM access and modifier flags.
    ///
    /// The same bitmask is used for class, field, and method declarations; a few bits are
    /// overloaded between contexts (`SUPER`/`SYNCHRONIZED`, `VOLATILE`/`BRIDGE`,
    /// `TRANSIENT`/`VARARGS`), matching the class file format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u16 {
        /// Declared `public`.
        const PUBLIC = 0x0001;
        /// Declared `private`.
        const PRIVATE = 0x0002;
        /// Declared `protected`.
        const PROTECTED = 0x0004;
        /// Declared `static`.
        const STATIC = 0x0008;
        /// Declared `final`.
        const FINAL = 0x0010;
        /// Class: treat superclass methods specially on `invokespecial`.
        /// Method: declared `synchronized`.
        const SUPER = 0x0020;
        /// Field: declared `volatile`. Method: a compiler-generated bridge.
        const VOLATILE = 0x0040;
        /// Field: declared `transient`. Method: declared with variable arity.
        const TRANSIENT = 0x0080;
        /// Declared `native`.
        const NATIVE = 0x0100;
        /// An interface, not a class.
        const INTERFACE = 0x0200;
        /// Declared `abstract`.
        const ABSTRACT = 0x0400;
        /// Declared `strictfp`.
        const STRICT = 0x0800;
        /// Not present in the source code; compiler or tool generated.
        const SYNTHETIC = 0x1000;
        /// An annotation interface.
        const ANNOTATION = 0x2000;
        /// An `enum` class or enum constant field.
        const ENUM = 0x4000;
        /// A module declaration rather than a class.
        const MODULE = 0x8000;
    }
}

impl AccessFlags {
    /// Whether the interface bit is set.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.contains(AccessFlags::INTERFACE)
    }

    /// Whether the static bit is set.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    /// Whether the abstract bit is set.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.contains(AccessFlags::ABSTRACT)
    }

    /// Whether the native bit is set.
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.contains(AccessFlags::NATIVE)
    }

    /// Whether the synthetic bit is set.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.contains(AccessFlags::SYNTHETIC)
    }
}

/// One declared field or method of a class.
///
/// A member is identified by its name and descriptor pair; two members with the same name
/// but different descriptors are distinct (method overloads, and legal-if-unusual field
/// shadowing in handcrafted classes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    /// Member name as it appears in the class file (`<init>` for constructors).
    pub name: String,
    /// Field or method descriptor, e.g. `I` or `(Ljava/lang/String;)V`.
    pub descriptor: String,
    /// Access and modifier flags of the declaration.
    pub access: AccessFlags,
}

impl Member {
    /// Create a member record.
    #[must_use]
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>, access: AccessFlags) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access,
        }
    }
}
