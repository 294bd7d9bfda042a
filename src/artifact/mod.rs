//! Immutable artifact value types.
//!
//! One artifact is one named binary unit tracked by the workspace. Every artifact pairs a
//! normalized slash-separated key with its raw byte payload; class-shaped artifacts
//! additionally carry structural metadata (supertype, interfaces, access flags, member
//! signatures) derived from the payload at construction time and never mutated
//! independently of it.
//!
//! # Key Components
//!
//! - [`ClassArtifact`] - A decoded JVM class
//! - [`DexClassArtifact`] - A decoded class scoped to one dex container
//! - [`FileArtifact`] - A loose file with an extension derived from its key
//! - [`Member`] - One field or method signature (name, descriptor, modifiers)
//! - [`AccessFlags`] - JVM access/modifier bitmask

mod class;
mod dex;
mod file;
mod member;

pub use class::ClassArtifact;
pub use dex::DexClassArtifact;
pub use file::{FileArtifact, UNKNOWN_EXTENSION};
pub use member::{AccessFlags, Member};

/// The root of the JVM type hierarchy.
///
/// The only class artifact for which a missing superclass is legal, and the seed entry of
/// every phantom-synthesis hierarchy walk.
pub const ROOT_OBJECT: &str = "java/lang/Object";
