//! Class file reading, repair, and construction.
//!
//! The codec works at the structural level: constant pool, top-level shape, member
//! lists, and attribute byte spans. It never decodes attribute payloads beyond what
//! repair and extraction need, so arbitrary (including hostile) attribute content
//! passes through untouched.
//!
//! Entry points:
//! - [`read_class`] / [`is_class_candidate`] — ingestion-side decoding and gating.
//! - [`patch_class`] / [`strip_invalid_signatures`] — byte-surgical repair.
//! - [`referenced_symbols`] — feed for phantom synthesis.
//! - [`ClassBuilder`] / [`hollow_class`] — minimal class construction.

pub(crate) mod io;
pub(crate) mod pool;
pub(crate) mod read;

pub mod descriptor;

mod hollow;
mod refs;
mod sanitize;
mod signature;
mod write;

pub use hollow::hollow_class;
pub use read::{is_class_candidate, matches_class_magic, read_class, MIN_MAJOR_VERSION};
pub use refs::{RefKind, SymbolRef};
pub use sanitize::{patch_class, strip_invalid_signatures};
pub use signature::{
    is_valid_class_signature, is_valid_field_signature, is_valid_method_signature,
};
pub use write::{ClassBuilder, MethodBody};

use crate::Result;

/// Extract every symbol referenced by a class: member accesses and calls from its
/// method bodies, plus type uses from its constant pool (class literals, catch types,
/// dynamic call-site descriptors).
///
/// See [`SymbolRef`] for what is recorded.
///
/// # Errors
/// Propagates strict parse errors and malformed reference sites.
pub fn referenced_symbols(data: &[u8]) -> Result<Vec<SymbolRef>> {
    let class_file = read::ClassFile::parse(data, false)?;
    refs::referenced_symbols(data, &class_file)
}
