// Copyright 2026 The jarscope contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
#![allow(clippy::too_many_arguments)]

//! # jarscope
//!
//! A workspace resource model for analyzing and reverse engineering compiled JVM programs
//! and Android dex packages. `jarscope` provides the storage and plumbing layer of a
//! reverse-engineering workbench: a versioned, observable, multi-layered in-memory store of
//! binary program artifacts, together with an ingestion pipeline that recovers usable
//! artifacts from malformed input, a dependency-closure repair step that synthesizes minimal
//! phantom classes for missing symbols, and a byte-faithful export step that re-serializes
//! the artifact set back into distributable archives.
//!
//! ## Features
//!
//! - **Versioned artifact tables** - Every mutation is attributable and revertible; dirty
//!   tracking falls out of the per-key version history
//! - **Resilient ingestion** - Malformed classes are patched or demoted instead of aborting
//!   the whole load
//! - **Layered lookup** - Primary input, user libraries, the runtime view, and generated
//!   phantom libraries compose behind one precedence-ordered query surface
//! - **Phantom synthesis** - Structural analysis over a partially-unknown type graph emits
//!   minimal valid stand-ins for referenced-but-missing types
//! - **Byte-faithful export** - Archive, directory, and single-file writers with optional
//!   class hollowing and library shading
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jarscope::prelude::*;
//!
//! // Open an archive as the primary resource of a workspace
//! let source = ArchiveContentSource::new("app.jar");
//! let mut primary = Resource::new(Box::new(source));
//! let report = primary.read()?;
//! println!("loaded {} classes ({} recovered)",
//!     primary.classes().len(), report.patches_recovered);
//! # Ok::<(), jarscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`artifact`] - Immutable value records for classes, dex classes, and loose files
//! - [`codec`] - The structural class-file codec (decode to summary, re-encode, hollow)
//! - [`workspace`] - The versioned item table, resource bundles, and the aggregate
//!   [`workspace::Resources`] lookup
//! - [`ingest`] - Content sources and the post-read recovery pass
//! - [`phantom`] - Phantom class synthesis for unresolved references
//! - [`export`] - Re-serialization of one or more resources into archives
//!
//! The class-file and dex codecs are deliberately narrow seams: the workspace core only ever
//! asks for "decode these bytes into a structural summary" and "re-encode this shape", so
//! alternative codecs can be slotted in behind the [`workspace::DexCodec`] trait without
//! touching the store.

#[macro_use]
mod error;

/// Immutable artifact value types tracked by the workspace.
///
/// An artifact pairs a normalized slash-separated key with a raw byte payload and metadata
/// derived from that payload at construction time:
///
/// - [`artifact::ClassArtifact`] - A JVM class (name, supertype, interfaces, members)
/// - [`artifact::DexClassArtifact`] - A class scoped to one dex container
/// - [`artifact::FileArtifact`] - A loose file with a derived extension
pub mod artifact;

/// Structural class-file codec: decode, scan, sanitize, patch, re-encode.
///
/// This is the in-crate collaborator the workspace model leans on: it turns raw class bytes
/// into the structural summary an artifact carries, extracts the referenced symbols phantom
/// synthesis solves for, strips invalid optional metadata, performs best-effort repair of
/// malformed inputs, and builds minimal new classes (phantoms, hollowed bodies).
///
/// Bytecode *verification* is explicitly out of scope; the codec only walks structure.
pub mod codec;

/// Workspace resource model: versioned tables, resource bundles, aggregate lookup.
///
/// # Key Components
///
/// - [`workspace::VersionedItemTable`] - The generic key/value container with append-only
///   per-key history, dirty tracking, rename, and single-subscriber notification
/// - [`workspace::Resource`] - One content-source-backed bundle of class/file/dex tables
/// - [`workspace::Resources`] - Primary + libraries + internal resources with fixed lookup
///   precedence
/// - [`workspace::RuntimeResource`] - Lazy, memoizing view of the platform classpath
pub mod workspace;

/// Content ingestion: sources, pending collections, and the recovery pass.
///
/// A [`ingest::ContentSource`] populates a [`ingest::ContentCollection`] with raw decoded
/// entries; the recovery pass then repairs or reclassifies problem entries so that a load
/// degrades gracefully instead of failing outright.
pub mod ingest;

/// Phantom class synthesis for referenced-but-missing types.
///
/// Builds a type hierarchy and member table over the known classes, extracts structural
/// constraints for every unresolved reference, deduplicates them, and emits minimal
/// synthetic classes that satisfy the constraints - or nothing at all when the workspace
/// is already closed over its references.
pub mod phantom;

/// Archive export: flattening resources into distributable containers.
///
/// The [`export::Exporter`] accumulates a sorted name-to-bytes mapping from one or more
/// resources and writes it as a compressed or stored archive, a directory tree, a single
/// file, or a dex-bearing package, reporting size and compression statistics.
pub mod export;

/// Small shared utilities (background task slots, cancellation).
pub mod util;

pub mod prelude;

#[cfg(test)]
pub(crate) mod test;

/// `jarscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. Used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `jarscope` Error type
///
/// The main error type for all operations in this crate. Only the fatal error tier
/// surfaces here; per-entry recoverable conditions are absorbed by the recovery pipeline
/// and per-operation reportable conditions are logged and skipped.
pub use error::Error;
