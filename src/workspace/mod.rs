//! The workspace resource model: versioned artifact tables and their composition.
//!
//! [`VersionedItemTable`] is the storage primitive: a key-to-value map with per-key
//! append-only version history, dirty tracking, rename, one-step undo, and a
//! single-slot listener. [`Resource`] bundles one class table, one file table, and one
//! per-container dex table set behind a content source; [`Resources`] composes the
//! primary resource with user libraries and the internally-managed runtime view and
//! phantom library, and answers all lookups the rest of the workbench performs.

mod dex;
mod resource;
mod resources;
mod runtime;
mod table;

pub use dex::{DexCodec, MultiDexClassTable};
pub use resource::Resource;
pub use resources::Resources;
pub use runtime::{ClasspathProvider, RuntimeClassProvider, RuntimeResource};
pub use table::{ItemListener, VersionedItemTable};
