//! Convenient re-exports of the most commonly used types.
//!
//! ```rust,no_run
//! use jarscope::prelude::*;
//!
//! let mut primary = Resource::new(Box::new(ArchiveContentSource::new("app.jar")));
//! primary.read()?;
//! # Ok::<(), jarscope::Error>(())
//! ```

pub use crate::artifact::{AccessFlags, ClassArtifact, DexClassArtifact, FileArtifact, Member};
pub use crate::export::{ExportSummary, Exporter};
pub use crate::ingest::{
    AgentContentSource, ArchiveContentSource, ContentCollection, ContentSource,
    DirectoryContentSource, RecoveryReport, SingleFileContentSource, SourceType,
};
pub use crate::phantom::PhantomGenerator;
pub use crate::workspace::{
    DexCodec, ItemListener, Resource, Resources, RuntimeClassProvider, RuntimeResource,
    VersionedItemTable,
};
pub use crate::{Error, Result};
