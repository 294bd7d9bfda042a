//! Content ingestion: turning external containers into populated artifact tables.
//!
//! A [`ContentSource`] decodes one container kind (archive, directory tree, single
//! file, or remote agent stream) into a [`ContentCollection`] of pending entries; the
//! recovery pass then repairs or reclassifies the problem entries before the owning
//! [`crate::workspace::Resource`] applies the result to its tables. Sources never touch
//! tables directly.

use std::path::Path;

use strum::{Display, EnumString};

use crate::Result;

mod agent;
mod archive;
mod collection;
mod directory;
mod generated;
mod recovery;
mod single;

pub use agent::{AgentContentSource, AgentReply, AgentRequest, AgentTransport};
pub use archive::ArchiveContentSource;
pub use collection::{ContentCollection, MismatchedEntry, PendingEntry};
pub use directory::DirectoryContentSource;
pub use generated::GeneratedContentSource;
pub use recovery::RecoveryReport;
pub use single::SingleFileContentSource;

pub(crate) use recovery::process as run_recovery;

/// The container kind a content source decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SourceType {
    /// A zip-family archive: jar, war, apk, or plain zip.
    Archive,
    /// A directory tree walked recursively.
    Directory,
    /// One loose file.
    SingleFile,
    /// A remote instrumentation agent stream.
    Agent,
    /// An in-memory set produced by the workbench itself (phantom output).
    Generated,
}

impl SourceType {
    /// Pick a source type from a filesystem path, by extension and file kind.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        if path.is_dir() {
            return Self::Directory;
        }
        match path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("jar" | "war" | "zip" | "apk" | "jmod") => Self::Archive,
            _ => Self::SingleFile,
        }
    }
}

/// One pluggable container decoder.
///
/// `read_into` fills the pending collection with everything the container holds. It is
/// called once per full [`crate::workspace::Resource::read`]; incremental refresh is
/// not part of the contract.
pub trait ContentSource: Send {
    /// The container kind this source decodes.
    fn source_type(&self) -> SourceType;

    /// Decode the container into the pending collection.
    ///
    /// # Errors
    /// Only fatal, container-level failures (top-level I/O, unreadable archive
    /// structure). Per-entry problems go into the collection's pending buckets instead.
    fn read_into(&mut self, collection: &mut ContentCollection) -> Result<()>;
}
