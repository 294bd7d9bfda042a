//! In-memory content source for workbench-generated class sets.

use crate::artifact::ClassArtifact;
use crate::ingest::{ContentCollection, ContentSource, SourceType};
use crate::Result;

/// Serves a fixed set of already-decoded classes.
///
/// Backs the internally-managed resources the workbench creates itself, most notably
/// the phantom library; a re-read simply repopulates the same set.
pub struct GeneratedContentSource {
    classes: Vec<ClassArtifact>,
}

impl GeneratedContentSource {
    /// Create a source serving the given classes.
    #[must_use]
    pub fn new(classes: Vec<ClassArtifact>) -> Self {
        Self { classes }
    }
}

impl ContentSource for GeneratedContentSource {
    fn source_type(&self) -> SourceType {
        SourceType::Generated
    }

    fn read_into(&mut self, collection: &mut ContentCollection) -> Result<()> {
        for artifact in &self.classes {
            collection.add_class(artifact.clone());
        }
        Ok(())
    }
}
