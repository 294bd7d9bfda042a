//! Single loose file content source.

use std::fs;
use std::path::PathBuf;

use crate::ingest::{ContentCollection, ContentSource, SourceType};
use crate::Result;

/// Ingests exactly one file, keyed by its file name.
pub struct SingleFileContentSource {
    path: PathBuf,
}

impl SingleFileContentSource {
    /// Create a source for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentSource for SingleFileContentSource {
    fn source_type(&self) -> SourceType {
        SourceType::SingleFile
    }

    fn read_into(&mut self, collection: &mut ContentCollection) -> Result<()> {
        let bytes = fs::read(&self.path)?;
        let key = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or(crate::Error::NotSupported)?;
        collection.add_entry(&key, bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ClassBuilder;

    #[test]
    fn test_single_class_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Main.class");
        fs::write(&path, ClassBuilder::new("Main").build()).unwrap();

        let mut collection = ContentCollection::new();
        SingleFileContentSource::new(&path)
            .read_into(&mut collection)
            .unwrap();
        assert!(collection.classes().contains_key("Main"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let mut collection = ContentCollection::new();
        assert!(SingleFileContentSource::new("/no/such/file.jar")
            .read_into(&mut collection)
            .is_err());
    }
}
