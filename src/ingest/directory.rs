//! Directory tree content source.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::{ContentCollection, ContentSource, SourceType};
use crate::Result;

/// Walks a directory tree recursively, ingesting every regular file under a
/// slash-separated key relative to the root.
pub struct DirectoryContentSource {
    root: PathBuf,
}

impl DirectoryContentSource {
    /// Create a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn visit(&self, dir: &Path, collection: &mut ContentCollection) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                self.visit(&path, collection)?;
                continue;
            }
            let key = relative_key(&self.root, &path);
            match fs::read(&path) {
                Ok(bytes) => collection.add_entry(&key, bytes),
                Err(err) => log::warn!("skipping unreadable file '{key}': {err}"),
            }
        }
        Ok(())
    }
}

impl ContentSource for DirectoryContentSource {
    fn source_type(&self) -> SourceType {
        SourceType::Directory
    }

    fn read_into(&mut self, collection: &mut ContentCollection) -> Result<()> {
        if !self.root.is_dir() {
            return Err(crate::Error::NotSupported);
        }
        let root = self.root.clone();
        self.visit(&root, collection)
    }
}

/// Slash-separated key of `path` relative to `root`.
fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ClassBuilder;

    #[test]
    fn test_walks_nested_tree() {
        let dir = tempfile::tempdir().unwrap();
        let class_dir = dir.path().join("com").join("example");
        fs::create_dir_all(&class_dir).unwrap();
        fs::write(
            class_dir.join("Foo.class"),
            ClassBuilder::new("com/example/Foo").build(),
        )
        .unwrap();
        fs::write(dir.path().join("readme.txt"), b"hello").unwrap();

        let mut collection = ContentCollection::new();
        DirectoryContentSource::new(dir.path())
            .read_into(&mut collection)
            .unwrap();
        assert!(collection.classes().contains_key("com/example/Foo"));
        assert!(collection.files().contains_key("readme.txt"));
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let mut collection = ContentCollection::new();
        assert!(DirectoryContentSource::new("/definitely/not/here")
            .read_into(&mut collection)
            .is_err());
    }
}
