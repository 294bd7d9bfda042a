//! The pending collection filled by content sources.
//!
//! Raw container decoding produces entries in five buckets: well-formed classes,
//! malformed classes, name-mismatched classes, entries that merely look like classes,
//! and plain files. The recovery pass then repairs or reclassifies the problem buckets
//! before the result lands in a resource's tables.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::artifact::{ClassArtifact, DexClassArtifact, FileArtifact};
use crate::codec;
use crate::workspace::DexCodec;

/// A raw entry awaiting repair or reclassification.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    /// Original container entry path.
    pub path: String,
    /// Raw entry bytes.
    pub bytes: Arc<[u8]>,
}

/// A class that decoded cleanly but declares a different name than its entry path.
#[derive(Debug, Clone)]
pub struct MismatchedEntry {
    /// Name derived from the container entry path.
    pub path_name: String,
    /// The decoded artifact, keyed by its declared name.
    pub artifact: ClassArtifact,
}

/// One decoded dex container and the codec that decoded it.
pub(crate) struct DexContainer {
    pub path: String,
    pub codec: Arc<dyn DexCodec>,
    pub classes: Vec<DexClassArtifact>,
}

/// Everything one full container read produced, prior to recovery.
#[derive(Default)]
pub struct ContentCollection {
    pub(crate) classes: BTreeMap<String, ClassArtifact>,
    pub(crate) malformed: Vec<PendingEntry>,
    pub(crate) mismatched: Vec<MismatchedEntry>,
    pub(crate) non_classes: Vec<PendingEntry>,
    pub(crate) files: BTreeMap<String, FileArtifact>,
    pub(crate) dex_containers: Vec<DexContainer>,
}

impl ContentCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one raw container entry.
    ///
    /// Classification is content-first: anything passing the class sanity gate goes down
    /// the class path regardless of its entry name, because packers routinely hide
    /// classes under other extensions. Entries that only *look* like classes (a
    /// `.class` path without class content) are held for demotion; everything else is a
    /// plain file.
    pub fn add_entry(&mut self, path: &str, bytes: Vec<u8>) {
        let path = path.trim_start_matches('/');
        let bytes: Arc<[u8]> = Arc::from(bytes);
        if codec::is_class_candidate(&bytes) {
            let path_name = path.strip_suffix(".class");
            match codec::read_class(&bytes) {
                Ok(artifact) => match path_name {
                    Some(name) if name != artifact.name() => {
                        self.mismatched.push(MismatchedEntry {
                            path_name: name.to_string(),
                            artifact,
                        });
                    }
                    _ => self.add_class(artifact),
                },
                Err(err) => {
                    log::debug!("malformed class at '{path}': {err}");
                    self.malformed.push(PendingEntry {
                        path: path.to_string(),
                        bytes,
                    });
                }
            }
        } else if path.ends_with(".class") {
            self.non_classes.push(PendingEntry {
                path: path.to_string(),
                bytes,
            });
        } else {
            self.add_file(FileArtifact::new(path, bytes));
        }
    }

    /// Record a well-formed class under its declared name.
    pub fn add_class(&mut self, artifact: ClassArtifact) {
        self.classes.insert(artifact.name().to_string(), artifact);
    }

    /// Record a plain file under its path.
    pub fn add_file(&mut self, artifact: FileArtifact) {
        self.files.insert(artifact.name().to_string(), artifact);
    }

    /// Record one decoded dex container.
    pub fn add_dex_container(
        &mut self,
        path: impl Into<String>,
        codec: Arc<dyn DexCodec>,
        classes: Vec<DexClassArtifact>,
    ) {
        self.dex_containers.push(DexContainer {
            path: path.into(),
            codec,
            classes,
        });
    }

    /// Well-formed classes decoded so far.
    #[must_use]
    pub fn classes(&self) -> &BTreeMap<String, ClassArtifact> {
        &self.classes
    }

    /// Plain files decoded so far.
    #[must_use]
    pub fn files(&self) -> &BTreeMap<String, FileArtifact> {
        &self.files
    }

    /// Name-mismatched classes still unresolved.
    #[must_use]
    pub fn mismatched(&self) -> &[MismatchedEntry] {
        &self.mismatched
    }

    /// Malformed entries still unrepaired.
    #[must_use]
    pub fn malformed(&self) -> &[PendingEntry] {
        &self.malformed
    }
}
