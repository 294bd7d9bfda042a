//! One content-source-backed bundle of artifact tables.

use std::sync::Arc;

use crate::artifact::{ClassArtifact, DexClassArtifact, FileArtifact};
use crate::codec;
use crate::ingest::{
    run_recovery, ContentCollection, ContentSource, GeneratedContentSource, RecoveryReport,
    SourceType,
};
use crate::workspace::dex::MultiDexClassTable;
use crate::workspace::table::{ItemListener, VersionedItemTable};
use crate::Result;

/// One class table, one file table, one dex table set, and the content source that
/// fills them.
///
/// [`Resource::read`] is a full (non-incremental) load: it clears all tables, runs the
/// source, runs recovery, applies the result, and finishes with the signature
/// sanitation pass. Artifacts change only through the tables' `put`/`remove`
/// afterwards.
pub struct Resource {
    source: Box<dyn ContentSource>,
    classes: VersionedItemTable<ClassArtifact>,
    files: VersionedItemTable<FileArtifact>,
    dex_classes: MultiDexClassTable,
}

impl Resource {
    /// Create an unread resource over a content source.
    #[must_use]
    pub fn new(source: Box<dyn ContentSource>) -> Self {
        Self {
            source,
            classes: VersionedItemTable::new(),
            files: VersionedItemTable::new(),
            dex_classes: MultiDexClassTable::new(),
        }
    }

    /// Create a resource pre-populated with generated classes.
    ///
    /// Used for internally-managed resources such as the phantom library; the backing
    /// source serves the same set again on a re-read.
    #[must_use]
    pub fn from_classes(classes: Vec<ClassArtifact>) -> Self {
        let mut resource = Self::new(Box::new(GeneratedContentSource::new(classes.clone())));
        for artifact in classes {
            resource.classes.put(artifact.name().to_string(), artifact);
        }
        resource
    }

    /// The container kind backing this resource.
    #[must_use]
    pub fn source_type(&self) -> SourceType {
        self.source.source_type()
    }

    /// Full load: clear all tables, decode the container, recover, apply, sanitize.
    ///
    /// # Errors
    /// Fatal container-level failures only; per-entry problems are absorbed by the
    /// recovery pass and show up in the returned report instead.
    pub fn read(&mut self) -> Result<RecoveryReport> {
        self.classes.clear();
        self.files.clear();
        self.dex_classes.clear();

        let mut collection = ContentCollection::new();
        self.source.read_into(&mut collection)?;
        let mut report = run_recovery(&mut collection);

        for (name, artifact) in std::mem::take(&mut collection.classes) {
            self.classes.put(name, artifact);
        }
        for (name, artifact) in std::mem::take(&mut collection.files) {
            self.files.put(name, artifact);
        }
        for container in std::mem::take(&mut collection.dex_containers) {
            self.dex_classes.add_scope(&container.path, container.codec);
            for class in container.classes {
                self.dex_classes
                    .put_scoped(&container.path, class.name().to_string(), class)?;
            }
        }

        report.signatures_sanitized = self.sanitize_signatures();
        Ok(report)
    }

    /// Recovery step 4: strip invalid signature metadata from every class.
    ///
    /// Runs against the populated table so each sanitized class lands as a versioned
    /// `put` and shows up in the dirty set like any other edit.
    fn sanitize_signatures(&mut self) -> usize {
        let names: Vec<String> = self.classes.keys().map(str::to_string).collect();
        let mut sanitized = 0;
        for name in names {
            let Some(artifact) = self.classes.get(&name) else {
                continue;
            };
            match codec::strip_invalid_signatures(artifact.bytes()) {
                Ok(None) => {}
                Ok(Some(fixed)) => match ClassArtifact::read(&fixed) {
                    Ok(updated) => {
                        log::debug!("stripped invalid signature metadata from '{name}'");
                        self.classes.put(name, updated);
                        sanitized += 1;
                    }
                    Err(err) => log::warn!("sanitized '{name}' no longer decodes: {err}"),
                },
                Err(err) => log::warn!("signature scan failed for '{name}': {err}"),
            }
        }
        sanitized
    }

    /// The class table.
    #[must_use]
    pub fn classes(&self) -> &VersionedItemTable<ClassArtifact> {
        &self.classes
    }

    /// The class table, mutable (edit write-back path).
    pub fn classes_mut(&mut self) -> &mut VersionedItemTable<ClassArtifact> {
        &mut self.classes
    }

    /// The file table.
    #[must_use]
    pub fn files(&self) -> &VersionedItemTable<FileArtifact> {
        &self.files
    }

    /// The file table, mutable.
    pub fn files_mut(&mut self) -> &mut VersionedItemTable<FileArtifact> {
        &mut self.files
    }

    /// The per-container dex class tables.
    #[must_use]
    pub fn dex_classes(&self) -> &MultiDexClassTable {
        &self.dex_classes
    }

    /// The per-container dex class tables, mutable.
    pub fn dex_classes_mut(&mut self) -> &mut MultiDexClassTable {
        &mut self.dex_classes
    }

    /// Install the class table listener.
    pub fn set_class_listener(&mut self, listener: Arc<dyn ItemListener<ClassArtifact>>) {
        self.classes.set_listener(listener);
    }

    /// Install the file table listener.
    pub fn set_file_listener(&mut self, listener: Arc<dyn ItemListener<FileArtifact>>) {
        self.files.set_listener(listener);
    }

    /// Install the shared dex class listener.
    pub fn set_dex_listener(&mut self, listener: Arc<dyn ItemListener<DexClassArtifact>>) {
        self.dex_classes.set_listener(listener);
    }

    /// Detach every listener; called when the owning workspace is torn down.
    pub fn clear_listeners(&mut self) {
        self.classes.clear_listener();
        self.files.clear_listener();
        self.dex_classes.clear_listener();
    }
}
