//! Dex class storage scoped per dex container.
//!
//! Android packages carry several dex containers (`classes.dex`, `classes2.dex`, ...);
//! each keeps its own class table because a class name is only unique within one
//! container, and export must re-encode each container separately. The dex binary
//! format itself stays behind [`DexCodec`]; the workspace only moves decoded artifacts
//! and opaque container bytes around.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::artifact::DexClassArtifact;
use crate::workspace::table::{ItemListener, VersionedItemTable};
use crate::Result;

/// Decoder/encoder for one dex container format.
pub trait DexCodec: Send + Sync {
    /// Decode a container into its class artifacts.
    ///
    /// # Errors
    /// Any decode failure; the caller treats the container as unreadable as a whole.
    fn decode(&self, dex_path: &str, data: &[u8]) -> Result<Vec<DexClassArtifact>>;

    /// Re-encode a class set into container bytes.
    ///
    /// # Errors
    /// Any encode failure; export reports it against the container path.
    fn encode(&self, dex_path: &str, classes: &[DexClassArtifact]) -> Result<Vec<u8>>;
}

struct DexScope {
    table: VersionedItemTable<DexClassArtifact>,
    codec: Arc<dyn DexCodec>,
}

/// Class tables for every dex container of one resource.
///
/// A purpose-built container rather than a general map: only scoped insertion, lookup,
/// removal, and iteration are safe operations here, and each scope carries the codec
/// that produced it so export can re-encode the container.
#[derive(Default)]
pub struct MultiDexClassTable {
    scopes: BTreeMap<String, DexScope>,
    listener: Option<Arc<dyn ItemListener<DexClassArtifact>>>,
}

impl MultiDexClassTable {
    /// Create an empty table set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dex container scope. Replaces any scope already under that path.
    pub fn add_scope(&mut self, dex_path: impl Into<String>, codec: Arc<dyn DexCodec>) {
        let mut table = VersionedItemTable::new();
        if let Some(listener) = &self.listener {
            table.set_listener(listener.clone());
        }
        self.scopes
            .insert(dex_path.into(), DexScope { table, codec });
    }

    /// First match for a class name across scopes, in container path order.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DexClassArtifact> {
        self.scopes.values().find_map(|scope| scope.table.get(key))
    }

    /// Lookup within one container.
    #[must_use]
    pub fn get_scoped(&self, dex_path: &str, key: &str) -> Option<&DexClassArtifact> {
        self.scopes.get(dex_path)?.table.get(key)
    }

    /// Insert into one container's table.
    ///
    /// # Errors
    /// [`crate::Error::KeyNotFound`] when the container scope was never registered.
    pub fn put_scoped(
        &mut self,
        dex_path: &str,
        key: impl Into<String>,
        item: DexClassArtifact,
    ) -> Result<Option<DexClassArtifact>> {
        let scope = self
            .scopes
            .get_mut(dex_path)
            .ok_or_else(|| crate::Error::KeyNotFound(dex_path.to_string()))?;
        Ok(scope.table.put(key, item))
    }

    /// Remove a class name from whichever scope holds it.
    pub fn remove(&mut self, key: &str) -> Option<DexClassArtifact> {
        self.scopes
            .values_mut()
            .find_map(|scope| scope.table.remove(key))
    }

    /// Iterate `(dex_path, class_key, artifact)` across all scopes.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &DexClassArtifact)> {
        self.scopes.iter().flat_map(|(path, scope)| {
            scope
                .table
                .iter()
                .map(move |(key, item)| (path.as_str(), key, item))
        })
    }

    /// Iterate `(dex_path, table, codec)` per scope; used by export to re-encode each
    /// container through the codec that decoded it.
    pub fn iter_scopes(
        &self,
    ) -> impl Iterator<Item = (&str, &VersionedItemTable<DexClassArtifact>, &Arc<dyn DexCodec>)>
    {
        self.scopes
            .iter()
            .map(|(path, scope)| (path.as_str(), &scope.table, &scope.codec))
    }

    /// Total class count across scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.values().map(|scope| scope.table.len()).sum()
    }

    /// Whether no scope holds any class.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dirty class keys across all scopes.
    #[must_use]
    pub fn dirty_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .scopes
            .values()
            .flat_map(|scope| scope.table.dirty_keys())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Drop every scope.
    pub fn clear(&mut self) {
        self.scopes.clear();
    }

    /// Install one listener shared by every scope, current and future.
    pub fn set_listener(&mut self, listener: Arc<dyn ItemListener<DexClassArtifact>>) {
        for scope in self.scopes.values_mut() {
            scope.table.set_listener(listener.clone());
        }
        self.listener = Some(listener);
    }

    /// Detach the shared listener from every scope.
    pub fn clear_listener(&mut self) {
        for scope in self.scopes.values_mut() {
            scope.table.clear_listener();
        }
        self.listener = None;
    }
}
