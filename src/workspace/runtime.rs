//! Lazy, cached view of the runtime platform's own classes.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Mutex;

use dashmap::DashMap;
use zip::ZipArchive;

use crate::artifact::ClassArtifact;
use crate::codec;
use crate::Result;

/// Supplier of platform class bytes by internal name.
///
/// Abstracts where the runtime's classes come from; the default implementation reads
/// them out of platform archives ([`ClasspathProvider`]), test code substitutes fixed
/// maps.
pub trait RuntimeClassProvider: Send + Sync {
    /// Raw class file bytes for `name`, or `None` when the platform has no such class.
    fn class_bytes(&self, name: &str) -> Option<Vec<u8>>;
}

/// Memoizing view over a [`RuntimeClassProvider`].
///
/// Both hits and misses are cached: "does not exist" is asked constantly during
/// hierarchy walks and must not re-probe the provider every time. Lookups of distinct
/// keys are safe concurrently; a race on the same key at worst redoes one decode, and
/// the second insert is an idempotent overwrite.
pub struct RuntimeResource {
    provider: Box<dyn RuntimeClassProvider>,
    cache: DashMap<String, Option<ClassArtifact>>,
}

impl RuntimeResource {
    /// Create a view over a provider. The cache starts empty.
    #[must_use]
    pub fn new(provider: Box<dyn RuntimeClassProvider>) -> Self {
        Self {
            provider,
            cache: DashMap::new(),
        }
    }

    /// Decode-on-first-access lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ClassArtifact> {
        if let Some(cached) = self.cache.get(name) {
            return cached.clone();
        }
        let decoded = self
            .provider
            .class_bytes(name)
            .and_then(|bytes| match codec::read_class(&bytes) {
                Ok(artifact) => Some(artifact),
                Err(err) => {
                    log::warn!("runtime class '{name}' failed to decode: {err}");
                    None
                }
            });
        self.cache.insert(name.to_string(), decoded.clone());
        decoded
    }

    /// Whether the platform has a class under this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of cached lookups, hits and misses both.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

/// [`RuntimeClassProvider`] reading from a list of platform archives (e.g. `rt.jar`,
/// an Android framework jar, or any bootclasspath entry).
///
/// Archives are opened once; entry reads lock the archive they hit. The memoizing
/// cache in front keeps contention negligible.
pub struct ClasspathProvider {
    archives: Vec<Mutex<ZipArchive<File>>>,
}

impl ClasspathProvider {
    /// Open every archive in the list.
    ///
    /// # Errors
    /// I/O or archive-structure failures opening any listed path.
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Result<Self> {
        let mut archives = Vec::new();
        for path in paths {
            let archive = ZipArchive::new(File::open(&path)?)?;
            archives.push(Mutex::new(archive));
        }
        Ok(Self { archives })
    }
}

impl RuntimeClassProvider for ClasspathProvider {
    fn class_bytes(&self, name: &str) -> Option<Vec<u8>> {
        let entry_name = format!("{name}.class");
        for archive in &self.archives {
            let Ok(mut archive) = archive.lock() else {
                continue;
            };
            // Bound separately so the lookup result drops before the guard.
            let found = archive.by_name(&entry_name);
            if let Ok(mut entry) = found {
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                if entry.read_to_end(&mut bytes).is_ok() {
                    return Some(bytes);
                }
            }
        }
        None
    }
}
