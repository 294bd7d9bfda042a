//! Flattening resources back into distributable form.
//!
//! The exporter accumulates one sorted name-to-bytes map from one or more resources,
//! then writes it as an archive, a directory tree, or a single file. Class entries get
//! their `.class` suffix back, dex classes are re-encoded per container through the
//! codec that decoded them, and archives always contain synthesized parent directory
//! entries so the flat map serializes as a valid nested structure.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::artifact::DexClassArtifact;
use crate::codec;
use crate::workspace::{Resource, Resources};
use crate::Result;

/// What one export wrote, for reporting.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Entries written, not counting synthesized directories.
    pub entries: usize,
    /// Total accumulated raw payload size.
    pub raw_bytes: u64,
    /// Size of the written output.
    pub written_bytes: u64,
    /// Wall time of the write.
    pub elapsed: Duration,
    /// Class keys that were dirty at export time.
    pub dirty_classes: usize,
    /// File keys that were dirty at export time.
    pub dirty_files: usize,
}

impl ExportSummary {
    /// `(raw - written) / raw`; negative when the output grew.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.raw_bytes == 0 {
            return 0.0;
        }
        (self.raw_bytes as f64 - self.written_bytes as f64) / self.raw_bytes as f64
    }
}

/// Accumulates resource content and serializes it.
///
/// # Examples
///
/// ```rust,ignore
/// use jarscope::export::Exporter;
///
/// let mut exporter = Exporter::new().hollow_classes(true);
/// exporter.add_resources(&resources)?;
/// let summary = exporter.write_as_archive("out.jar".as_ref())?;
/// println!("wrote {} entries, ratio {:.2}", summary.entries, summary.compression_ratio());
/// ```
pub struct Exporter {
    content: BTreeMap<String, Vec<u8>>,
    dirty_classes: BTreeSet<String>,
    dirty_files: BTreeSet<String>,
    compress: bool,
    skip_files: bool,
    hollow: bool,
    shade_libs: bool,
    raw_bytes: u64,
}

impl Default for Exporter {
    fn default() -> Self {
        Self {
            content: BTreeMap::new(),
            dirty_classes: BTreeSet::new(),
            dirty_files: BTreeSet::new(),
            compress: true,
            skip_files: false,
            hollow: false,
            shade_libs: false,
            raw_bytes: 0,
        }
    }
}

impl Exporter {
    /// Create an exporter with compression on and every other switch off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deflate archive entries instead of storing them.
    #[must_use]
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Leave loose files out of the output.
    #[must_use]
    pub fn skip_files(mut self, skip: bool) -> Self {
        self.skip_files = skip;
        self
    }

    /// Strip method bodies while preserving every signature.
    #[must_use]
    pub fn hollow_classes(mut self, hollow: bool) -> Self {
        self.hollow = hollow;
        self
    }

    /// Include library resources' content, not just the primary.
    #[must_use]
    pub fn shade_libraries(mut self, shade: bool) -> Self {
        self.shade_libs = shade;
        self
    }

    /// Accumulate the primary resource, and the libraries when shading is on.
    ///
    /// # Errors
    /// Propagates [`Self::add_resource`] failures.
    pub fn add_resources(&mut self, resources: &Resources) -> Result<()> {
        self.add_resource(resources.primary())?;
        if self.shade_libs {
            for library in resources.libraries() {
                self.add_resource(library)?;
            }
        }
        Ok(())
    }

    /// Accumulate one resource's files, classes, and re-encoded dex containers.
    ///
    /// # Errors
    /// Currently infallible in practice; per-entry problems (hollowing, dex
    /// re-encoding) are logged against their key and the entry falls back or is
    /// skipped.
    pub fn add_resource(&mut self, resource: &Resource) -> Result<()> {
        if !self.skip_files {
            for (name, file) in resource.files().iter() {
                self.insert(name.to_string(), file.bytes().to_vec());
            }
            self.dirty_files.extend(resource.files().dirty_keys());
        }

        for (name, class) in resource.classes().iter() {
            let bytes = if self.hollow {
                match codec::hollow_class(class.bytes()) {
                    Ok(hollowed) => hollowed,
                    Err(err) => {
                        log::error!("hollowing '{name}' failed, exporting original bytes: {err}");
                        class.bytes().to_vec()
                    }
                }
            } else {
                class.bytes().to_vec()
            };
            self.insert(format!("{name}.class"), bytes);
        }
        self.dirty_classes.extend(resource.classes().dirty_keys());

        for (dex_path, table, dex_codec) in resource.dex_classes().iter_scopes() {
            let classes: Vec<DexClassArtifact> =
                table.iter().map(|(_, class)| class.clone()).collect();
            match dex_codec.encode(dex_path, &classes) {
                Ok(bytes) => self.insert(dex_path.to_string(), bytes),
                Err(err) => log::error!("re-encoding dex container '{dex_path}' failed: {err}"),
            }
            self.dirty_classes.extend(table.dirty_keys());
        }
        Ok(())
    }

    fn insert(&mut self, key: String, bytes: Vec<u8>) {
        self.raw_bytes += bytes.len() as u64;
        if let Some(replaced) = self.content.insert(key.clone(), bytes) {
            // The replaced payload no longer counts toward the raw total.
            self.raw_bytes -= replaced.len() as u64;
            log::warn!("export entry '{key}' overwritten by a later resource");
        }
    }

    /// Number of accumulated entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.content.len()
    }

    /// Write the accumulator as a zip-family archive.
    ///
    /// Entries go out in key order; a not-yet-seen parent directory entry is
    /// synthesized (shallowest first) before its first child, and every entry carries a
    /// CRC32 from the zip layer, stored or deflated per the compress switch.
    ///
    /// # Errors
    /// I/O and archive-structure failures.
    pub fn write_as_archive(&self, path: &Path) -> Result<ExportSummary> {
        let started = Instant::now();
        let mut writer = ZipWriter::new(File::create(path)?);
        let method = if self.compress {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        };
        let options = SimpleFileOptions::default().compression_method(method);

        let mut seen_dirs: BTreeSet<String> = BTreeSet::new();
        for (key, bytes) in &self.content {
            for directory in parent_directories(key) {
                if seen_dirs.insert(directory.clone()) {
                    writer.add_directory(directory, options)?;
                }
            }
            writer.start_file(key, options)?;
            writer.write_all(bytes)?;
        }
        let file = writer.finish()?;
        let written_bytes = file.metadata()?.len();
        Ok(self.finish_summary(written_bytes, started))
    }

    /// Mirror the accumulator onto a real filesystem tree under `root`.
    ///
    /// # Errors
    /// I/O failures creating directories or writing files.
    pub fn write_as_directory(&self, root: &Path) -> Result<ExportSummary> {
        let started = Instant::now();
        let mut written_bytes = 0u64;
        for (key, bytes) in &self.content {
            let destination = root.join(key);
            if let Some(parent) = destination.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&destination, bytes)?;
            written_bytes += bytes.len() as u64;
        }
        Ok(self.finish_summary(written_bytes, started))
    }

    /// Write the accumulator's sole entry to `path`.
    ///
    /// Requires exactly one accumulated entry; a violation is reported and yields
    /// `None` rather than an error, because it is an operator mistake the surrounding
    /// workflow should survive.
    ///
    /// # Errors
    /// I/O failures writing the file.
    pub fn write_as_single_file(&self, path: &Path) -> Result<Option<ExportSummary>> {
        let started = Instant::now();
        let mut entries = self.content.iter();
        let (Some((key, bytes)), None) = (entries.next(), entries.next()) else {
            log::error!(
                "single-file export needs exactly one entry, accumulator holds {}",
                self.content.len()
            );
            return Ok(None);
        };
        log::debug!("writing single entry '{key}'");
        std::fs::write(path, bytes)?;
        Ok(Some(self.finish_summary(bytes.len() as u64, started)))
    }

    fn finish_summary(&self, written_bytes: u64, started: Instant) -> ExportSummary {
        let summary = ExportSummary {
            entries: self.content.len(),
            raw_bytes: self.raw_bytes,
            written_bytes,
            elapsed: started.elapsed(),
            dirty_classes: self.dirty_classes.len(),
            dirty_files: self.dirty_files.len(),
        };
        log::info!(
            "exported {} entries in {:?}, compression ratio {:.3}",
            summary.entries,
            summary.elapsed,
            summary.compression_ratio()
        );
        summary
    }
}

/// Ancestor directory keys of an entry, shallowest first, each with a trailing slash.
fn parent_directories(key: &str) -> Vec<String> {
    let mut directories = Vec::new();
    let mut end = 0;
    while let Some(slash) = key[end..].find('/') {
        end += slash + 1;
        directories.push(key[..end].to_string());
    }
    directories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_directories() {
        assert_eq!(
            parent_directories("com/example/Main.class"),
            ["com/", "com/example/"]
        );
        assert!(parent_directories("MANIFEST.MF").is_empty());
    }

    #[test]
    fn test_single_file_requires_exactly_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.bin");

        let mut exporter = Exporter::new();
        exporter.insert("a.bin".to_string(), vec![1, 2, 3]);
        exporter.insert("b.bin".to_string(), vec![4]);
        assert!(exporter.write_as_single_file(&out).unwrap().is_none());

        let mut exporter = Exporter::new();
        exporter.insert("a.bin".to_string(), vec![1, 2, 3]);
        let summary = exporter.write_as_single_file(&out).unwrap().unwrap();
        assert_eq!(summary.entries, 1);
        assert_eq!(std::fs::read(&out).unwrap(), [1, 2, 3]);
    }

    #[test]
    fn test_overwritten_entry_counts_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = Exporter::new();
        exporter.insert("lib/Helper.class".to_string(), vec![0; 16]);
        exporter.insert("lib/Helper.class".to_string(), vec![1; 4]);
        assert_eq!(exporter.entry_count(), 1);

        let summary = exporter.write_as_directory(dir.path()).unwrap();
        assert_eq!(summary.raw_bytes, 4);
        assert_eq!(summary.written_bytes, 4);
    }

    #[test]
    fn test_directory_export_mirrors_tree() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = Exporter::new();
        exporter.insert("com/example/Main.class".to_string(), vec![1]);
        exporter.insert("META-INF/MANIFEST.MF".to_string(), vec![2]);
        let summary = exporter.write_as_directory(dir.path()).unwrap();
        assert_eq!(summary.entries, 2);
        assert!(dir.path().join("com/example/Main.class").is_file());
        assert!(dir.path().join("META-INF/MANIFEST.MF").is_file());
    }
}
