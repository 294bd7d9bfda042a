//! Archive content source for the zip family: jar, war, apk, plain zip.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;

use memmap2::Mmap;
use zip::ZipArchive;

use crate::ingest::{ContentCollection, ContentSource, SourceType};
use crate::workspace::DexCodec;
use crate::Result;

const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";

/// Reads every entry of a zip-family archive into the pending collection.
///
/// Dex containers (`classes.dex`, `classes2.dex`, ...) are decoded through the
/// configured [`DexCodec`] when one is attached; without a codec they pass through as
/// plain files, so a jar-only workflow needs no dex support at all.
pub struct ArchiveContentSource {
    path: PathBuf,
    dex_codec: Option<Arc<dyn DexCodec>>,
}

impl ArchiveContentSource {
    /// Create a source for the archive at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dex_codec: None,
        }
    }

    /// Attach a dex codec for apk inputs.
    #[must_use]
    pub fn with_dex_codec(mut self, codec: Arc<dyn DexCodec>) -> Self {
        self.dex_codec = Some(codec);
        self
    }
}

impl ContentSource for ArchiveContentSource {
    fn source_type(&self) -> SourceType {
        SourceType::Archive
    }

    fn read_into(&mut self, collection: &mut ContentCollection) -> Result<()> {
        let file = File::open(&self.path)?;
        // The map is read-only and lives only for this call.
        let mapped = unsafe { Mmap::map(&file)? };
        let data = locate_zip(&mapped)?;
        let mut archive = ZipArchive::new(Cursor::new(data))?;

        for index in 0..archive.len() {
            let mut entry = match archive.by_index(index) {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("skipping unreadable archive entry #{index}: {err}");
                    continue;
                }
            };
            let name = entry.name().to_string();
            if !keep_entry(&name, entry.is_dir()) {
                continue;
            }
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            if let Err(err) = entry.read_to_end(&mut bytes) {
                log::warn!("skipping archive entry '{name}': {err}");
                continue;
            }
            match (&self.dex_codec, is_dex_container(&name)) {
                (Some(codec), true) => match codec.decode(&name, &bytes) {
                    Ok(classes) => collection.add_dex_container(&name, Arc::clone(codec), classes),
                    Err(err) => {
                        log::warn!("dex container '{name}' failed to decode: {err}");
                        collection.add_entry(&name, bytes);
                    }
                },
                _ => collection.add_entry(&name, bytes),
            }
        }
        Ok(())
    }
}

/// Find the real zip payload inside the mapped file.
///
/// Some packers prepend junk before the first local file header; the JVM's own zip
/// reader tolerates this, so the workbench must too.
fn locate_zip(data: &[u8]) -> Result<&[u8]> {
    if data.starts_with(ZIP_LOCAL_HEADER) {
        return Ok(data);
    }
    data.windows(ZIP_LOCAL_HEADER.len())
        .position(|window| window == ZIP_LOCAL_HEADER)
        .map(|offset| {
            log::debug!("archive has {offset} bytes of junk before the first local header");
            &data[offset..]
        })
        .ok_or(crate::Error::NotSupported)
}

/// Entry filter: reject traversal tricks, skip directories unless the path plays games
/// with a `.class` segment (a known hiding spot for real classes).
fn keep_entry(name: &str, is_dir: bool) -> bool {
    if name.contains("../") || name.starts_with("//") {
        log::warn!("rejecting suspicious archive entry '{name}'");
        return false;
    }
    !is_dir || name.contains(".class")
}

/// `classes.dex`, `classes2.dex`, and friends at any depth.
fn is_dex_container(name: &str) -> bool {
    name.ends_with(".dex")
}
