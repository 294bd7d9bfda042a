//! Shared test fixtures: class factories, archive builders, and stub providers.


use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::artifact::{AccessFlags, ClassArtifact, DexClassArtifact, Member};
use crate::codec::{ClassBuilder, MethodBody};
use crate::workspace::{DexCodec, RuntimeClassProvider};
use crate::Result;

/// A minimal decoded class with the given name.
pub(crate) fn simple_class(name: &str) -> ClassArtifact {
    ClassArtifact::read(&ClassBuilder::new(name).build()).unwrap()
}

/// Class bytes declaring one public no-op method.
pub(crate) fn class_with_method(name: &str, method: &str, descriptor: &str) -> Vec<u8> {
    ClassBuilder::new(name)
        .method(AccessFlags::PUBLIC, method, descriptor, MethodBody::NoOp)
        .build()
}

/// Route `log` output into the harness capture. Repeat calls are no-ops.
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Write a stored (uncompressed) jar with the given entries.
pub(crate) fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    init_logging();
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, bytes) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

/// Runtime provider with no classes at all.
pub(crate) struct EmptyRuntimeProvider;

impl RuntimeClassProvider for EmptyRuntimeProvider {
    fn class_bytes(&self, _name: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Dex codec double: decode yields the classes scripted at construction, encode
/// serializes class names newline-separated. Enough to observe scoping and export
/// plumbing without a real dex implementation.
pub(crate) struct StubDexCodec {
    classes: Vec<(String, String)>,
}

impl StubDexCodec {
    pub(crate) fn new(classes: &[(&str, &str)]) -> Self {
        Self {
            classes: classes
                .iter()
                .map(|(name, method)| (name.to_string(), method.to_string()))
                .collect(),
        }
    }
}

impl DexCodec for StubDexCodec {
    fn decode(&self, dex_path: &str, data: &[u8]) -> Result<Vec<DexClassArtifact>> {
        Ok(self
            .classes
            .iter()
            .map(|(name, method)| {
                DexClassArtifact::new(
                    name,
                    Some("java/lang/Object".to_string()),
                    Vec::new(),
                    AccessFlags::PUBLIC,
                    Vec::new(),
                    vec![Member::new(method, "()V", AccessFlags::PUBLIC)],
                    Arc::from(data),
                    dex_path,
                )
            })
            .collect())
    }

    fn encode(&self, _dex_path: &str, classes: &[DexClassArtifact]) -> Result<Vec<u8>> {
        let names: Vec<&str> = classes.iter().map(DexClassArtifact::name).collect();
        Ok(names.join("\n").into_bytes())
    }
}
