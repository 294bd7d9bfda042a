use std::sync::Arc;

/// Sentinel extension for keys that carry none.
pub const UNKNOWN_EXTENSION: &str = "unknown";

/// An immutable loose-file artifact.
///
/// Anything ingested that is not a class or a dex container ends up here: manifests,
/// resources, native libraries, and entries demoted by the recovery pass. The extension is
/// derived from the key once at construction (case-folded text after the final dot of the
/// last path segment, [`UNKNOWN_EXTENSION`] when absent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArtifact {
    name: String,
    extension: String,
    bytes: Arc<[u8]>,
}

impl FileArtifact {
    /// Create a file artifact from a key and raw content.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Arc<[u8]>) -> Self {
        let name = name.into();
        let extension = derive_extension(&name);
        Self {
            name,
            extension,
            bytes,
        }
    }

    /// Normalized slash-separated file path.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased file extension, or [`UNKNOWN_EXTENSION`].
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Raw file payload.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the raw payload.
    #[must_use]
    pub fn bytes_arc(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }
}

fn derive_extension(name: &str) -> String {
    let segment = name.rsplit('/').next().unwrap_or(name);
    match segment.rfind('.') {
        Some(idx) if idx + 1 < segment.len() => segment[idx + 1..].to_lowercase(),
        _ => UNKNOWN_EXTENSION.to_string(),
    }
}
