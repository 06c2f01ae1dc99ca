use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading metadata or writing the manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to {operation} '{}': {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse metadata document: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to serialize metadata document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Invalid metadata document: {0}")]
    InvalidDocument(String),
}

impl ManifestError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ManifestError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
