//! Error types for the build pipeline and the release monitor

use fxpack_config::ConfigError;
use fxpack_manifest::ManifestError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a build
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Failed to {operation} '{}': {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Bundler '{0}' was not found on PATH")]
    BundlerNotFound(String),

    #[error("Failed to launch bundler '{program}': {source}")]
    BundlerLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Bundler '{program}' exited with {status}: {stderr}")]
    BundlerFailed {
        program: String,
        status: String,
        stderr: String,
    },
}

impl BuildError {
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while checking the remote release feed
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),
}
