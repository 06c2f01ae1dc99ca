use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating a build configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to {operation} '{}': {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse build configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize build configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Invalid(ValidationReport),
}

/// Every violation found in a configuration, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<String>,
}

impl ValidationReport {
    pub fn new(violations: Vec<String>) -> Self {
        ValidationReport { violations }
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Configuration validation failed:\n  - {}",
            self.violations.join("\n  - ")
        )
    }
}
