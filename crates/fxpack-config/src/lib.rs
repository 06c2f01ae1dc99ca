//! Build configuration for fxpack
//!
//! Loads `fxpack.toml`, validates it as a whole before any build stage runs,
//! and resolves the version override supplied through the environment.

pub mod build_config;
pub mod env;
pub mod errors;
pub mod validation;

pub use build_config::{
    BuildConfig, BundleConfig, ManifestConfig, MetadataConfig, ReleaseConfig, TimestampConfig,
    TimestampStyle, CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE,
};
pub use errors::{ConfigError, ValidationReport};
pub use validation::{validate, TimeOffset, TimestampSpec, ValidatedBuild};
