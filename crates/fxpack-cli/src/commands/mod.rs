//! Subcommand handlers

pub mod build;
pub mod check;
pub mod init;
pub mod release_check;
pub mod render;

use anyhow::Result;
use fxpack_config::{validate, BuildConfig, ValidatedBuild};
use std::path::PathBuf;

use crate::logger;
use crate::GlobalOpts;

/// Load the configuration selected by the global options and validate it as a whole
pub(crate) fn load_validated(opts: &GlobalOpts) -> Result<(PathBuf, BuildConfig, ValidatedBuild)> {
    let path = opts.config_path();
    logger::debug(&format!("Using configuration: {}", path.display()));

    let config = BuildConfig::load(&path)?;
    let validated = validate(&config)?;
    Ok((path, config, validated))
}
