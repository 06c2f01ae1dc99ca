use anyhow::Result;
use fxpack_manifest::{generate, MetadataDocument};

use super::load_validated;
use crate::logger;
use crate::GlobalOpts;

/// Print the manifest the build would write, without touching any file
pub fn handle_render(opts: &GlobalOpts) -> Result<()> {
    let (_path, config, validated) = load_validated(opts)?;

    let metadata_path = config.metadata_path();
    let mut document = MetadataDocument::load(&metadata_path)?;
    if let Some(version) = fxpack_config::env::version_override(
        config.metadata.version_env.as_deref(),
        config.metadata.version_prefix.as_deref(),
    ) {
        logger::debug(&format!("Rendering with version override {}", version));
        document.set_version(&version);
    }

    print!("{}", generate(&validated.sections, &document));
    Ok(())
}
