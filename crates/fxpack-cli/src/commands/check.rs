use anyhow::Result;
use colored::Colorize;

use super::load_validated;
use crate::GlobalOpts;

/// Validate the configuration without running any stage
pub fn handle_check(opts: &GlobalOpts) -> Result<()> {
    let (path, _config, validated) = load_validated(opts)?;

    let renderable = validated
        .sections
        .iter()
        .filter(|s| s.is_renderable())
        .count();

    println!(
        "{} {} is valid ({} sections, {} enabled)",
        "✔".green(),
        path.display(),
        validated.sections.len(),
        renderable
    );
    Ok(())
}
