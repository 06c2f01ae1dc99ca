use anyhow::Result;
use colored::Colorize;

use super::load_validated;
use crate::logger;
use crate::pipeline::BuildPipeline;
use crate::GlobalOpts;

/// Run the full build pipeline
pub fn handle_build(skip_bundle: bool, opts: &GlobalOpts) -> Result<()> {
    let (path, config, validated) = load_validated(opts)?;
    logger::step(&format!("Building from {}", path.display()));

    let report = BuildPipeline::new(&config, &validated)
        .skip_bundle(skip_bundle)
        .run()?;

    logger::success(&format!(
        "Manifest written to {}",
        report.manifest_path.display()
    ));
    if let Some(version) = &report.version {
        println!("{} {}", "version:".bold(), version);
    }
    println!("{} {}", "timestamp:".bold(), report.timestamp);
    println!("{} {}", "manifest:".bold(), report.manifest_path.display());
    if let Some(bundle) = &report.bundle_path {
        println!("{} {}", "bundle:".bold(), bundle.display());
    }

    Ok(())
}
