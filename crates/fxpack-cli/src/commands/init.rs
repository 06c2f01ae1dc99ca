use anyhow::{Context, Result};
use colored::Colorize;
use fxpack_config::DEFAULT_CONFIG_FILE;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::logger;
use crate::GlobalOpts;

pub(crate) const CONFIG_TEMPLATE: &str = r#"# fxpack build configuration
# Stages run in order: metadata, timestamp, manifest, bundle.

[metadata]
path = "package.json"
# Environment variable holding a release version, e.g. "v1.2.3"
version_env = "RELEASE_VERSION"
version_prefix = "v"
indent = 2

[timestamp]
output = "dist/.buildstamp"
# iso | locale | custom
style = "iso"
# locale = "en_US"
# time_zone = "utc"
# pattern = "%Y-%m-%d %H:%M"

[manifest]
output = "fxmanifest.lua"

[[manifest.sections]]
id = "header"
type = "key_value"
data = [
  { key = "fx_version", value = "cerulean" },
  { key = "game", value = "gta5" },
]

[[manifest.sections]]
id = "package"
type = "package_metadata"
data = [
  { manifest_key = "name", source_key = "name" },
  { manifest_key = "version", source_key = "version" },
  { manifest_key = "description", source_key = "description" },
  { manifest_key = "author", source_key = "author" },
]

[[manifest.sections]]
id = "server"
type = "list"
singular_key = "server_script"
plural_key = "server_scripts"
data = ["dist/server.js"]

[[manifest.sections]]
id = "convars"
type = "convar_category"
enabled = false
category = { name = "Resource", description = "Resource settings" }
data = [
  { description = "Enable debug output", name = "resource_debug", type = "CV_BOOL", default = "false" },
]

[bundle]
entry_points = ["src/server.ts"]
output = "dist/server.js"
program = "esbuild"

[bundle.options]
format = "cjs"
platform = "node"
target = "node16"
keep_names = true
legal_comments = "inline"

# [release]
# repository = "owner/name"
# delay_secs = 5
"#;

/// Write a starter build configuration
pub fn handle_init(file: Option<String>, force: bool, _opts: &GlobalOpts) -> Result<()> {
    logger::debug("Handling init command");

    let target_filename = file.unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let target_path = Path::new(&target_filename);

    logger::debug(&format!("Target file: {}", target_filename));

    if target_path.exists() && !force && !confirm_overwrite(&target_filename)? {
        logger::info("Operation cancelled by user");
        println!("Operation cancelled.");
        return Ok(());
    }

    if let Some(parent) = target_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(target_path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to create configuration file {}", target_filename))?;

    logger::success(&format!("Created configuration file: {}", target_filename));
    println!();
    println!("{}  Configuration file created successfully!", "✔".green());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} to describe your resource",
        target_filename.bold()
    );
    println!("  2. Validate it: fxpack check");
    println!("  3. Preview the manifest: fxpack render");
    println!("  4. Build: fxpack build");

    Ok(())
}

fn confirm_overwrite(filename: &str) -> Result<bool> {
    print!(
        "{} File '{}' already exists. Overwrite? {} ",
        "?".bold().cyan(),
        filename,
        "[y/n] ›".dimmed()
    );
    io::stdout().flush().ok();

    let mut response = String::new();
    io::stdin()
        .read_line(&mut response)
        .context("Failed to read input")?;
    let response = response.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}
