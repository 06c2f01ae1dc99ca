//! Manifest generator - folds sections into the manifest text and writes it
//!
//! Sections are rendered in the order given; every section that produces
//! lines is followed by exactly one blank line.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::ManifestError;
use crate::metadata::MetadataDocument;
use crate::render::render;
use crate::types::Section;

/// Render all sections into the full manifest text
pub fn generate(sections: &[Section], metadata: &MetadataDocument) -> String {
    sections.iter().fold(String::new(), |mut output, section| {
        let lines = render(section, metadata);
        if lines.is_empty() {
            debug!("Section '{}' produced no output", section.id);
        } else {
            output.push_str(&lines.join("\n"));
            output.push_str("\n\n");
        }
        output
    })
}

/// Render the manifest and write it to `output_path`
pub fn write_manifest(
    sections: &[Section],
    metadata: &MetadataDocument,
    output_path: &Path,
) -> Result<(), ManifestError> {
    debug!("Writing manifest to: {:?}", output_path);

    let content = generate(sections, metadata);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| ManifestError::io("create manifest directory", parent, e))?;
    }
    fs::write(output_path, &content)
        .map_err(|e| ManifestError::io("write manifest", output_path, e))?;

    info!("Manifest written successfully to: {:?}", output_path);
    info!(
        "Sections rendered: {}",
        sections.iter().filter(|s| s.is_renderable()).count()
    );

    Ok(())
}
