//! Section renderer - turns one typed section into manifest lines
//!
//! Rendering is pure: the same section and metadata document always produce
//! the same lines. Disabled or empty sections produce no lines at all.

use crate::metadata::{is_truthy, MetadataDocument};
use crate::types::{
    display_value, CategoryHeader, Convar, KeyValueEntry, MetadataProjection, Section, SectionBody,
};

/// Indentation unit for nested manifest lines
pub const INDENT: &str = "    ";

/// Render a section into its ordered manifest lines
pub fn render(section: &Section, metadata: &MetadataDocument) -> Vec<String> {
    if !section.is_renderable() {
        return Vec::new();
    }

    match &section.body {
        SectionBody::KeyValue(entries) => render_key_values(entries),
        SectionBody::PackageMetadata(projections) => render_projections(projections, metadata),
        SectionBody::List {
            singular_key,
            plural_key,
            items,
        } => render_list(singular_key, plural_key, items),
        SectionBody::ConvarCategory { category, convars } => {
            render_convar_category(category, convars)
        }
    }
}

fn render_key_values(entries: &[KeyValueEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| entry_line(&entry.key, &display_value(&entry.value)))
        .collect()
}

fn render_projections(projections: &[MetadataProjection], metadata: &MetadataDocument) -> Vec<String> {
    projections
        .iter()
        .filter_map(|projection| {
            metadata
                .lookup(&projection.source_key)
                .filter(|value| is_truthy(value))
                .map(|value| entry_line(&projection.manifest_key, &display_value(value)))
        })
        .collect()
}

fn render_list(singular_key: &str, plural_key: &str, items: &[String]) -> Vec<String> {
    match items {
        [] => Vec::new(),
        [item] => vec![entry_line(singular_key, item)],
        _ => {
            let mut lines = Vec::with_capacity(items.len() + 2);
            lines.push(format!("{} {{", plural_key));
            lines.extend(items.iter().map(|item| format!("{}{},", INDENT, quote(item))));
            lines.push("}".to_string());
            lines
        }
    }
}

fn render_convar_category(category: &CategoryHeader, convars: &[Convar]) -> Vec<String> {
    let mut lines = Vec::with_capacity(convars.len() + 5);
    lines.push(format!("convar_category {} {{", quote(&category.name)));
    lines.push(format!("{}{},", INDENT, quote(&category.description)));
    lines.push(format!("{}{{", INDENT));
    for convar in convars {
        lines.push(format!(
            "{indent}{indent}{{ {}, {}, {}, {} }},",
            quote(&convar.description),
            quote(&convar.name),
            quote(&convar.kind),
            quote(&display_value(&convar.default)),
            indent = INDENT,
        ));
    }
    lines.push(format!("{}}}", INDENT));
    lines.push("}".to_string());
    lines
}

fn entry_line(key: &str, value: &str) -> String {
    format!("{} {}", key, quote(value))
}

/// Single-quoted Lua string literal
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}
