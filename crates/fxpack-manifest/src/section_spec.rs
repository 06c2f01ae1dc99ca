//! Raw section declarations as they appear in a build configuration
//!
//! Every field is optional at this level so that a malformed section turns
//! into a validation message instead of a parse failure. [`validate_sections`]
//! checks all declarations, accumulating every violation, and produces the
//! typed [`Section`] list the renderer works with.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use crate::types::{CategoryHeader, Section, SectionBody, SectionKind};

fn default_enabled() -> bool {
    true
}

/// A section exactly as declared in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, alias = "singularKey", skip_serializing_if = "Option::is_none")]
    pub singular_key: Option<String>,

    #[serde(default, alias = "pluralKey", skip_serializing_if = "Option::is_none")]
    pub plural_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryHeaderSpec>,
}

impl Default for SectionSpec {
    fn default() -> Self {
        SectionSpec {
            id: None,
            kind: None,
            enabled: true,
            data: None,
            singular_key: None,
            plural_key: None,
            category: None,
        }
    }
}

/// Raw `convar_category` header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryHeaderSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SectionSpec {
    /// Check this declaration, appending violations. Returns the typed section
    /// when the declaration is usable.
    ///
    /// Disabled sections only need an `id` and a `type`; a disabled section
    /// whose type is unknown, or whose payload does not decode, is dropped
    /// because it would render nothing anyway.
    pub fn validate(&self, position: usize, violations: &mut Vec<String>) -> Option<Section> {
        let label = self.label(position);
        let before = violations.len();

        let id = non_blank(self.id.as_ref());
        if id.is_none() {
            violations.push(format!("{}: missing 'id'", label));
        }

        let tag = non_blank(self.kind.as_ref());
        if tag.is_none() {
            violations.push(format!("{}: missing 'type'", label));
        }

        if self.enabled && is_empty_data(self.data.as_ref()) {
            violations.push(format!("{}: enabled but 'data' is empty", label));
        }

        let kind = tag.and_then(SectionKind::from_tag);

        if self.enabled {
            if let (Some(tag), None) = (tag, kind) {
                violations.push(format!("{}: unsupported section type '{}'", label, tag));
            }

            match kind {
                Some(SectionKind::List) => {
                    if non_blank(self.singular_key.as_ref()).is_none() {
                        violations.push(format!("{}: list section requires 'singular_key'", label));
                    }
                    if non_blank(self.plural_key.as_ref()).is_none() {
                        violations.push(format!("{}: list section requires 'plural_key'", label));
                    }
                }
                Some(SectionKind::ConvarCategory) => {
                    let header = self.category.clone().unwrap_or_default();
                    if non_blank(header.name.as_ref()).is_none() {
                        violations.push(format!(
                            "{}: convar_category section requires 'category.name'",
                            label
                        ));
                    }
                    if non_blank(header.description.as_ref()).is_none() {
                        violations.push(format!(
                            "{}: convar_category section requires 'category.description'",
                            label
                        ));
                    }
                }
                _ => {}
            }
        }

        if violations.len() > before {
            return None;
        }

        let (Some(id), Some(kind)) = (id, kind) else {
            debug!("Dropping disabled section {} with unknown type", label);
            return None;
        };

        match self.decode_body(kind) {
            Ok(body) => Some(Section {
                id: id.to_string(),
                enabled: self.enabled,
                body,
            }),
            Err(e) if self.enabled => {
                violations.push(format!("{}: invalid 'data' for {} section: {}", label, kind, e));
                None
            }
            Err(e) => {
                debug!("Dropping disabled section {} with undecodable data: {}", label, e);
                None
            }
        }
    }

    fn decode_body(&self, kind: SectionKind) -> Result<SectionBody, serde_json::Error> {
        let data = match &self.data {
            None | Some(Value::Null) => Value::Array(Vec::new()),
            Some(value) => value.clone(),
        };

        let body = match kind {
            SectionKind::KeyValue => SectionBody::KeyValue(serde_json::from_value(data)?),
            SectionKind::PackageMetadata => {
                SectionBody::PackageMetadata(serde_json::from_value(data)?)
            }
            SectionKind::List => SectionBody::List {
                singular_key: self.singular_key.clone().unwrap_or_default(),
                plural_key: self.plural_key.clone().unwrap_or_default(),
                items: serde_json::from_value(data)?,
            },
            SectionKind::ConvarCategory => {
                let header = self.category.clone().unwrap_or_default();
                SectionBody::ConvarCategory {
                    category: CategoryHeader {
                        name: header.name.unwrap_or_default(),
                        description: header.description.unwrap_or_default(),
                    },
                    convars: serde_json::from_value(data)?,
                }
            }
        };
        Ok(body)
    }

    fn label(&self, position: usize) -> String {
        match non_blank(self.id.as_ref()) {
            Some(id) => format!("section '{}'", id),
            None => format!("section #{}", position + 1),
        }
    }
}

/// Validate every declaration and collect the typed sections in order.
///
/// Returns the sections together with all violations found; callers treat a
/// non-empty violation list as fatal.
pub fn validate_sections(specs: &[SectionSpec]) -> (Vec<Section>, Vec<String>) {
    let mut violations = Vec::new();
    let mut sections = Vec::with_capacity(specs.len());
    let mut seen_ids = HashSet::new();

    for (position, spec) in specs.iter().enumerate() {
        if let Some(id) = non_blank(spec.id.as_ref()) {
            if !seen_ids.insert(id) {
                violations.push(format!("section '{}': duplicate id", id));
            }
        }

        if let Some(section) = spec.validate(position, &mut violations) {
            sections.push(section);
        }
    }

    (sections, violations)
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn is_empty_data(data: Option<&Value>) -> bool {
    match data {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}
