//! Typed manifest sections
//!
//! A [`Section`] only exists after its raw configuration has passed validation
//! (see [`crate::section_spec`]), so every body variant here is known to be
//! well formed. Rendering dispatches on [`SectionBody`] exhaustively.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// =============================================================================
// SECTION KIND - the `type` discriminator used in configuration files
// =============================================================================

/// The render strategy a section asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    KeyValue,
    PackageMetadata,
    List,
    ConvarCategory,
}

impl SectionKind {
    /// Parse the configuration tag. Accepts snake_case and camelCase spellings.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "key_value" | "keyValue" => Some(SectionKind::KeyValue),
            "package_metadata" | "packageMetadata" => Some(SectionKind::PackageMetadata),
            "list" => Some(SectionKind::List),
            "convar_category" | "convarCategory" => Some(SectionKind::ConvarCategory),
            _ => None,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            SectionKind::KeyValue => "key_value",
            SectionKind::PackageMetadata => "package_metadata",
            SectionKind::List => "list",
            SectionKind::ConvarCategory => "convar_category",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

// =============================================================================
// SECTION - validated unit of manifest output
// =============================================================================

/// One declarative unit of manifest output
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub enabled: bool,
    pub body: SectionBody,
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        self.body.kind()
    }

    /// Whether this section can contribute any lines at all
    pub fn is_renderable(&self) -> bool {
        self.enabled && !self.body.is_empty()
    }
}

/// Variant-specific payload of a [`Section`]
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    KeyValue(Vec<KeyValueEntry>),
    PackageMetadata(Vec<MetadataProjection>),
    List {
        singular_key: String,
        plural_key: String,
        items: Vec<String>,
    },
    ConvarCategory {
        category: CategoryHeader,
        convars: Vec<Convar>,
    },
}

impl SectionBody {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionBody::KeyValue(_) => SectionKind::KeyValue,
            SectionBody::PackageMetadata(_) => SectionKind::PackageMetadata,
            SectionBody::List { .. } => SectionKind::List,
            SectionBody::ConvarCategory { .. } => SectionKind::ConvarCategory,
        }
    }

    /// Uniform emptiness check over the `data` payload
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        match self {
            SectionBody::KeyValue(entries) => entries.len(),
            SectionBody::PackageMetadata(projections) => projections.len(),
            SectionBody::List { items, .. } => items.len(),
            SectionBody::ConvarCategory { convars, .. } => convars.len(),
        }
    }
}

// =============================================================================
// PAYLOAD ENTRIES
// =============================================================================

/// A literal `key 'value'` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyValueEntry {
    pub key: String,
    pub value: Value,
}

/// Projects a value from the metadata document into the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataProjection {
    #[serde(alias = "manifestKey")]
    pub manifest_key: String,
    /// Top-level key or dotted path into the metadata document
    #[serde(alias = "sourceKey", alias = "source_key_path", alias = "sourceKeyPath")]
    pub source_key: String,
}

/// Header of a `convar_category` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryHeader {
    pub name: String,
    pub description: String,
}

/// A console variable exposed by the resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Convar {
    pub description: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub default: Value,
}

/// Plain textual form of a configuration or metadata value.
///
/// Strings render unquoted, arrays as comma-joined elements and objects as
/// compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_kind_accepts_both_spellings() {
        assert_eq!(SectionKind::from_tag("key_value"), Some(SectionKind::KeyValue));
        assert_eq!(SectionKind::from_tag("keyValue"), Some(SectionKind::KeyValue));
        assert_eq!(
            SectionKind::from_tag("convarCategory"),
            Some(SectionKind::ConvarCategory)
        );
        assert_eq!(SectionKind::from_tag("template"), None);
    }

    #[test]
    fn test_body_emptiness() {
        let body = SectionBody::List {
            singular_key: "file".to_string(),
            plural_key: "files".to_string(),
            items: Vec::new(),
        };
        assert!(body.is_empty());

        let body = SectionBody::KeyValue(vec![KeyValueEntry {
            key: "lua54".to_string(),
            value: json!("yes"),
        }]);
        assert!(!body.is_empty());
        assert_eq!(body.kind(), SectionKind::KeyValue);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("abc")), "abc");
        assert_eq!(display_value(&json!(3)), "3");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!(["a", 1])), "a,1");
        assert_eq!(display_value(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
