//! Package metadata document - loading, lookups and the version patch
//!
//! The metadata document is the resource's `package.json`-style record. It is
//! read once, optionally has its `version` field replaced, is written back, and
//! is then handed read-only to the manifest generator.

use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::ManifestError;

/// Separator for nested metadata lookups (`repository.url`)
pub const PATH_SEPARATOR: char = '.';

const VERSION_KEY: &str = "version";

/// Parsed metadata document with a JSON object at its root
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataDocument {
    root: Map<String, Value>,
}

impl MetadataDocument {
    pub fn new(root: Map<String, Value>) -> Self {
        MetadataDocument { root }
    }

    /// Build a document from any JSON value; the root must be an object
    pub fn from_value(value: Value) -> Result<Self, ManifestError> {
        match value {
            Value::Object(root) => Ok(MetadataDocument { root }),
            other => Err(ManifestError::InvalidDocument(format!(
                "expected an object at the root, found {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(content).map_err(ManifestError::Parse)?;
        Self::from_value(value)
    }

    /// Load the document from disk
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        debug!("Reading metadata document: {:?}", path);
        let content = std::fs::read_to_string(path)
            .map_err(|e| ManifestError::io("read metadata", path, e))?;
        Self::parse(&content)
    }

    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Resolve a key against the document.
    ///
    /// Keys containing [`PATH_SEPARATOR`] are walked segment by segment and
    /// short-circuit to `None` at the first missing segment. Numeric segments
    /// index into arrays. Any other key is a direct top-level lookup.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        if !key.contains(PATH_SEPARATOR) {
            return self.root.get(key);
        }

        let mut segments = key.split(PATH_SEPARATOR);
        let first = segments.next()?;
        segments.try_fold(self.root.get(first)?, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    pub fn version(&self) -> Option<&str> {
        self.root.get(VERSION_KEY).and_then(Value::as_str)
    }

    pub fn set_version(&mut self, version: &str) {
        self.root
            .insert(VERSION_KEY.to_string(), Value::String(version.to_string()));
    }

    /// Serialize with the given indentation width and a trailing newline
    pub fn to_pretty_string(&self, indent: usize) -> Result<String, ManifestError> {
        let indent_bytes = vec![b' '; indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
        let mut buffer = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.root
            .serialize(&mut serializer)
            .map_err(ManifestError::Serialize)?;
        buffer.push(b'\n');
        String::from_utf8(buffer)
            .map_err(|e| ManifestError::InvalidDocument(format!("non UTF-8 output: {}", e)))
    }

    /// Save the document with an atomic write
    pub fn save_to_path(&self, path: &Path, indent: usize) -> Result<(), ManifestError> {
        let content = self.to_pretty_string(indent)?;

        let temp_path = path.with_extension("json.tmp");
        let result = write_temp(&temp_path, &content).and_then(|()| {
            std::fs::rename(&temp_path, path)
                .map_err(|e| ManifestError::io("replace metadata", path, e))
        });

        if result.is_err() && temp_path.exists() {
            let _ = std::fs::remove_file(&temp_path);
        }
        result
    }
}

fn write_temp(temp_path: &Path, content: &str) -> Result<(), ManifestError> {
    let mut file = std::fs::File::create(temp_path)
        .map_err(|e| ManifestError::io("create temporary metadata file", temp_path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| ManifestError::io("write metadata", temp_path, e))?;
    file.flush()
        .map_err(|e| ManifestError::io("write metadata", temp_path, e))
}

/// JavaScript-style truthiness of a metadata value.
///
/// `null`, `false`, zero and the empty string are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read, patch and persist the metadata document
pub struct MetadataStore;

impl MetadataStore {
    /// Load the document, apply the version override if any, write it back and
    /// return it for manifest generation.
    pub fn sync(
        path: &Path,
        version_override: Option<&str>,
        indent: usize,
    ) -> Result<MetadataDocument, ManifestError> {
        let mut document = MetadataDocument::load(path)?;

        if let Some(version) = version_override {
            info!(
                "Setting metadata version: {} -> {}",
                document.version().unwrap_or("<none>"),
                version
            );
            document.set_version(version);
        }

        document.save_to_path(path, indent)?;
        debug!("Metadata document written to {:?}", path);
        Ok(document)
    }
}
