use crate::errors::ConfigError;
use fxpack_manifest::SectionSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "fxpack.toml";

/// Environment variable overriding the configuration file location
pub const CONFIG_ENV_VAR: &str = "FXPACK_CONFIG";

/// Default bundler executable
pub const DEFAULT_BUNDLER: &str = "esbuild";

/// Delay before the release check fires, in seconds
pub const DEFAULT_RELEASE_DELAY_SECS: u64 = 5;

fn default_indent() -> usize {
    2
}

fn default_bundler() -> String {
    DEFAULT_BUNDLER.to_string()
}

fn default_release_delay() -> u64 {
    DEFAULT_RELEASE_DELAY_SECS
}

/// Build configuration loaded from `fxpack.toml`
///
/// Fields the validator reports on all default to empty values so that a
/// missing entry surfaces as a validation violation rather than a parse error.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct BuildConfig {
    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub timestamp: TimestampConfig,

    #[serde(default)]
    pub manifest: ManifestConfig,

    #[serde(default)]
    pub bundle: BundleConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<ReleaseConfig>,

    /// Directory relative paths are resolved against (the config file's directory)
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Package metadata document settings
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MetadataConfig {
    #[serde(default)]
    pub path: PathBuf,

    /// Environment variable that may carry a replacement version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_env: Option<String>,

    /// Prefix stripped from the environment version (e.g. `v` in `v1.2.3`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_prefix: Option<String>,

    /// Indentation width used when the document is written back
    #[serde(default = "default_indent")]
    pub indent: usize,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        MetadataConfig {
            path: PathBuf::new(),
            version_env: None,
            version_prefix: None,
            indent: default_indent(),
        }
    }
}

/// How the build timestamp is rendered
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimestampStyle {
    #[default]
    Iso,
    Locale,
    Custom,
}

/// Timestamp marker settings
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TimestampConfig {
    #[serde(default)]
    pub output: PathBuf,

    #[serde(default)]
    pub style: TimestampStyle,

    /// Locale name for the `locale` style (`en_US`, `de-DE`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// `utc`, `local` or a fixed offset such as `+02:00`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    /// strftime pattern for the `custom` style
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Generated manifest settings
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ManifestConfig {
    #[serde(default)]
    pub output: PathBuf,

    /// Sections in output order
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

/// External bundler settings
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BundleConfig {
    #[serde(default)]
    pub entry_points: Vec<String>,

    #[serde(default)]
    pub output: PathBuf,

    #[serde(default = "default_bundler")]
    pub program: String,

    /// Passed through to the bundler untouched
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        BundleConfig {
            entry_points: Vec::new(),
            output: PathBuf::new(),
            program: default_bundler(),
            options: Map::new(),
        }
    }
}

/// Remote release feed settings
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReleaseConfig {
    /// `owner/name` of the repository whose releases are watched
    #[serde(default)]
    pub repository: String,

    #[serde(default = "default_release_delay")]
    pub delay_secs: u64,
}

impl BuildConfig {
    /// Resolve which configuration file to use: explicit path, then the
    /// `FXPACK_CONFIG` environment variable, then `./fxpack.toml`.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
            _ => PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }

    /// Load the build configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading build configuration: {:?}", path);
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            operation: "read build configuration",
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BuildConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve a configured path against the configuration file's directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || self.base_dir.as_os_str().is_empty() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.resolve(&self.metadata.path)
    }

    pub fn timestamp_path(&self) -> PathBuf {
        self.resolve(&self.timestamp.output)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.manifest.output)
    }

    pub fn bundle_output_path(&self) -> PathBuf {
        self.resolve(&self.bundle.output)
    }

    pub fn bundle_entry_paths(&self) -> Vec<PathBuf> {
        self.bundle
            .entry_points
            .iter()
            .map(|entry| self.resolve(Path::new(entry)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[metadata]
path = "package.json"
version_env = "RELEASE_VERSION"
version_prefix = "v"

[timestamp]
output = "dist/.buildstamp"
style = "locale"
locale = "en_US"
time_zone = "utc"

[manifest]
output = "fxmanifest.lua"

[[manifest.sections]]
id = "header"
type = "key_value"
data = [{ key = "fx_version", value = "cerulean" }]

[[manifest.sections]]
id = "files"
type = "list"
enabled = false
singular_key = "file"
plural_key = "files"
data = ["client.lua"]

[bundle]
entry_points = ["src/server.ts"]
output = "dist/server.js"

[bundle.options]
format = "cjs"
keep_names = true
"#;

    #[test]
    fn test_parse_sample() {
        let Ok(config) = BuildConfig::from_toml_str(SAMPLE) else {
            panic!("sample configuration should parse");
        };
        assert_eq!(config.metadata.path, PathBuf::from("package.json"));
        assert_eq!(config.metadata.indent, 2);
        assert_eq!(config.timestamp.style, TimestampStyle::Locale);
        assert_eq!(config.manifest.sections.len(), 2);
        assert!(!config.manifest.sections[1].enabled);
        assert_eq!(config.bundle.program, "esbuild");
        assert_eq!(config.bundle.options.get("keep_names"), Some(&Value::Bool(true)));
        assert!(config.release.is_none());
    }

    #[test]
    fn test_missing_tables_default_to_empty() {
        let config = BuildConfig::from_toml_str("");
        assert!(config.is_ok_and(|c| c.metadata.path.as_os_str().is_empty()
            && c.bundle.entry_points.is_empty()
            && c.timestamp.style == TimestampStyle::Iso));
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        assert!(matches!(
            BuildConfig::from_toml_str("[metadata\npath ="),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let config_path = dir.path().join("fxpack.toml");
        if fs::write(&config_path, SAMPLE).is_err() {
            return;
        }

        let Ok(config) = BuildConfig::load(&config_path) else {
            panic!("configuration should load");
        };
        assert_eq!(config.metadata_path(), dir.path().join("package.json"));
        assert_eq!(
            config.bundle_entry_paths(),
            vec![dir.path().join("src/server.ts")]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let result = BuildConfig::load(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_resolve_path_prefers_explicit() {
        let explicit = PathBuf::from("custom.toml");
        assert_eq!(BuildConfig::resolve_path(Some(&explicit)), explicit);
    }
}
