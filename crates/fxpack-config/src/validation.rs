//! Build configuration validation
//!
//! Every check runs; violations are collected and reported together so the
//! whole defect list is visible in one run. Nothing is read or written until
//! validation has passed.

use chrono::format::{Item, StrftimeItems};
use chrono::{FixedOffset, Locale};
use fxpack_manifest::{validate_sections, Section};
use std::path::Path;
use tracing::debug;

use crate::build_config::{BuildConfig, TimestampStyle};
use crate::errors::{ConfigError, ValidationReport};

/// Time zone a locale-formatted timestamp is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOffset {
    Utc,
    Local,
    Fixed(FixedOffset),
}

impl TimeOffset {
    /// Parse `utc`, `local`, `Z` or a `+HH:MM` / `-HHMM` offset
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        match value.to_ascii_lowercase().as_str() {
            "" | "utc" | "z" | "gmt" => return Some(TimeOffset::Utc),
            "local" => return Some(TimeOffset::Local),
            _ => {}
        }

        let (sign, digits) = match value.as_bytes().first()? {
            b'+' => (1, &value[1..]),
            b'-' => (-1, &value[1..]),
            _ => return None,
        };
        let digits: String = digits.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let hours: i32 = digits[..2].parse().ok()?;
        let minutes: i32 = digits[2..].parse().ok()?;
        if minutes >= 60 {
            return None;
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).map(TimeOffset::Fixed)
    }
}

/// Validated timestamp rendering choice
#[derive(Debug, Clone)]
pub enum TimestampSpec {
    Iso,
    Locale { locale: Locale, offset: TimeOffset },
    Custom { pattern: String },
}

/// Outcome of a successful validation
#[derive(Debug, Clone)]
pub struct ValidatedBuild {
    pub sections: Vec<Section>,
    pub timestamp: TimestampSpec,
}

/// Validate a build configuration, reporting every violation at once
pub fn validate(config: &BuildConfig) -> Result<ValidatedBuild, ConfigError> {
    let mut violations = Vec::new();

    require_path(&config.metadata.path, "metadata.path", &mut violations);
    require_path(&config.timestamp.output, "timestamp.output", &mut violations);
    require_path(&config.manifest.output, "manifest.output", &mut violations);
    require_path(&config.bundle.output, "bundle.output", &mut violations);

    if config.bundle.entry_points.is_empty() {
        violations.push("bundle.entry_points must list at least one entry file".to_string());
    }
    for (index, entry) in config.bundle.entry_points.iter().enumerate() {
        if entry.trim().is_empty() {
            violations.push(format!("bundle.entry_points[{}] is blank", index));
        }
    }
    if config.bundle.program.trim().is_empty() {
        violations.push("bundle.program must name the bundler executable".to_string());
    }

    if let Some(prefix) = &config.metadata.version_prefix {
        if prefix.chars().count() > 1 {
            violations.push(format!(
                "metadata.version_prefix must be a single character, got '{}'",
                prefix
            ));
        }
    }

    let timestamp = validate_timestamp(config, &mut violations);

    if let Some(release) = &config.release {
        let parts: Vec<&str> = release.repository.split('/').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.trim().is_empty()) {
            violations.push(format!(
                "release.repository must be in 'owner/name' form, got '{}'",
                release.repository
            ));
        }
    }

    let (sections, section_violations) = validate_sections(&config.manifest.sections);
    violations.extend(section_violations);

    if !violations.is_empty() {
        return Err(ConfigError::Invalid(ValidationReport::new(violations)));
    }

    debug!("Build configuration valid: {} section(s)", sections.len());
    Ok(ValidatedBuild {
        sections,
        timestamp: timestamp.unwrap_or(TimestampSpec::Iso),
    })
}

fn require_path(path: &Path, field: &str, violations: &mut Vec<String>) {
    if path.as_os_str().is_empty() {
        violations.push(format!("{} is required", field));
    }
}

fn validate_timestamp(config: &BuildConfig, violations: &mut Vec<String>) -> Option<TimestampSpec> {
    let timestamp = &config.timestamp;
    match timestamp.style {
        TimestampStyle::Iso => Some(TimestampSpec::Iso),
        TimestampStyle::Locale => {
            let locale = match timestamp.locale.as_deref().map(str::trim) {
                None | Some("") => {
                    violations.push("timestamp.locale is required for the locale style".to_string());
                    None
                }
                Some(name) => {
                    let parsed = parse_locale(name);
                    if parsed.is_none() {
                        violations.push(format!("timestamp.locale '{}' is not a known locale", name));
                    }
                    parsed
                }
            };

            let zone = timestamp.time_zone.as_deref().unwrap_or("utc");
            let offset = TimeOffset::parse(zone);
            if offset.is_none() {
                violations.push(format!(
                    "timestamp.time_zone '{}' must be 'utc', 'local' or an offset like '+02:00'",
                    zone
                ));
            }

            Some(TimestampSpec::Locale {
                locale: locale?,
                offset: offset?,
            })
        }
        TimestampStyle::Custom => match timestamp.pattern.as_deref() {
            None | Some("") => {
                violations.push("timestamp.pattern is required for the custom style".to_string());
                None
            }
            Some(pattern) => {
                if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                    violations.push(format!(
                        "timestamp.pattern '{}' is not a valid strftime pattern",
                        pattern
                    ));
                    None
                } else {
                    Some(TimestampSpec::Custom {
                        pattern: pattern.to_string(),
                    })
                }
            }
        },
    }
}

/// Locale names are accepted with either `_` or `-` separators
fn parse_locale(name: &str) -> Option<Locale> {
    Locale::try_from(name.replace('-', "_").as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_config::BuildConfig;

    const VALID: &str = r#"
[metadata]
path = "package.json"

[timestamp]
output = ".buildstamp"

[manifest]
output = "fxmanifest.lua"

[[manifest.sections]]
id = "header"
type = "key_value"
data = [{ key = "fx_version", value = "cerulean" }]

[bundle]
entry_points = ["src/index.ts"]
output = "dist/index.js"
"#;

    fn violations_of(toml: &str) -> Vec<String> {
        let Ok(config) = BuildConfig::from_toml_str(toml) else {
            return vec!["<parse failure>".to_string()];
        };
        match validate(&config) {
            Ok(_) => Vec::new(),
            Err(ConfigError::Invalid(report)) => report.violations().to_vec(),
            Err(other) => vec![other.to_string()],
        }
    }

    #[test]
    fn test_valid_configuration() {
        let Ok(config) = BuildConfig::from_toml_str(VALID) else {
            return;
        };
        let validated = validate(&config);
        assert!(validated
            .is_ok_and(|v| v.sections.len() == 1 && matches!(v.timestamp, TimestampSpec::Iso)));
    }

    #[test]
    fn test_all_violations_are_reported() {
        let toml = r#"
[timestamp]
output = ".buildstamp"

[manifest]
output = "fxmanifest.lua"

[bundle]
output = "dist/index.js"
"#;
        let violations = violations_of(toml);
        assert_eq!(
            violations,
            vec![
                "metadata.path is required",
                "bundle.entry_points must list at least one entry file",
            ]
        );
    }

    #[test]
    fn test_empty_configuration_lists_every_missing_field() {
        let violations = violations_of("");
        assert_eq!(violations.len(), 5);
        assert!(violations.contains(&"timestamp.output is required".to_string()));
        assert!(violations.contains(&"manifest.output is required".to_string()));
        assert!(violations.contains(&"bundle.output is required".to_string()));
    }

    #[test]
    fn test_section_violations_are_merged() {
        let toml = format!(
            "{}\n{}",
            VALID,
            r#"
[[manifest.sections]]
id = "files"
type = "list"
data = []
"#
        );
        let violations = violations_of(&toml);
        assert_eq!(violations.len(), 3);
        assert!(violations[0].contains("'data' is empty"));
    }

    #[test]
    fn test_locale_style_requires_locale() {
        let toml = VALID.replace(
            "output = \".buildstamp\"",
            "output = \".buildstamp\"\nstyle = \"locale\"",
        );
        assert_eq!(
            violations_of(&toml),
            vec!["timestamp.locale is required for the locale style"]
        );
    }

    #[test]
    fn test_locale_style_with_offset() {
        let toml = VALID.replace(
            "output = \".buildstamp\"",
            "output = \".buildstamp\"\nstyle = \"locale\"\nlocale = \"de-DE\"\ntime_zone = \"+02:00\"",
        );
        let Ok(config) = BuildConfig::from_toml_str(&toml) else {
            return;
        };
        let validated = validate(&config);
        assert!(validated.is_ok_and(|v| matches!(
            v.timestamp,
            TimestampSpec::Locale { offset: TimeOffset::Fixed(o), .. } if o.local_minus_utc() == 7200
        )));
    }

    #[test]
    fn test_custom_style_rejects_bad_pattern() {
        let toml = VALID.replace(
            "output = \".buildstamp\"",
            "output = \".buildstamp\"\nstyle = \"custom\"\npattern = \"%Q\"",
        );
        let violations = violations_of(&toml);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("not a valid strftime pattern"));
    }

    #[test]
    fn test_version_prefix_must_be_single_character() {
        let toml = VALID.replace(
            "path = \"package.json\"",
            "path = \"package.json\"\nversion_prefix = \"ver\"",
        );
        assert_eq!(
            violations_of(&toml),
            vec!["metadata.version_prefix must be a single character, got 'ver'"]
        );
    }

    #[test]
    fn test_release_repository_shape() {
        let toml = format!("{}\n[release]\nrepository = \"just-a-name\"\n", VALID);
        let violations = violations_of(&toml);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].starts_with("release.repository"));
    }

    #[test]
    fn test_time_offset_parse() {
        assert_eq!(TimeOffset::parse("UTC"), Some(TimeOffset::Utc));
        assert_eq!(TimeOffset::parse("local"), Some(TimeOffset::Local));
        assert!(matches!(
            TimeOffset::parse("-0530"),
            Some(TimeOffset::Fixed(o)) if o.local_minus_utc() == -19800
        ));
        assert_eq!(TimeOffset::parse("Europe/Paris"), None);
        assert_eq!(TimeOffset::parse("+25:00"), None);
    }
}
