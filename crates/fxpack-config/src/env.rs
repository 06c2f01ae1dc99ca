//! Version override taken from the environment (typically a CI tag such as `v1.4.0`)

use tracing::debug;

/// Read the version override from `key`, stripping `prefix` once.
///
/// Returns `None` when no key is configured, the variable is unset, or the
/// value is empty after stripping.
pub fn version_override(key: Option<&str>, prefix: Option<&str>) -> Option<String> {
    let key = key.map(str::trim).filter(|k| !k.is_empty())?;
    let raw = std::env::var(key).ok()?;
    let version = normalize_version(&raw, prefix);
    debug!("Version override from {}: {:?}", key, version);
    version
}

/// Strip the configured prefix and surrounding whitespace from a version string
pub fn normalize_version(raw: &str, prefix: Option<&str>) -> Option<String> {
    let trimmed = raw.trim();
    let stripped = prefix
        .filter(|p| !p.is_empty())
        .and_then(|p| trimmed.strip_prefix(p))
        .unwrap_or(trimmed);

    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}
