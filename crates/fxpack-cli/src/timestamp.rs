//! Build timestamp marker
//!
//! The timestamp file holds a single line describing when the build ran, in
//! one of three interchangeable styles.

use chrono::{DateTime, Locale, SecondsFormat, Utc};
use fxpack_config::{TimeOffset, TimestampSpec};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::errors::BuildError;

/// Source of "now" for the pipeline
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

type FormatFn = dyn Fn(DateTime<Utc>) -> String + Send + Sync;

/// Caller-supplied timestamp formatter
#[derive(Clone)]
pub struct CustomFormatter(Arc<FormatFn>);

impl CustomFormatter {
    pub fn new(format: impl Fn(DateTime<Utc>) -> String + Send + Sync + 'static) -> Self {
        CustomFormatter(Arc::new(format))
    }

    /// Formatter rendering a strftime pattern in UTC. An unrenderable pattern
    /// falls back to RFC 3339.
    pub fn from_pattern(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        CustomFormatter::new(move |now| {
            let mut out = String::new();
            if write!(out, "{}", now.format(&pattern)).is_err() {
                return now.to_rfc3339();
            }
            out
        })
    }

    pub fn apply(&self, now: DateTime<Utc>) -> String {
        (self.0)(now)
    }
}

impl fmt::Debug for CustomFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomFormatter(..)")
    }
}

/// Timestamp rendering style
#[derive(Debug, Clone)]
pub enum TimestampFormat {
    /// `2026-10-18T09:30:00.000Z`
    Iso,
    /// Localized date and time in the given offset
    Locale { locale: Locale, offset: TimeOffset },
    Custom(CustomFormatter),
}

impl From<&TimestampSpec> for TimestampFormat {
    fn from(spec: &TimestampSpec) -> Self {
        match spec {
            TimestampSpec::Iso => TimestampFormat::Iso,
            TimestampSpec::Locale { locale, offset } => TimestampFormat::Locale {
                locale: *locale,
                offset: *offset,
            },
            TimestampSpec::Custom { pattern } => {
                TimestampFormat::Custom(CustomFormatter::from_pattern(pattern.clone()))
            }
        }
    }
}

impl TimestampFormat {
    pub fn format(&self, now: DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso => now.to_rfc3339_opts(SecondsFormat::Millis, true),
            TimestampFormat::Locale { locale, offset } => {
                const PATTERN: &str = "%x %X";
                match offset {
                    TimeOffset::Utc => now.format_localized(PATTERN, *locale).to_string(),
                    TimeOffset::Local => now
                        .with_timezone(&chrono::Local)
                        .format_localized(PATTERN, *locale)
                        .to_string(),
                    TimeOffset::Fixed(fixed) => now
                        .with_timezone(fixed)
                        .format_localized(PATTERN, *locale)
                        .to_string(),
                }
            }
            TimestampFormat::Custom(formatter) => formatter.apply(now),
        }
    }
}

/// Format `now` and write it to `path`, returning the written value
pub fn write_timestamp(
    format: &TimestampFormat,
    now: DateTime<Utc>,
    path: &Path,
) -> Result<String, BuildError> {
    let stamp = format.format(now);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| BuildError::io("create timestamp directory", parent, e))?;
    }
    fs::write(path, &stamp).map_err(|e| BuildError::io("write timestamp", path, e))?;

    tracing::debug!("Timestamp {} written to {:?}", stamp, path);
    Ok(stamp)
}
