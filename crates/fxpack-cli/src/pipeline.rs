//! Build orchestration
//!
//! Runs the stages in a fixed order: metadata, timestamp, manifest, bundle.
//! A stage only starts after the previous one finished, and the first failure
//! stops the build. A pipeline can only be built from a [`ValidatedBuild`], so
//! configuration errors never reach a stage.

use colored::Colorize;
use fxpack_config::{env, BuildConfig, ValidatedBuild};
use fxpack_manifest::{write_manifest, MetadataStore};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::bundle::{BundleRequest, Bundler, CommandBundler};
use crate::errors::BuildError;
use crate::logger;
use crate::timestamp::{write_timestamp, Clock, SystemClock, TimestampFormat};

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Metadata,
    Timestamp,
    Manifest,
    Bundle,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Metadata, Stage::Timestamp, Stage::Manifest, Stage::Bundle];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Metadata => "metadata",
            Stage::Timestamp => "timestamp",
            Stage::Manifest => "manifest",
            Stage::Bundle => "bundle",
        }
    }
}

/// Artifacts produced by a successful build
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub metadata_path: PathBuf,
    pub version: Option<String>,
    pub timestamp_path: PathBuf,
    pub timestamp: String,
    pub manifest_path: PathBuf,
    pub bundle_path: Option<PathBuf>,
}

pub struct BuildPipeline<'a> {
    config: &'a BuildConfig,
    validated: &'a ValidatedBuild,
    bundler: Box<dyn Bundler + 'a>,
    clock: Box<dyn Clock + 'a>,
    timestamp_format: TimestampFormat,
    version_override: Option<String>,
    skip_bundle: bool,
}

impl<'a> BuildPipeline<'a> {
    /// Pipeline with the production collaborators: the configured bundler
    /// executable, the system clock and the environment version override.
    pub fn new(config: &'a BuildConfig, validated: &'a ValidatedBuild) -> Self {
        let version_override = env::version_override(
            config.metadata.version_env.as_deref(),
            config.metadata.version_prefix.as_deref(),
        );

        BuildPipeline {
            config,
            validated,
            bundler: Box::new(CommandBundler::new(config.bundle.program.clone())),
            clock: Box::new(SystemClock),
            timestamp_format: TimestampFormat::from(&validated.timestamp),
            version_override,
            skip_bundle: false,
        }
    }

    pub fn with_bundler(mut self, bundler: impl Bundler + 'a) -> Self {
        self.bundler = Box::new(bundler);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'a) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn with_version_override(mut self, version: Option<String>) -> Self {
        self.version_override = version;
        self
    }

    pub fn skip_bundle(mut self, skip: bool) -> Self {
        self.skip_bundle = skip;
        self
    }

    /// Run every stage in order, stopping at the first failure
    pub fn run(&self) -> Result<BuildReport, BuildError> {
        let pipeline_start = Instant::now();
        let mut report = BuildReport::default();

        let metadata_path = self.config.metadata_path();
        let document = self.stage(Stage::Metadata, || {
            MetadataStore::sync(
                &metadata_path,
                self.version_override.as_deref(),
                self.config.metadata.indent,
            )
            .map_err(BuildError::from)
        })?;
        report.version = document.version().map(str::to_string);
        report.metadata_path = metadata_path;

        let timestamp_path = self.config.timestamp_path();
        report.timestamp = self.stage(Stage::Timestamp, || {
            write_timestamp(&self.timestamp_format, self.clock.now(), &timestamp_path)
        })?;
        report.timestamp_path = timestamp_path;

        let manifest_path = self.config.manifest_path();
        self.stage(Stage::Manifest, || {
            write_manifest(&self.validated.sections, &document, &manifest_path)
                .map_err(BuildError::from)
        })?;
        report.manifest_path = manifest_path;

        if self.skip_bundle {
            logger::info("Skipping bundle stage");
        } else {
            let request = BundleRequest {
                entry_points: self.config.bundle_entry_paths(),
                output: self.config.bundle_output_path(),
                options: &self.config.bundle.options,
            };
            self.stage(Stage::Bundle, || self.bundler.bundle(&request))?;
            report.bundle_path = Some(request.output);
        }

        eprintln!(
            "{}",
            format!("Finished in: {}", format_duration(pipeline_start.elapsed()))
                .green()
                .bold()
        );

        Ok(report)
    }

    fn stage<T>(
        &self,
        stage: Stage,
        run: impl FnOnce() -> Result<T, BuildError>,
    ) -> Result<T, BuildError> {
        let position = Stage::ALL.iter().position(|s| *s == stage).unwrap_or(0) + 1;
        let label = format!("{} [{}/{}]", stage.name(), position, Stage::ALL.len());

        logger::set_current_stage(Some(stage.name()));
        logger::spinner_start(&format!("  {}", label));
        let started = Instant::now();

        let result = run();

        let elapsed = format_duration(started.elapsed());
        match &result {
            Ok(_) => logger::spinner_success(&format!("{} ({})", label, elapsed)),
            Err(_) => logger::spinner_error(&format!("{} ({})", label, elapsed)),
        }
        logger::set_current_stage(None);

        result
    }
}

pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}
