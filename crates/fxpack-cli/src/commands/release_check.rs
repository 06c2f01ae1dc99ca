use anyhow::{anyhow, Result};
use clap::Parser;
use colored::Colorize;
use fxpack_config::build_config::DEFAULT_RELEASE_DELAY_SECS;
use fxpack_config::BuildConfig;
use fxpack_manifest::MetadataDocument;
use std::future::Future;
use std::io;
use std::time::Duration;

use crate::errors::MonitorError;
use crate::logger;
use crate::release::{MonitorHandle, ReleaseMonitor, UpdateCheck};
use crate::GlobalOpts;

#[derive(Parser, Debug, Clone, Default)]
pub struct ReleaseCheckCommand {
    /// Repository to query, as owner/name (default: [release].repository)
    #[arg(long)]
    pub repository: Option<String>,

    /// Version to compare against (default: the metadata document's version)
    #[arg(long)]
    pub current: Option<String>,

    /// Seconds to wait before checking (default: [release].delay_secs)
    #[arg(long, value_name = "SECONDS")]
    pub delay_secs: Option<u64>,
}

struct ResolvedCheck {
    repository: String,
    current: String,
    delay: Duration,
}

/// Check for a newer release. Never fails the process: problems are reported
/// as warnings.
pub fn handle_release_check(cmd: ReleaseCheckCommand, opts: &GlobalOpts) -> Result<()> {
    let resolved = match resolve(cmd, opts) {
        Ok(resolved) => resolved,
        Err(e) => {
            logger::warn(&format!("Release check skipped: {}", e));
            return Ok(());
        }
    };

    match run(resolved) {
        Ok(Some(outcome)) => print_outcome(&outcome),
        Ok(None) => {}
        Err(e) => logger::warn(&format!("Release check failed: {}", e)),
    }
    Ok(())
}

fn resolve(cmd: ReleaseCheckCommand, opts: &GlobalOpts) -> Result<ResolvedCheck> {
    let needs_config = cmd.repository.is_none() || cmd.current.is_none() || cmd.delay_secs.is_none();
    let config = if needs_config {
        let path = opts.config_path();
        match BuildConfig::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                logger::debug(&format!("No build configuration available: {}", e));
                None
            }
        }
    } else {
        None
    };
    let release = config.as_ref().and_then(|c| c.release.as_ref());

    let repository = cmd
        .repository
        .or_else(|| release.map(|r| r.repository.clone()))
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| anyhow!("no repository given (use --repository or [release].repository)"))?;

    let current = match cmd.current {
        Some(current) => current,
        None => {
            let config = config
                .as_ref()
                .ok_or_else(|| anyhow!("no current version given and no configuration found"))?;
            let document = MetadataDocument::load(&config.metadata_path())?;
            document
                .version()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("metadata document has no 'version'"))?
        }
    };

    let delay_secs = cmd
        .delay_secs
        .or_else(|| release.map(|r| r.delay_secs))
        .unwrap_or(DEFAULT_RELEASE_DELAY_SECS);

    Ok(ResolvedCheck {
        repository,
        current,
        delay: Duration::from_secs(delay_secs),
    })
}

fn run(resolved: ResolvedCheck) -> Result<Option<UpdateCheck>, MonitorError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(MonitorError::Runtime)?;

    logger::debug(&format!(
        "Checking {} for releases newer than {} in {}s",
        resolved.repository,
        resolved.current,
        resolved.delay.as_secs()
    ));
    let monitor =
        ReleaseMonitor::new(&resolved.repository, resolved.current)?.with_delay(resolved.delay);

    Ok(runtime.block_on(async move {
        wait_or_interrupt(monitor.spawn(), tokio::signal::ctrl_c()).await
    }))
}

/// Wait for the check unless `interrupt` fires first. An interrupt source that
/// fails (no signal handler available) leaves the check running.
async fn wait_or_interrupt(
    mut handle: MonitorHandle,
    interrupt: impl Future<Output = io::Result<()>>,
) -> Option<UpdateCheck> {
    let finished = tokio::select! {
        outcome = handle.wait() => Some(outcome),
        Ok(()) = interrupt => None,
    };
    match finished {
        Some(outcome) => outcome,
        None => {
            handle.cancel();
            logger::info("Release check cancelled");
            None
        }
    }
}

fn print_outcome(outcome: &UpdateCheck) {
    match outcome {
        UpdateCheck::UpdateAvailable {
            current,
            latest,
            url,
        } => {
            println!(
                "{} {} -> {}",
                "Update available:".yellow().bold(),
                current,
                latest.to_string().green()
            );
            if !url.is_empty() {
                println!("  {}", url);
            }
        }
        UpdateCheck::UpToDate { current } => {
            println!("{} {} is the latest release", "✔".green(), current);
        }
        UpdateCheck::Skipped(reason) => {
            println!("Release check skipped: {:?}", reason);
        }
    }
}
