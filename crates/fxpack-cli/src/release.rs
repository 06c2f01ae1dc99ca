//! Release monitor
//!
//! Compares the running version against the latest published release and
//! reports when an upgrade exists. The check runs in the background after a
//! short delay and never fails the caller: network and parse problems are
//! logged and swallowed.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::errors::MonitorError;
use crate::logger;

pub const RELEASE_API_BASE: &str = "https://api.github.com/repos";

static SEMVER_TRIPLE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^0-9]?([0-9]+)\.([0-9]+)\.([0-9]+)$").ok());

/// `major.minor.patch`, optionally behind a single non-digit prefix such as `v`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SemVerTriple {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemVerTriple {
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = SEMVER_TRIPLE.as_ref()?.captures(raw.trim())?;
        let part = |i: usize| captures.get(i)?.as_str().parse::<u64>().ok();
        Some(SemVerTriple {
            major: part(1)?,
            minor: part(2)?,
            patch: part(3)?,
        })
    }
}

impl fmt::Display for SemVerTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// True when `latest` is strictly newer than `current`. The first differing
/// component decides.
pub fn upgrade_available(current: SemVerTriple, latest: SemVerTriple) -> bool {
    current.cmp(&latest) == Ordering::Less
}

/// Latest release as published by the release feed
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseDescriptor {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(rename = "html_url", default)]
    pub url: String,
    #[serde(rename = "prerelease", default)]
    pub is_prerelease: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Prerelease,
    InvalidCurrentVersion,
    InvalidLatestVersion,
    Unavailable(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
    UpToDate {
        current: SemVerTriple,
    },
    UpdateAvailable {
        current: SemVerTriple,
        latest: SemVerTriple,
        url: String,
    },
    Skipped(SkipReason),
}

/// Decide what a fetched release means for the running version
pub fn evaluate(current: &str, release: &ReleaseDescriptor) -> UpdateCheck {
    if release.is_prerelease {
        return UpdateCheck::Skipped(SkipReason::Prerelease);
    }
    let Some(current) = SemVerTriple::parse(current) else {
        return UpdateCheck::Skipped(SkipReason::InvalidCurrentVersion);
    };
    let Some(latest) = SemVerTriple::parse(&release.tag) else {
        return UpdateCheck::Skipped(SkipReason::InvalidLatestVersion);
    };

    if upgrade_available(current, latest) {
        UpdateCheck::UpdateAvailable {
            current,
            latest,
            url: release.url.clone(),
        }
    } else {
        UpdateCheck::UpToDate { current }
    }
}

pub struct ReleaseMonitor {
    client: reqwest::Client,
    endpoint: String,
    current_version: String,
    delay: Duration,
}

impl ReleaseMonitor {
    /// Monitor for `owner/name` on the public release API
    pub fn new(repository: &str, current_version: impl Into<String>) -> Result<Self, MonitorError> {
        let client = reqwest::Client::builder().build()?;

        Ok(ReleaseMonitor {
            client,
            endpoint: format!("{}/{}/releases/latest", RELEASE_API_BASE, repository),
            current_version: current_version.into(),
            delay: Duration::from_secs(fxpack_config::build_config::DEFAULT_RELEASE_DELAY_SECS),
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Replace the HTTP client, e.g. to configure proxies or a request timeout
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The inner `Err` carries the status of a non-success answer
    async fn fetch_latest(&self) -> Result<Result<ReleaseDescriptor, u16>, MonitorError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, format!("fxpack/{}", env!("CARGO_PKG_VERSION")))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Release feed {} answered {}", self.endpoint, status);
            return Ok(Err(status.as_u16()));
        }

        Ok(Ok(response.json::<ReleaseDescriptor>().await?))
    }

    /// Fetch and evaluate the latest release immediately
    pub async fn check(&self) -> Result<UpdateCheck, MonitorError> {
        match self.fetch_latest().await? {
            Ok(release) => Ok(evaluate(&self.current_version, &release)),
            Err(status) => Ok(UpdateCheck::Skipped(SkipReason::Unavailable(status))),
        }
    }

    async fn run_check(&self) -> Option<UpdateCheck> {
        match self.check().await {
            Ok(outcome) => {
                report(&outcome);
                Some(outcome)
            }
            Err(e) => {
                logger::warn(&format!("Release check failed: {}", e));
                None
            }
        }
    }

    /// Run the check in the background once the delay has elapsed. Must be
    /// called from within a tokio runtime.
    pub fn spawn(self) -> MonitorHandle {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            tokio::select! {
                Ok(()) = &mut cancel_rx => {
                    tracing::debug!("Release check cancelled");
                    None
                }
                outcome = async {
                    tokio::time::sleep(self.delay).await;
                    self.run_check().await
                } => outcome,
            }
        });

        MonitorHandle {
            cancel: Some(cancel_tx),
            task: Some(task),
        }
    }
}

fn report(outcome: &UpdateCheck) {
    match outcome {
        UpdateCheck::UpdateAvailable {
            current,
            latest,
            url,
        } => logger::warn(&format!(
            "A new fxpack release is available: {} -> {} ({})",
            current, latest, url
        )),
        UpdateCheck::UpToDate { current } => {
            logger::info(&format!("fxpack {} is up to date", current));
        }
        UpdateCheck::Skipped(reason) => {
            logger::debug(&format!("Release check skipped: {:?}", reason));
        }
    }
}

/// Handle to a spawned release check. Dropping it leaves the check running.
pub struct MonitorHandle {
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Option<UpdateCheck>>>,
}

impl MonitorHandle {
    /// Stop the pending check. No effect once the check has finished.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// Wait for the check to finish; `None` if it was cancelled or failed
    pub async fn wait(&mut self) -> Option<UpdateCheck> {
        let task = self.task.take()?;
        task.await.ok().flatten()
    }
}
