//! Refresh orchestrator.
//!
//! Runs the scraper, then the cleaner if one is installed, then moves the
//! cleaned artifact into place. Steps run strictly one after another.
//!
//! A failed fetch is tolerated: the previous dataset is left in place and
//! the run carries on. Repeated upstream outages therefore only show up as
//! `warn` lines and in the report. A failed clean stops the run before
//! anything is moved.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::adapters::{Adapter, CommandAdapter, StepInvocation};
use crate::config::{ApiKey, ResolvedConfig, API_KEY_ENV};
use crate::domain::{CleanStatus, FetchStatus, Promotion, RunReport};

use super::error::RefreshError;
use super::workspace::{LocalFs, Workspace};

/// Which scrape the fetch step performs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Latest edition only
    #[default]
    Update,
    /// Every edition in the archive
    Full,
}

impl FetchMode {
    /// Scraper flag selecting this mode
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Update => "--update",
            Self::Full => "--full",
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Absolute locations of the files a refresh touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    /// Dataset the scraper overwrites
    pub dataset: PathBuf,
    /// Cleaner script; cleaning only runs when it exists
    pub cleaner_script: PathBuf,
    /// Output written by the cleaner
    pub cleaned_artifact: PathBuf,
    /// Destination of the cleaned artifact
    pub cleaned_output: PathBuf,
}

/// Dataset refresh orchestrator
pub struct Orchestrator<W: Workspace = LocalFs> {
    layout: DatasetLayout,
    api_key: ApiKey,
    mode: FetchMode,
    fetcher: Box<dyn Adapter>,
    cleaner: Box<dyn Adapter>,
    workspace: W,
}

impl Orchestrator<LocalFs> {
    /// Orchestrator running the configured scraper and cleaner on the local filesystem
    pub fn from_config(config: &ResolvedConfig, api_key: ApiKey) -> Self {
        Self::new(
            config.layout.clone(),
            api_key,
            Box::new(CommandAdapter::from_spec("fetch", &config.fetch)),
            Box::new(CommandAdapter::from_spec("clean", &config.clean)),
            LocalFs,
        )
    }
}

impl<W: Workspace> Orchestrator<W> {
    pub fn new(
        layout: DatasetLayout,
        api_key: ApiKey,
        fetcher: Box<dyn Adapter>,
        cleaner: Box<dyn Adapter>,
        workspace: W,
    ) -> Self {
        Self {
            layout,
            api_key,
            mode: FetchMode::default(),
            fetcher,
            cleaner,
            workspace,
        }
    }

    /// Select incremental or full scraping
    pub fn with_fetch_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Refresh the dataset
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub async fn run(&self) -> Result<RunReport, RefreshError> {
        let started_at = Utc::now();
        info!(dataset = %self.layout.dataset.display(), "Starting dataset refresh");

        // Only reported. The run continues whatever the scraper did.
        let fetch = self.fetch().await;

        let Some(script) = self.cleaner_script() else {
            info!(
                script = %self.layout.cleaner_script.display(),
                "No cleaner script found, skipping cleaning"
            );
            return Ok(self.complete(started_at, fetch, CleanStatus::Skipped, None));
        };

        self.clean(script).await?;
        let promotion = self.promote()?;

        Ok(self.complete(started_at, fetch, CleanStatus::Succeeded, Some(promotion)))
    }

    /// Cleaner script path, if the script is installed
    pub fn cleaner_script(&self) -> Option<&Path> {
        let path = self.layout.cleaner_script.as_path();
        self.workspace.exists(path).then_some(path)
    }

    /// Cleaned artifact path, if the cleaner produced one
    pub fn cleaned_artifact(&self) -> Option<&Path> {
        let path = self.layout.cleaned_artifact.as_path();
        self.workspace.exists(path).then_some(path)
    }

    async fn fetch(&self) -> FetchStatus {
        let invocation = StepInvocation::new()
            .arg(self.mode.flag())
            .env(API_KEY_ENV, self.api_key.expose());

        info!(step = self.fetcher.name(), "Fetching latest listings");

        match self.fetcher.invoke(&invocation).await {
            Ok(outcome) if outcome.success() => {
                info!("Fetch step completed");
                FetchStatus::Succeeded
            }
            Ok(outcome) => {
                warn!(%outcome, "Fetch step failed, continuing with existing dataset");
                FetchStatus::Failed { code: outcome.code }
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                warn!(error = %reason, "Fetch step could not run, continuing with existing dataset");
                FetchStatus::NotStarted { reason }
            }
        }
    }

    async fn clean(&self, script: &Path) -> Result<(), RefreshError> {
        info!(step = self.cleaner.name(), script = %script.display(), "Cleaning dataset");

        let outcome = self
            .cleaner
            .invoke(&StepInvocation::new())
            .await
            .map_err(|e| {
                let reason = format!("{:#}", e);
                error!(error = %reason, "Clean step could not run");
                RefreshError::CleanNotStarted { reason }
            })?;

        if !outcome.success() {
            error!(%outcome, "Clean step failed");
            return Err(RefreshError::CleanFailed { outcome });
        }

        info!("Clean step completed");
        Ok(())
    }

    fn promote(&self) -> Result<Promotion, RefreshError> {
        let Some(artifact) = self.cleaned_artifact() else {
            info!(
                artifact = %self.layout.cleaned_artifact.display(),
                "Cleaner produced no output, nothing to move"
            );
            return Ok(Promotion::NoArtifact);
        };

        let to = self.layout.cleaned_output.as_path();
        self.workspace
            .rename(artifact, to)
            .map_err(|source| RefreshError::Promote {
                from: artifact.to_path_buf(),
                to: to.to_path_buf(),
                source,
            })?;

        info!(from = %artifact.display(), to = %to.display(), "Moved cleaned dataset into place");
        Ok(Promotion::Promoted {
            from: artifact.to_path_buf(),
            to: to.to_path_buf(),
        })
    }

    fn complete(
        &self,
        started_at: DateTime<Utc>,
        fetch: FetchStatus,
        clean: CleanStatus,
        promotion: Option<Promotion>,
    ) -> RunReport {
        let report = RunReport::new(started_at, fetch, clean, promotion);
        info!(
            duration_ms = report.duration_ms(),
            fetched = report.fetch.is_success(),
            "Refresh complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_mode_flags() {
        assert_eq!(FetchMode::default(), FetchMode::Update);
        assert_eq!(FetchMode::Update.flag(), "--update");
        assert_eq!(FetchMode::Full.flag(), "--full");
        assert_eq!(FetchMode::Full.to_string(), "full");
    }

    #[test]
    fn test_from_config_keeps_layout() {
        let config = crate::config::resolve(Path::new("/project"), None, None);
        let orchestrator = Orchestrator::from_config(&config, ApiKey::new("key"));

        assert_eq!(orchestrator.layout, config.layout);
        assert_eq!(orchestrator.mode, FetchMode::Update);
        assert_eq!(orchestrator.fetcher.name(), "fetch");
        assert_eq!(orchestrator.cleaner.name(), "clean");
    }
}
