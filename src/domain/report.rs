//! Outcome of a single refresh run.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to the fetch step.
///
/// Recorded for the report only. A failed fetch leaves the previous dataset
/// in place and the run carries on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchStatus {
    Succeeded,
    /// The scraper ran and exited non-zero (or was killed)
    Failed { code: Option<i32> },
    /// The scraper could not be started at all
    NotStarted { reason: String },
}

impl FetchStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// What happened to the clean step when the run did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanStatus {
    /// No cleaner script was present
    Skipped,
    Succeeded,
}

/// Result of looking for the cleaned artifact after a clean
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Promotion {
    Promoted { from: PathBuf, to: PathBuf },
    /// The cleaner exited cleanly but wrote nothing
    NoArtifact,
}

/// Summary of a completed refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub fetch: FetchStatus,
    pub clean: CleanStatus,
    /// Absent when cleaning was skipped
    pub promotion: Option<Promotion>,
}

impl RunReport {
    pub fn new(
        started_at: DateTime<Utc>,
        fetch: FetchStatus,
        clean: CleanStatus,
        promotion: Option<Promotion>,
    ) -> Self {
        Self {
            started_at,
            finished_at: Utc::now(),
            fetch,
            clean,
            promotion,
        }
    }

    /// Path the cleaned dataset was moved to, if a move happened
    pub fn promoted_to(&self) -> Option<&PathBuf> {
        match &self.promotion {
            Some(Promotion::Promoted { to, .. }) => Some(to),
            _ => None,
        }
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
