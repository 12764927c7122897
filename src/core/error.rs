//! Errors that stop a refresh.
//!
//! Only the clean step and the final move can fail a run. Fetch problems
//! never surface here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::adapters::StepOutcome;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Clean step failed with {outcome}")]
    CleanFailed { outcome: StepOutcome },

    #[error("Clean step could not be started: {reason}")]
    CleanNotStarted { reason: String },

    #[error("Failed to move {} to {}", .from.display(), .to.display())]
    Promote {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RefreshError {
    /// Exit code of the failed cleaner, when there is one
    pub fn clean_exit_code(&self) -> Option<i32> {
        match self {
            Self::CleanFailed { outcome } => outcome.code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = RefreshError::CleanFailed {
            outcome: StepOutcome::from_code(Some(3)),
        };
        assert_eq!(err.to_string(), "Clean step failed with exit code 3");
        assert_eq!(err.clean_exit_code(), Some(3));

        let err = RefreshError::Promote {
            from: PathBuf::from("data/companies.json.cleaned"),
            to: PathBuf::from("data/companies_cleaned.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to move data/companies.json.cleaned to data/companies_cleaned.json"
        );
        assert_eq!(err.clean_exit_code(), None);
    }
}
