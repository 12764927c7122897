//! Adapter interfaces for the external dataset tools.
//!
//! The scraper and the cleaner are separate programs. Adapters give the
//! orchestrator a uniform way to run them and observe how they exited,
//! without caring whether a real process is involved.

pub mod command;

use std::fmt;
use std::process::ExitStatus;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use command::CommandAdapter;

/// Per-call arguments and environment layered over an adapter's own setup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepInvocation {
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl StepInvocation {
    /// An invocation that adds nothing to the configured command
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set an environment variable for the child only
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn envs(&self) -> &[(String, String)] {
        &self.envs
    }
}

/// How a step process finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Exit code, `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl StepOutcome {
    pub fn from_code(code: Option<i32>) -> Self {
        Self { code }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for StepOutcome {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "termination by signal"),
        }
    }
}

/// Trait for external dataset steps
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Run the step to completion.
    ///
    /// `Err` means the step could not be started or awaited. A step that ran
    /// and exited, with any code, is `Ok`.
    async fn invoke(&self, invocation: &StepInvocation) -> Result<StepOutcome>;
}
