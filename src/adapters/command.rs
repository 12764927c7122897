//! Subprocess adapter.
//!
//! Runs a configured program (the Python scraper or cleaner in the default
//! layout) and waits for it to exit. Child output is forwarded to our
//! stderr so progress stays visible while stdout carries only the report.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{Adapter, StepInvocation, StepOutcome};
use crate::config::CommandSpec;

/// Adapter that spawns an external program
#[derive(Debug, Clone)]
pub struct CommandAdapter {
    name: String,
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CommandAdapter {
    /// Create an adapter for `program`, run from `working_dir`
    pub fn new(
        name: impl Into<String>,
        program: impl Into<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
        }
    }

    /// Build an adapter from a resolved command
    pub fn from_spec(name: impl Into<String>, spec: &CommandSpec) -> Self {
        Self::new(name, spec.program.clone(), spec.working_dir.clone())
            .with_args(spec.args.iter().cloned())
    }

    /// Fixed arguments passed before any per-invocation arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Full argument list for an invocation
    fn argv(&self, invocation: &StepInvocation) -> Vec<String> {
        self.args
            .iter()
            .chain(invocation.args())
            .cloned()
            .collect()
    }

    fn command(&self, invocation: &StepInvocation) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(self.argv(invocation))
            .current_dir(&self.working_dir)
            .envs(invocation.envs().iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(std::io::stderr())
            .stderr(std::io::stderr())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl Adapter for CommandAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, invocation: &StepInvocation) -> Result<StepOutcome> {
        debug!(
            step = %self.name,
            program = %self.program,
            args = ?self.argv(invocation),
            working_dir = %self.working_dir.display(),
            "Spawning step process"
        );

        let status = self
            .command(invocation)
            .status()
            .await
            .with_context(|| {
                format!(
                    "Failed to run {} step `{}` in {}",
                    self.name,
                    self.program,
                    self.working_dir.display()
                )
            })?;

        Ok(StepOutcome::from(status))
    }
}
