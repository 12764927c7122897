//! Filesystem access for the orchestrator.
//!
//! The orchestrator only ever asks two questions of the filesystem: does a
//! path exist, and can a file be moved. Keeping those behind a trait lets
//! the control flow run against an in-memory workspace in tests.

use std::io;
use std::path::Path;

/// Minimal filesystem surface used by the orchestrator
pub trait Workspace: Send + Sync {
    /// Whether a file exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Move `from` to `to`, replacing anything already at `to`
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl Workspace for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }
}
