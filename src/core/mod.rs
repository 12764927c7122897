//! Core orchestration logic.
//!
//! This module contains:
//! - Orchestrator: fetch, clean, move
//! - Workspace: filesystem probes and the final rename
//! - RefreshError: failures that stop a run

pub mod error;
pub mod orchestrator;
pub mod workspace;

// Re-export commonly used types
pub use error::RefreshError;
pub use orchestrator::{DatasetLayout, FetchMode, Orchestrator};
pub use workspace::{LocalFs, Workspace};
