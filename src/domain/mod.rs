//! Domain types for the refresh orchestrator.
//!
//! - Report: per-step statuses and timestamps of a finished run

pub mod report;

pub use report::{CleanStatus, FetchStatus, Promotion, RunReport};
