//! listings-refresh - Refresh the newsletter company listings dataset
//!
//! Drives the two external dataset tools in order:
//!
//! 1. the scraper, which rewrites `data/companies.json` (failures tolerated)
//! 2. the cleaner, only if its script is present (failures are fatal)
//!
//! and then moves `data/companies.json.cleaned` to
//! `data/companies_cleaned.json` when the cleaner produced it.
//!
//! # Modules
//!
//! - `adapters`: Running the external scraper and cleaner
//! - `core`: Orchestrator, filesystem probes, errors
//! - `domain`: Run report types
//! - `config`: Layered configuration
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Refresh with the latest edition
//! ANTHROPIC_API_KEY=... listings-refresh
//!
//! # Rescrape everything and print a JSON report
//! listings-refresh --full --json
//!
//! # Show resolved paths and commands
//! listings-refresh config
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{Adapter, CommandAdapter, StepInvocation, StepOutcome};
pub use config::{ApiKey, ResolvedConfig};
pub use crate::core::{DatasetLayout, FetchMode, LocalFs, Orchestrator, RefreshError, Workspace};
pub use domain::{CleanStatus, FetchStatus, Promotion, RunReport};
