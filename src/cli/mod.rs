//! Command-line interface for listings-refresh.
//!
//! Running the binary with no subcommand refreshes the dataset. The
//! `config` subcommand prints what a refresh would use.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::config::{self, ApiKey, ResolvedConfig, API_KEY_ENV, ROOT_ENV};
use crate::core::{FetchMode, Orchestrator};
use crate::domain::{FetchStatus, Promotion, RunReport};

/// listings-refresh - Refresh the newsletter company listings dataset
#[derive(Parser, Debug)]
#[command(name = "listings-refresh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project root (defaults to the directory holding .listings-refresh/, else the current directory)
    #[arg(long, global = true, env = ROOT_ENV)]
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show resolved configuration (debug)
    Config,
}

/// Options for a refresh
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// API key handed to the scraper
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Rescrape every edition instead of only the latest
    #[arg(long)]
    pub full: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn fetch_mode(&self) -> FetchMode {
        if self.full {
            FetchMode::Full
        } else {
            FetchMode::Update
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = config::load_config(self.root.as_deref())?;

        match self.command {
            Some(Commands::Config) => show_config(&config, &self.run),
            None => run_refresh(&config, self.run).await,
        }
    }
}

async fn run_refresh(config: &ResolvedConfig, args: RunArgs) -> Result<()> {
    let api_key = ApiKey::from_option(args.api_key.clone())?;

    let orchestrator =
        Orchestrator::from_config(config, api_key).with_fetch_mode(args.fetch_mode());

    let report = orchestrator
        .run()
        .await
        .context("Dataset refresh failed")?;

    print_summary(&report);

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize run report")?;
        println!("{}", json);
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    match &report.fetch {
        FetchStatus::Succeeded => eprintln!("Fetch: ok"),
        FetchStatus::Failed { code } => match code {
            Some(code) => eprintln!("Fetch: failed (exit code {}), kept existing dataset", code),
            None => eprintln!("Fetch: failed (terminated), kept existing dataset"),
        },
        FetchStatus::NotStarted { reason } => {
            eprintln!("Fetch: could not run ({}), kept existing dataset", reason)
        }
    }

    match &report.promotion {
        None => eprintln!("Clean: skipped (no cleaner script)"),
        Some(Promotion::NoArtifact) => eprintln!("Clean: ok, no cleaned output produced"),
        Some(Promotion::Promoted { to, .. }) => {
            eprintln!("Clean: ok, cleaned dataset at {}", to.display())
        }
    }

    eprintln!("\n[Refresh completed in {}ms]", report.duration_ms());
}

fn show_config(config: &ResolvedConfig, args: &RunArgs) -> Result<()> {
    let api_key = match ApiKey::from_option(args.api_key.clone()) {
        Ok(key) => key.to_string(),
        Err(_) => "(not set)".to_string(),
    };

    println!("Root: {}", config.root.display());
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    println!("API key: {}", api_key);
    println!();
    println!("Dataset: {}", config.layout.dataset.display());
    println!("Cleaner script: {}", config.layout.cleaner_script.display());
    println!("Cleaned artifact: {}", config.layout.cleaned_artifact.display());
    println!("Cleaned output: {}", config.layout.cleaned_output.display());
    println!();
    println!(
        "Fetch: {} {} (in {})",
        config.fetch.program,
        config.fetch.args.join(" "),
        config.fetch.working_dir.display()
    );
    println!(
        "Clean: {} {} (in {})",
        config.clean.program,
        config.clean.args.join(" "),
        config.clean.working_dir.display()
    );

    Ok(())
}
