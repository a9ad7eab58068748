//! CLI interface for standup-digest.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use crate::digest::{BranchSelection, DigestRequest};
use crate::utils::{day_window, previous_workday};

pub mod commits;
pub mod models;
pub mod summary;

/// standup-digest: summarize yesterday's commits.
#[derive(Parser)]
#[command(name = "standup-digest")]
#[command(about = "Summarize a workday of commits across branches", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Summarizes the day's commits with Gemini (or a heuristic in demo mode).
    Summary(summary::SummaryCommand),
    /// Prints the aggregated commits as YAML without calling any model.
    Commits(commits::CommitsCommand),
    /// Lists the ranked model candidates.
    Models(models::ModelsCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Summary(cmd) => cmd.execute().await,
            Commands::Commits(cmd) => cmd.execute(),
            Commands::Models(cmd) => cmd.execute().await,
        }
    }
}

/// Options selecting the repository, day, branches and author.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Path inside the git repository to scan.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Day to summarize; defaults to the previous workday.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Number of most recently updated local branches to scan.
    #[arg(long, value_name = "N", default_value_t = 5)]
    pub branches: usize,

    /// Branch to scan (repeatable); overrides --branches.
    #[arg(long = "branch", value_name = "NAME")]
    pub branch: Vec<String>,

    /// Author filter; defaults to git config user.email.
    #[arg(long)]
    pub author: Option<String>,
}

impl SelectionArgs {
    /// Builds the digest request for these options.
    pub fn to_request(&self) -> Result<DigestRequest> {
        let date = self
            .date
            .unwrap_or_else(|| previous_workday(Local::now().date_naive()));
        let window = day_window(date, &Local)?;

        let branches = if self.branch.is_empty() {
            BranchSelection::Recent(self.branches)
        } else {
            BranchSelection::Explicit(self.branch.clone())
        };

        Ok(DigestRequest {
            repo_path: self.repo.clone(),
            branches,
            author: self.author.clone(),
            window,
            day_label: date.format("%A %Y-%m-%d").to_string(),
        })
    }
}
