//! Commits command: print the aggregated commit list.

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::SelectionArgs;
use crate::digest::DigestPipeline;

/// Commits command options.
#[derive(Parser)]
pub struct CommitsCommand {
    /// Repository, day, branch and author selection.
    #[command(flatten)]
    pub selection: SelectionArgs,
}

impl CommitsCommand {
    /// Executes the commits command.
    pub fn execute(self) -> Result<()> {
        let request = self.selection.to_request()?;
        let report = DigestPipeline::default().collect_commits(&request)?;

        let yaml = crate::data::to_yaml(&report).context("Failed to serialize commit report")?;
        print!("{yaml}");
        Ok(())
    }
}
