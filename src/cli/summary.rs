//! Summary command: aggregate the day's commits and summarize them.

use anyhow::{Context, Result};
use clap::Parser;

use crate::ai::GeminiClient;
use crate::cli::SelectionArgs;
use crate::digest::{DigestPipeline, SummaryBackend};
use crate::utils::preflight::{check_ai_credentials, retry_policy, API_KEY_VARS};

/// Summary command options.
#[derive(Parser)]
pub struct SummaryCommand {
    /// Repository, day, branch and author selection.
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Gemini model to use (skips model discovery).
    #[arg(long)]
    pub model: Option<String>,

    /// Uses the offline heuristic summary instead of Gemini.
    #[arg(long)]
    pub demo: bool,
}

impl SummaryCommand {
    /// Executes the summary command.
    pub async fn execute(self) -> Result<()> {
        let request = self.selection.to_request()?;
        let ai_info = check_ai_credentials(self.model.as_deref(), self.demo);
        let pipeline = DigestPipeline::new(retry_policy());

        let digest = match &ai_info.api_key {
            Some(api_key) => {
                let client = GeminiClient::new(api_key.clone())?;
                eprintln!("Summarizing {} with {}", request.day_label, ai_info.provider);
                pipeline
                    .run(
                        &request,
                        SummaryBackend::Provider {
                            provider: &client,
                            model_override: ai_info.model_override.as_deref(),
                        },
                    )
                    .await
                    .context("Failed to generate summary")?
            }
            None => {
                if !self.demo {
                    eprintln!(
                        "No Gemini API key found (set one of {}); using {}",
                        API_KEY_VARS.join(", "),
                        ai_info.provider
                    );
                }
                pipeline
                    .run(&request, SummaryBackend::Heuristic)
                    .await
                    .context("Failed to build summary")?
            }
        };

        eprintln!(
            "{} commit(s) from {} branch(es)",
            digest.report.commits.len(),
            digest.report.branches.len()
        );
        if let Some(model) = &digest.summary.model_used {
            eprintln!("Model: {model}");
        }

        println!("{}", digest.summary.text);
        Ok(())
    }
}
