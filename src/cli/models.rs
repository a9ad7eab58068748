//! Models command: show which Gemini models would be tried, best first.

use anyhow::{anyhow, Result};
use clap::Parser;

use crate::ai::catalog::score;
use crate::ai::{GeminiClient, GenerationError};
use crate::digest::DigestPipeline;
use crate::utils::preflight::{check_ai_credentials, API_KEY_VARS};

/// Models command options.
#[derive(Parser)]
pub struct ModelsCommand {
    /// Model override to resolve instead of discovering.
    #[arg(long)]
    pub model: Option<String>,
}

impl ModelsCommand {
    /// Executes the models command.
    pub async fn execute(self) -> Result<()> {
        let ai_info = check_ai_credentials(self.model.as_deref(), false);
        let api_key = ai_info.api_key.ok_or_else(|| {
            anyhow!(
                "Gemini API key not found. Set one of these environment variables: {}",
                API_KEY_VARS.join(", ")
            )
        })?;

        let client = GeminiClient::new(api_key)?;
        let pipeline = DigestPipeline::default();
        let candidates = pipeline
            .catalog()
            .resolve(&client, ai_info.model_override.as_deref())
            .await;

        if candidates.is_empty() {
            return Err(GenerationError::NoCandidates.into());
        }

        for candidate in &candidates {
            println!(
                "{:>3}  {:<40} {:>6}",
                candidate.rank + 1,
                candidate.identifier,
                score(&candidate.identifier)
            );
        }
        Ok(())
    }
}
