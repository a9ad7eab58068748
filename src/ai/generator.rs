//! Generation with per-candidate retry and cross-candidate fallback.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::ai::{
    classify, AttemptRecord, ErrorKind, GenerationError, GenerationProvider, ModelCandidate,
    Prompt, ProviderError,
};

/// Retry settings for a single candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per candidate, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

/// Generated text and the model that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
    /// Extracted response text.
    pub text: String,
    /// Identifier of the candidate that succeeded.
    pub model_used: String,
}

/// Drives generation across an ordered candidate list.
///
/// Candidates are tried strictly one at a time. Retryable failures are
/// retried on the same candidate with exponential backoff; every other
/// failure, and a retryable one that hits the attempt ceiling, moves on to
/// the next candidate.
#[derive(Clone, Debug, Default)]
pub struct ResilientGenerator {
    policy: RetryPolicy,
}

impl ResilientGenerator {
    /// Creates a generator with the given retry policy.
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Generates text for `prompt`, falling back across `candidates`.
    pub async fn generate(
        &self,
        provider: &dyn GenerationProvider,
        prompt: &Prompt,
        candidates: &[ModelCandidate],
    ) -> Result<Generation, GenerationError> {
        if candidates.is_empty() {
            return Err(GenerationError::NoCandidates);
        }

        let provider_name = provider.get_metadata().provider;
        let mut attempts = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let model = candidate.identifier.as_str();
            debug!(provider = %provider_name, model, rank = candidate.rank, "Trying candidate");

            match self.attempt_candidate(provider, model, prompt).await {
                Ok(text) => {
                    info!(model, response_len = text.len(), "Generation succeeded");
                    return Ok(Generation {
                        text,
                        model_used: model.to_string(),
                    });
                }
                Err(err) => {
                    let kind = classify(&err);
                    warn!(model, kind = %kind, error = %err, "Candidate failed, falling back");
                    attempts.push(AttemptRecord {
                        model: model.to_string(),
                        kind,
                        message: err.to_string(),
                    });
                }
            }
        }

        Err(GenerationError::exhausted(attempts))
    }

    /// Runs the retry loop for one candidate and returns its final outcome.
    async fn attempt_candidate(
        &self,
        provider: &dyn GenerationProvider,
        model: &str,
        prompt: &Prompt,
    ) -> Result<String, ProviderError> {
        let mut attempt = 1;

        loop {
            let result = provider
                .generate(model, prompt)
                .await
                .and_then(|response| response.extract_text().ok_or(ProviderError::EmptyResponse));

            match result {
                Ok(text) => return Ok(text),
                Err(err)
                    if classify(&err) == ErrorKind::Retryable
                        && attempt < self.policy.max_attempts =>
                {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        model,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retryable error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
