//! Gemini integration: model discovery, ranking and resilient generation.

pub mod catalog;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod prompts;
pub mod provider;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_utils;

pub use catalog::{ModelCandidate, ModelCatalog};
pub use error::{classify, AttemptRecord, ErrorKind, GenerationError, ProviderError};
pub use gemini::GeminiClient;
pub use generator::{Generation, ResilientGenerator, RetryPolicy};
pub use prompts::Prompt;
pub use provider::{GenerateResponse, GenerationProvider, ModelInfo, ModelPage, ProviderMetadata};
