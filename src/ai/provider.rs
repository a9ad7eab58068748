//! Provider trait and wire payloads shared by provider implementations.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use crate::ai::{Prompt, ProviderError};

/// Boxed future returned by [`GenerationProvider`] methods.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Metadata about a provider implementation.
#[derive(Clone, Debug)]
pub struct ProviderMetadata {
    /// Service provider name.
    pub provider: String,
    /// Base URL requests are sent to.
    pub api_base: String,
}

/// One model entry from a discovery listing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name, e.g. `models/gemini-2.5-flash`.
    pub name: String,
    /// Generation methods the model supports; empty when not advertised.
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// Creates an entry that advertises no generation methods.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supported_generation_methods: Vec::new(),
        }
    }
}

/// One page of a discovery listing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelPage {
    /// Models on this page.
    #[serde(default)]
    pub models: Vec<ModelInfo>,
    /// Token for the next page, absent on the last page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A text fragment inside a response candidate.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ResponsePart {
    /// Text content, absent for non-text parts.
    #[serde(default)]
    pub text: Option<String>,
}

/// Content block of a response candidate.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ResponseContent {
    /// Ordered parts.
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// One generated candidate.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ResponseCandidate {
    /// Candidate content, absent when generation was blocked.
    #[serde(default)]
    pub content: Option<ResponseContent>,
}

/// Response of a generation call.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct GenerateResponse {
    /// Convenience text field some payload shapes carry at the top level.
    #[serde(default)]
    pub text: Option<String>,
    /// Generated candidates.
    #[serde(default)]
    pub candidates: Vec<ResponseCandidate>,
}

impl GenerateResponse {
    /// Builds a response carrying only a top-level text field.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            candidates: Vec::new(),
        }
    }

    /// Builds a single-candidate response from text parts.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: None,
            candidates: vec![ResponseCandidate {
                content: Some(ResponseContent {
                    parts: parts
                        .into_iter()
                        .map(|p| ResponsePart {
                            text: Some(p.into()),
                        })
                        .collect(),
                }),
            }],
        }
    }

    /// Extracts plain text.
    ///
    /// Prefers a non-empty top-level `text`; otherwise joins every text part
    /// of every candidate with newlines. Returns `None` when the trimmed
    /// result is empty.
    pub fn extract_text(&self) -> Option<String> {
        if let Some(text) = self.text.as_deref().map(str::trim) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }

        let joined = self
            .candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n");

        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// A backend that can list models and generate text.
pub trait GenerationProvider: Send + Sync {
    /// Fetches one page of the model listing.
    fn list_models<'a>(&'a self, page_token: Option<&'a str>) -> ProviderFuture<'a, ModelPage>;

    /// Runs one generation call against `model`.
    fn generate<'a>(&'a self, model: &'a str, prompt: &'a Prompt)
        -> ProviderFuture<'a, GenerateResponse>;

    /// Returns metadata about the provider implementation.
    fn get_metadata(&self) -> ProviderMetadata;
}
