//! Gemini API client implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::ai::catalog::normalize_identifier;
use crate::ai::provider::ProviderFuture;
use crate::ai::{
    GenerateResponse, GenerationProvider, ModelPage, Prompt, ProviderError, ProviderMetadata,
};

/// Default base URL of the Gemini REST API.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// HTTP request timeout for Gemini API calls.
///
/// A request that exceeds it surfaces as [`ProviderError::Timeout`], which is
/// retried like any other transient failure.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Models requested per listing page.
const LIST_PAGE_SIZE: &str = "1000";

/// Gemini API request part.
#[derive(Serialize)]
struct Part {
    text: String,
}

/// Gemini API request content block.
#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

/// Gemini API `generateContent` request body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

/// Gemini API error body.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// Gemini API error details.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Gemini API client.
pub struct GeminiClient {
    /// HTTP client for API requests.
    client: Client,
    /// API key sent in the `x-goog-api-key` header.
    api_key: String,
    /// Base URL without a trailing slash.
    base_url: String,
}

impl GeminiClient {
    /// Creates a client for the public Gemini endpoint.
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, GEMINI_API_BASE)
    }

    /// Creates a client for a custom endpoint.
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ProviderError> {
        Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| ProviderError::Network(format!("Invalid API URL: {e}")))
    }
}

/// Maps a reqwest transport error onto the provider error taxonomy.
fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else if err.is_connect() {
        ProviderError::Connect(err.to_string())
    } else {
        ProviderError::Network(err.to_string())
    }
}

/// Checks an HTTP response for error status and returns a structured error
/// if non-success.
async fn check_error_response(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let error_text = response.text().await.unwrap_or_else(|e| {
        debug!("Failed to read error response body: {e}");
        String::new()
    });

    let (message, api_status) = match serde_json::from_str::<ErrorEnvelope>(&error_text) {
        Ok(envelope) => (envelope.error.message, envelope.error.status),
        Err(_) => (error_text, None),
    };

    Err(ProviderError::Api {
        status,
        api_status,
        message,
    })
}

async fn decode_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            ProviderError::Timeout(e.to_string())
        } else {
            ProviderError::InvalidResponse(e.to_string())
        }
    })
}

impl GenerationProvider for GeminiClient {
    fn list_models<'a>(&'a self, page_token: Option<&'a str>) -> ProviderFuture<'a, ModelPage> {
        Box::pin(async move {
            let mut url = self.url("models")?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", LIST_PAGE_SIZE);
                if let Some(token) = page_token {
                    query.append_pair("pageToken", token);
                }
            }

            debug!(url = %url.path(), has_page_token = page_token.is_some(), "Listing Gemini models");

            let response = self
                .client
                .get(url)
                .header("x-goog-api-key", &self.api_key)
                .send()
                .await
                .map_err(transport_error)?;

            let page: ModelPage = decode_json(check_error_response(response).await?).await?;
            debug!(
                models = page.models.len(),
                has_next = page.next_page_token.is_some(),
                "Received Gemini model page"
            );
            Ok(page)
        })
    }

    fn generate<'a>(
        &'a self,
        model: &'a str,
        prompt: &'a Prompt,
    ) -> ProviderFuture<'a, GenerateResponse> {
        Box::pin(async move {
            let model = normalize_identifier(model);
            let url = self.url(&format!("models/{model}:generateContent"))?;

            debug!(
                system_prompt_len = prompt.system.len(),
                user_prompt_len = prompt.user.len(),
                model,
                "Preparing Gemini API request"
            );
            debug!(user_prompt = %prompt.user, "Gemini API request content");

            let request = GenerateContentRequest {
                system_instruction: Content {
                    role: None,
                    parts: vec![Part {
                        text: prompt.system.clone(),
                    }],
                },
                contents: vec![Content {
                    role: Some("user".to_string()),
                    parts: vec![Part {
                        text: prompt.user.clone(),
                    }],
                }],
            };

            info!(model, "Sending request to Gemini API");

            let response = self
                .client
                .post(url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(transport_error)?;

            let response: GenerateResponse =
                decode_json(check_error_response(response).await?).await?;

            debug!(
                candidate_count = response.candidates.len(),
                "Received Gemini API response"
            );
            Ok(response)
        })
    }

    fn get_metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            provider: "Gemini".to_string(),
            api_base: self.base_url.clone(),
        }
    }
}
