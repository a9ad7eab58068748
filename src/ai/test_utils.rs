//! Shared test utilities for the `ai` module.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::time::Instant;

use crate::ai::provider::ProviderFuture;
use crate::ai::{
    GenerateResponse, GenerationProvider, ModelPage, Prompt, ProviderError, ProviderMetadata,
};

/// Mock provider with pre-programmed queues of listing pages and
/// generation responses.
///
/// Queues are consumed in FIFO order. An exhausted generation queue answers
/// with an `Other`-kind error; an exhausted page queue returns an empty last
/// page. Every generation call records the model and the (tokio) instant it
/// was made, so paused-clock tests can measure backoff delays.
pub(crate) struct MockProvider {
    responses: Mutex<VecDeque<Result<GenerateResponse, ProviderError>>>,
    pages: Mutex<VecDeque<Result<ModelPage, ProviderError>>>,
    calls: Mutex<Vec<(String, Instant)>>,
    page_tokens: Mutex<Vec<Option<String>>>,
}

impl MockProvider {
    /// Creates a mock with empty queues.
    pub(crate) fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            pages: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            page_tokens: Mutex::new(Vec::new()),
        }
    }

    /// Queues a generation response.
    pub(crate) fn with_response(self, response: Result<GenerateResponse, ProviderError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Queues a successful text response.
    pub(crate) fn with_text(self, text: &str) -> Self {
        self.with_response(Ok(GenerateResponse::from_text(text)))
    }

    /// Queues a listing page.
    pub(crate) fn with_page(self, page: Result<ModelPage, ProviderError>) -> Self {
        self.pages.lock().unwrap().push_back(page);
        self
    }

    /// Models passed to each generation call, in order.
    pub(crate) fn called_models(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    /// Instants at which each generation call was made.
    pub(crate) fn call_instants(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    /// Number of generation calls made.
    pub(crate) fn generate_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of listing calls made.
    pub(crate) fn list_calls(&self) -> usize {
        self.page_tokens.lock().unwrap().len()
    }

    /// Page tokens passed to each listing call.
    pub(crate) fn page_tokens(&self) -> Vec<Option<String>> {
        self.page_tokens.lock().unwrap().clone()
    }
}

impl GenerationProvider for MockProvider {
    fn list_models<'a>(&'a self, page_token: Option<&'a str>) -> ProviderFuture<'a, ModelPage> {
        self.page_tokens
            .lock()
            .unwrap()
            .push(page_token.map(str::to_string));
        let page = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ModelPage::default()));
        Box::pin(async move { page })
    }

    fn generate<'a>(
        &'a self,
        model: &'a str,
        _prompt: &'a Prompt,
    ) -> ProviderFuture<'a, GenerateResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), Instant::now()));
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ProviderError::InvalidResponse(
                    "no more mock responses".to_string(),
                ))
            });
        Box::pin(async move { response })
    }

    fn get_metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            provider: "Mock".to_string(),
            api_base: "mock://".to_string(),
        }
    }
}

/// Shorthand for an API error with the given HTTP status.
pub(crate) fn api_error(status: u16, message: &str) -> ProviderError {
    ProviderError::Api {
        status,
        api_status: None,
        message: message.to_string(),
    }
}
