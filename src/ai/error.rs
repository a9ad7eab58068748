//! Provider error handling and classification.
//!
//! Every transport or API failure is mapped into an [`ErrorKind`] by
//! [`classify`]; retry and fallback decisions only ever look at the kind.

use std::fmt;

use thiserror::Error;

/// Hint attached when the final failure was an access problem.
pub const ACCESS_HINT: &str =
    "Check the API key's quota, billing and permissions, or pass --model to pick a specific model";

/// Hint attached for every other terminal failure.
pub const UNUSABLE_HINT: &str =
    "The model backend could not produce a summary; try another model with --model";

/// Failures returned by a [`GenerationProvider`](super::GenerationProvider).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The API answered with a non-success HTTP status.
    #[error("HTTP {status}{}: {message}", status_suffix(.api_status))]
    Api {
        /// HTTP status code.
        status: u16,
        /// API status string from the error body (e.g. `UNAVAILABLE`).
        api_status: Option<String>,
        /// Error message from the body, or the raw body.
        message: String,
    },

    /// The request did not complete within the client timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The API host could not be reached.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Any other transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// The response decoded but carried no text.
    #[error("Model returned an empty response")]
    EmptyResponse,
}

fn status_suffix(api_status: &Option<String>) -> String {
    api_status
        .as_deref()
        .map(|s| format!(" {s}"))
        .unwrap_or_default()
}

/// Failure classes that drive retry and fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transient: rate limiting, unavailability, timeouts.
    Retryable,
    /// Permission, quota or billing problems.
    Access,
    /// The model is unknown or unsupported for this account.
    NotFound,
    /// Anything else.
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Retryable => write!(f, "retryable"),
            ErrorKind::Access => write!(f, "access denied"),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Other => write!(f, "error"),
        }
    }
}

const NOT_FOUND_MARKERS: &[&str] = &["not found", "is not supported", "unknown model"];
const QUOTA_MARKERS: &[&str] = &[
    "billing",
    "exceeded your current quota",
    "quota exceeded",
    "insufficient quota",
];
const ACCESS_MARKERS: &[&str] = &["permission", "api key"];
const RETRYABLE_MARKERS: &[&str] = &[
    "rate limit",
    "overloaded",
    "try again",
    "timed out",
    "timeout",
    "unavailable",
];

/// Maps any provider failure to its [`ErrorKind`].
pub fn classify(err: &ProviderError) -> ErrorKind {
    match err {
        ProviderError::Timeout(_) | ProviderError::Connect(_) => ErrorKind::Retryable,
        ProviderError::Api {
            status,
            api_status,
            message,
        } => classify_api(*status, api_status.as_deref(), message),
        ProviderError::Network(message) => classify_message(message).unwrap_or(ErrorKind::Other),
        ProviderError::InvalidResponse(_) | ProviderError::EmptyResponse => ErrorKind::Other,
    }
}

fn classify_api(status: u16, api_status: Option<&str>, message: &str) -> ErrorKind {
    let message = message.to_lowercase();
    let has = |markers: &[&str]| markers.iter().any(|m| message.contains(m));

    if status == 404 || api_status == Some("NOT_FOUND") {
        return ErrorKind::NotFound;
    }

    if matches!(status, 401 | 403)
        || matches!(api_status, Some("PERMISSION_DENIED" | "UNAUTHENTICATED"))
    {
        return ErrorKind::Access;
    }

    if status == 429 || api_status == Some("RESOURCE_EXHAUSTED") {
        return if has(QUOTA_MARKERS) {
            ErrorKind::Access
        } else {
            ErrorKind::Retryable
        };
    }

    if matches!(status, 408 | 500 | 502 | 503 | 504)
        || matches!(
            api_status,
            Some("UNAVAILABLE" | "DEADLINE_EXCEEDED" | "INTERNAL")
        )
    {
        return ErrorKind::Retryable;
    }

    // Status is not decisive (e.g. 400 INVALID_ARGUMENT); fall back to wording.
    if has(QUOTA_MARKERS) || has(ACCESS_MARKERS) {
        ErrorKind::Access
    } else if has(NOT_FOUND_MARKERS) {
        ErrorKind::NotFound
    } else if has(RETRYABLE_MARKERS) {
        ErrorKind::Retryable
    } else {
        ErrorKind::Other
    }
}

fn classify_message(message: &str) -> Option<ErrorKind> {
    let message = message.to_lowercase();
    let has = |markers: &[&str]| markers.iter().any(|m| message.contains(m));

    if has(RETRYABLE_MARKERS) {
        Some(ErrorKind::Retryable)
    } else if has(QUOTA_MARKERS) || has(ACCESS_MARKERS) {
        Some(ErrorKind::Access)
    } else {
        None
    }
}

/// Final outcome recorded for one candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Model identifier that was tried.
    pub model: String,
    /// Classification of the final error.
    pub kind: ErrorKind,
    /// Final error message.
    pub message: String,
}

impl fmt::Display for AttemptRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({}): {}", self.model, self.kind, self.message)
    }
}

/// Terminal failures of the generation stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// No candidate model was available to try.
    #[error(
        "No model candidates available. Set GEMINI_MODEL or pass --model, and check that the API key can list models"
    )]
    NoCandidates,

    /// The only candidate failed.
    #[error("Model '{model}' is unusable ({kind}): {message}. {hint}")]
    BackendUnusable {
        /// Model identifier.
        model: String,
        /// Classification of the final error.
        kind: ErrorKind,
        /// Final error message.
        message: String,
        /// What the caller can do about it.
        hint: &'static str,
    },

    /// Every candidate failed.
    #[error(
        "All {} model candidates failed; last tried {headline}. {hint}{}",
        .attempts.len(),
        format_attempts(.attempts)
    )]
    AllCandidatesFailed {
        /// The last candidate attempted.
        headline: AttemptRecord,
        /// Every attempted candidate in order.
        attempts: Vec<AttemptRecord>,
        /// What the caller can do about it.
        hint: &'static str,
    },
}

fn format_attempts(attempts: &[AttemptRecord]) -> String {
    attempts
        .iter()
        .map(|a| format!("\n  - {a}"))
        .collect::<String>()
}

impl GenerationError {
    /// Builds the terminal error once every candidate has been tried.
    pub(crate) fn exhausted(attempts: Vec<AttemptRecord>) -> Self {
        let Some(last) = attempts.last().cloned() else {
            return GenerationError::NoCandidates;
        };

        let hint = match last.kind {
            ErrorKind::Access => ACCESS_HINT,
            _ => UNUSABLE_HINT,
        };

        if attempts.len() == 1 {
            GenerationError::BackendUnusable {
                model: last.model,
                kind: last.kind,
                message: last.message,
                hint,
            }
        } else {
            GenerationError::AllCandidatesFailed {
                headline: last,
                attempts,
                hint,
            }
        }
    }

    /// Classification of the terminating error, if any candidate was tried.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            GenerationError::NoCandidates => None,
            GenerationError::BackendUnusable { kind, .. } => Some(*kind),
            GenerationError::AllCandidatesFailed { headline, .. } => Some(headline.kind),
        }
    }
}
