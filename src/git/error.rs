//! Git-specific error handling.

use thiserror::Error;

/// Failures reported by a [`HistorySource`](super::HistorySource).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// The target path is not a git working tree.
    #[error("Not a git repository: {path}: {message}")]
    NotARepository {
        /// Path that was opened.
        path: String,
        /// Underlying git error.
        message: String,
    },

    /// The branch reference does not resolve to a commit.
    #[error("Branch '{0}' not found")]
    BranchNotFound(String),

    /// Neither `user.email` nor `user.name` is configured.
    #[error("Could not determine git author identity: {0}")]
    AuthorIdentity(String),

    /// Any other failure while walking a branch.
    #[error("History query for branch '{branch}' failed: {message}")]
    Query {
        /// Branch being queried.
        branch: String,
        /// Underlying git error.
        message: String,
    },
}

/// Fatal errors raised before any generation attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The target is not a valid git working tree.
    #[error("{path} is not a git repository ({message})")]
    NotARepository {
        /// Path that was opened.
        path: String,
        /// Underlying git error.
        message: String,
    },

    /// The local author identity could not be determined.
    #[error("Git author identity is not configured. Set user.email or pass --author ({0})")]
    MissingAuthorIdentity(String),
}
