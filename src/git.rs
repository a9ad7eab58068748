//! Git history access and multi-branch commit aggregation.

pub mod aggregate;
pub mod commit;
pub mod error;
pub mod history;
pub mod repository;

pub use aggregate::{CommitAggregator, CommitLedger};
pub use commit::Commit;
pub use error::{ConfigurationError, HistoryError};
pub use history::{HistoryQuery, HistorySource, RawCommit, TimeWindow};
pub use repository::GitHistory;

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;
