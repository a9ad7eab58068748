//! The history-query seam consumed by the aggregator.

use chrono::{DateTime, FixedOffset};

use crate::git::HistoryError;

/// Half-open `[since, until)` interval on author dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive lower bound.
    pub since: DateTime<FixedOffset>,
    /// Exclusive upper bound.
    pub until: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// Creates a window from its bounds.
    pub fn new(since: DateTime<FixedOffset>, until: DateTime<FixedOffset>) -> Self {
        Self { since, until }
    }

    /// Returns true if `instant` lies inside the window.
    pub fn contains(&self, instant: &DateTime<FixedOffset>) -> bool {
        *instant >= self.since && *instant < self.until
    }
}

/// Parameters of one per-branch history query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Case-insensitive substring matched against `Name <email>`.
    pub author_filter: String,
    /// Author-date window.
    pub window: TimeWindow,
    /// Skip commits with more than one parent.
    pub exclude_merges: bool,
}

/// One commit record as returned by a history query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    /// Full commit hash.
    pub hash: String,
    /// Author timestamp with the author's offset.
    pub author_date: DateTime<FixedOffset>,
    /// First line of the message.
    pub subject: String,
    /// Message text after the subject, trimmed.
    pub body: String,
}

/// Source of per-branch commit history.
pub trait HistorySource {
    /// Returns the local author identity used when no filter is given.
    fn author_identity(&self) -> Result<String, HistoryError>;

    /// Returns the commits on `branch` matching `query`.
    fn query(&self, branch: &str, query: &HistoryQuery) -> Result<Vec<RawCommit>, HistoryError>;
}
