//! Data processing and serialization.

use serde::{Deserialize, Serialize};

use crate::git::Commit;

pub mod yaml;

pub use yaml::to_yaml;

/// Commits collected for one day across the scanned branches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    /// Human-readable label of the day covered.
    pub day: String,
    /// Branches that were scanned, in scan order.
    pub branches: Vec<String>,
    /// Deduplicated commits, newest first.
    pub commits: Vec<Commit>,
}
