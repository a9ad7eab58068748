//! Multi-branch commit aggregation.
//!
//! Branches are folded strictly in order into a [`CommitLedger`] keyed by
//! hash. The first sighting of a hash fixes its message; later sightings only
//! extend its branch set.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::git::{
    Commit, ConfigurationError, HistoryError, HistoryQuery, HistorySource, RawCommit, TimeWindow,
};

struct LedgerEntry {
    first_seen: RawCommit,
    branches: BTreeSet<String>,
}

/// Per-run dedup map from commit hash to its first sighting and branch set.
#[derive(Default)]
pub struct CommitLedger {
    entries: HashMap<String, LedgerEntry>,
}

impl CommitLedger {
    /// Records one sighting of `raw` on `branch`.
    pub fn record(&mut self, branch: &str, raw: RawCommit) {
        self.entries
            .entry(raw.hash.clone())
            .or_insert_with(|| LedgerEntry {
                first_seen: raw,
                branches: BTreeSet::new(),
            })
            .branches
            .insert(branch.to_string());
    }

    /// Number of distinct commits recorded so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finalizes the ledger into commits ordered by author date descending,
    /// then hash ascending.
    pub fn into_commits(self) -> Vec<Commit> {
        let mut commits: Vec<Commit> = self
            .entries
            .into_values()
            .map(|entry| Commit::from_raw(entry.first_seen, entry.branches.into_iter().collect()))
            .collect();

        commits.sort_by(|a, b| {
            b.author_date
                .cmp(&a.author_date)
                .then_with(|| a.hash.cmp(&b.hash))
        });
        commits
    }
}

/// Queries each branch of a [`HistorySource`] and merges the results.
pub struct CommitAggregator<'a> {
    source: &'a dyn HistorySource,
}

impl<'a> CommitAggregator<'a> {
    /// Creates an aggregator over `source`.
    pub fn new(source: &'a dyn HistorySource) -> Self {
        Self { source }
    }

    /// Aggregates `branches` into a fresh ledger and returns the final list.
    pub fn aggregate(
        &self,
        branches: &[String],
        author_filter: Option<&str>,
        window: &TimeWindow,
    ) -> Result<Vec<Commit>, ConfigurationError> {
        let mut ledger = CommitLedger::default();
        self.aggregate_into(&mut ledger, branches, author_filter, window)?;
        Ok(ledger.into_commits())
    }

    /// Folds every branch, in order, into `ledger`.
    ///
    /// Missing branches and per-branch query failures are logged and skipped.
    /// A "not a repository" failure aborts the whole aggregation.
    pub fn aggregate_into(
        &self,
        ledger: &mut CommitLedger,
        branches: &[String],
        author_filter: Option<&str>,
        window: &TimeWindow,
    ) -> Result<(), ConfigurationError> {
        let author_filter = match author_filter {
            Some(filter) => filter.to_string(),
            None => self.source.author_identity().map_err(|e| match e {
                HistoryError::NotARepository { path, message } => {
                    ConfigurationError::NotARepository { path, message }
                }
                other => ConfigurationError::MissingAuthorIdentity(other.to_string()),
            })?,
        };

        let query = HistoryQuery {
            author_filter,
            window: *window,
            exclude_merges: true,
        };

        for branch in branches {
            match self.source.query(branch, &query) {
                Ok(commits) => {
                    debug!(branch = %branch, count = commits.len(), "Merging branch commits");
                    for raw in commits {
                        ledger.record(branch, raw);
                    }
                }
                Err(HistoryError::NotARepository { path, message }) => {
                    return Err(ConfigurationError::NotARepository { path, message });
                }
                Err(HistoryError::BranchNotFound(name)) => {
                    warn!(branch = %name, "Branch not found, skipping");
                }
                Err(e) => {
                    warn!(branch = %branch, error = %e, "Branch query failed, treating as empty");
                }
            }
        }

        Ok(())
    }
}
