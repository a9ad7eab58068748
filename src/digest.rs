//! Orchestration of a single digest run.
//!
//! [`DigestPipeline`] owns the per-run state (the model catalog memo) and
//! threads it through aggregation, candidate resolution and generation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};

use crate::ai::prompts::build_summary_prompt;
use crate::ai::{GenerationError, GenerationProvider, ModelCatalog, ResilientGenerator, RetryPolicy};
use crate::data::CommitReport;
use crate::git::{
    Commit, CommitAggregator, CommitLedger, ConfigurationError, GitHistory, TimeWindow,
};

/// Fixed reply when the window holds no commits.
pub const NO_COMMITS_MESSAGE: &str = "No commits found for this day. Nothing to report.";

/// How the branches to scan are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchSelection {
    /// Scan exactly these branches, in order.
    Explicit(Vec<String>),
    /// Scan the N most recently updated local branches.
    Recent(usize),
}

/// Inputs of one digest run.
#[derive(Debug, Clone)]
pub struct DigestRequest {
    /// Path inside the target working tree.
    pub repo_path: PathBuf,
    /// Branches to scan.
    pub branches: BranchSelection,
    /// Author filter; the local git identity when absent.
    pub author: Option<String>,
    /// Author-date window.
    pub window: TimeWindow,
    /// Label of the day, used in prompts and output.
    pub day_label: String,
}

/// Where the summary text comes from.
pub enum SummaryBackend<'a> {
    /// Generate with a provider, optionally pinned to one model.
    Provider {
        /// Provider to call.
        provider: &'a dyn GenerationProvider,
        /// Explicit model override.
        model_override: Option<&'a str>,
    },
    /// Offline heuristic summary.
    Heuristic,
}

/// Summary text and the model that wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Text to print.
    pub text: String,
    /// Model that produced the text; `None` for fixed or heuristic output.
    pub model_used: Option<String>,
}

/// Result of a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// Commits that were summarized.
    pub report: CommitReport,
    /// The summary.
    pub summary: Summary,
}

/// Per-run orchestrator.
#[derive(Default)]
pub struct DigestPipeline {
    catalog: ModelCatalog,
    generator: ResilientGenerator,
}

impl DigestPipeline {
    /// Creates a pipeline whose generator uses `policy`.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            catalog: ModelCatalog::new(),
            generator: ResilientGenerator::new(policy),
        }
    }

    /// The run's model catalog.
    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Opens the repository and aggregates the requested branches.
    pub fn collect_commits(&self, request: &DigestRequest) -> Result<CommitReport, ConfigurationError> {
        let history = GitHistory::open_at(&request.repo_path)?;

        let branches = match &request.branches {
            BranchSelection::Explicit(branches) => branches.clone(),
            BranchSelection::Recent(count) => history.recent_branches(*count).unwrap_or_else(|e| {
                warn!(error = %e, "Could not list branches, using the current branch only");
                history.current_branch().into_iter().collect()
            }),
        };
        if branches.is_empty() {
            warn!("No branches to scan");
        }

        let mut ledger = CommitLedger::default();
        CommitAggregator::new(&history).aggregate_into(
            &mut ledger,
            &branches,
            request.author.as_deref(),
            &request.window,
        )?;
        info!(
            branches = branches.len(),
            commits = ledger.len(),
            "Aggregated commits"
        );

        Ok(CommitReport {
            day: request.day_label.clone(),
            branches,
            commits: ledger.into_commits(),
        })
    }

    /// Summarizes `commits`.
    ///
    /// An empty commit list short-circuits to [`NO_COMMITS_MESSAGE`] without
    /// touching the backend.
    pub async fn summarize(
        &self,
        commits: &[Commit],
        day_label: &str,
        backend: SummaryBackend<'_>,
    ) -> Result<Summary, GenerationError> {
        if commits.is_empty() {
            return Ok(Summary {
                text: NO_COMMITS_MESSAGE.to_string(),
                model_used: None,
            });
        }

        match backend {
            SummaryBackend::Heuristic => Ok(Summary {
                text: heuristic_summary(commits, day_label),
                model_used: None,
            }),
            SummaryBackend::Provider {
                provider,
                model_override,
            } => {
                let candidates = self.catalog.resolve(provider, model_override).await;
                let prompt = build_summary_prompt(commits, day_label);
                let generation = self.generator.generate(provider, &prompt, &candidates).await?;
                Ok(Summary {
                    text: generation.text,
                    model_used: Some(generation.model_used),
                })
            }
        }
    }

    /// Runs aggregation followed by summarization.
    pub async fn run(&self, request: &DigestRequest, backend: SummaryBackend<'_>) -> Result<Digest> {
        let report = self.collect_commits(request)?;
        let summary = self
            .summarize(&report.commits, &request.day_label, backend)
            .await?;
        Ok(Digest { report, summary })
    }
}

/// Deterministic offline summary grouped by branch set.
pub fn heuristic_summary(commits: &[Commit], day_label: &str) -> String {
    let mut groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for commit in commits {
        groups
            .entry(commit.origin_branches.join(", "))
            .or_default()
            .push(commit.subject.as_str());
    }

    let mut out = format!(
        "{day_label}: {} commit{} across {} branch group{}.",
        commits.len(),
        if commits.len() == 1 { "" } else { "s" },
        groups.len(),
        if groups.len() == 1 { "" } else { "s" },
    );
    for (branches, subjects) in &groups {
        out.push_str(&format!("\n\n{branches}:"));
        for subject in subjects {
            out.push_str(&format!("\n- {subject}"));
        }
    }
    out
}
