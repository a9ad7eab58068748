//! Git repository operations

use std::path::Path;

use git2::{BranchType, Oid, Repository, Sort};
use tracing::debug;

use crate::git::commit::signature_date;
use crate::git::{
    ConfigurationError, HistoryError, HistoryQuery, HistorySource, RawCommit, TimeWindow,
};

/// Committer-time slack below `since` before a branch walk stops.
///
/// The walk is ordered by committer time, which can lag author time or be
/// skewed between machines.
const WALK_CUTOFF_SLACK_SECS: i64 = 7 * 24 * 60 * 60;

/// Committer time (unix seconds) below which a walk for `window` can stop.
fn walk_cutoff(window: &TimeWindow) -> i64 {
    window.since.timestamp().saturating_sub(WALK_CUTOFF_SLACK_SECS)
}

/// `git2`-backed history source.
pub struct GitHistory {
    repo: Repository,
}

impl GitHistory {
    /// Open the working tree containing `path`
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let not_a_repo = |message: String| ConfigurationError::NotARepository {
            path: path.display().to_string(),
            message,
        };

        let repo = Repository::discover(path).map_err(|e| not_a_repo(e.message().to_string()))?;
        if repo.is_bare() {
            return Err(not_a_repo("repository has no working tree".to_string()));
        }

        Ok(Self { repo })
    }

    /// Get current branch name, if HEAD is attached
    pub fn current_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        head.shorthand()
            .filter(|name| *name != "HEAD")
            .map(str::to_string)
    }

    /// Local branches ordered by tip commit time, newest first.
    ///
    /// The checked-out branch is always part of the result, even when it
    /// falls outside the first `count` entries.
    pub fn recent_branches(&self, count: usize) -> Result<Vec<String>, HistoryError> {
        let query_err = |e: git2::Error| HistoryError::Query {
            branch: "*".to_string(),
            message: e.message().to_string(),
        };

        let mut branches = Vec::new();
        for entry in self.repo.branches(Some(BranchType::Local)).map_err(query_err)? {
            let (branch, _) = entry.map_err(query_err)?;
            let Some(name) = branch.name().map_err(query_err)?.map(str::to_string) else {
                continue;
            };
            let Ok(tip) = branch.get().peel_to_commit() else {
                continue;
            };
            branches.push((tip.time().seconds(), name));
        }

        branches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        let mut names: Vec<String> = branches.into_iter().take(count).map(|(_, n)| n).collect();

        if let Some(current) = self.current_branch() {
            if !names.contains(&current) {
                names.push(current);
            }
        }

        debug!(count = names.len(), branches = ?names, "Selected recent branches");
        Ok(names)
    }

    /// Resolve a branch name to its tip commit
    fn resolve_branch(&self, branch_name: &str) -> Result<Oid, HistoryError> {
        for kind in [BranchType::Local, BranchType::Remote] {
            if let Ok(branch) = self.repo.find_branch(branch_name, kind) {
                if let Ok(commit) = branch.get().peel_to_commit() {
                    return Ok(commit.id());
                }
            }
        }

        self.repo
            .revparse_single(branch_name)
            .and_then(|obj| obj.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|_| HistoryError::BranchNotFound(branch_name.to_string()))
    }
}

impl HistorySource for GitHistory {
    fn author_identity(&self) -> Result<String, HistoryError> {
        let config = self
            .repo
            .config()
            .map_err(|e| HistoryError::AuthorIdentity(e.message().to_string()))?;

        ["user.email", "user.name"]
            .iter()
            .find_map(|key| config.get_string(key).ok().filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| {
                HistoryError::AuthorIdentity("neither user.email nor user.name is set".to_string())
            })
    }

    fn query(&self, branch: &str, query: &HistoryQuery) -> Result<Vec<RawCommit>, HistoryError> {
        let query_err = |message: String| HistoryError::Query {
            branch: branch.to_string(),
            message,
        };

        let tip = self.resolve_branch(branch)?;

        let mut walker = self.repo.revwalk().map_err(|e| query_err(e.to_string()))?;
        walker
            .set_sorting(Sort::TIME)
            .map_err(|e| query_err(e.to_string()))?;
        walker.push(tip).map_err(|e| query_err(e.to_string()))?;

        let needle = query.author_filter.to_lowercase();
        let cutoff = walk_cutoff(&query.window);
        let mut commits = Vec::new();

        for oid in walker {
            let oid = oid.map_err(|e| query_err(e.to_string()))?;
            let commit = self
                .repo
                .find_commit(oid)
                .map_err(|e| query_err(e.to_string()))?;

            if commit.time().seconds() < cutoff {
                debug!(branch, oid = %oid, "Reached commits older than the window, stopping walk");
                break;
            }

            if query.exclude_merges && commit.parent_count() > 1 {
                continue;
            }

            let author = commit.author();
            let date = signature_date(&author).map_err(|e| query_err(e.to_string()))?;
            if !query.window.contains(&date) {
                continue;
            }

            let who = format!(
                "{} <{}>",
                author.name().unwrap_or(""),
                author.email().unwrap_or("")
            );
            if !who.to_lowercase().contains(&needle) {
                continue;
            }

            commits.push(RawCommit::from_git_commit(&commit).map_err(|e| query_err(e.to_string()))?);
        }

        debug!(branch, count = commits.len(), "Queried branch history");
        Ok(commits)
    }
}
