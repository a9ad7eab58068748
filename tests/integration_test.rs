use anyhow::Result;
use chrono::DateTime;
use git2::{Oid, Repository, Signature, Time};
use standup_digest::data::to_yaml;
use standup_digest::digest::{BranchSelection, DigestPipeline, DigestRequest, SummaryBackend};
use standup_digest::git::{CommitAggregator, ConfigurationError, GitHistory, TimeWindow};
use tempfile::TempDir;

/// 2024-03-01T00:00:00Z
const DAY_START: i64 = 1_709_251_200;
const HOUR: i64 = 3600;

/// Test setup that creates a temporary git repository with dated commits
struct TestRepo {
    temp_dir: TempDir,
    repo: Repository,
}

impl TestRepo {
    fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let repo = Repository::init(temp_dir.path())?;

        // Configure git user for commits
        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        Ok(TestRepo { temp_dir, repo })
    }

    /// Creates a commit authored at `at` (unix seconds, UTC) and moves
    /// `branch` to it.
    fn commit(
        &self,
        branch: &str,
        parents: &[Oid],
        message: &str,
        at: i64,
        author: (&str, &str),
    ) -> Result<Oid> {
        self.commit_at(branch, parents, message, at, at, author)
    }

    /// Like [`TestRepo::commit`] with separate author and committer times.
    fn commit_at(
        &self,
        branch: &str,
        parents: &[Oid],
        message: &str,
        authored: i64,
        committed: i64,
        author: (&str, &str),
    ) -> Result<Oid> {
        let signature = Signature::new(author.0, author.1, &Time::new(authored, 0))?;
        let committer = Signature::new(author.0, author.1, &Time::new(committed, 0))?;
        let tree_id = self.repo.treebuilder(None)?.write()?;
        let tree = self.repo.find_tree(tree_id)?;
        let parents = parents
            .iter()
            .map(|id| self.repo.find_commit(*id))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        let oid = self
            .repo
            .commit(None, &signature, &committer, message, &tree, &parent_refs)?;
        self.repo
            .reference(&format!("refs/heads/{branch}"), oid, true, "test")?;
        Ok(oid)
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.repo.set_head(&format!("refs/heads/{branch}"))?;
        Ok(())
    }

    fn path(&self) -> &std::path::Path {
        self.temp_dir.path()
    }
}

const ME: (&str, &str) = ("Test User", "test@example.com");
const OTHER: (&str, &str) = ("Other Person", "other@example.com");

struct Fixture {
    repo: TestRepo,
    shared: Oid,
    on_main: Oid,
    on_feature: Oid,
}

/// main:    old -- shared -- on_main -- merge(on_feature) -- other
/// feature:        shared -- on_feature
fn fixture() -> Result<Fixture> {
    let repo = TestRepo::new()?;

    let old = repo.commit("main", &[], "Yesterday's work", DAY_START - 2 * HOUR, ME)?;
    let shared = repo.commit("main", &[old], "Shared groundwork", DAY_START + 9 * HOUR, ME)?;
    let on_feature = repo.commit(
        "feature",
        &[shared],
        "Add retry loop\n\nBacks off exponentially.",
        DAY_START + 11 * HOUR,
        ME,
    )?;
    let on_main = repo.commit("main", &[shared], "Fix typo", DAY_START + 10 * HOUR, ME)?;
    let merge = repo.commit(
        "main",
        &[on_main, on_feature],
        "Merge branch 'feature'",
        DAY_START + 12 * HOUR,
        ME,
    )?;
    repo.commit("main", &[merge], "Someone else's change", DAY_START + 13 * HOUR, OTHER)?;
    repo.checkout("main")?;

    Ok(Fixture {
        repo,
        shared,
        on_main,
        on_feature,
    })
}

fn window() -> TimeWindow {
    TimeWindow::new(
        DateTime::parse_from_rfc3339("2024-03-01T00:00:00+00:00").unwrap(),
        DateTime::parse_from_rfc3339("2024-03-02T00:00:00+00:00").unwrap(),
    )
}

fn branches(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn aggregates_and_deduplicates_across_branches() -> Result<()> {
    let fx = fixture()?;
    let history = GitHistory::open_at(fx.repo.path())?;

    let commits =
        CommitAggregator::new(&history).aggregate(&branches(&["main", "feature"]), None, &window())?;

    let hashes: Vec<String> = commits.iter().map(|c| c.hash.clone()).collect();
    assert_eq!(
        hashes,
        vec![
            fx.on_feature.to_string(),
            fx.on_main.to_string(),
            fx.shared.to_string()
        ]
    );

    assert_eq!(commits[0].origin_branches, branches(&["feature", "main"]));
    assert_eq!(commits[0].subject, "Add retry loop");
    assert_eq!(commits[0].body, "Backs off exponentially.");
    assert_eq!(commits[1].origin_branches, branches(&["main"]));
    assert_eq!(commits[2].origin_branches, branches(&["feature", "main"]));

    // Merges, other authors and commits outside the day never appear
    assert!(commits.iter().all(|c| !c.subject.starts_with("Merge")));
    assert!(commits.iter().all(|c| c.subject != "Someone else's change"));
    assert!(commits.iter().all(|c| c.subject != "Yesterday's work"));
    Ok(())
}

#[test]
fn author_date_decides_membership_over_long_history() -> Result<()> {
    const DAY: i64 = 24 * HOUR;
    let repo = TestRepo::new()?;

    let mut parent = repo.commit("main", &[], "Initial import", DAY_START - 90 * DAY, ME)?;
    for n in (1..=5).rev() {
        parent = repo.commit("main", &[parent], &format!("Old work {n}"), DAY_START - n * 10 * DAY, ME)?;
    }
    // Authored during the day, committed (amended) two days later
    let amended = repo.commit_at(
        "main",
        &[parent],
        "Amended later",
        DAY_START + 15 * HOUR,
        DAY_START + 2 * DAY,
        ME,
    )?;
    // Rebased onto main during the day, but authored a month earlier
    repo.commit_at(
        "main",
        &[amended],
        "Rebased old patch",
        DAY_START - 30 * DAY,
        DAY_START + 16 * HOUR,
        ME,
    )?;
    repo.checkout("main")?;

    let history = GitHistory::open_at(repo.path())?;
    let commits = CommitAggregator::new(&history).aggregate(&branches(&["main"]), None, &window())?;

    let subjects: Vec<&str> = commits.iter().map(|c| c.subject.as_str()).collect();
    assert_eq!(subjects, vec!["Amended later"]);
    assert_eq!(commits[0].hash, amended.to_string());
    Ok(())
}

#[test]
fn explicit_author_filter_is_case_insensitive() -> Result<()> {
    let fx = fixture()?;
    let history = GitHistory::open_at(fx.repo.path())?;

    let commits = CommitAggregator::new(&history).aggregate(
        &branches(&["main"]),
        Some("OTHER PERSON"),
        &window(),
    )?;

    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].subject, "Someone else's change");
    Ok(())
}

#[test]
fn missing_branch_is_skipped() -> Result<()> {
    let fx = fixture()?;
    let history = GitHistory::open_at(fx.repo.path())?;

    let with_missing = CommitAggregator::new(&history).aggregate(
        &branches(&["does-not-exist", "main"]),
        None,
        &window(),
    )?;
    let without = CommitAggregator::new(&history).aggregate(&branches(&["main"]), None, &window())?;

    assert_eq!(with_missing, without);
    Ok(())
}

#[test]
fn opening_a_plain_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = GitHistory::open_at(dir.path()).err().unwrap();
    assert!(matches!(err, ConfigurationError::NotARepository { .. }));
}

#[test]
fn opening_a_bare_repository_fails() {
    let dir = tempfile::tempdir().unwrap();
    Repository::init_bare(dir.path()).unwrap();

    let err = GitHistory::open_at(dir.path()).err().unwrap();
    assert!(matches!(err, ConfigurationError::NotARepository { .. }));
}

#[test]
fn recent_branches_keeps_current_branch() -> Result<()> {
    let fx = fixture()?;
    let history = GitHistory::open_at(fx.repo.path())?;
    assert_eq!(history.recent_branches(1)?, branches(&["main"]));
    assert_eq!(history.recent_branches(5)?, branches(&["main", "feature"]));

    fx.repo.checkout("feature")?;
    let history = GitHistory::open_at(fx.repo.path())?;
    assert_eq!(history.current_branch().as_deref(), Some("feature"));
    assert_eq!(history.recent_branches(1)?, branches(&["main", "feature"]));
    Ok(())
}

#[tokio::test]
async fn pipeline_runs_offline_end_to_end() -> Result<()> {
    let fx = fixture()?;
    let request = DigestRequest {
        repo_path: fx.repo.path().to_path_buf(),
        branches: BranchSelection::Recent(5),
        author: None,
        window: window(),
        day_label: "Friday 2024-03-01".to_string(),
    };

    let digest = DigestPipeline::default()
        .run(&request, SummaryBackend::Heuristic)
        .await?;

    assert_eq!(digest.report.branches, branches(&["main", "feature"]));
    assert_eq!(digest.report.commits.len(), 3);
    assert_eq!(digest.summary.model_used, None);
    assert!(digest
        .summary
        .text
        .starts_with("Friday 2024-03-01: 3 commits across 2 branch groups."));

    let yaml = to_yaml(&digest.report)?;
    assert!(yaml.contains(&fx.on_feature.to_string()));
    assert!(yaml.contains("Add retry loop"));
    Ok(())
}

#[tokio::test]
async fn empty_day_reports_nothing() -> Result<()> {
    let fx = fixture()?;
    let request = DigestRequest {
        repo_path: fx.repo.path().to_path_buf(),
        branches: BranchSelection::Explicit(branches(&["main"])),
        author: Some("nobody@example.com".to_string()),
        window: window(),
        day_label: "Friday 2024-03-01".to_string(),
    };

    let digest = DigestPipeline::default()
        .run(&request, SummaryBackend::Heuristic)
        .await?;

    assert!(digest.report.commits.is_empty());
    assert_eq!(
        digest.summary.text,
        standup_digest::digest::NO_COMMITS_MESSAGE
    );
    Ok(())
}
