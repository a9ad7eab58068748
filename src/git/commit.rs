//! Aggregated commit model

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::git::{RawCommit, SHORT_HASH_LEN};

/// A commit observed on one or more branches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full SHA-1 hash of the commit
    pub hash: String,
    /// Author date with the author's timezone
    pub author_date: DateTime<FixedOffset>,
    /// First line of the commit message
    pub subject: String,
    /// Remaining message text, trimmed
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub body: String,
    /// Every branch the commit was seen on, sorted ascending
    pub origin_branches: Vec<String>,
}

impl Commit {
    /// Builds a commit from its first sighting and the final branch set.
    pub fn from_raw(raw: RawCommit, origin_branches: Vec<String>) -> Self {
        Self {
            hash: raw.hash,
            author_date: raw.author_date,
            subject: raw.subject,
            body: raw.body,
            origin_branches,
        }
    }

    /// Abbreviated hash for display.
    pub fn short_hash(&self) -> &str {
        let end = self.hash.len().min(SHORT_HASH_LEN);
        &self.hash[..end]
    }
}

impl RawCommit {
    /// Creates a RawCommit from a git2::Commit
    pub fn from_git_commit(commit: &git2::Commit) -> Result<Self> {
        let hash = commit.id().to_string();
        let author_date = signature_date(&commit.author())?;

        let subject = commit.summary().unwrap_or("").trim().to_string();
        let body = commit.body().unwrap_or("").trim().to_string();

        Ok(Self {
            hash,
            author_date,
            subject,
            body,
        })
    }
}

/// Converts a git signature timestamp into a zoned date.
pub(crate) fn signature_date(signature: &git2::Signature) -> Result<DateTime<FixedOffset>> {
    let timestamp = signature.when();
    let offset = FixedOffset::east_opt(timestamp.offset_minutes() * 60).unwrap_or(Utc.fix());
    let date = DateTime::from_timestamp(timestamp.seconds(), 0)
        .context("Invalid commit timestamp")?
        .with_timezone(&offset);
    Ok(date)
}
