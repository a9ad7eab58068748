//! Prompt templates for standup summaries

use crate::git::Commit;

/// System instruction sent with every summary request
pub const SYSTEM_PROMPT: &str = r#"You are an engineer writing your own daily standup update from your git history.

You will receive the commits you authored during one workday, each tagged with the branches it appears on.

Write a short update in the first person:
1. Start with a one-line overview of the day's focus.
2. Follow with 3-7 bullet points grouping related commits by outcome, not by commit.
3. Mention a branch name only when it helps explain where work is happening.
4. Do not invent work that the commits do not show.
5. Do not include commit hashes.

Respond with plain text only, no headings and no code fences."#;

/// System and user prompt for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// System instruction.
    pub system: String,
    /// User content.
    pub user: String,
}

/// Build the summary prompt for a set of commits
pub fn build_summary_prompt(commits: &[Commit], day_label: &str) -> Prompt {
    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user: render_commits(commits, day_label),
    }
}

/// Render commits as prompt content
pub fn render_commits(commits: &[Commit], day_label: &str) -> String {
    let mut out = format!("Commits authored on {day_label} ({} total):\n", commits.len());

    for commit in commits {
        out.push_str(&format!(
            "\n- {} [{}] {} ({})",
            commit.short_hash(),
            commit.origin_branches.join(", "),
            commit.subject,
            commit.author_date.format("%H:%M"),
        ));
        for line in commit.body.lines().filter(|l| !l.trim().is_empty()) {
            out.push_str(&format!("\n    {}", line.trim_end()));
        }
    }

    out.push('\n');
    out
}
