// SPDX-License-Identifier: Apache-2.0

//! Aggregates a PR's issue comments, reviews and review comments into one
//! chronological history block, excluding the comment that triggered the
//! current event.

use codeagent_platform::{HistoryEntry, IssueComment, Review, ReviewComment};

/// Merges the three history sources by `created_at`, dropping whichever
/// issue/review comment carries `exclude_comment_id` (the comment that
/// triggered the current flow, so the assistant isn't shown its own cue).
pub fn aggregate_history(
    issue_comments: Vec<IssueComment>,
    review_comments: Vec<ReviewComment>,
    reviews: Vec<Review>,
    exclude_comment_id: Option<u64>,
) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = Vec::new();
    entries.extend(
        issue_comments.into_iter().filter(|c| Some(c.id) != exclude_comment_id).map(HistoryEntry::IssueComment),
    );
    entries.extend(
        review_comments.into_iter().filter(|c| Some(c.id) != exclude_comment_id).map(HistoryEntry::ReviewComment),
    );
    entries.extend(reviews.into_iter().map(HistoryEntry::Review));
    entries.sort_by_key(HistoryEntry::created_at);
    entries
}

/// Renders a history block for prompt inclusion, one entry per paragraph.
pub fn format_history(entries: &[HistoryEntry]) -> String {
    entries.iter().map(|e| format!("{}: {}", e.author(), e.body())).collect::<Vec<_>>().join("\n\n")
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
