// SPDX-License-Identifier: Apache-2.0

//! Prompt text builders. Exact wording is out of scope — these exist only
//! so each flow has a concrete string to hand the session; what matters is
//! which pieces of context each mode embeds, not the phrasing.

/// The issue-comment flow's initial generation prompt.
pub fn generation_prompt(issue_number: u64, args: &str) -> String {
    format!(
        "Implement the request from issue #{issue_number}.\n\n{args}\n\n\
         Respond with ## Summary, ## Changes and ## Test Plan sections."
    )
}

/// `/continue` on an existing PR.
pub fn continue_prompt(history: &str, args: &str) -> String {
    format!("Continue the work on this pull request.\n\nHistory:\n{history}\n\nRequest: {args}")
}

/// `/fix` on an existing PR.
pub fn fix_prompt(history: &str, args: &str) -> String {
    format!("Fix the issues raised on this pull request.\n\nHistory:\n{history}\n\nRequest: {args}")
}

/// A single review line-comment's `/continue` or `/fix`.
pub fn review_comment_prompt(file: &str, line: Option<u64>, comment_body: &str, args: &str) -> String {
    let line_desc = line.map(|l| l.to_string()).unwrap_or_else(|| "?".to_string());
    format!("Address this review comment.\n\nFile: {file}\nLine: {line_desc}\nComment: {comment_body}\n\n{args}")
}

/// One batch prompt covering every line comment attached to a whole review.
pub fn review_batch_prompt(review_body: &str, comments: &[(String, Option<u64>, String)]) -> String {
    let mut out = format!("Address this review.\n\nReview: {review_body}\n\n");
    for (i, (file, line, body)) in comments.iter().enumerate() {
        let line_desc = line.map(|l| l.to_string()).unwrap_or_else(|| "?".to_string());
        out.push_str(&format!("{}. {file}:{line_desc} - {body}\n", i + 1));
    }
    out
}

/// The agent handler's unprompted continuation on PR opened/synchronized.
pub fn agent_prompt(pr_title: &str, base_prompt: &str) -> String {
    format!("Continue automated work on \"{pr_title}\".\n\n{base_prompt}")
}
