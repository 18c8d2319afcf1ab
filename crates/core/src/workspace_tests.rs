// SPDX-License-Identifier: Apache-2.0

use super::*;

#[test]
fn assistant_parses_known_names_only() {
    assert_eq!(Assistant::parse("claude"), Some(Assistant::Claude));
    assert_eq!(Assistant::parse("gemini"), Some(Assistant::Gemini));
    assert_eq!(Assistant::parse("gpt4"), None);
    assert_eq!(Assistant::parse(""), None);
}

#[test]
fn workspace_key_display_distinguishes_kind() {
    let repo = RepoCoord::new("acme", "widget");
    let issue_key = WorkspaceKey::issue(Assistant::Claude, repo.clone(), 42);
    let pr_key = WorkspaceKey::pr(Assistant::Claude, repo, 101);
    assert_eq!(issue_key.to_string(), "claude/acme/widget/issue-42");
    assert_eq!(pr_key.to_string(), "claude/acme/widget/101");
}

#[test]
fn workspace_age_saturates_at_zero() {
    let ws = Workspace {
        key: WorkspaceKey::pr(Assistant::Claude, RepoCoord::new("acme", "widget"), 1),
        path: "/tmp/x".into(),
        branch: "codeagent/claude/issue-1-100".into(),
        session_path: None,
        remote_url: "https://example.com/acme/widget.git".into(),
        created_at: 100,
    };
    assert_eq!(ws.age_secs(150), 50);
    assert_eq!(ws.age_secs(50), 0); // clock skew shouldn't underflow
}
