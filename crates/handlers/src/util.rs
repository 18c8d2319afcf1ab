// SPDX-License-Identifier: Apache-2.0

use codeagent_core::RepoCoord;

/// The clone URL for a repo coordinate, built from a configurable base (the
/// platform host in production, a local directory standing in for the
/// remote in tests). The platform's actual remote transport is a named
/// non-goal; handlers only need a stable URL string to hand to
/// `RepoCache`/`GitOps`.
pub fn remote_url(base: &str, repo: &RepoCoord) -> String {
    format!("{base}/{}/{}", repo.org, repo.repo)
}

/// The issue URL `WorkspaceManager::create_from_issue` parses `(org, repo)`
/// back out of.
pub fn issue_url(repo: &RepoCoord, number: u64) -> String {
    format!("https://github.com/{}/{}/issues/{}", repo.org, repo.repo, number)
}
