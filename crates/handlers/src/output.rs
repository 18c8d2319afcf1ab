// SPDX-License-Identifier: Apache-2.0

//! Scans an assistant's plain-text response stream for its `Summary`,
//! `Changes` and `Test Plan` sections, and pulls the last error-looking line
//! out of a transcript.

/// The three sections a generation/fix response is expected to carry.
/// Trailing whitespace of each is stripped; a section with no lines is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutput {
    pub summary: String,
    pub changes: String,
    pub test_plan: String,
}

impl ParsedOutput {
    /// True when none of the three sections captured any content — the
    /// transcript had no recognized headers, or every section under them
    /// was blank.
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.changes.is_empty() && self.test_plan.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Summary,
    Changes,
    TestPlan,
}

/// Scans `text` line by line, switching the active section on a recognized
/// header line (`## Summary`, `## Changes`, `## Test Plan`, case-insensitive,
/// any run of leading `#`) and appending every other line to whichever
/// section is currently active. Lines before the first header are dropped.
pub fn parse_output(text: &str) -> ParsedOutput {
    let mut current = Section::None;
    let mut summary = String::new();
    let mut changes = String::new();
    let mut test_plan = String::new();

    for line in text.lines() {
        if let Some(section) = match_header(line) {
            current = section;
            continue;
        }
        let buf = match current {
            Section::None => continue,
            Section::Summary => &mut summary,
            Section::Changes => &mut changes,
            Section::TestPlan => &mut test_plan,
        };
        buf.push_str(line);
        buf.push('\n');
    }

    ParsedOutput {
        summary: summary.trim_end().to_string(),
        changes: changes.trim_end().to_string(),
        test_plan: test_plan.trim_end().to_string(),
    }
}

fn match_header(line: &str) -> Option<Section> {
    let trimmed = line.trim();
    if !trimmed.starts_with('#') {
        return None;
    }
    match trimmed.trim_start_matches('#').trim().to_ascii_lowercase().as_str() {
        "summary" => Some(Section::Summary),
        "changes" => Some(Section::Changes),
        "test plan" => Some(Section::TestPlan),
        _ => None,
    }
}

const ERROR_PREFIXES: &[&str] = &["error", "exception", "traceback", "panic"];

/// Reverse-scans `text` for the last line whose lowercase, trimmed form
/// starts with one of `error`, `exception`, `traceback`, `panic`. Returns the
/// empty string when no such line exists.
pub fn extract_error(text: &str) -> String {
    text.lines()
        .rev()
        .find(|line| {
            let lower = line.trim().to_ascii_lowercase();
            ERROR_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
        })
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
