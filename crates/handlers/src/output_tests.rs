use super::*;

#[test]
fn parses_the_three_sections() {
    let input = "## Summary\nDid a thing.\n## Changes\n- a.go: edit\n## Test Plan\nrun tests\n";
    let parsed = parse_output(input);
    assert_eq!(parsed.summary, "Did a thing.");
    assert_eq!(parsed.changes, "- a.go: edit");
    assert_eq!(parsed.test_plan, "run tests");
}

#[test]
fn multi_line_sections_are_joined_and_trailing_whitespace_stripped() {
    let input = "## Summary\nline one\nline two\n\n## Changes\n- x\n- y\n";
    let parsed = parse_output(input);
    assert_eq!(parsed.summary, "line one\nline two");
    assert_eq!(parsed.changes, "- x\n- y");
}

#[test]
fn lines_before_the_first_header_are_dropped() {
    let input = "preamble\n## Summary\nbody\n";
    let parsed = parse_output(input);
    assert_eq!(parsed.summary, "body");
}

#[test]
fn unrecognized_header_is_not_a_section_switch() {
    let input = "## Summary\nkeep\n## Notes\nignored content\n";
    let parsed = parse_output(input);
    assert_eq!(parsed.summary, "keep");
}

#[test]
fn extract_error_finds_the_last_matching_line() {
    assert_eq!(extract_error("ok\npanic: nil deref\ndone"), "panic: nil deref");
}

#[test]
fn extract_error_returns_empty_when_nothing_matches() {
    assert_eq!(extract_error("all good\nnothing to see"), "");
}

#[test]
fn extract_error_prefers_the_last_of_several_matches() {
    let input = "error: first\nworking...\nexception: second";
    assert_eq!(extract_error(input), "exception: second");
}

#[test]
fn is_empty_is_true_only_when_every_section_is_blank() {
    assert!(ParsedOutput::default().is_empty());
    assert!(!parse_output("## Summary\nDid a thing.\n").is_empty());
    assert!(parse_output("preamble with no recognized header\n").is_empty());
}
