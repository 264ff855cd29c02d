//! Inline diagnostic suppression via `# robotcode: ignore` comments.
//!
//! A diagnostic is dropped when any source line covered by its range ends in
//! a trailing comment carrying the pragma. The `#` must be preceded by
//! start-of-line whitespace, a tab run, or at least two spaces, matching how
//! Robot Framework separates trailing comments from cell content.

use once_cell::sync::Lazy;
use regex::Regex;

use robotcode_text::Range;

static EXTRACT_COMMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".*(?:^ *|\t+| {2,})#(?P<comment>.*)$").expect("valid comment pattern"));

static ROBOTCODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\brobotcode\b\s*:\s*(?P<rule>\b\w+\b)").expect("valid pragma pattern")
});

/// The trailing comment body of `line`, if the line has one.
fn trailing_comment(line: &str) -> Option<&str> {
    EXTRACT_COMMENT_PATTERN
        .captures(line)
        .and_then(|captures| captures.name("comment"))
        .map(|comment| comment.as_str())
        .filter(|comment| !comment.is_empty())
}

/// Whether a comment body contains the `robotcode: ignore` pragma.
fn has_ignore_pragma(comment: &str) -> bool {
    ROBOTCODE_PATTERN
        .captures_iter(comment)
        .any(|captures| &captures["rule"] == "ignore")
}

/// Whether a diagnostic spanning `range` is suppressed by a pragma on any
/// covered line. Lines past the end of the snapshot are ignored.
pub fn is_suppressed(lines: &[String], range: Range) -> bool {
    (range.start.line..=range.end.line)
        .filter_map(|line_no| lines.get(line_no as usize))
        .any(|line| trailing_comment(line).is_some_and(has_ignore_pragma))
}
