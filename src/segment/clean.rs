use super::SegmentPatterns;

/// Drops decorative separator lines and collapses runs of blank lines to one.
///
/// Idempotent; never touches characters outside separator lines and blank runs.
pub fn clean_block(patterns: &SegmentPatterns, text: &str) -> String {
    let without_separators = patterns.separator_line.replace_all(text, "");
    let collapsed = patterns
        .blank_run
        .replace_all(&without_separators, "\n\n");

    collapsed.trim().to_string()
}
