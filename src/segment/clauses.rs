use super::SegmentPatterns;
use super::clean::clean_block;
use crate::model::Clause;

/// Finds clause anchors in a section's raw (uncleaned) text and slices clause bodies.
///
/// Offsets are relative to `raw_section`. Each body runs from the end of its heading line
/// to the start of the next clause heading, or the end of the section.
pub fn extract_clauses(patterns: &SegmentPatterns, raw_section: &str) -> Vec<Clause> {
    let candidates = patterns
        .clause_heading
        .captures_iter(raw_section)
        .filter_map(|captures| {
            let heading = captures.get(0)?;
            let clause_id = captures.get(1)?.as_str().to_string();
            let title = captures
                .get(2)
                .map(|m| m.as_str().trim())
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned);

            Some((heading.start(), heading.end(), clause_id, title))
        })
        .collect::<Vec<_>>();

    // A bare number with no title and nothing before the next candidate is table or list
    // data, not a clause; its line stays in the surrounding text.
    let anchors = candidates
        .iter()
        .enumerate()
        .filter(|(index, (_, heading_end, _, title))| {
            let next_start = candidates
                .get(index + 1)
                .map(|(next_start, ..)| *next_start)
                .unwrap_or(raw_section.len());
            title.is_some()
                || !clean_block(patterns, &raw_section[*heading_end..next_start]).is_empty()
        })
        .map(|(_, anchor)| anchor.clone())
        .collect::<Vec<_>>();

    let mut clauses = Vec::with_capacity(anchors.len());
    for (index, (heading_start, heading_end, clause_id, title)) in anchors.iter().enumerate() {
        let end = anchors
            .get(index + 1)
            .map(|(next_start, ..)| *next_start)
            .unwrap_or(raw_section.len());

        let heading_line = raw_section[*heading_start..*heading_end].trim().to_string();
        let stripped = strip_heading(
            &raw_section[*heading_end..end],
            &heading_line,
            title.as_deref(),
        );
        let cleaned = clean_block(patterns, stripped);
        let body = if cleaned.is_empty() {
            title.clone().unwrap_or_default()
        } else {
            cleaned
        };

        clauses.push(Clause {
            clause_id: clause_id.clone(),
            title: title.clone(),
            heading_line,
            body,
            heading_start: *heading_start,
            start: *heading_end,
            end,
        });
    }

    clauses
}

/// Removes a repeated heading line, then a repeated bare title, from the front of a body.
///
/// A prefix only counts when it ends on a word boundary.
fn strip_heading<'a>(body: &'a str, heading_line: &str, title: Option<&str>) -> &'a str {
    let mut remaining = body.trim();

    if let Some(rest) = strip_word_prefix(remaining, heading_line) {
        remaining = rest.trim_start();
    }

    if let Some(rest) = title.and_then(|title| strip_word_prefix(remaining, title)) {
        remaining = rest.trim_start();
    }

    remaining
}

fn strip_word_prefix<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(prefix)?;
    match rest.chars().next() {
        Some(next) if next.is_alphanumeric() => None,
        _ => Some(rest),
    }
}

/// Cleaned section text with every clause heading and body removed.
pub(super) fn section_summary(
    patterns: &SegmentPatterns,
    raw_section: &str,
    clauses: &[Clause],
) -> String {
    let mut outside = String::with_capacity(raw_section.len());
    let mut cursor = 0usize;

    for clause in clauses {
        if clause.heading_start > cursor {
            outside.push_str(&raw_section[cursor..clause.heading_start]);
        }
        cursor = cursor.max(clause.end);
    }
    if cursor < raw_section.len() {
        outside.push_str(&raw_section[cursor..]);
    }

    clean_block(patterns, &outside)
}
