pub const CHUNK_NAMESPACE: &str = "DC";

const SECTION_KEYWORD: &str = "SECTION";
const CLAUSE_MARKER: &str = "CLAUSE";
const NUMERIC_WIDTH: usize = 3;

/// Replaces whitespace and every dash variant with `_`.
pub fn sanitize_token(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_whitespace() || is_dash_like(ch) {
                '_'
            } else {
                ch
            }
        })
        .collect()
}

fn is_dash_like(ch: char) -> bool {
    matches!(
        ch,
        '-' | '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{fe58}' | '\u{fe63}' | '\u{ff0d}'
    )
}

/// `"SECTION 3"` -> `"SECTION_003"`, `"Section 4.2(a)"` -> `"SECTION_004_002_a"`.
pub fn normalize_section(section_id: &str) -> String {
    let trimmed = section_id.trim();
    let without_keyword = match trimmed.get(..SECTION_KEYWORD.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(SECTION_KEYWORD) => {
            &trimmed[SECTION_KEYWORD.len()..]
        }
        _ => trimmed,
    };

    let parts = without_keyword
        .split(|ch: char| matches!(ch, '.' | '(' | ')') || ch.is_whitespace() || is_dash_like(ch))
        .filter(|part| !part.is_empty())
        .map(|part| {
            if part.chars().all(|ch| ch.is_ascii_digit()) {
                format!("{:0>width$}", part, width = NUMERIC_WIDTH)
            } else {
                sanitize_token(part)
            }
        })
        .collect::<Vec<String>>();

    if parts.is_empty() {
        return SECTION_KEYWORD.to_string();
    }

    format!("{SECTION_KEYWORD}_{}", parts.join("_"))
}

pub fn section_chunk_id(deal_name: &str, document_id: &str, normalized_section: &str) -> String {
    format!(
        "{CHUNK_NAMESPACE}_{}_{}_{}",
        sanitize_token(deal_name),
        sanitize_token(document_id),
        normalized_section
    )
}

pub fn clause_chunk_id(
    deal_name: &str,
    document_id: &str,
    normalized_section: &str,
    clause_id: &str,
) -> String {
    format!(
        "{}_{CLAUSE_MARKER}_{}",
        section_chunk_id(deal_name, document_id, normalized_section),
        sanitize_token(clause_id)
    )
}

/// `"credit_agreement"` -> `"Credit Agreement"`, `"o'neil_side_letter"` -> `"O'Neil Side Letter"`.
///
/// A letter is upper-cased when it follows a non-letter and lower-cased otherwise.
pub fn document_display_name(document_id: &str) -> String {
    let spaced = document_id
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ");

    let mut display = String::with_capacity(spaced.len());
    let mut after_letter = false;
    for ch in spaced.chars() {
        if ch.is_alphabetic() {
            if after_letter {
                display.extend(ch.to_lowercase());
            } else {
                display.extend(ch.to_uppercase());
            }
            after_letter = true;
        } else {
            display.push(ch);
            after_letter = false;
        }
    }

    display
}
