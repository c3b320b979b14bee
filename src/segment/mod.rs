//! Section/clause segmentation and chunk identity.
//!
//! The stages run in a fixed order per document: decode and normalize, find
//! section anchors, find clause anchors inside each raw section span, clean
//! the sliced text, then derive identifiers and flatten into chunks. Noise
//! cleaning only ever sees text whose anchors have already been located.

use anyhow::{Context, Result};
use regex::Regex;

use crate::model::{ParsedDocument, RawDocument, Section};

mod assemble;
mod clauses;
mod clean;
mod ids;
mod normalize;
mod sections;
#[cfg(test)]
mod tests;

pub use assemble::build_chunks;
pub use normalize::{SourceEncoding, decode_document, normalize_text};

use clauses::extract_clauses;
use sections::extract_sections;

/// Compiled pattern set shared read-only by every document worker.
#[derive(Debug)]
pub struct SegmentPatterns {
    section_heading: Regex,
    clause_heading: Regex,
    separator_line: Regex,
    blank_run: Regex,
}

impl SegmentPatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            section_heading: Regex::new(
                r"(?im)^[ \t]*(section[ \t]+\d+(?:\.\d+)*)[ \t]*(?:[-–—:][ \t]*(.*?))?[ \t]*$",
            )
            .context("failed to compile section heading regex")?,
            clause_heading: Regex::new(
                r"(?m)^[ \t]*(\d+(?:\.\d+)+(?:\([A-Za-z]\))?)\.?(?:[ \t]+(.*?))?[ \t]*$",
            )
            .context("failed to compile clause heading regex")?,
            separator_line: Regex::new(r"(?m)^[ \t]*[-_=]{5,}[ \t]*(?:\n|$)")
                .context("failed to compile separator line regex")?,
            blank_run: Regex::new(r"\n(?:[ \t]*\n){2,}")
                .context("failed to compile blank run regex")?,
        })
    }
}

/// Slices normalized text into sections, each carrying its clauses and cleaned summary.
pub fn segment_text(patterns: &SegmentPatterns, text: &str) -> Vec<Section> {
    extract_sections(patterns, text)
        .into_iter()
        .map(|span| {
            let raw_text = span.raw(text);
            let clauses = extract_clauses(patterns, raw_text);
            let summary = clauses::section_summary(patterns, raw_text, &clauses);

            Section {
                section_id: span.section_id,
                title: span.title,
                position: span.position,
                heading_start: span.heading_start,
                start: span.start,
                end: span.end,
                raw_text: raw_text.to_string(),
                summary,
                clauses,
            }
        })
        .collect()
}

pub fn parse_document(patterns: &SegmentPatterns, document: &RawDocument) -> ParsedDocument {
    ParsedDocument {
        document_id: document.document_id.clone(),
        source_path: document.source_path.clone(),
        source_format: document.source_format.clone(),
        file_hash: document.file_hash.clone(),
        sections: segment_text(patterns, &document.text),
    }
}
