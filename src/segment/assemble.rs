use anyhow::{Result, bail};

use super::ids::{clause_chunk_id, document_display_name, normalize_section, section_chunk_id};
use crate::model::{ChunkLevel, ChunkMetadata, ChunkRecord, ParsedDocument};

const ORIGIN_SECTION: &str = "section_no_clauses";
const ORIGIN_CLAUSE: &str = "clause";

/// Flattens a parsed document into one chunk per leaf.
///
/// A section without clauses yields a single section-level chunk; a section with clauses
/// yields exactly one chunk per clause and no section-level chunk. Every chunk's
/// `parent_section` is the owning section's normalized identifier.
pub fn build_chunks(deal_name: &str, document: &ParsedDocument) -> Result<Vec<ChunkRecord>> {
    let display_name = document_display_name(&document.document_id);
    let mut chunks = Vec::new();

    for section in &document.sections {
        let normalized_section = normalize_section(&section.section_id);

        if section.clauses.is_empty() {
            let content = if section.summary.is_empty() {
                section.title.clone().unwrap_or_default()
            } else {
                section.summary.clone()
            };

            let draft = ChunkRecord {
                chunk_id: section_chunk_id(deal_name, &document.document_id, &normalized_section),
                level: ChunkLevel::Section,
                deal_name: deal_name.to_string(),
                document_id: document.document_id.clone(),
                document_display_name: display_name.clone(),
                section_id: section.section_id.clone(),
                normalized_section: normalized_section.clone(),
                section_title: section.title.clone(),
                clause_id: None,
                clause_title: None,
                metadata: chunk_metadata(document, ORIGIN_SECTION, &normalized_section, &content),
                content,
            };
            chunks.push(validated(draft)?);
            continue;
        }

        for clause in &section.clauses {
            let content = clause.body.clone();
            let draft = ChunkRecord {
                chunk_id: clause_chunk_id(
                    deal_name,
                    &document.document_id,
                    &normalized_section,
                    &clause.clause_id,
                ),
                level: ChunkLevel::Clause,
                deal_name: deal_name.to_string(),
                document_id: document.document_id.clone(),
                document_display_name: display_name.clone(),
                section_id: section.section_id.clone(),
                normalized_section: normalized_section.clone(),
                section_title: section.title.clone(),
                clause_id: Some(clause.clause_id.clone()),
                clause_title: clause.title.clone(),
                metadata: chunk_metadata(document, ORIGIN_CLAUSE, &normalized_section, &content),
                content,
            };
            chunks.push(validated(draft)?);
        }
    }

    Ok(chunks)
}

fn chunk_metadata(
    document: &ParsedDocument,
    origin: &str,
    parent_section: &str,
    content: &str,
) -> ChunkMetadata {
    ChunkMetadata {
        origin: origin.to_string(),
        parent_section: parent_section.to_string(),
        source_format: document.source_format.clone(),
        file_hash: document.file_hash.clone(),
        source_path: document.source_path.clone(),
        length_chars: content.chars().count(),
    }
}

/// Rejects records that break the chunk contract.
fn validated(chunk: ChunkRecord) -> Result<ChunkRecord> {
    if chunk.content.trim().is_empty() {
        bail!(
            "chunk {} ({}) would be emitted with empty content",
            chunk.chunk_id,
            chunk.level.as_str()
        );
    }
    if chunk.deal_name.trim().is_empty() || chunk.document_id.trim().is_empty() {
        bail!(
            "chunk {} is missing its deal or document identifier",
            chunk.chunk_id
        );
    }
    if chunk.metadata.file_hash.is_empty() {
        bail!("chunk {} is missing its source file hash", chunk.chunk_id);
    }

    Ok(chunk)
}
