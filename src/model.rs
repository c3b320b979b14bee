use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A document as loaded from disk, after decoding and line-ending normalization.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub deal_name: String,
    pub document_id: String,
    pub source_path: String,
    pub source_format: String,
    pub file_hash: String,
    pub text: String,
}

/// Top-level division of a document. Offsets index into the normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub section_id: String,
    pub title: Option<String>,
    pub position: usize,
    pub heading_start: usize,
    pub start: usize,
    pub end: usize,
    pub raw_text: String,
    /// Cleaned text outside every clause span; the retrieval text of a clauseless section.
    pub summary: String,
    pub clauses: Vec<Clause>,
}

/// Numbered sub-division of a section. Offsets index into the owning section's raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub clause_id: String,
    pub title: Option<String>,
    pub heading_line: String,
    pub body: String,
    pub heading_start: usize,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub document_id: String,
    pub source_path: String,
    pub source_format: String,
    pub file_hash: String,
    pub sections: Vec<Section>,
}

/// Per-deal intermediate structure, persisted as `processed/sections.json`.
pub type DealSections = BTreeMap<String, ParsedDocument>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkLevel {
    Section,
    Clause,
}

impl ChunkLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ChunkLevel::Section => "section",
            ChunkLevel::Clause => "clause",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub origin: String,
    pub parent_section: String,
    pub source_format: String,
    pub file_hash: String,
    pub source_path: String,
    pub length_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub chunk_id: String,
    pub level: ChunkLevel,
    pub deal_name: String,
    pub document_id: String,
    pub document_display_name: String,
    pub section_id: String,
    pub normalized_section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clause_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clause_title: Option<String>,
    pub content: String,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub deal_name: String,
    pub document_id: String,
    pub filename: String,
    pub source_format: String,
    pub size_bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub corpus_root: String,
    pub deal_count: usize,
    pub document_count: usize,
    pub documents: Vec<InventoryEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunCounts {
    pub deals: usize,
    pub documents: usize,
    pub documents_succeeded: usize,
    pub documents_skipped: usize,
    pub documents_failed: usize,
    pub documents_cancelled: usize,
    pub sections: usize,
    pub clauses: usize,
    pub section_chunks: usize,
    pub clause_chunks: usize,
    pub chunks: usize,
    pub duplicate_chunk_ids: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealReport {
    pub deal_name: String,
    pub sections_path: String,
    pub chunks_path: String,
    pub counts: RunCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    pub deal_name: String,
    pub document_id: String,
    pub source_path: String,
    pub status: String,
    pub reason: Option<String>,
    pub section_count: usize,
    pub chunk_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPaths {
    pub corpus_root: String,
    pub manifest_dir: String,
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub kind: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub paths: RunPaths,
    pub counts: RunCounts,
    pub deals: Vec<DealReport>,
    pub documents: Vec<DocumentReport>,
    pub warnings: Vec<String>,
}
