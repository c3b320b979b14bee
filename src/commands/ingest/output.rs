use std::path::{Path, PathBuf};

use super::*;

#[derive(Debug, Clone)]
pub(crate) struct DealPaths {
    pub(crate) sections_path: PathBuf,
    pub(crate) chunks_path: PathBuf,
}

impl DealPaths {
    pub(crate) fn for_deal(deal: &DealSources) -> Self {
        let processed = deal.processed_dir();
        Self {
            sections_path: processed.join("sections.json"),
            chunks_path: processed.join("chunks.jsonl"),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct BatchOutcome {
    pub(crate) counts: RunCounts,
    pub(crate) deals: Vec<DealReport>,
    pub(crate) documents: Vec<DocumentReport>,
    pub(crate) warnings: Vec<String>,
    pub(crate) cancelled: bool,
}

impl BatchOutcome {
    pub(crate) fn absorb(&mut self, report: DealReport, results: &[DocumentResult]) {
        add_counts(&mut self.counts, &report.counts);
        self.counts.deals += 1;
        self.documents
            .extend(results.iter().map(DocumentResult::report));
        self.deals.push(report);
    }

    /// Records documents that never ran because the batch was interrupted first.
    pub(crate) fn absorb_cancelled(&mut self, deal: &DealSources) {
        for source in &deal.documents {
            let result = DocumentResult::cancelled(
                &deal.deal_name,
                &source.document_id,
                &display_path(source),
            );
            self.counts.documents += 1;
            self.counts.documents_cancelled += 1;
            self.documents.push(result.report());
        }
    }
}

/// Single writer for one deal: `sections.json`, `chunks.jsonl`, then the chunk store.
///
/// Only documents that finished (succeeded or skipped) contribute; failed and cancelled
/// documents leave previously stored chunks untouched.
pub(crate) fn write_deal_outputs(
    deal_name: &str,
    paths: &DealPaths,
    results: &[DocumentResult],
    write_sections: bool,
    store: Option<&mut Connection>,
    warnings: &mut Vec<String>,
) -> Result<DealReport> {
    let finished = results
        .iter()
        .filter(|result| result.status.is_final())
        .collect::<Vec<&DocumentResult>>();

    if write_sections {
        let sections = finished
            .iter()
            .filter_map(|result| result.parsed.clone())
            .map(|parsed| (parsed.document_id.clone(), parsed))
            .collect::<DealSections>();
        write_json_pretty(&paths.sections_path, &sections)?;
        info!(
            deal = %deal_name,
            documents = sections.len(),
            path = %paths.sections_path.display(),
            "wrote sections"
        );
    }

    let chunks = finished
        .iter()
        .flat_map(|result| result.chunks.iter().cloned())
        .collect::<Vec<ChunkRecord>>();

    let duplicates = duplicate_chunk_ids(&chunks);
    for chunk_id in &duplicates {
        warn!(deal = %deal_name, chunk_id = %chunk_id, "duplicate chunk identifier; last write wins");
        warnings.push(format!("duplicate chunk identifier in deal {deal_name}: {chunk_id}"));
    }

    write_jsonl(&paths.chunks_path, &chunks)?;
    info!(
        deal = %deal_name,
        chunks = chunks.len(),
        path = %paths.chunks_path.display(),
        "wrote chunks"
    );

    if let Some(connection) = store {
        for result in &finished {
            replace_document_chunks(connection, deal_name, &result.document_id, &result.chunks)
                .with_context(|| {
                    format!(
                        "failed to store chunks for {deal_name}/{}",
                        result.document_id
                    )
                })?;
        }
    }

    for result in results {
        if let Some(reason) = result.status.reason() {
            warnings.push(format!(
                "{} {}/{}: {}",
                result.status.as_str(),
                deal_name,
                result.document_id,
                reason
            ));
        }
    }

    let mut counts = tally(results);
    counts.duplicate_chunk_ids = duplicates.len();

    Ok(DealReport {
        deal_name: deal_name.to_string(),
        sections_path: paths.sections_path.display().to_string(),
        chunks_path: paths.chunks_path.display().to_string(),
        counts,
    })
}

pub(crate) fn duplicate_chunk_ids(chunks: &[ChunkRecord]) -> Vec<String> {
    let mut seen = HashSet::<&str>::new();
    let mut duplicates = Vec::<String>::new();

    for chunk in chunks {
        if !seen.insert(chunk.chunk_id.as_str()) && !duplicates.contains(&chunk.chunk_id) {
            duplicates.push(chunk.chunk_id.clone());
        }
    }

    duplicates
}

pub(crate) fn tally(results: &[DocumentResult]) -> RunCounts {
    let mut counts = RunCounts {
        documents: results.len(),
        ..RunCounts::default()
    };

    for result in results {
        match result.status {
            DocumentStatus::Succeeded => counts.documents_succeeded += 1,
            DocumentStatus::Skipped { .. } => counts.documents_skipped += 1,
            DocumentStatus::Failed { .. } => counts.documents_failed += 1,
            DocumentStatus::Cancelled => counts.documents_cancelled += 1,
        }

        if let Some(parsed) = &result.parsed {
            counts.sections += parsed.sections.len();
            counts.clauses += parsed
                .sections
                .iter()
                .map(|section| section.clauses.len())
                .sum::<usize>();
        }

        for chunk in &result.chunks {
            match chunk.level {
                crate::model::ChunkLevel::Section => counts.section_chunks += 1,
                crate::model::ChunkLevel::Clause => counts.clause_chunks += 1,
            }
        }
        counts.chunks += result.chunks.len();
    }

    counts
}

fn add_counts(total: &mut RunCounts, deal: &RunCounts) {
    total.documents += deal.documents;
    total.documents_succeeded += deal.documents_succeeded;
    total.documents_skipped += deal.documents_skipped;
    total.documents_failed += deal.documents_failed;
    total.documents_cancelled += deal.documents_cancelled;
    total.sections += deal.sections;
    total.clauses += deal.clauses;
    total.section_chunks += deal.section_chunks;
    total.clause_chunks += deal.clause_chunks;
    total.chunks += deal.chunks;
    total.duplicate_chunk_ids += deal.duplicate_chunk_ids;
}

pub(crate) fn build_run_manifest(
    kind: &str,
    run_id: &str,
    started_at: String,
    command: String,
    corpus_root: &Path,
    db_path: &Path,
    outcome: BatchOutcome,
) -> RunManifest {
    RunManifest {
        manifest_version: 1,
        run_id: run_id.to_string(),
        kind: kind.to_string(),
        status: if outcome.cancelled {
            "cancelled".to_string()
        } else {
            "completed".to_string()
        },
        started_at,
        updated_at: now_utc_string(),
        command,
        paths: RunPaths {
            corpus_root: corpus_root.display().to_string(),
            manifest_dir: corpus_root.join("manifests").display().to_string(),
            db_path: db_path.display().to_string(),
        },
        counts: outcome.counts,
        deals: outcome.deals,
        documents: outcome.documents,
        warnings: outcome.warnings,
    }
}
