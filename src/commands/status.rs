use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::{info, warn};

use crate::cli::{StatusArgs, default_db_path};
use crate::model::{CorpusInventoryManifest, RunManifest};
use crate::store::chunk_counts_by_deal;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.corpus_root.join("manifests");
    let inventory_path = manifest_dir.join("corpus_inventory.json");
    let db_path = default_db_path(&args.corpus_root, args.db_path.as_ref());

    info!(corpus_root = %args.corpus_root.display(), "status requested");

    match latest_run_manifest(&manifest_dir)? {
        Some((path, manifest)) => {
            info!(
                path = %path.display(),
                run_id = %manifest.run_id,
                kind = %manifest.kind,
                status = %manifest.status,
                started_at = %manifest.started_at,
                updated_at = %manifest.updated_at,
                deals = manifest.counts.deals,
                documents = manifest.counts.documents,
                succeeded = manifest.counts.documents_succeeded,
                skipped = manifest.counts.documents_skipped,
                failed = manifest.counts.documents_failed,
                cancelled = manifest.counts.documents_cancelled,
                chunks = manifest.counts.chunks,
                duplicate_chunk_ids = manifest.counts.duplicate_chunk_ids,
                warnings = manifest.warnings.len(),
                "loaded latest run manifest"
            );
        }
        None => warn!(path = %manifest_dir.display(), "no run manifest found"),
    }

    if inventory_path.exists() {
        let raw = fs::read(&inventory_path)
            .with_context(|| format!("failed to read {}", inventory_path.display()))?;
        let inventory: CorpusInventoryManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", inventory_path.display()))?;

        info!(
            generated_at = %inventory.generated_at,
            deal_count = inventory.deal_count,
            document_count = inventory.document_count,
            "loaded inventory manifest"
        );
    } else {
        warn!(path = %inventory_path.display(), "inventory manifest missing");
    }

    if db_path.exists() {
        let connection = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        let counts = chunk_counts_by_deal(&connection)?;
        let total = counts.iter().map(|(_, count)| count).sum::<i64>();

        for (deal_name, chunks) in &counts {
            info!(deal = %deal_name, chunks = chunks, "stored chunks");
        }
        info!(path = %db_path.display(), deals = counts.len(), chunks = total, "chunk store status");
    } else {
        warn!(path = %db_path.display(), "chunk store missing");
    }

    Ok(())
}

/// Most recently updated `ingest_run_*` or `chunk_run_*` manifest.
fn latest_run_manifest(manifest_dir: &Path) -> Result<Option<(PathBuf, RunManifest)>> {
    if !manifest_dir.is_dir() {
        return Ok(None);
    }

    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;

    let mut latest: Option<(PathBuf, RunManifest)> = None;
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?
            .path();
        let is_run_manifest = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.contains("_run_") && name.ends_with(".json"));
        if !is_run_manifest {
            continue;
        }

        let raw = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        let manifest = match serde_json::from_slice::<RunManifest>(&raw) {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable run manifest");
                continue;
            }
        };

        let newer = latest
            .as_ref()
            .is_none_or(|(_, current)| manifest.updated_at > current.updated_at);
        if newer {
            latest = Some((path, manifest));
        }
    }

    Ok(latest)
}
