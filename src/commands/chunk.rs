use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::{ChunkArgs, default_db_path};
use crate::commands::ingest::{
    BatchOutcome, DealPaths, DocumentResult, build_run_manifest, write_deal_outputs,
};
use crate::commands::inventory::{DealSources, discover_corpus};
use crate::model::DealSections;
use crate::store::open_store;
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty};

pub fn run(args: ChunkArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let corpus_root = args.corpus_root.clone();
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        corpus_root.join("manifests").join(format!(
            "chunk_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });
    let db_path = default_db_path(&corpus_root, args.db_path.as_ref());

    info!(corpus_root = %corpus_root.display(), run_id = %run_id, "starting re-chunk");

    let deals = discover_corpus(&corpus_root, args.deal.as_deref())?;
    let mut store = if args.skip_store {
        None
    } else {
        Some(open_store(&db_path)?)
    };

    let outcome = rechunk_deals(&deals, store.as_mut())?;

    let manifest = build_run_manifest(
        "chunk",
        &run_id,
        started_at,
        render_chunk_command(&args),
        &corpus_root,
        &db_path,
        outcome,
    );
    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote chunk run manifest");
    info!(
        run_id = %manifest.run_id,
        deals = manifest.counts.deals,
        documents = manifest.counts.documents,
        chunks = manifest.counts.chunks,
        "re-chunk completed"
    );

    Ok(())
}

/// Rebuilds each deal's chunk stream from its persisted `sections.json`.
fn rechunk_deals(deals: &[DealSources], mut store: Option<&mut Connection>) -> Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();

    for deal in deals {
        let paths = DealPaths::for_deal(deal);
        if !paths.sections_path.exists() {
            warn!(
                deal = %deal.deal_name,
                path = %paths.sections_path.display(),
                "sections.json missing; run ingest first"
            );
            outcome.warnings.push(format!(
                "sections missing for deal {}: {}",
                deal.deal_name,
                paths.sections_path.display()
            ));
            continue;
        }

        let sections = load_deal_sections(&paths.sections_path)?;
        let results = sections
            .into_values()
            .map(|parsed| DocumentResult::from_parsed(&deal.deal_name, parsed))
            .collect::<Vec<_>>();

        let report = write_deal_outputs(
            &deal.deal_name,
            &paths,
            &results,
            false,
            store.as_deref_mut(),
            &mut outcome.warnings,
        )
        .with_context(|| format!("failed to write chunks for deal {}", deal.deal_name))?;

        outcome.absorb(report, &results);
    }

    Ok(outcome)
}

fn load_deal_sections(path: &Path) -> Result<DealSections> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn render_chunk_command(args: &ChunkArgs) -> String {
    let mut command = vec![
        "dealchunk".to_string(),
        "chunk".to_string(),
        "--corpus-root".to_string(),
        args.corpus_root.display().to_string(),
    ];

    if let Some(deal) = &args.deal {
        command.push("--deal".to_string());
        command.push(deal.clone());
    }
    if let Some(path) = &args.db_path {
        command.push("--db-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if args.skip_store {
        command.push("--skip-store".to_string());
    }

    command.join(" ")
}
