use super::*;

pub fn run(args: IngestArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let corpus_root = args.corpus_root.clone();
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        corpus_root.join("manifests").join(format!(
            "ingest_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });
    let db_path = default_db_path(&corpus_root, args.db_path.as_ref());

    info!(
        corpus_root = %corpus_root.display(),
        run_id = %run_id,
        workers = args.workers,
        "starting ingest"
    );

    let deals = discover_corpus(&corpus_root, args.deal.as_deref())?;
    let patterns = SegmentPatterns::new()?;
    let pool = build_worker_pool(args.workers)?;

    let cancel = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(Arc::clone(&cancel));

    let mut store = if args.skip_store {
        None
    } else {
        Some(open_store(&db_path)?)
    };

    let outcome = ingest_deals(&deals, &patterns, &pool, &cancel, store.as_mut())?;

    let manifest = build_run_manifest(
        "ingest",
        &run_id,
        started_at,
        render_ingest_command(&args),
        &corpus_root,
        &db_path,
        outcome,
    );
    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote ingest run manifest");
    info!(
        run_id = %manifest.run_id,
        status = %manifest.status,
        deals = manifest.counts.deals,
        documents = manifest.counts.documents,
        succeeded = manifest.counts.documents_succeeded,
        skipped = manifest.counts.documents_skipped,
        failed = manifest.counts.documents_failed,
        cancelled = manifest.counts.documents_cancelled,
        chunks = manifest.counts.chunks,
        "ingest completed"
    );

    Ok(())
}

/// Segments deal by deal; the worker pool fans out over one deal's documents and this
/// thread is the only writer of that deal's outputs.
pub(super) fn ingest_deals(
    deals: &[DealSources],
    patterns: &SegmentPatterns,
    pool: &rayon::ThreadPool,
    cancel: &AtomicBool,
    mut store: Option<&mut Connection>,
) -> Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();

    for deal in deals {
        if cancel.load(Ordering::SeqCst) {
            warn!(deal = %deal.deal_name, "batch cancelled before deal started; outputs left as-is");
            outcome.cancelled = true;
            outcome.absorb_cancelled(deal);
            continue;
        }

        info!(
            deal = %deal.deal_name,
            documents = deal.documents.len(),
            "segmenting deal"
        );

        let results = segment_deal(pool, patterns, deal, cancel);
        if results
            .iter()
            .any(|result| result.status == DocumentStatus::Cancelled)
        {
            outcome.cancelled = true;
        }

        let paths = DealPaths::for_deal(deal);
        let report = write_deal_outputs(
            &deal.deal_name,
            &paths,
            &results,
            true,
            store.as_deref_mut(),
            &mut outcome.warnings,
        )
        .with_context(|| format!("failed to write outputs for deal {}", deal.deal_name))?;

        outcome.absorb(report, &results);
    }

    Ok(outcome)
}

pub(super) fn render_ingest_command(args: &IngestArgs) -> String {
    let mut command = vec![
        "dealchunk".to_string(),
        "ingest".to_string(),
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
    command.push("--workers".to_string());
    command.push(args.workers.to_string());
    if args.skip_store {
        command.push("--skip-store".to_string());
    }

    command.join(" ")
}
