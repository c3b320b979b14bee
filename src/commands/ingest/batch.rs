use super::*;

pub(super) fn build_worker_pool(workers: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|index| format!("segment-{index}"))
        .build()
        .context("failed to build document worker pool")
}

pub(super) fn install_interrupt_handler(cancel: Arc<AtomicBool>) {
    let result = ctrlc::set_handler(move || {
        if !cancel.swap(true, Ordering::SeqCst) {
            warn!("interrupt received; finishing documents already in progress");
        }
    });

    if let Err(err) = result {
        warn!(error = %err, "failed to install interrupt handler");
    }
}

/// Segments every document of one deal on the worker pool, in document order.
///
/// Each document is independent; a failure is recorded on its own result and never
/// stops the others. Documents not yet started when `cancel` is set come back cancelled.
pub(super) fn segment_deal(
    pool: &rayon::ThreadPool,
    patterns: &SegmentPatterns,
    deal: &DealSources,
    cancel: &AtomicBool,
) -> Vec<DocumentResult> {
    pool.install(|| {
        deal.documents
            .par_iter()
            .map(|source| {
                if cancel.load(Ordering::SeqCst) {
                    return DocumentResult::cancelled(
                        &deal.deal_name,
                        &source.document_id,
                        &display_path(source),
                    );
                }
                segment_source(patterns, &deal.deal_name, source)
            })
            .collect()
    })
}

pub(super) fn segment_source(
    patterns: &SegmentPatterns,
    deal_name: &str,
    source: &SourceDocument,
) -> DocumentResult {
    match load_document(deal_name, source) {
        Ok(document) => {
            let parsed = parse_document(patterns, &document);
            DocumentResult::from_parsed(&document.deal_name, parsed)
        }
        Err(err) => {
            DocumentResult::failed(deal_name, &source.document_id, &display_path(source), &err)
        }
    }
}

fn load_document(deal_name: &str, source: &SourceDocument) -> Result<RawDocument> {
    match source.extension.as_str() {
        TEXT_SOURCE_FORMAT => load_text_document(deal_name, source),
        other => bail!("unsupported source format '{other}'"),
    }
}

fn load_text_document(deal_name: &str, source: &SourceDocument) -> Result<RawDocument> {
    let bytes = fs::read(&source.path)
        .with_context(|| format!("failed to read {}", source.path.display()))?;
    let file_hash = sha256_bytes(&bytes);

    let (decoded, encoding) = decode_document(&bytes)
        .with_context(|| format!("failed to decode {}", source.path.display()))?;
    if encoding != SourceEncoding::Utf8 {
        warn!(
            path = %source.path.display(),
            encoding = encoding.as_str(),
            "utf-8 decoding failed; used fallback encoding"
        );
    }

    Ok(RawDocument {
        deal_name: deal_name.to_string(),
        document_id: source.document_id.clone(),
        source_path: display_path(source),
        source_format: TEXT_SOURCE_FORMAT.to_string(),
        file_hash,
        text: normalize_text(&decoded),
    })
}

pub(super) fn display_path(source: &SourceDocument) -> String {
    source.path.display().to_string().replace('\\', "/")
}
