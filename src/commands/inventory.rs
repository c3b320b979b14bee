use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::InventoryArgs;
use crate::model::{CorpusInventoryManifest, InventoryEntry};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

#[derive(Debug, Clone)]
pub struct DealSources {
    pub deal_name: String,
    pub deal_root: PathBuf,
    pub documents: Vec<SourceDocument>,
}

impl DealSources {
    pub fn processed_dir(&self) -> PathBuf {
        self.deal_root.join("processed")
    }
}

#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub document_id: String,
    pub path: PathBuf,
    pub extension: String,
}

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.corpus_root, args.deal.as_deref())?;

    if args.dry_run {
        info!(
            deal_count = manifest.deal_count,
            document_count = manifest.document_count,
            corpus_root = %manifest.corpus_root,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args.manifest_path.unwrap_or_else(|| {
        args.corpus_root
            .join("manifests")
            .join("corpus_inventory.json")
    });

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(
        deal_count = manifest.deal_count,
        document_count = manifest.document_count,
        "inventory completed"
    );

    Ok(())
}

pub fn build_manifest(corpus_root: &Path, deal: Option<&str>) -> Result<CorpusInventoryManifest> {
    let deals = discover_corpus(corpus_root, deal)?;

    let mut documents = Vec::new();
    for deal in &deals {
        for document in &deal.documents {
            let size_bytes = fs::metadata(&document.path)
                .with_context(|| format!("failed to inspect {}", document.path.display()))?
                .len();
            let filename = document
                .path
                .file_name()
                .and_then(|name| name.to_str())
                .map(ToOwned::to_owned)
                .with_context(|| format!("invalid UTF-8 filename: {}", document.path.display()))?;

            documents.push(InventoryEntry {
                deal_name: deal.deal_name.clone(),
                document_id: document.document_id.clone(),
                filename,
                source_format: document.extension.clone(),
                size_bytes,
                sha256: sha256_file(&document.path)?,
            });
        }
    }

    Ok(CorpusInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        corpus_root: corpus_root.display().to_string(),
        deal_count: deals.len(),
        document_count: documents.len(),
        documents,
    })
}

/// Lists `<corpus_root>/<deal>/raw/*` in lexicographic order, optionally for one deal only.
pub fn discover_corpus(corpus_root: &Path, deal: Option<&str>) -> Result<Vec<DealSources>> {
    if !corpus_root.is_dir() {
        bail!("corpus root is not a directory: {}", corpus_root.display());
    }

    if let Some(deal_name) = deal {
        let deal_root = corpus_root.join(deal_name);
        let raw_dir = deal_root.join("raw");
        if !raw_dir.is_dir() {
            bail!("raw directory missing for deal {deal_name}: {}", raw_dir.display());
        }

        return Ok(vec![DealSources {
            deal_name: deal_name.to_string(),
            documents: discover_documents(&raw_dir)?,
            deal_root,
        }]);
    }

    let mut deals = Vec::new();
    for path in sorted_entries(corpus_root)? {
        if !path.is_dir() {
            continue;
        }

        let Some(deal_name) = path.file_name().and_then(|name| name.to_str()) else {
            warn!(path = %path.display(), "skipping deal directory with non UTF-8 name");
            continue;
        };

        let raw_dir = path.join("raw");
        if !raw_dir.is_dir() {
            if deal_name != "manifests" {
                warn!(deal = %deal_name, path = %raw_dir.display(), "raw directory missing");
            }
            continue;
        }

        deals.push(DealSources {
            deal_name: deal_name.to_string(),
            documents: discover_documents(&raw_dir)?,
            deal_root: path.clone(),
        });
    }

    Ok(deals)
}

fn discover_documents(raw_dir: &Path) -> Result<Vec<SourceDocument>> {
    let mut documents = Vec::new();

    for path in sorted_entries(raw_dir)? {
        if !path.is_file() {
            continue;
        }

        let Some(document_id) = path.file_stem().and_then(|stem| stem.to_str()) else {
            warn!(path = %path.display(), "skipping document with non UTF-8 name");
            continue;
        };

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        documents.push(SourceDocument {
            document_id: document_id.to_string(),
            path: path.clone(),
            extension,
        });
    }

    Ok(documents)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let hidden = entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false);
        if !hidden {
            paths.push(entry.path());
        }
    }

    paths.sort();
    Ok(paths)
}
