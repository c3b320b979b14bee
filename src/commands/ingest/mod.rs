use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rayon::prelude::*;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::{IngestArgs, default_db_path};
use crate::commands::inventory::{DealSources, SourceDocument, discover_corpus};
use crate::model::{
    ChunkRecord, DealReport, DealSections, DocumentReport, ParsedDocument, RawDocument, RunCounts,
    RunManifest, RunPaths,
};
use crate::segment::{
    SegmentPatterns, SourceEncoding, build_chunks, decode_document, normalize_text, parse_document,
};
use crate::store::{open_store, replace_document_chunks};
use crate::util::{now_utc_string, sha256_bytes, utc_compact_string, write_json_pretty, write_jsonl};

const TEXT_SOURCE_FORMAT: &str = "txt";

mod batch;
mod output;
mod run;
mod types;

pub use run::run;

pub(crate) use output::{BatchOutcome, DealPaths, build_run_manifest, write_deal_outputs};
pub(crate) use types::{DocumentResult, DocumentStatus};

use batch::*;
