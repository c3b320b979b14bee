use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OpenFlags};
use tracing::info;

use crate::cli::{LookupArgs, default_db_path};
use crate::model::ChunkRecord;
use crate::store::lookup_chunk;

pub fn run(args: LookupArgs) -> Result<()> {
    let db_path = default_db_path(&args.corpus_root, args.db_path.as_ref());
    if !db_path.exists() {
        bail!(
            "chunk store not found at {}; run ingest first",
            db_path.display()
        );
    }

    let connection = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("failed to open {}", db_path.display()))?;

    let Some(chunk) = lookup_chunk(&connection, &args.chunk_id)? else {
        bail!("chunk not found: {}", args.chunk_id);
    };

    info!(chunk_id = %chunk.chunk_id, level = chunk.level.as_str(), "chunk found");

    if args.json {
        write_json_response(&chunk)
    } else {
        write_text_response(&chunk)
    }
}

fn write_json_response(chunk: &ChunkRecord) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, chunk)
        .context("failed to serialize chunk json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_response(chunk: &ChunkRecord) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Chunk: {}", chunk.chunk_id)?;
    writeln!(
        output,
        "Deal: {}\tDocument: {} ({})",
        chunk.deal_name, chunk.document_display_name, chunk.document_id
    )?;
    writeln!(
        output,
        "Section: {}{}",
        chunk.section_id,
        chunk
            .section_title
            .as_deref()
            .map(|title| format!(" - {title}"))
            .unwrap_or_default()
    )?;
    if let Some(clause_id) = &chunk.clause_id {
        writeln!(
            output,
            "Clause: {}{}",
            clause_id,
            chunk
                .clause_title
                .as_deref()
                .map(|title| format!(" {title}"))
                .unwrap_or_default()
        )?;
    }
    writeln!(
        output,
        "Source: {}\tsha256={}\tchars={}",
        chunk.metadata.source_path, chunk.metadata.file_hash, chunk.metadata.length_chars
    )?;
    writeln!(output)?;
    writeln!(output, "{}", chunk.content)?;

    output.flush()?;
    Ok(())
}
