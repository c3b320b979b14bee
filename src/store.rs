use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::model::ChunkRecord;
use crate::util::now_utc_string;

pub const STORE_SCHEMA_VERSION: &str = "0.1.0";

pub fn open_store(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        crate::util::ensure_directory(parent)?;
    }

    let connection = Connection::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chunks (
          chunk_id TEXT PRIMARY KEY,
          deal_name TEXT NOT NULL,
          document_id TEXT NOT NULL,
          level TEXT NOT NULL,
          section_id TEXT NOT NULL,
          normalized_section TEXT NOT NULL,
          clause_id TEXT,
          content TEXT NOT NULL,
          file_hash TEXT NOT NULL,
          record_json TEXT NOT NULL,
          updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_document
          ON chunks(deal_name, document_id);
        ",
        )
        .context("failed to create chunk store schema")?;

    connection.execute(
        "
        INSERT INTO metadata(key, value) VALUES('schema_version', ?1)
        ON CONFLICT(key) DO UPDATE SET value=excluded.value
        ",
        [STORE_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// Drops the document's previous rows and upserts the new chunk set in one transaction.
///
/// Rows are keyed on `chunk_id`; when two chunks share an identifier the later one wins.
pub fn replace_document_chunks(
    connection: &mut Connection,
    deal_name: &str,
    document_id: &str,
    chunks: &[ChunkRecord],
) -> Result<usize> {
    let tx = connection.transaction()?;
    tx.execute(
        "DELETE FROM chunks WHERE deal_name = ?1 AND document_id = ?2",
        params![deal_name, document_id],
    )?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO chunks(
              chunk_id, deal_name, document_id, level, section_id, normalized_section,
              clause_id, content, file_hash, record_json, updated_at
            )
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(chunk_id) DO UPDATE SET
              deal_name=excluded.deal_name,
              document_id=excluded.document_id,
              level=excluded.level,
              section_id=excluded.section_id,
              normalized_section=excluded.normalized_section,
              clause_id=excluded.clause_id,
              content=excluded.content,
              file_hash=excluded.file_hash,
              record_json=excluded.record_json,
              updated_at=excluded.updated_at
            ",
        )?;

        let updated_at = now_utc_string();
        for chunk in chunks {
            let record_json = serde_json::to_string(chunk)
                .with_context(|| format!("failed to serialize chunk {}", chunk.chunk_id))?;
            statement.execute(params![
                chunk.chunk_id,
                chunk.deal_name,
                chunk.document_id,
                chunk.level.as_str(),
                chunk.section_id,
                chunk.normalized_section,
                chunk.clause_id,
                chunk.content,
                chunk.metadata.file_hash,
                record_json,
                updated_at,
            ])?;
        }
    }

    tx.commit()?;
    Ok(chunks.len())
}

pub fn lookup_chunk(connection: &Connection, chunk_id: &str) -> Result<Option<ChunkRecord>> {
    let record_json = connection
        .query_row(
            "SELECT record_json FROM chunks WHERE chunk_id = ?1 LIMIT 1",
            [chunk_id],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .with_context(|| format!("failed to look up chunk {chunk_id}"))?;

    record_json
        .map(|raw| {
            serde_json::from_str::<ChunkRecord>(&raw)
                .with_context(|| format!("failed to parse stored chunk {chunk_id}"))
        })
        .transpose()
}

pub fn chunk_counts_by_deal(connection: &Connection) -> Result<Vec<(String, i64)>> {
    let mut statement = connection.prepare(
        "
        SELECT deal_name, COUNT(*)
        FROM chunks
        GROUP BY deal_name
        ORDER BY deal_name ASC
        ",
    )?;

    let mut rows = statement.query([])?;
    let mut out = Vec::<(String, i64)>::new();
    while let Some(row) = rows.next()? {
        out.push((row.get(0)?, row.get(1)?));
    }

    Ok(out)
}
