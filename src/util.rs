use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn utc_compact_string(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn sha256_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_atomically(path, |file| {
        serde_json::to_writer_pretty(&mut *file, value)
            .with_context(|| format!("failed to serialize json: {}", path.display()))?;
        file.write_all(b"\n")
            .with_context(|| format!("failed to finalize json file: {}", path.display()))?;
        Ok(())
    })
}

/// One compact JSON object per line.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    write_atomically(path, |file| {
        for record in records {
            serde_json::to_writer(&mut *file, record)
                .with_context(|| format!("failed to serialize jsonl record: {}", path.display()))?;
            file.write_all(b"\n")
                .with_context(|| format!("failed to write jsonl file: {}", path.display()))?;
        }
        Ok(())
    })
}

fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let staging_path = staging_path_for(path);
    let file = File::create(&staging_path)
        .with_context(|| format!("failed to create file: {}", staging_path.display()))?;
    let mut writer = BufWriter::new(file);

    write(&mut writer)?;

    writer
        .flush()
        .with_context(|| format!("failed to flush file: {}", staging_path.display()))?;
    drop(writer);

    fs::rename(&staging_path, path).with_context(|| {
        format!(
            "failed to move {} into place at {}",
            staging_path.display(),
            path.display()
        )
    })
}

fn staging_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|value| value.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
