use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "dealchunk",
    version,
    about = "Contract segmentation and chunk identity tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hash and list every deal document.
    Inventory(InventoryArgs),
    /// Segment raw documents into sections, clauses and chunks.
    Ingest(IngestArgs),
    /// Rebuild chunks from persisted sections.json without re-reading raw text.
    Chunk(ChunkArgs),
    /// Print one chunk record by identifier.
    Lookup(LookupArgs),
    /// Drop answers whose citations fall outside the retrieved chunk set.
    Ground(GroundArgs),
    /// Report the latest run manifest and stored chunk counts.
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = "data/deals")]
    pub corpus_root: PathBuf,

    #[arg(long)]
    pub deal: Option<String>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long, default_value = "data/deals")]
    pub corpus_root: PathBuf,

    #[arg(long)]
    pub deal: Option<String>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = 4)]
    pub workers: usize,

    #[arg(long, default_value_t = false)]
    pub skip_store: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ChunkArgs {
    #[arg(long, default_value = "data/deals")]
    pub corpus_root: PathBuf,

    #[arg(long)]
    pub deal: Option<String>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub skip_store: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    #[arg(long, default_value = "data/deals")]
    pub corpus_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    pub chunk_id: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GroundArgs {
    /// JSON file holding `{ "answer": ..., "citations": [...] }`.
    #[arg(long)]
    pub answer_path: PathBuf,

    #[arg(long = "retrieved")]
    pub retrieved: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "data/deals")]
    pub corpus_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

pub fn default_db_path(corpus_root: &std::path::Path, db_path: Option<&PathBuf>) -> PathBuf {
    db_path
        .cloned()
        .unwrap_or_else(|| corpus_root.join("chunk_index.sqlite"))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn every_subcommand_has_help_text() {
        let command = Cli::command();

        for name in ["inventory", "ingest", "chunk", "lookup", "ground", "status"] {
            let subcommand = command
                .find_subcommand(name)
                .expect("subcommand should exist");
            assert!(subcommand.get_about().is_some(), "{name} has no help text");
        }
    }
}
