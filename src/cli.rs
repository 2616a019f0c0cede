use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use docsieve_core::Config;

#[derive(Debug, Parser)]
#[command(
    name = "docsieve",
    version,
    about = "Split PDF, DOCX and PPTX documents into identified chunks and embed them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    /// Path to a TOML config file (default: $DOCSIEVE_CONFIG or config/default.toml).
    #[arg(global = true, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub splitter: SplitterArgs,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load and split documents, printing one JSON chunk per line.
    Split(InputArgs),
    /// Load, split and embed documents, printing one JSON vector per line.
    Embed(InputArgs),
    /// Embed documents and rank chunks against a query.
    Search(SearchArgs),
}

/// Overrides for the `[splitter]` config section.
#[derive(Debug, Args)]
pub struct SplitterArgs {
    /// Maximum characters per chunk.
    #[arg(global = true, long)]
    pub chunk_size: Option<usize>,
    /// Characters shared by consecutive chunks.
    #[arg(global = true, long)]
    pub chunk_overlap: Option<usize>,
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// File or directory to ingest.
    pub path: PathBuf,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// File or directory to ingest.
    pub path: PathBuf,
    /// Query text.
    #[arg(long, short)]
    pub query: String,
    /// Maximum number of results.
    #[arg(long, default_value_t = 5)]
    pub limit: usize,
    /// Only rank chunks whose `source` equals this path.
    #[arg(long)]
    pub source: Option<String>,
}

impl SplitterArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(size) = self.chunk_size {
            config.splitter.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            config.splitter.chunk_overlap = overlap;
        }
    }
}
