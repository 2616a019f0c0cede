mod cli;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use docsieve_core::{Config, IngestionPipeline, backend_from_config};
use docsieve_embed::{FieldCondition, IndexFilter};
use docsieve_ingest::{Chunk, FileLoader, TextSplitter};

use crate::cli::{Cli, Commands, InputArgs, SearchArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());
    let config = load_config(&cli, &config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    tracing::debug!(path = %config_path.display(), "configuration loaded");

    match cli.command {
        Commands::Split(args) => split(&config, &args).await,
        Commands::Embed(args) => embed(&config, &args).await,
        Commands::Search(args) => search(&config, &args).await,
    }
}

fn resolve_config_path(cli_path: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_path {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("DOCSIEVE_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

/// File and env values first, then command-line overrides, validated once at the end.
fn load_config(cli: &Cli, path: &Path) -> anyhow::Result<Config> {
    let mut config = Config::resolve(path)?;
    cli.splitter.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn split(config: &Config, args: &InputArgs) -> anyhow::Result<()> {
    let loader = FileLoader::new(config.loader.max_file_size)
        .with_concurrency(config.loader.concurrency);
    let splitter = TextSplitter::new(config.splitter_config())?;

    let documents = loader
        .load(&args.path)
        .await
        .with_context(|| format!("failed to load {}", args.path.display()))?
        .into_documents();
    let chunks = splitter.split(&documents).context("failed to split documents")?;

    let mut out = std::io::stdout().lock();
    for chunk in &chunks {
        serde_json::to_writer(&mut out, &chunk_line(chunk))?;
        writeln!(out)?;
    }
    Ok(())
}

async fn embed(config: &Config, args: &InputArgs) -> anyhow::Result<()> {
    let backend = backend_from_config(config)?;
    let pipeline = IngestionPipeline::from_config(config, backend)?;
    let report = pipeline
        .ingest(&args.path)
        .await
        .with_context(|| format!("failed to ingest {}", args.path.display()))?;

    let mut out = std::io::stdout().lock();
    for chunk in &report.chunks {
        let line = serde_json::json!({
            "chunk_id": chunk.chunk_id,
            "embedding": report.index.vector(&chunk.chunk_id),
        });
        serde_json::to_writer(&mut out, &line)?;
        writeln!(out)?;
    }
    Ok(())
}

async fn search(config: &Config, args: &SearchArgs) -> anyhow::Result<()> {
    let backend = backend_from_config(config)?;
    let pipeline = IngestionPipeline::from_config(config, backend)?;
    let report = pipeline
        .ingest(&args.path)
        .await
        .with_context(|| format!("failed to ingest {}", args.path.display()))?;

    let query = pipeline.embedder().embed_query(&args.query).await?;
    let filter = args
        .source
        .as_ref()
        .map(|source| IndexFilter::default().must(FieldCondition::new("source", source.as_str())));
    let hits = report.index.search(&query, args.limit, filter.as_ref())?;

    let mut out = std::io::stdout().lock();
    for hit in &hits {
        serde_json::to_writer(&mut out, hit)?;
        writeln!(out)?;
    }
    Ok(())
}

fn chunk_line(chunk: &Chunk) -> serde_json::Value {
    serde_json::json!({
        "chunk_id": chunk.chunk_id,
        "content": chunk.content,
        "metadata": chunk.payload(),
    })
}
