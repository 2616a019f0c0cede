use std::path::Path;

use docsieve_embed::{
    BackendKind, Embedder, EmbeddingBackend, EmbedError, InMemoryIndex, OpenAiBackend,
};
use docsieve_ingest::{Chunk, FileLoader, LoadFailure, TextSplitter};

use crate::config::Config;
use crate::error::PipelineError;

/// Chunks produced from one path, with the files that were skipped.
#[derive(Debug)]
pub struct SplitReport {
    pub chunks: Vec<Chunk>,
    pub failures: Vec<LoadFailure>,
}

/// Result of a full load, split, embed run.
#[derive(Debug)]
pub struct IngestReport {
    pub chunks: Vec<Chunk>,
    pub index: InMemoryIndex,
    pub failures: Vec<LoadFailure>,
}

/// Build the embedding backend named in the configuration.
///
/// # Errors
///
/// Returns [`EmbedError::UnsupportedBackend`] for an unknown backend id and
/// [`EmbedError::MissingApiKey`] when no API key is configured.
pub fn backend_from_config(config: &Config) -> Result<OpenAiBackend, EmbedError> {
    match BackendKind::parse(&config.embedding.backend)? {
        BackendKind::OpenAi => {
            let key = config
                .secrets
                .openai_api_key
                .as_ref()
                .ok_or(EmbedError::MissingApiKey { backend: "openai" })?;
            OpenAiBackend::new(
                key.expose(),
                config.embedding.base_url.as_str(),
                config.embedding.model.as_str(),
            )
        }
    }
}

/// Load, split and embed in sequence.
pub struct IngestionPipeline<B> {
    loader: FileLoader,
    splitter: TextSplitter,
    embedder: Embedder<B>,
}

impl<B: EmbeddingBackend> IngestionPipeline<B> {
    pub fn new(loader: FileLoader, splitter: TextSplitter, embedder: Embedder<B>) -> Self {
        Self {
            loader,
            splitter,
            embedder,
        }
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::Split`] if the splitter settings are invalid.
    pub fn from_config(config: &Config, backend: B) -> Result<Self, PipelineError> {
        let loader =
            FileLoader::new(config.loader.max_file_size).with_concurrency(config.loader.concurrency);
        let splitter = TextSplitter::new(config.splitter_config())?;
        let embedder = Embedder::new(backend, config.embedder_config());
        Ok(Self::new(loader, splitter, embedder))
    }

    #[must_use]
    pub fn splitter(&self) -> &TextSplitter {
        &self.splitter
    }

    #[must_use]
    pub fn embedder(&self) -> &Embedder<B> {
        &self.embedder
    }

    /// Load `path` and split everything that loaded.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Load`] if nothing could be loaded and
    /// [`PipelineError::Split`] if splitting fails, including when `path`
    /// holds no documents at all.
    pub async fn split_path(&self, path: &Path) -> Result<SplitReport, PipelineError> {
        let outcome = self.loader.load(path).await?;
        let failures = outcome.failures.clone();
        let documents = outcome.into_documents();
        let chunks = self.splitter.split(&documents)?;
        Ok(SplitReport { chunks, failures })
    }

    /// Load, split and embed `path` into a fresh in-memory index.
    ///
    /// # Errors
    ///
    /// Any stage error, wrapped in [`PipelineError`]. Nothing is returned
    /// from a run that failed part way.
    pub async fn ingest(&self, path: &Path) -> Result<IngestReport, PipelineError> {
        let SplitReport { chunks, failures } = self.split_path(path).await?;
        let index = self.embedder.build_index(&chunks).await?;
        tracing::info!(
            path = %path.display(),
            chunks = chunks.len(),
            skipped = failures.len(),
            "ingestion complete"
        );
        Ok(IngestReport {
            chunks,
            index,
            failures,
        })
    }
}
