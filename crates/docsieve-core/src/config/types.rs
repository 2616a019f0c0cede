use std::time::Duration;

use docsieve_embed::EmbedderConfig;
use docsieve_ingest::{DEFAULT_MAX_FILE_SIZE, SplitterConfig};
use serde::{Deserialize, Serialize};

use crate::secret::Secret;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub splitter: SplitterSection,
    #[serde(default)]
    pub loader: LoaderSection,
    #[serde(default)]
    pub embedding: EmbeddingSection,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SplitterSection {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

impl Default for SplitterSection {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoaderSection {
    /// Files larger than this many bytes are skipped.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Files parsed at once when loading a directory.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_concurrency() -> usize {
    4
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmbeddingSection {
    /// Backend identifier. Only `openai` is supported.
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

fn default_backend() -> String {
    "openai".into()
}

fn default_embedding_model() -> String {
    docsieve_embed::openai::DEFAULT_MODEL.into()
}

fn default_base_url() -> String {
    docsieve_embed::openai::DEFAULT_BASE_URL.into()
}

fn default_batch_size() -> usize {
    docsieve_embed::embedder::DEFAULT_BATCH_SIZE
}

impl Default for EmbeddingSection {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model: default_embedding_model(),
            base_url: default_base_url(),
            batch_size: default_batch_size(),
            timeout_seconds: None,
        }
    }
}

/// Credentials read from the environment, never from the config file.
#[derive(Debug, Default)]
pub struct ResolvedSecrets {
    pub openai_api_key: Option<Secret>,
}

impl Config {
    #[must_use]
    pub fn splitter_config(&self) -> SplitterConfig {
        SplitterConfig {
            chunk_size: self.splitter.chunk_size,
            chunk_overlap: self.splitter.chunk_overlap,
        }
    }

    #[must_use]
    pub fn embedder_config(&self) -> EmbedderConfig {
        EmbedderConfig {
            batch_size: self.embedding.batch_size,
            timeout: self.embedding.timeout_seconds.map(Duration::from_secs),
        }
    }
}
