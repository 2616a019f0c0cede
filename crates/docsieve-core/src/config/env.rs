use std::str::FromStr;

use super::Config;
use crate::secret::Secret;

/// Parses an override value, warning and returning `None` when it is malformed.
fn parse_override<T: FromStr>(key: &str, value: &str) -> Option<T> {
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        tracing::warn!(key, value, "ignoring invalid environment override");
    }
    parsed
}

fn numeric_env<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .and_then(|v| parse_override(key, &v))
}

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Some(size) = numeric_env("DOCSIEVE_CHUNK_SIZE") {
            self.splitter.chunk_size = size;
        }
        if let Some(overlap) = numeric_env("DOCSIEVE_CHUNK_OVERLAP") {
            self.splitter.chunk_overlap = overlap;
        }
        if let Some(bytes) = numeric_env("DOCSIEVE_MAX_FILE_SIZE") {
            self.loader.max_file_size = bytes;
        }
        if let Some(n) = numeric_env("DOCSIEVE_LOADER_CONCURRENCY") {
            self.loader.concurrency = n;
        }
        if let Ok(v) = std::env::var("DOCSIEVE_EMBEDDING_BACKEND") {
            self.embedding.backend = v;
        }
        if let Ok(v) = std::env::var("DOCSIEVE_EMBEDDING_MODEL") {
            self.embedding.model = v;
        }
        if let Ok(v) = std::env::var("DOCSIEVE_EMBEDDING_BASE_URL") {
            self.embedding.base_url = v;
        }
        if let Some(n) = numeric_env("DOCSIEVE_EMBEDDING_BATCH_SIZE") {
            self.embedding.batch_size = n;
        }
        if let Some(secs) = numeric_env("DOCSIEVE_EMBEDDING_TIMEOUT") {
            self.embedding.timeout_seconds = Some(secs);
        }
        if let Some(key) = Secret::from_env("OPENAI_API_KEY") {
            self.secrets.openai_api_key = Some(key);
        }
    }
}
