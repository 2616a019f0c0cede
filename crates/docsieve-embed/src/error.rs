use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("unsupported embedding backend: {0} (supported: openai)")]
    UnsupportedBackend(String),

    #[error("no chunks to embed")]
    EmptyInput,

    #[error("embedding backend returned no vectors")]
    EmptyEmbedding,

    #[error("embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding request timed out after {0:?}")]
    Timeout(Duration),

    #[error("rate limited")]
    RateLimited,

    #[error("embedding API request failed (status {status})")]
    Api { status: u16 },

    #[error("missing API key for {backend}")]
    MissingApiKey { backend: &'static str },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
