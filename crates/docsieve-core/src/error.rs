use docsieve_embed::EmbedError;
use docsieve_ingest::{LoaderError, SplitError};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("loading failed: {0}")]
    Load(#[from] LoaderError),

    #[error("splitting failed: {0}")]
    Split(#[from] SplitError),

    #[error("embedding failed: {0}")]
    Embed(#[from] EmbedError),
}
