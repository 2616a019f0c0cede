//! Embedding backends, batched chunk embedding and an in-memory vector index.

pub mod backend;
pub mod embedder;
pub mod error;
pub mod http;
pub mod index;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod openai;

pub use backend::{BackendKind, EmbeddingBackend};
pub use embedder::{Embedder, EmbedderConfig};
pub use error::EmbedError;
pub use index::{FieldCondition, InMemoryIndex, IndexFilter, ScoredChunk};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockBackend;
pub use openai::OpenAiBackend;
