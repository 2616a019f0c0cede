//! Document loading, recursive chunk splitting and deterministic chunk identity.

pub mod chunk_id;
pub mod error;
pub mod loader;
pub mod splitter;
pub mod types;

pub use error::{ChunkIdError, LoadFailure, LoaderError, MetadataError, SplitError};
pub use loader::{
    DEFAULT_MAX_FILE_SIZE, DocumentLoader, DocxLoader, FileLoader, LoadOutcome, PptxLoader,
    SUPPORTED_EXTENSIONS,
};
pub use splitter::{SplitterConfig, TextSplitter};
pub use types::{Chunk, Document, DocumentMetadata, MetadataValue};

#[cfg(feature = "pdf")]
pub use loader::PdfLoader;
