//! Error types for loading, splitting and chunk identity.

use std::fmt;

/// Chunk identifier derivation failed.
#[derive(Debug, thiserror::Error)]
pub enum ChunkIdError {
    #[error("source path {path:?} has no file stem")]
    NoFileStem { path: String },
}

/// Deriving metadata for one chunk failed.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("chunk id derivation failed: {0}")]
    ChunkId(#[from] ChunkIdError),

    #[error("`source` metadata must be text, found {found}")]
    SourceNotText { found: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("invalid splitter config: {0}")]
    InvalidConfig(String),

    #[error("no documents to split")]
    EmptyInput,

    #[error("splitting {source_name} failed: {reason}")]
    Algorithm { source_name: String, reason: String },

    #[error("metadata enrichment failed for chunk {index}: {source}")]
    Metadata {
        index: usize,
        #[source]
        source: MetadataError,
    },

    #[error("splitting produced no chunks from non-empty input")]
    EmptyResult,
}

/// A file the loader skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub name: String,
    pub message: String,
}

impl LoadFailure {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

struct FailureList<'a>(&'a [LoadFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("path not found: {0}")]
    NotFound(String),

    #[error("error accessing path: {0}")]
    Walk(String),

    #[error("file exceeds maximum size of {max} bytes ({size} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to load any documents. Errors: {}", FailureList(.0))]
    NothingLoaded(Vec<LoadFailure>),
}
