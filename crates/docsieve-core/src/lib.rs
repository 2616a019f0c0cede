//! Configuration and the load, split, embed ingestion pipeline.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod secret;

pub use config::Config;
pub use error::PipelineError;
pub use pipeline::{IngestReport, IngestionPipeline, SplitReport, backend_from_config};
pub use secret::Secret;
