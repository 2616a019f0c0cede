use std::path::{Path, PathBuf};

use futures::StreamExt;
use ignore::WalkBuilder;

use super::{
    DEFAULT_MAX_FILE_SIZE, DocumentLoader, DocxLoader, PptxLoader, SUPPORTED_EXTENSIONS,
    join_error,
};
use crate::error::{LoadFailure, LoaderError};
use crate::types::Document;

const DEFAULT_CONCURRENCY: usize = 4;

/// Documents loaded from a path plus the files that were skipped.
///
/// `documents` holds one entry per successfully parsed file, in walk order.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub documents: Vec<Vec<Document>>,
    pub failures: Vec<LoadFailure>,
}

impl LoadOutcome {
    /// Total number of documents across all files.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.iter().map(Vec::len).sum()
    }

    /// Flatten per-file groups into one ordered sequence.
    #[must_use]
    pub fn into_documents(self) -> Vec<Document> {
        self.documents.into_iter().flatten().collect()
    }
}

/// Loads a file or a directory tree, dispatching each file by extension.
pub struct FileLoader {
    max_file_size: u64,
    concurrency: usize,
    loaders: Vec<Box<dyn DocumentLoader>>,
}

impl Default for FileLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl FileLoader {
    #[must_use]
    pub fn new(max_file_size: u64) -> Self {
        let mut loaders: Vec<Box<dyn DocumentLoader>> = vec![
            Box::new(DocxLoader { max_file_size }),
            Box::new(PptxLoader { max_file_size }),
        ];
        #[cfg(feature = "pdf")]
        loaders.push(Box::new(super::PdfLoader { max_file_size }));

        Self {
            max_file_size,
            concurrency: DEFAULT_CONCURRENCY,
            loaders,
        }
    }

    /// Number of files parsed at once. Values below 1 are treated as 1.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Load every supported file under `path`.
    ///
    /// Files that fail validation or parsing are collected in
    /// [`LoadOutcome::failures`] instead of aborting the run.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::NotFound`] if `path` does not exist,
    /// [`LoaderError::Walk`] if a directory cannot be listed, and
    /// [`LoaderError::NothingLoaded`] if every file failed.
    pub async fn load(&self, path: &Path) -> Result<LoadOutcome, LoaderError> {
        let Ok(meta) = tokio::fs::metadata(path).await else {
            return Err(LoaderError::NotFound(path.display().to_string()));
        };

        let (files, mut failures) = if meta.is_dir() {
            let _listing = tokio::fs::read_dir(path)
                .await
                .map_err(|e| LoaderError::Walk(e.to_string()))?;
            let root = path.to_path_buf();
            tokio::task::spawn_blocking(move || walk(&root))
                .await
                .map_err(join_error)?
        } else {
            (vec![path.to_path_buf()], Vec::new())
        };

        let results: Vec<(PathBuf, Result<Vec<Document>, String>)> =
            futures::stream::iter(files)
                .map(|file| async move {
                    let result = self.load_file(&file).await;
                    (file, result)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut documents = Vec::new();
        for (file, result) in results {
            match result {
                Ok(docs) => {
                    tracing::debug!(file = %file.display(), documents = docs.len(), "loaded file");
                    documents.push(docs);
                }
                Err(message) => failures.push(LoadFailure::new(file_name(&file), message)),
            }
        }

        for failure in &failures {
            tracing::warn!(file = %failure.name, error = %failure.message, "skipping file");
        }

        if documents.is_empty() && !failures.is_empty() {
            return Err(LoaderError::NothingLoaded(failures));
        }

        let outcome = LoadOutcome {
            documents,
            failures,
        };
        tracing::info!(
            path = %path.display(),
            files = outcome.documents.len(),
            documents = outcome.document_count(),
            failures = outcome.failures.len(),
            "load complete"
        );
        Ok(outcome)
    }

    async fn load_file(&self, file: &Path) -> Result<Vec<Document>, String> {
        let ext = self.validate(file).await?;
        let loader = self
            .loaders
            .iter()
            .find(|l| l.supported_extensions().contains(&ext.as_str()))
            .ok_or_else(|| format!("Unsupported file format: .{ext}"))?;
        loader.load(file).await.map_err(|e| e.to_string())
    }

    /// Returns the lowercase extension of a loadable file, or the reason it is skipped.
    async fn validate(&self, file: &Path) -> Result<String, String> {
        let Ok(meta) = tokio::fs::metadata(file).await else {
            return Err("File does not exist".into());
        };
        if !meta.is_file() {
            return Err("Not a regular file".into());
        }
        if tokio::fs::File::open(file).await.is_err() {
            return Err("File is not readable".into());
        }

        let ext = file
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            let suffix = file
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            return Err(format!("Unsupported file format: {suffix}"));
        }

        if meta.len() > self.max_file_size {
            return Err(format!(
                "File exceeds maximum size of {} bytes",
                self.max_file_size
            ));
        }
        Ok(ext)
    }
}

/// Every non-directory entry under `root`, sorted by name at each level.
///
/// Symlinks are followed; a link cycle is reported as a failure.
fn walk(root: &Path) -> (Vec<PathBuf>, Vec<LoadFailure>) {
    let mut files = Vec::new();
    let mut failures = Vec::new();

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b));

    for entry in builder.build() {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_some_and(|t| t.is_dir()) {
                    continue;
                }
                files.push(entry.into_path());
            }
            Err(e) => failures.push(LoadFailure::new(
                error_path(&e).map_or_else(|| file_name(root), file_name),
                format!("Error accessing path: {e}"),
            )),
        }
    }

    (files, failures)
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}
