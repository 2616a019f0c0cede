use std::path::Path;

use super::{DEFAULT_MAX_FILE_SIZE, DocumentLoader, LoadFuture, check_size, join_error};
use crate::error::LoaderError;
use crate::types::{Document, DocumentMetadata};

/// Loads a PDF as one [`Document`] per page.
pub struct PdfLoader {
    pub max_file_size: u64,
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            check_size(&path, max_size).await?;

            let source = path.display().to_string();
            let pages = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_by_pages(&path)
                    .map_err(|e| LoaderError::Pdf(e.to_string()))
            })
            .await
            .map_err(join_error)??;

            let total = i64::try_from(pages.len()).unwrap_or(i64::MAX);
            Ok(pages
                .into_iter()
                .zip(1_i64..)
                .map(|(content, page)| {
                    let mut metadata = DocumentMetadata::with_source(source.clone());
                    metadata.insert("content_type", "application/pdf");
                    metadata.insert("page", page);
                    metadata.insert("total_pages", total);
                    Document::new(content, metadata)
                })
                .collect())
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }
}
