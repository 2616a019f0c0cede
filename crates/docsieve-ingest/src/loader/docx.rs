use std::fs::File;
use std::path::Path;

use zip::ZipArchive;

use super::{DEFAULT_MAX_FILE_SIZE, DocumentLoader, LoadFuture, check_size, join_error, ooxml};
use crate::error::LoaderError;
use crate::types::{Document, DocumentMetadata};

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Loads a Word document as a single [`Document`].
pub struct DocxLoader {
    pub max_file_size: u64,
}

impl Default for DocxLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for DocxLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            check_size(&path, max_size).await?;

            let source = path.display().to_string();
            let content = tokio::task::spawn_blocking(move || read_docx(&path))
                .await
                .map_err(join_error)??;

            let mut metadata = DocumentMetadata::with_source(source);
            metadata.insert("content_type", DOCX_CONTENT_TYPE);
            Ok(vec![Document::new(content, metadata)])
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }
}

fn read_docx(path: &Path) -> Result<String, LoaderError> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let xml = ooxml::read_part(&mut archive, "word/document.xml")?;
    ooxml::extract_text(&xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::fixtures;

    #[tokio::test]
    async fn load_docx_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("memo.docx");
        fixtures::write_docx(&file, &["Dear team,", "The launch moved to Friday."]);

        let docs = DocxLoader::default().load(&file).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "Dear team,\n\nThe launch moved to Friday.");
        assert_eq!(
            docs[0].metadata.source().unwrap(),
            file.display().to_string()
        );
        assert_eq!(
            docs[0].metadata.get("content_type").and_then(|v| v.as_str()),
            Some(DOCX_CONTENT_TYPE)
        );
    }

    #[tokio::test]
    async fn missing_document_part_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("empty.docx");
        fixtures::write_zip(&file, &[("docProps/app.xml", "<Properties/>")]);

        let result = DocxLoader::default().load(&file).await;
        assert!(matches!(result, Err(LoaderError::Archive(_))));
    }

    #[tokio::test]
    async fn not_a_zip_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fake.docx");
        std::fs::write(&file, "plain text pretending").unwrap();

        assert!(DocxLoader::default().load(&file).await.is_err());
    }

    #[tokio::test]
    async fn file_too_large_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("big.docx");
        fixtures::write_docx(&file, &["x"]);

        let loader = DocxLoader { max_file_size: 1 };
        let result = loader.load(&file).await;
        assert!(matches!(result, Err(LoaderError::FileTooLarge { max: 1, .. })));
    }

    #[test]
    fn supported_extensions_list() {
        assert_eq!(DocxLoader::default().supported_extensions(), ["docx"]);
    }
}
