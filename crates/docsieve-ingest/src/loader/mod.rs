mod docx;
mod file;
mod ooxml;
#[cfg(feature = "pdf")]
mod pdf;
mod pptx;

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

pub use docx::DocxLoader;
pub use file::{FileLoader, LoadOutcome};
#[cfg(feature = "pdf")]
pub use pdf::PdfLoader;
pub use pptx::PptxLoader;

use crate::error::LoaderError;
use crate::types::Document;

/// Default maximum file size: 100 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Extensions the loader accepts, lowercase and without the dot.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "pptx"];

pub type LoadFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Document>, LoaderError>> + Send + 'a>>;

/// Parses one file into documents. Granularity (page, slide, whole file) is up to the loader.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> LoadFuture<'_>;

    fn supported_extensions(&self) -> &[&str];
}

async fn check_size(path: &Path, max_size: u64) -> Result<(), LoaderError> {
    let size = tokio::fs::metadata(path).await?.len();
    if size > max_size {
        return Err(LoaderError::FileTooLarge {
            size,
            max: max_size,
        });
    }
    Ok(())
}

fn join_error(e: tokio::task::JoinError) -> LoaderError {
    LoaderError::Io(std::io::Error::other(e))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Write;
    use std::path::Path;

    use zip::write::SimpleFileOptions;

    /// Write a zip archive with the given `(entry name, contents)` parts.
    pub(crate) fn write_zip(path: &Path, parts: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, contents) in parts {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    pub(crate) fn docx_xml(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    pub(crate) fn slide_xml(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{p}</a:t></a:r></a:p>"))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody>{body}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#
        )
    }

    pub(crate) fn write_docx(path: &Path, paragraphs: &[&str]) {
        write_zip(path, &[("word/document.xml", &docx_xml(paragraphs))]);
    }

    pub(crate) fn write_pptx(path: &Path, slides: &[&[&str]]) {
        let names: Vec<String> = (1..=slides.len())
            .map(|i| format!("ppt/slides/slide{i}.xml"))
            .collect();
        let xmls: Vec<String> = slides.iter().map(|s| slide_xml(s)).collect();
        let parts: Vec<(&str, &str)> = names
            .iter()
            .zip(&xmls)
            .map(|(n, x)| (n.as_str(), x.as_str()))
            .collect();
        write_zip(path, &parts);
    }
}
