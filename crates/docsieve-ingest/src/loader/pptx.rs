use std::fs::File;
use std::path::Path;

use zip::ZipArchive;

use super::{DEFAULT_MAX_FILE_SIZE, DocumentLoader, LoadFuture, check_size, join_error, ooxml};
use crate::error::LoaderError;
use crate::types::{Document, DocumentMetadata};

const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Loads a presentation as one [`Document`] per slide, in slide order.
pub struct PptxLoader {
    pub max_file_size: u64,
}

impl Default for PptxLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for PptxLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            check_size(&path, max_size).await?;

            let source = path.display().to_string();
            let slides = tokio::task::spawn_blocking(move || read_slides(&path))
                .await
                .map_err(join_error)??;

            let total = i64::try_from(slides.len()).unwrap_or(i64::MAX);
            let docs = slides
                .into_iter()
                .zip(1_i64..)
                .map(|(content, number)| {
                    let mut metadata = DocumentMetadata::with_source(source.clone());
                    metadata.insert("content_type", PPTX_CONTENT_TYPE);
                    metadata.insert("slide", number);
                    metadata.insert("total_slides", total);
                    Document::new(content, metadata)
                })
                .collect();
            Ok(docs)
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pptx"]
    }
}

/// Slide number from a part name like `ppt/slides/slide12.xml`.
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn read_slides(path: &Path) -> Result<Vec<String>, LoaderError> {
    let mut archive = ZipArchive::new(File::open(path)?)?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_owned())))
        .collect();
    slides.sort_unstable_by_key(|(n, _)| *n);

    slides
        .into_iter()
        .map(|(_, name)| {
            let xml = ooxml::read_part(&mut archive, &name)?;
            ooxml::extract_text(&xml)
        })
        .collect()
}
