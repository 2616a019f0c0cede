use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use docsieve_ingest::{
    Document, DocumentMetadata, FileLoader, LoaderError, MetadataValue, SplitError,
    SplitterConfig, TextSplitter,
};
use zip::write::SimpleFileOptions;

fn write_zip(path: &Path, parts: &[(String, String)]) {
    let mut writer = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
    for (name, contents) in parts {
        writer
            .start_file(name.as_str(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

fn paragraphs(prefix: &str, tag: &str, texts: &[String]) -> String {
    texts
        .iter()
        .map(|t| format!("<{prefix}:p><{prefix}:r><{prefix}:{tag}>{t}</{prefix}:{tag}></{prefix}:r></{prefix}:p>"))
        .collect()
}

fn write_docx(path: &Path, texts: &[String]) {
    let body = paragraphs("w", "t", texts);
    let xml = format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    write_zip(path, &[("word/document.xml".into(), xml)]);
}

fn write_pptx(path: &Path, slides: &[&str]) {
    let parts: Vec<(String, String)> = slides
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let body = paragraphs("a", "t", &[(*text).to_owned()]);
            (
                format!("ppt/slides/slide{}.xml", i + 1),
                format!(
                    r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:txBody>{body}</p:txBody></p:sld>"#
                ),
            )
        })
        .collect();
    write_zip(path, &parts);
}

fn prose(sentences: usize) -> Vec<String> {
    (0..sentences)
        .map(|i| format!("Sentence number {i} talks about quarterly revenue and growth."))
        .collect()
}

#[tokio::test]
async fn load_and_split_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_docx(&dir.path().join("annual report.docx"), &prose(80));
    write_pptx(&dir.path().join("deck.pptx"), &["Intro", "Numbers", "Outlook"]);
    std::fs::write(dir.path().join("notes.txt"), "skipped").unwrap();

    let outcome = FileLoader::default().load(dir.path()).await.unwrap();
    assert_eq!(outcome.documents.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].name, "notes.txt");

    let splitter = TextSplitter::new(SplitterConfig::default()).unwrap();
    let chunks = splitter.split(&outcome.into_documents()).unwrap();

    let ids: Vec<&str> = chunks.iter().map(|c| c.chunk_id.as_str()).collect();
    assert!(ids[0].starts_with("annual_report_"));
    assert_eq!(&ids[ids.len() - 3..], ["deck_000", "deck_001", "deck_002"]);

    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());

    for chunk in &chunks {
        assert!(chunk.content.chars().count() <= 1000);
        assert_eq!(chunk.token_count, chunk.content.split_whitespace().count());
        assert!((chunk.weight - 1.0).abs() < f64::EPSILON);
    }

    let last = chunks.last().unwrap();
    assert_eq!(last.content, "Outlook");
    assert_eq!(last.metadata.get("slide"), Some(&MetadataValue::Integer(3)));
    let payload = last.payload();
    assert_eq!(payload.get("chunk_id").and_then(|v| v.as_str()), Some("deck_002"));
    assert_eq!(payload.get("total_slides").and_then(MetadataValue::as_i64), Some(3));
}

#[tokio::test]
async fn only_unsupported_files_fail_the_load() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.csv"), "1,2").unwrap();
    std::fs::write(dir.path().join("b.json"), "{}").unwrap();

    let err = FileLoader::default().load(dir.path()).await.unwrap_err();
    assert!(matches!(err, LoaderError::NothingLoaded(ref f) if f.len() == 2));
    assert!(err.to_string().starts_with("failed to load any documents"));
}

#[test]
fn split_is_deterministic_across_calls() {
    let docs: Vec<Document> = ["a/b.pdf", "b/c.pdf", "a/b.pdf"]
        .iter()
        .map(|src| {
            Document::new(
                prose(40).join(" "),
                DocumentMetadata::with_source(*src),
            )
        })
        .collect();

    let splitter = TextSplitter::new(SplitterConfig {
        chunk_size: 300,
        chunk_overlap: 50,
    })
    .unwrap();
    let first = splitter.split(&docs).unwrap();
    let second = splitter.split(&docs).unwrap();
    assert_eq!(first, second);

    let ids: HashSet<&str> = first.iter().map(|c| c.chunk_id.as_str()).collect();
    assert_eq!(ids.len(), first.len());
}

#[test]
fn invalid_overlap_is_rejected_up_front() {
    let result = TextSplitter::new(SplitterConfig {
        chunk_size: 100,
        chunk_overlap: 100,
    });
    assert!(matches!(result, Err(SplitError::InvalidConfig(_))));
}
