//! Text extraction shared by the Office Open XML loaders.

use std::fs::File;
use std::io::Read;

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::error::LoaderError;

pub(super) fn read_part(archive: &mut ZipArchive<File>, name: &str) -> Result<String, LoaderError> {
    let mut part = archive.by_name(name)?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Visible text of a WordprocessingML or DrawingML part.
///
/// Text runs (`t`) are concatenated, `tab` becomes `\t`, `br`/`cr` become `\n`,
/// and non-empty paragraphs (`p`) are separated by a blank line.
pub(super) fn extract_text(xml: &str) -> Result<String, LoaderError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => paragraph.push('\t'),
                b"br" | b"cr" => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => paragraph.push_str(&e.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => flush_paragraph(&mut out, &mut paragraph),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    flush_paragraph(&mut out, &mut paragraph);

    Ok(out)
}

fn flush_paragraph(out: &mut String, paragraph: &mut String) {
    let text = paragraph.trim();
    if !text.is_empty() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(text);
    }
    paragraph.clear();
}
