use std::collections::{HashMap, VecDeque};

use crate::chunk_id;
use crate::error::{MetadataError, SplitError};
use crate::types::{Chunk, Document, SOURCE_HASH_KEY, UNKNOWN_SOURCE};

/// Relevance multiplier every chunk starts with.
pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitterConfig {
    /// Target maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks of one document.
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl SplitterConfig {
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidConfig`] if `chunk_size` is zero or the overlap
    /// is not strictly smaller than the chunk size.
    pub fn validate(&self) -> Result<(), SplitError> {
        if self.chunk_size == 0 {
            return Err(SplitError::InvalidConfig(
                "chunk_size must be greater than zero".into(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(SplitError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Cut points, tried from the most to the least semantic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Paragraph,
    Line,
    Sentence,
    Word,
    Char,
}

impl Boundary {
    fn next(self) -> Option<Self> {
        match self {
            Self::Paragraph => Some(Self::Line),
            Self::Line => Some(Self::Sentence),
            Self::Sentence => Some(Self::Word),
            Self::Word => Some(Self::Char),
            Self::Char => None,
        }
    }

    /// `prev` is the previous character of the piece being built, if any.
    fn cuts_after(self, prev: Option<char>, c: char) -> bool {
        match self {
            Self::Paragraph => c == '\n' && prev == Some('\n'),
            Self::Line => c == '\n',
            Self::Sentence => {
                c.is_whitespace() && prev.is_some_and(|p| matches!(p, '.' | '!' | '?'))
            }
            Self::Word => c.is_whitespace(),
            Self::Char => true,
        }
    }

    /// Split `text` after every cut point, keeping the separator on the left piece.
    ///
    /// `\r` never becomes `prev`, so `\r\n\r\n` is a paragraph break.
    fn pieces(self, text: &str) -> Vec<&str> {
        let mut pieces = Vec::new();
        let mut start = 0;
        let mut prev = None;
        for (i, c) in text.char_indices() {
            if self.cuts_after(prev, c) {
                let end = i + c.len_utf8();
                pieces.push(&text[start..end]);
                start = end;
                prev = None;
            } else if c != '\r' {
                prev = Some(c);
            }
        }
        if start < text.len() {
            pieces.push(&text[start..]);
        }
        pieces
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn token_count(content: &str) -> usize {
    content.split_whitespace().count()
}

#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidConfig`] for a zero chunk size or an overlap that
    /// does not fit inside a chunk.
    pub fn new(config: SplitterConfig) -> Result<Self, SplitError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Split documents into identified, enriched chunks.
    ///
    /// Chunks come out in input document order, left to right within a document.
    /// Enrichment is all-or-nothing: the first chunk whose metadata cannot be derived
    /// fails the whole call.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::EmptyInput`] for an empty slice, [`SplitError::Metadata`]
    /// with the offending output index when enrichment fails, and
    /// [`SplitError::EmptyResult`] when no document yields any text.
    pub fn split(&self, documents: &[Document]) -> Result<Vec<Chunk>, SplitError> {
        if documents.is_empty() {
            return Err(SplitError::EmptyInput);
        }

        let mut pieces: Vec<(&Document, String)> = Vec::new();
        for document in documents {
            let source_name = document.metadata.source().unwrap_or(UNKNOWN_SOURCE);
            let texts = self.split_content(&document.content, source_name)?;
            tracing::debug!(source = source_name, chunks = texts.len(), "split document");
            pieces.extend(texts.into_iter().map(|text| (document, text)));
        }

        if pieces.is_empty() {
            return Err(SplitError::EmptyResult);
        }

        let mut stem_counters: HashMap<String, usize> = HashMap::new();
        let chunks = pieces
            .into_iter()
            .enumerate()
            .map(|(index, (document, content))| {
                enrich(document, content, &mut stem_counters)
                    .map_err(|source| SplitError::Metadata { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            documents = documents.len(),
            chunks = chunks.len(),
            "split complete"
        );
        Ok(chunks)
    }

    /// Split raw text without attaching identity or metadata.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::Algorithm`] if a produced piece breaks the size bound.
    pub fn split_text(&self, text: &str) -> Result<Vec<String>, SplitError> {
        self.split_content(text, UNKNOWN_SOURCE)
    }

    fn split_content(&self, text: &str, source_name: &str) -> Result<Vec<String>, SplitError> {
        let mut out = Vec::new();
        if char_len(text) <= self.config.chunk_size {
            push_trimmed(&mut out, text);
        } else {
            self.split_recursive(text, Boundary::Paragraph, &mut out);
        }

        if let Some(oversized) = out.iter().find(|c| char_len(c) > self.config.chunk_size) {
            return Err(SplitError::Algorithm {
                source_name: source_name.to_owned(),
                reason: format!(
                    "piece of {} chars exceeds chunk_size {}",
                    char_len(oversized),
                    self.config.chunk_size
                ),
            });
        }
        Ok(out)
    }

    fn split_recursive(&self, text: &str, from: Boundary, out: &mut Vec<String>) {
        let mut boundary = from;
        let mut pieces = boundary.pieces(text);
        while pieces.len() < 2 {
            let Some(next) = boundary.next() else { break };
            boundary = next;
            pieces = boundary.pieces(text);
        }

        let mut fitting = Vec::new();
        for piece in pieces {
            if char_len(piece) <= self.config.chunk_size {
                fitting.push(piece);
                continue;
            }
            self.merge(&fitting, out);
            fitting.clear();
            match boundary.next() {
                Some(next) => self.split_recursive(piece, next, out),
                None => push_trimmed(out, piece),
            }
        }
        self.merge(&fitting, out);
    }

    /// Greedy left-to-right merge of pieces that each fit in a chunk.
    fn merge(&self, pieces: &[&str], out: &mut Vec<String>) {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0;
        // Set once the window holds text not yet emitted.
        let mut fresh = false;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > size && !window.is_empty() {
                if fresh {
                    emit(&window, out);
                    fresh = false;
                }
                while total > overlap || (total + len > size && total > 0) {
                    let Some((_, dropped)) = window.pop_front() else {
                        break;
                    };
                    total -= dropped;
                }
            }
            window.push_back((piece, len));
            total += len;
            fresh |= !piece.trim().is_empty();
        }

        if fresh {
            emit(&window, out);
        }
    }
}

fn emit(window: &VecDeque<(&str, usize)>, out: &mut Vec<String>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    push_trimmed(out, &joined);
}

fn push_trimmed(out: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_owned());
    }
}

fn enrich(
    document: &Document,
    content: String,
    stem_counters: &mut HashMap<String, usize>,
) -> Result<Chunk, MetadataError> {
    let source = document.metadata.source()?;
    let stem = chunk_id::sanitize_stem(source)?;
    let next = stem_counters.entry(stem.clone()).or_default();
    let chunk_id = chunk_id::format_id(&stem, *next);
    *next += 1;

    let mut metadata = document.metadata.clone();
    metadata.insert(SOURCE_HASH_KEY, chunk_id::source_hash(source));

    Ok(Chunk {
        token_count: token_count(&content),
        content,
        metadata,
        chunk_id,
        weight: DEFAULT_WEIGHT,
    })
}
