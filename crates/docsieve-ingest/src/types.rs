use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;

/// Fallback used when a document carries no `source` key.
pub const UNKNOWN_SOURCE: &str = "unknown";

pub const SOURCE_KEY: &str = "source";
pub const CHUNK_ID_KEY: &str = "chunk_id";
pub const TOKEN_COUNT_KEY: &str = "token_count";
pub const WEIGHT_KEY: &str = "weight";
pub const SOURCE_HASH_KEY: &str = "source_hash";

/// Scalar metadata value. Serializes as a bare JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl MetadataValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[expect(clippy::cast_precision_loss)]
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(_) => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// Open key/value metadata attached to documents and chunks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentMetadata(BTreeMap<String, MetadataValue>);

impl DocumentMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_source(source: impl Into<String>) -> Self {
        let mut meta = Self::new();
        meta.insert(SOURCE_KEY, source.into());
        meta
    }

    /// Originating path of the document, `"unknown"` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::SourceNotText`] if `source` holds a non-text value.
    pub fn source(&self) -> Result<&str, MetadataError> {
        match self.0.get(SOURCE_KEY) {
            None => Ok(UNKNOWN_SOURCE),
            Some(MetadataValue::Text(s)) => Ok(s),
            Some(other) => Err(MetadataError::SourceNotText {
                found: other.kind(),
            }),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Option<MetadataValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, MetadataValue)> for DocumentMetadata {
    fn from_iter<I: IntoIterator<Item = (String, MetadataValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A unit of loaded text, before splitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    #[must_use]
    pub fn new(content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// A split unit of text with identity and derived metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub metadata: DocumentMetadata,
    pub chunk_id: String,
    pub token_count: usize,
    pub weight: f64,
}

impl Chunk {
    /// Inherited metadata merged with the derived fields. Derived fields win on key clash.
    #[must_use]
    pub fn payload(&self) -> DocumentMetadata {
        let mut merged = self.metadata.clone();
        merged.insert(CHUNK_ID_KEY, self.chunk_id.clone());
        merged.insert(
            TOKEN_COUNT_KEY,
            i64::try_from(self.token_count).unwrap_or(i64::MAX),
        );
        merged.insert(WEIGHT_KEY, self.weight);
        merged
    }

    /// Source path the chunk was cut from.
    #[must_use]
    pub fn source(&self) -> &str {
        self.metadata.source().unwrap_or(UNKNOWN_SOURCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_source_falls_back_to_unknown() {
        let meta = DocumentMetadata::new();
        assert_eq!(meta.source().unwrap(), "unknown");
    }

    #[test]
    fn non_text_source_is_an_error() {
        let mut meta = DocumentMetadata::new();
        meta.insert("source", 42_i64);
        let err = meta.source().unwrap_err();
        assert!(matches!(err, MetadataError::SourceNotText { found: "integer" }));
    }

    #[test]
    fn payload_keeps_inherited_keys() {
        let mut metadata = DocumentMetadata::with_source("report.pdf");
        metadata.insert("page", 3_i64);
        let chunk = Chunk {
            content: "hello".into(),
            metadata,
            chunk_id: "report_000".into(),
            token_count: 1,
            weight: 1.0,
        };
        let payload = chunk.payload();
        assert_eq!(payload.get("source").and_then(MetadataValue::as_str), Some("report.pdf"));
        assert_eq!(payload.get("page").and_then(MetadataValue::as_i64), Some(3));
        assert_eq!(payload.get("chunk_id").and_then(MetadataValue::as_str), Some("report_000"));
        assert_eq!(payload.get("token_count").and_then(MetadataValue::as_i64), Some(1));
        assert_eq!(payload.get("weight").and_then(MetadataValue::as_f64), Some(1.0));
    }

    #[test]
    fn derived_fields_override_inherited_clash() {
        let mut metadata = DocumentMetadata::with_source("a.pdf");
        metadata.insert("weight", "heavy");
        let chunk = Chunk {
            content: String::new(),
            metadata,
            chunk_id: "a_000".into(),
            token_count: 0,
            weight: 1.0,
        };
        assert_eq!(chunk.payload().get("weight"), Some(&MetadataValue::Float(1.0)));
    }

    #[test]
    fn metadata_serializes_as_plain_scalars() {
        let mut meta = DocumentMetadata::with_source("a.pdf");
        meta.insert("page", 1_i64);
        meta.insert("score", 0.5);
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"page":1,"score":0.5,"source":"a.pdf"}"#);

        let back: DocumentMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn value_display() {
        assert_eq!(MetadataValue::from("x").to_string(), "x");
        assert_eq!(MetadataValue::from(7_i64).to_string(), "7");
    }
}
