use std::collections::HashMap;

use docsieve_ingest::{Chunk, DocumentMetadata, MetadataValue};
use serde::{Deserialize, Serialize};

use crate::error::EmbedError;

/// Equality condition on one payload field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCondition {
    pub field: String,
    pub value: MetadataValue,
}

impl FieldCondition {
    pub fn new(field: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Every `must` condition holds and no `must_not` condition holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexFilter {
    #[serde(default)]
    pub must: Vec<FieldCondition>,
    #[serde(default)]
    pub must_not: Vec<FieldCondition>,
}

impl IndexFilter {
    #[must_use]
    pub fn must(mut self, condition: FieldCondition) -> Self {
        self.must.push(condition);
        self
    }

    #[must_use]
    pub fn must_not(mut self, condition: FieldCondition) -> Self {
        self.must_not.push(condition);
        self
    }

    fn matches(&self, payload: &DocumentMetadata) -> bool {
        self.must
            .iter()
            .all(|cond| payload.get(&cond.field) == Some(&cond.value))
            && !self
                .must_not
                .iter()
                .any(|cond| payload.get(&cond.field) == Some(&cond.value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub score: f32,
    pub content: String,
    pub payload: DocumentMetadata,
}

#[derive(Debug, Clone)]
struct Entry {
    chunk_id: String,
    content: String,
    payload: DocumentMetadata,
    vector: Vec<f32>,
}

/// Vectors keyed by chunk id, searched by brute-force cosine similarity.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    dimensions: Option<usize>,
    entries: Vec<Entry>,
    positions: HashMap<String, usize>,
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl InMemoryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector size fixed by the first insert.
    #[must_use]
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    #[must_use]
    pub fn contains(&self, chunk_id: &str) -> bool {
        self.positions.contains_key(chunk_id)
    }

    /// Insert or replace the entry for `chunk.chunk_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::DimensionMismatch`] if `vector` differs in size from
    /// earlier entries.
    pub fn insert(&mut self, chunk: &Chunk, vector: Vec<f32>) -> Result<(), EmbedError> {
        self.check_dimensions(vector.len())?;
        self.dimensions = Some(vector.len());

        let entry = Entry {
            chunk_id: chunk.chunk_id.clone(),
            content: chunk.content.clone(),
            payload: chunk.payload(),
            vector,
        };
        if let Some(&pos) = self.positions.get(&chunk.chunk_id) {
            self.entries[pos] = entry;
        } else {
            self.positions
                .insert(chunk.chunk_id.clone(), self.entries.len());
            self.entries.push(entry);
        }
        Ok(())
    }

    #[must_use]
    pub fn vector(&self, chunk_id: &str) -> Option<&[f32]> {
        self.positions
            .get(chunk_id)
            .map(|&pos| self.entries[pos].vector.as_slice())
    }

    /// Remove an entry. Returns whether it existed.
    pub fn remove(&mut self, chunk_id: &str) -> bool {
        let Some(pos) = self.positions.remove(chunk_id) else {
            return false;
        };
        self.entries.remove(pos);
        for idx in self.positions.values_mut() {
            if *idx > pos {
                *idx -= 1;
            }
        }
        if self.entries.is_empty() {
            self.dimensions = None;
        }
        true
    }

    /// Top `limit` entries by cosine similarity to `query`, best first.
    /// Equal scores keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::DimensionMismatch`] if `query` differs in size from the
    /// stored vectors.
    pub fn search(
        &self,
        query: &[f32],
        limit: usize,
        filter: Option<&IndexFilter>,
    ) -> Result<Vec<ScoredChunk>, EmbedError> {
        self.check_dimensions(query.len())?;

        let mut scored: Vec<(f32, &Entry)> = self
            .entries
            .iter()
            .filter(|e| filter.is_none_or(|f| f.matches(&e.payload)))
            .map(|e| (cosine_similarity(query, &e.vector), e))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(score, e)| ScoredChunk {
                chunk_id: e.chunk_id.clone(),
                score,
                content: e.content.clone(),
                payload: e.payload.clone(),
            })
            .collect())
    }

    fn check_dimensions(&self, actual: usize) -> Result<(), EmbedError> {
        match self.dimensions {
            Some(expected) if expected != actual => {
                Err(EmbedError::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }
}
