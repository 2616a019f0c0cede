use std::time::Duration;

use docsieve_ingest::Chunk;

use crate::backend::EmbeddingBackend;
use crate::error::EmbedError;
use crate::index::InMemoryIndex;

pub const DEFAULT_BATCH_SIZE: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedderConfig {
    /// Texts sent per backend request.
    pub batch_size: usize,
    /// Upper bound for one backend request. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: None,
        }
    }
}

/// Turns chunks into vectors through an [`EmbeddingBackend`].
#[derive(Debug, Clone)]
pub struct Embedder<B> {
    backend: B,
    config: EmbedderConfig,
}

impl<B: EmbeddingBackend> Embedder<B> {
    #[must_use]
    pub fn new(backend: B, mut config: EmbedderConfig) -> Self {
        config.batch_size = config.batch_size.max(1);
        Self { backend, config }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn config(&self) -> &EmbedderConfig {
        &self.config
    }

    /// One vector per chunk, in chunk order.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::EmptyInput`] for no chunks, [`EmbedError::EmptyEmbedding`]
    /// or [`EmbedError::CountMismatch`] when the backend answers with the wrong number
    /// of vectors, [`EmbedError::Timeout`] when a request exceeds the configured
    /// timeout, and any backend error unchanged.
    pub async fn embed(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        self.embed_texts(&texts).await
    }

    /// Like [`Embedder::embed`] for raw texts.
    ///
    /// # Errors
    ///
    /// See [`Embedder::embed`].
    pub async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Err(EmbedError::EmptyInput);
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for (batch_no, batch) in texts.chunks(self.config.batch_size).enumerate() {
            let batch_vectors = self.embed_one_batch(batch).await?;
            if batch_vectors.is_empty() {
                return Err(EmbedError::EmptyEmbedding);
            }
            if batch_vectors.len() != batch.len() {
                return Err(EmbedError::CountMismatch {
                    expected: texts.len(),
                    actual: vectors.len() + batch_vectors.len(),
                });
            }
            tracing::debug!(
                backend = self.backend.name(),
                batch = batch_no,
                size = batch.len(),
                "embedded batch"
            );
            vectors.extend(batch_vectors);
        }

        tracing::info!(
            backend = self.backend.name(),
            texts = texts.len(),
            "embedding complete"
        );
        Ok(vectors)
    }

    /// Embed a single search query.
    ///
    /// # Errors
    ///
    /// See [`Embedder::embed`].
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed_texts(&[query.to_owned()]).await?;
        vectors.pop().ok_or(EmbedError::EmptyEmbedding)
    }

    /// Embed `chunks` and store them in a fresh index keyed by chunk id.
    ///
    /// # Errors
    ///
    /// See [`Embedder::embed`]; also [`EmbedError::DimensionMismatch`] if the backend
    /// returns vectors of different sizes.
    pub async fn build_index(&self, chunks: &[Chunk]) -> Result<InMemoryIndex, EmbedError> {
        let vectors = self.embed(chunks).await?;
        let mut index = InMemoryIndex::new();
        for (chunk, vector) in chunks.iter().zip(vectors) {
            index.insert(chunk, vector)?;
        }
        Ok(index)
    }

    async fn embed_one_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, self.backend.embed_batch(batch))
                .await
                .map_err(|_| EmbedError::Timeout(limit))?,
            None => self.backend.embed_batch(batch).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use docsieve_ingest::DocumentMetadata;

    use super::*;

    /// Echoes the text length as a 2-d vector and records batch sizes.
    #[derive(Default)]
    struct LengthBackend {
        batches: Arc<std::sync::Mutex<Vec<usize>>>,
        calls: AtomicUsize,
        short_on_call: Option<usize>,
        empty: bool,
        delay: Option<Duration>,
    }

    impl EmbeddingBackend for LengthBackend {
        #[allow(clippy::unnecessary_literal_bound)]
        fn name(&self) -> &str {
            "length"
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.batches.lock().unwrap().push(texts.len());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.empty {
                return Ok(Vec::new());
            }
            #[allow(clippy::cast_precision_loss)]
            let mut out: Vec<Vec<f32>> = texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect();
            if self.short_on_call == Some(call) {
                out.pop();
            }
            Ok(out)
        }
    }

    fn chunks(n: usize) -> Vec<Chunk> {
        (0..n)
            .map(|i| Chunk {
                content: "x".repeat(i + 1),
                metadata: DocumentMetadata::with_source("doc.pdf"),
                chunk_id: format!("doc_{i:03}"),
                token_count: 1,
                weight: 1.0,
            })
            .collect()
    }

    fn config(batch_size: usize) -> EmbedderConfig {
        EmbedderConfig {
            batch_size,
            timeout: None,
        }
    }

    #[tokio::test]
    async fn batches_preserve_order() {
        let backend = LengthBackend::default();
        let batches = Arc::clone(&backend.batches);
        let embedder = Embedder::new(backend, config(2));

        let vectors = embedder.embed(&chunks(5)).await.unwrap();
        let lens: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(lens, [1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(*batches.lock().unwrap(), [2, 2, 1]);
    }

    #[tokio::test]
    async fn empty_input_rejected() {
        let embedder = Embedder::new(LengthBackend::default(), EmbedderConfig::default());
        let err = embedder.embed(&[]).await.unwrap_err();
        assert!(matches!(err, EmbedError::EmptyInput));
    }

    #[tokio::test]
    async fn empty_response_rejected() {
        let backend = LengthBackend {
            empty: true,
            ..LengthBackend::default()
        };
        let err = Embedder::new(backend, EmbedderConfig::default())
            .embed(&chunks(3))
            .await
            .unwrap_err();
        assert!(matches!(err, EmbedError::EmptyEmbedding));
    }

    #[tokio::test]
    async fn short_batch_is_count_mismatch() {
        let backend = LengthBackend {
            short_on_call: Some(1),
            ..LengthBackend::default()
        };
        let err = Embedder::new(backend, config(2))
            .embed(&chunks(4))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EmbedError::CountMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn timeout_applies_per_batch() {
        let backend = LengthBackend {
            delay: Some(Duration::from_millis(200)),
            ..LengthBackend::default()
        };
        let embedder = Embedder::new(
            backend,
            EmbedderConfig {
                batch_size: 8,
                timeout: Some(Duration::from_millis(10)),
            },
        );
        let err = embedder.embed(&chunks(2)).await.unwrap_err();
        assert!(matches!(err, EmbedError::Timeout(d) if d == Duration::from_millis(10)));
    }

    #[tokio::test]
    async fn build_index_keys_by_chunk_id() {
        let embedder = Embedder::new(LengthBackend::default(), EmbedderConfig::default());
        let index = embedder.build_index(&chunks(3)).await.unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.dimensions(), Some(2));
        assert!(index.contains("doc_002"));
    }

    #[tokio::test]
    async fn embed_query_returns_single_vector() {
        let embedder = Embedder::new(LengthBackend::default(), EmbedderConfig::default());
        assert_eq!(embedder.embed_query("abcd").await.unwrap(), vec![4.0, 1.0]);
    }

    #[test]
    fn zero_batch_size_clamped() {
        let embedder = Embedder::new(LengthBackend::default(), config(0));
        assert_eq!(embedder.config().batch_size, 1);
    }
}
