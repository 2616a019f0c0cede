use std::fmt;

use serde::{Deserialize, Serialize};

use crate::backend::EmbeddingBackend;
use crate::error::EmbedError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Embeddings through an OpenAI-compatible `/embeddings` endpoint.
#[derive(Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiBackend {
    /// # Errors
    ///
    /// Returns [`EmbedError::MissingApiKey`] for an empty key and
    /// [`EmbedError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, EmbedError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(EmbedError::MissingApiKey { backend: "openai" });
        }
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            client: crate::http::default_client()?,
            api_key,
            base_url,
            model: model.into(),
        })
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl EmbeddingBackend for OpenAiBackend {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "openai"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let body = EmbeddingRequest {
            input: texts,
            model: &self.model,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EmbedError::RateLimited);
        }
        if !status.is_success() {
            tracing::error!(status = %status, body = %text, "OpenAI embedding API error");
            return Err(EmbedError::Api {
                status: status.as_u16(),
            });
        }

        let mut resp: EmbeddingResponse = serde_json::from_str(&text)?;
        resp.data.sort_by_key(|d| d.index);
        tracing::debug!(
            model = %self.model,
            inputs = texts.len(),
            vectors = resp.data.len(),
            "OpenAI embeddings received"
        );
        Ok(resp.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let backend = OpenAiBackend::new("sk-very-secret", DEFAULT_BASE_URL, DEFAULT_MODEL).unwrap();
        let dbg = format!("{backend:?}");
        assert!(!dbg.contains("sk-very-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn trailing_slashes_trimmed() {
        let backend = OpenAiBackend::new("k", "http://localhost:8080/v1//", DEFAULT_MODEL).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn empty_key_rejected() {
        let err = OpenAiBackend::new("  ", DEFAULT_BASE_URL, DEFAULT_MODEL).unwrap_err();
        assert!(matches!(err, EmbedError::MissingApiKey { backend: "openai" }));
    }

    #[test]
    fn request_serialization() {
        let input = vec!["hello".to_owned(), "world".to_owned()];
        let body = EmbeddingRequest {
            input: &input,
            model: "text-embedding-3-small",
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            r#"{"input":["hello","world"],"model":"text-embedding-3-small"}"#
        );
    }

    #[test]
    fn response_deserialization() {
        let json = r#"{"object":"list","data":[{"object":"embedding","index":1,"embedding":[0.5]},{"object":"embedding","index":0,"embedding":[0.1,0.2]}],"model":"m","usage":{"prompt_tokens":2,"total_tokens":2}}"#;
        let resp: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.len(), 2);
        assert_eq!(resp.data[0].index, 1);
        assert_eq!(resp.data[1].embedding, vec![0.1, 0.2]);
    }
}
