use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EmbedError;

/// A provider that maps a batch of texts to one vector per text, in input order.
pub trait EmbeddingBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Embed `texts` in a single request.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or answers with an error.
    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, EmbedError>> + Send;
}

/// Backends selectable by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    OpenAi,
}

impl BackendKind {
    /// # Errors
    ///
    /// Returns [`EmbedError::UnsupportedBackend`] for any identifier other than `openai`.
    pub fn parse(id: &str) -> Result<Self, EmbedError> {
        match id.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            _ => Err(EmbedError::UnsupportedBackend(id.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
        }
    }
}

impl FromStr for BackendKind {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_openai() {
        assert_eq!(BackendKind::parse("openai").unwrap(), BackendKind::OpenAi);
        assert_eq!(BackendKind::parse(" OpenAI ").unwrap(), BackendKind::OpenAi);
    }

    #[test]
    fn parse_unknown_fails() {
        let err = BackendKind::parse("huggingface").unwrap_err();
        assert!(matches!(err, EmbedError::UnsupportedBackend(ref id) if id == "huggingface"));
        assert!("".parse::<BackendKind>().is_err());
    }

    #[test]
    fn serde_uses_identifier() {
        let json = serde_json::to_string(&BackendKind::OpenAi).unwrap();
        assert_eq!(json, "\"openai\"");
        let back: BackendKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BackendKind::OpenAi);
        assert_eq!(BackendKind::OpenAi.to_string(), "openai");
    }
}
