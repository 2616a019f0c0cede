use std::fmt;

const REDACTED: &str = "[REDACTED]";

/// An API credential. Formatting never reveals the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Box<str>);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().into_boxed_str())
    }

    /// Reads a credential from the environment variable `key`.
    ///
    /// Surrounding whitespace is trimmed; an unset or blank variable yields `None`.
    #[must_use]
    pub fn from_env(key: &str) -> Option<Self> {
        let value = std::env::var(key).ok()?;
        let value = value.trim();
        (!value.is_empty()).then(|| Self::new(value))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&format_args!("{REDACTED}")).finish()
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
