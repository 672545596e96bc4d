//! The Gemini API key the user hands to the backend.
//!
//! It is held in memory for this process only and forwarded once per
//! `configure` call. Formatting it, in logs or errors, prints a placeholder.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

const REDACTED: &str = "[REDACTED]";

pub struct ApiKey(SecretBox<str>);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretBox::new(key.into().into_boxed_str()))
    }

    /// Raw key text, for the `/configure` request body.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// No characters at all. Whitespace is left for the backend to judge.
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl Clone for ApiKey {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&format_args!("{}", REDACTED)).finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}
