//! Opaque wrapper for sensitive values.
//!
//! A [`Secret`] never shows its contents through `Debug` or `Display`.
//! Engines pass secrets to containers through the process environment or
//! through 0600 temp files mounted read-only, never through command lines.

use crate::error::{Error, Result};
use std::fmt;
use std::fs;
use std::path::Path;

/// A sensitive string value (API key, token, password).
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap an in-memory value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read a secret from an environment variable.
    pub fn from_env(var: &str) -> Result<Self> {
        std::env::var(var)
            .map(Self)
            .map_err(|_| Error::SecretUnavailable(format!("environment variable {var} not set")))
    }

    /// Read a secret from a file, trimming a trailing newline.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self(contents.trim_end_matches('\n').to_string()))
    }

    /// Access the underlying value. Callers are responsible for not
    /// writing it anywhere user-visible.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the secret is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
