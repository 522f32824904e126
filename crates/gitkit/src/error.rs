//! Error types for git operations.

use std::io;
use std::path::PathBuf;

/// Result type alias for gitkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// git is not installed.
    #[error("git not found in PATH")]
    GitNotFound,

    /// A git subcommand exited with a nonzero status.
    #[error("git {action} failed: {stderr}")]
    CommandFailed {
        /// Subcommand that failed (clone, push, ...).
        action: String,
        /// Captured stderr, with credentials never present.
        stderr: String,
    },

    /// IO error during file operations.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a command failure for a subcommand.
    pub fn command(action: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            action: action.into(),
            stderr: stderr.into(),
        }
    }
}
