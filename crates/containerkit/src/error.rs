//! Error types for container operations.
//!
//! Errors carry enough context to tell a user which image or command failed
//! and whether the failure looks transient (network hiccup during a pull)
//! or permanent (bad spec, failed command).

use std::io;
use std::path::PathBuf;

/// Result type alias for containerkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building images or running containers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No container engine (docker/podman) could be located.
    #[error("no container engine found: install docker or podman, or set an explicit binary")]
    EngineNotFound,

    /// The requested engine binary does not exist.
    #[error("container engine not found: {0}")]
    EngineBinaryNotFound(String),

    /// Image build failed.
    #[error("image build failed for {base}: {message}")]
    BuildFailed {
        /// Base image of the spec that failed to build.
        base: String,
        /// Captured stderr from the engine.
        message: String,
    },

    /// A container command exited with a nonzero status.
    #[error("command failed in {image}: {stderr}")]
    CommandFailed {
        /// Image the command ran in.
        image: String,
        /// Captured stderr.
        stderr: String,
        /// Exit code if the process exited normally.
        code: Option<i32>,
    },

    /// The image spec or invocation is malformed.
    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    /// A referenced secret could not be resolved.
    #[error("secret not available: {0}")]
    SecretUnavailable(String),

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

    /// Whether this error is typically transient and worth retrying.
    ///
    /// Only build failures that look like registry/network trouble qualify.
    /// Command failures are never retried: the modules wrap tools that
    /// mutate external state, rerunning them blindly is not safe.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::BuildFailed { message, .. } => looks_transient(message),
            _ => false,
        }
    }
}

/// Heuristic for registry/network failures in engine stderr.
fn looks_transient(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    [
        "timeout",
        "timed out",
        "temporary failure",
        "connection reset",
        "connection refused",
        "tls handshake",
        "i/o timeout",
        "503",
        "too many requests",
    ]
    .iter()
    .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_network_failure_is_retryable() {
        let err = Error::BuildFailed {
            base: "alpine:3.19".to_string(),
            message: "Get \"https://registry-1.docker.io/v2/\": net/http: TLS handshake timeout"
                .to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_build_syntax_failure_is_not_retryable() {
        let err = Error::BuildFailed {
            base: "alpine:3.19".to_string(),
            message: "dockerfile parse error line 3: unknown instruction: RUNN".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_command_failure_is_never_retryable() {
        let err = Error::CommandFailed {
            image: "sha256:abc".to_string(),
            stderr: "connection timed out".to_string(),
            code: Some(1),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_display_includes_context() {
        let err = Error::CommandFailed {
            image: "gradle:latest".to_string(),
            stderr: "task 'bild' not found".to_string(),
            code: Some(1),
        };
        let display = format!("{}", err);
        assert!(display.contains("gradle:latest"));
        assert!(display.contains("bild"));
    }
}
