//! Core types for runtime container execution.

use crate::secret::Secret;
use std::path::PathBuf;

/// Reference to a built image (engine image ID or tag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef(pub String);

impl ImageRef {
    /// The engine-level image reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A host path bind-mounted into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bind {
    /// Path on the host.
    pub host: PathBuf,
    /// Mount point inside the container.
    pub container: String,
    /// Whether the container may write to the mount.
    pub writable: bool,
}

/// One runtime execution against a built image.
///
/// Credentials travel as secret env vars (process environment, never argv)
/// or secret files (0600 host temp file, mounted read-only).
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Arguments appended to the image entrypoint. When
    /// `use_entrypoint` is false the first argument becomes the program.
    pub args: Vec<String>,
    /// Whether to run through the image's entrypoint.
    pub use_entrypoint: bool,
    /// Plain environment variables.
    pub env: Vec<(String, String)>,
    /// Secret environment variables.
    pub secret_env: Vec<(String, Secret)>,
    /// Bind mounts.
    pub binds: Vec<Bind>,
    /// Secret file mounts: container path and contents.
    pub secret_files: Vec<(String, Secret)>,
    /// Named cache volumes: volume name and container path.
    pub caches: Vec<(String, String)>,
    /// Attach the caller's terminal (debug shells).
    pub interactive: bool,
}

impl Invocation {
    /// Run the image entrypoint with the given arguments.
    #[must_use]
    pub fn entrypoint_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            use_entrypoint: true,
            ..Self::default()
        }
    }

    /// Run an arbitrary command, ignoring the image entrypoint.
    #[must_use]
    pub fn command<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            use_entrypoint: false,
            ..Self::default()
        }
    }

    /// Set a plain environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set a secret environment variable.
    #[must_use]
    pub fn secret_env(mut self, key: impl Into<String>, secret: Secret) -> Self {
        self.secret_env.push((key.into(), secret));
        self
    }

    /// Bind-mount a host path read-only.
    #[must_use]
    pub fn bind(mut self, host: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        self.binds.push(Bind {
            host: host.into(),
            container: container.into(),
            writable: false,
        });
        self
    }

    /// Bind-mount a host path read-write.
    #[must_use]
    pub fn bind_writable(mut self, host: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        self.binds.push(Bind {
            host: host.into(),
            container: container.into(),
            writable: true,
        });
        self
    }

    /// Mount a secret as a read-only file inside the container.
    #[must_use]
    pub fn secret_file(mut self, container: impl Into<String>, secret: Secret) -> Self {
        self.secret_files.push((container.into(), secret));
        self
    }

    /// Mount a named cache volume.
    #[must_use]
    pub fn cache(mut self, name: impl Into<String>, container: impl Into<String>) -> Self {
        self.caches.push((name.into(), container.into()));
        self
    }

    /// Attach the caller's terminal.
    #[must_use]
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }
}

/// Captured output of a container run.
#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
    /// Exit code if the process exited normally.
    pub code: Option<i32>,
}

impl ExecOutput {
    /// Whether the command exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}
