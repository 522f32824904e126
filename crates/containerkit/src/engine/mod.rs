//! Engine abstraction for building images and running containers.
//!
//! The [`Engine`] trait is the seam between the automation modules and the
//! container runtime. The real implementation shells out to the Docker or
//! Podman CLI; [`MockEngine`] records everything for tests.

pub mod docker;

use crate::error::{Error, Result};
use crate::spec::ImageSpec;
use crate::types::{ExecOutput, ImageRef, Invocation};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Engine trait for container build-and-exec pipelines.
pub trait Engine: Send + Sync {
    /// Check if the engine is usable.
    fn is_available(&self) -> bool;

    /// Build an image from a spec, returning a reference to it.
    fn build(&self, spec: &ImageSpec) -> Result<ImageRef>;

    /// Run one invocation against a built image, capturing output.
    ///
    /// A nonzero exit is not an error at this level; callers that want
    /// fail-on-nonzero semantics use [`Engine::exec_capture`].
    fn run(&self, image: &ImageRef, invocation: &Invocation) -> Result<ExecOutput>;

    /// Run an invocation and return trimmed stdout, failing on nonzero exit.
    fn exec_capture(&self, image: &ImageRef, invocation: &Invocation) -> Result<String> {
        let output = self.run(image, invocation)?;
        if output.success() {
            Ok(output.stdout.trim().to_string())
        } else {
            Err(Error::CommandFailed {
                image: image.as_str().to_string(),
                stderr: output.stderr.trim().to_string(),
                code: output.code,
            })
        }
    }
}

/// Get the default engine (docker, falling back to podman).
pub fn default_engine() -> Result<docker::DockerEngine> {
    docker::DockerEngine::new()
}

/// Mock engine for testing without a container runtime.
///
/// Records every built spec and every invocation, and replays scripted
/// outputs in order. When the script runs dry, runs succeed with empty
/// output.
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    builds: Arc<Mutex<Vec<ImageSpec>>>,
    runs: Arc<Mutex<Vec<(String, Invocation)>>>,
    outputs: Arc<Mutex<VecDeque<ExecOutput>>>,
}

impl MockEngine {
    /// Create a new empty mock engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next run to succeed with the given stdout.
    pub fn push_stdout(&self, stdout: impl Into<String>) {
        self.outputs.lock().unwrap().push_back(ExecOutput {
            stdout: stdout.into(),
            stderr: String::new(),
            code: Some(0),
        });
    }

    /// Script the next run to fail with the given stderr.
    pub fn push_failure(&self, stderr: impl Into<String>) {
        self.outputs.lock().unwrap().push_back(ExecOutput {
            stdout: String::new(),
            stderr: stderr.into(),
            code: Some(1),
        });
    }

    /// All specs that were built, in order.
    #[must_use]
    pub fn builds(&self) -> Vec<ImageSpec> {
        self.builds.lock().unwrap().clone()
    }

    /// All invocations that were run, in order, with the image they ran in.
    #[must_use]
    pub fn runs(&self) -> Vec<(String, Invocation)> {
        self.runs.lock().unwrap().clone()
    }
}

impl Engine for MockEngine {
    fn is_available(&self) -> bool {
        true
    }

    fn build(&self, spec: &ImageSpec) -> Result<ImageRef> {
        // Rendering validates the spec the same way a real build would.
        spec.render()?;
        let mut builds = self.builds.lock().unwrap();
        builds.push(spec.clone());
        Ok(ImageRef(format!("mock:{}", builds.len() - 1)))
    }

    fn run(&self, image: &ImageRef, invocation: &Invocation) -> Result<ExecOutput> {
        self.runs
            .lock()
            .unwrap()
            .push((image.as_str().to_string(), invocation.clone()));

        Ok(self
            .outputs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ExecOutput {
                stdout: String::new(),
                stderr: String::new(),
                code: Some(0),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_builds_and_runs() {
        let mock = MockEngine::new();
        let spec = ImageSpec::from_image("alpine:3.19");

        let image = mock.build(&spec).unwrap();
        mock.run(&image, &Invocation::entrypoint_args(["version"]))
            .unwrap();

        assert_eq!(mock.builds().len(), 1);
        let runs = mock.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].0, "mock:0");
        assert_eq!(runs[0].1.args, vec!["version"]);
    }

    #[test]
    fn test_mock_replays_outputs_in_order() {
        let mock = MockEngine::new();
        mock.push_stdout("first");
        mock.push_stdout("second");

        let image = mock.build(&ImageSpec::from_image("alpine:3.19")).unwrap();
        let inv = Invocation::entrypoint_args(["x"]);

        assert_eq!(mock.exec_capture(&image, &inv).unwrap(), "first");
        assert_eq!(mock.exec_capture(&image, &inv).unwrap(), "second");
        // Script exhausted: succeed with empty output.
        assert_eq!(mock.exec_capture(&image, &inv).unwrap(), "");
    }

    #[test]
    fn test_exec_capture_fails_on_nonzero() {
        let mock = MockEngine::new();
        mock.push_failure("no such cluster");

        let image = mock.build(&ImageSpec::from_image("alpine:3.19")).unwrap();
        let err = mock
            .exec_capture(&image, &Invocation::entrypoint_args(["delete"]))
            .unwrap_err();

        match err {
            Error::CommandFailed { stderr, code, .. } => {
                assert_eq!(stderr, "no such cluster");
                assert_eq!(code, Some(1));
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_mock_build_validates_spec() {
        let mock = MockEngine::new();
        assert!(mock.build(&ImageSpec::from_image("")).is_err());
    }
}
