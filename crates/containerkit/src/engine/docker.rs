//! Real engine backed by the Docker or Podman CLI.

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::retry::{RetryConfig, with_retry};
use crate::spec::ImageSpec;
use crate::types::{ExecOutput, ImageRef, Invocation};
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Engine that executes `docker` (or `podman`) commands.
pub struct DockerEngine {
    binary: PathBuf,
    retry: RetryConfig,
}

impl DockerEngine {
    /// Create an engine, preferring `docker` and falling back to `podman`.
    pub fn new() -> Result<Self> {
        for candidate in ["docker", "podman"] {
            if let Ok(path) = which::which(candidate) {
                return Ok(Self {
                    binary: path,
                    retry: RetryConfig::default(),
                });
            }
        }
        Err(Error::EngineNotFound)
    }

    /// Create an engine with an explicit binary name or path.
    pub fn with_binary(binary: &str) -> Result<Self> {
        let path = which::which(binary)
            .map_err(|_| Error::EngineBinaryNotFound(binary.to_string()))?;
        Ok(Self {
            binary: path,
            retry: RetryConfig::default(),
        })
    }

    /// Override the retry configuration used for image builds.
    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn build_once(&self, spec: &ImageSpec) -> Result<ImageRef> {
        let context = tempfile::tempdir().map_err(|e| Error::io("build context", e))?;
        let dockerfile = context.path().join("Dockerfile");
        fs::write(&dockerfile, spec.render()?).map_err(|e| Error::io(&dockerfile, e))?;

        log::debug!("building image from {}", spec.base());
        let output = Command::new(&self.binary)
            .arg("build")
            .arg("-q")
            .arg(context.path())
            .output()
            .map_err(|e| Error::io(&self.binary, e))?;

        if !output.status.success() {
            return Err(Error::BuildFailed {
                base: spec.base().to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let image = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if image.is_empty() {
            return Err(Error::BuildFailed {
                base: spec.base().to_string(),
                message: "engine returned no image ID".to_string(),
            });
        }

        Ok(ImageRef(image))
    }

    /// Assemble `run` arguments and the secret material for one invocation.
    ///
    /// Secret files are written under `secret_dir` with 0600 permissions;
    /// the directory must outlive the container process.
    fn run_args(
        &self,
        image: &ImageRef,
        invocation: &Invocation,
        secret_dir: &std::path::Path,
    ) -> Result<Vec<String>> {
        if invocation.args.is_empty() {
            return Err(Error::InvalidSpec("invocation has no arguments".to_string()));
        }

        let mut args = vec!["run".to_string(), "--rm".to_string()];

        if invocation.interactive {
            args.push("-it".to_string());
        }

        for (key, value) in &invocation.env {
            args.push("-e".to_string());
            args.push(format!("{key}={value}"));
        }

        // Secret values pass through the engine's process environment:
        // `-e KEY` without a value makes the CLI forward it.
        for (key, _) in &invocation.secret_env {
            args.push("-e".to_string());
            args.push(key.clone());
        }

        for bind in &invocation.binds {
            let mode = if bind.writable { "" } else { ":ro" };
            args.push("-v".to_string());
            args.push(format!("{}:{}{}", bind.host.display(), bind.container, mode));
        }

        for (index, (container_path, secret)) in invocation.secret_files.iter().enumerate() {
            let host_path = secret_dir.join(format!("secret-{index}"));
            fs::write(&host_path, secret.expose()).map_err(|e| Error::io(&host_path, e))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&host_path, fs::Permissions::from_mode(0o600))
                    .map_err(|e| Error::io(&host_path, e))?;
            }
            args.push("-v".to_string());
            args.push(format!("{}:{}:ro", host_path.display(), container_path));
        }

        for (name, container_path) in &invocation.caches {
            args.push("-v".to_string());
            args.push(format!("{name}:{container_path}"));
        }

        let mut argv = invocation.args.clone();
        if !invocation.use_entrypoint {
            args.push("--entrypoint".to_string());
            args.push(argv.remove(0));
        }

        args.push(image.as_str().to_string());
        args.extend(argv);

        Ok(args)
    }
}

impl Engine for DockerEngine {
    fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn build(&self, spec: &ImageSpec) -> Result<ImageRef> {
        with_retry(&self.retry, || self.build_once(spec))
    }

    fn run(&self, image: &ImageRef, invocation: &Invocation) -> Result<ExecOutput> {
        let secret_dir = tempfile::tempdir().map_err(|e| Error::io("secret dir", e))?;
        let args = self.run_args(image, invocation, secret_dir.path())?;

        let mut cmd = Command::new(&self.binary);
        cmd.args(&args);
        for (key, secret) in &invocation.secret_env {
            cmd.env(key, secret.expose());
        }

        log::debug!("running container: {} {:?}", image, invocation.args);

        if invocation.interactive {
            // Hand the terminal to the container; nothing to capture.
            let status = cmd
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(|e| Error::io(&self.binary, e))?;
            return Ok(ExecOutput {
                stdout: String::new(),
                stderr: String::new(),
                code: status.code(),
            });
        }

        let output = cmd.output().map_err(|e| Error::io(&self.binary, e))?;
        Ok(ExecOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            code: output.status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::Secret;

    fn engine() -> DockerEngine {
        // The binary is never executed by these tests.
        DockerEngine {
            binary: PathBuf::from("docker"),
            retry: RetryConfig::no_retry(),
        }
    }

    #[test]
    fn test_run_args_entrypoint() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::entrypoint_args(["get", "pods"])
            .env("AWS_PROFILE", "ci")
            .bind("/home/ci/.aws/credentials", "/root/.aws/credentials");

        let args = engine()
            .run_args(&ImageRef("img".to_string()), &inv, dir.path())
            .unwrap();

        assert_eq!(
            args,
            vec![
                "run",
                "--rm",
                "-e",
                "AWS_PROFILE=ci",
                "-v",
                "/home/ci/.aws/credentials:/root/.aws/credentials:ro",
                "img",
                "get",
                "pods",
            ]
        );
    }

    #[test]
    fn test_run_args_without_entrypoint() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::command(["sh", "-c", "echo hi"]);

        let args = engine()
            .run_args(&ImageRef("img".to_string()), &inv, dir.path())
            .unwrap();

        assert_eq!(
            args,
            vec!["run", "--rm", "--entrypoint", "sh", "img", "-c", "echo hi"]
        );
    }

    #[test]
    fn test_run_args_secret_env_has_no_value_in_argv() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::entrypoint_args(["branches", "list"])
            .secret_env("NEON_API_KEY", Secret::new("tok_abc"));

        let args = engine()
            .run_args(&ImageRef("img".to_string()), &inv, dir.path())
            .unwrap();

        assert!(args.contains(&"NEON_API_KEY".to_string()));
        assert!(!args.iter().any(|a| a.contains("tok_abc")));
    }

    #[test]
    fn test_run_args_secret_file_written_and_mounted() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::command(["sh", "-c", "cat /tmp/conn"])
            .secret_file("/tmp/conn", Secret::new("postgres://u:p@host/db"));

        let args = engine()
            .run_args(&ImageRef("img".to_string()), &inv, dir.path())
            .unwrap();

        let host_path = dir.path().join("secret-0");
        assert_eq!(
            fs::read_to_string(&host_path).unwrap(),
            "postgres://u:p@host/db"
        );
        assert!(
            args.iter()
                .any(|a| a == &format!("{}:/tmp/conn:ro", host_path.display()))
        );
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&host_path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_run_args_cache_volumes() {
        let dir = tempfile::tempdir().unwrap();
        let inv =
            Invocation::entrypoint_args(["build"]).cache("gradle-caches", "/root/.gradle/caches");

        let args = engine()
            .run_args(&ImageRef("img".to_string()), &inv, dir.path())
            .unwrap();

        assert!(
            args.iter()
                .any(|a| a == "gradle-caches:/root/.gradle/caches")
        );
    }

    #[test]
    fn test_run_args_rejects_empty_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::default();
        assert!(
            engine()
                .run_args(&ImageRef("img".to_string()), &inv, dir.path())
                .is_err()
        );
    }

    #[test]
    fn test_with_binary_missing() {
        assert!(DockerEngine::with_binary("definitely-not-a-container-engine").is_err());
    }
}
