//! kubectl with per-cluster authentication baked into the container.
//!
//! [`Kubectl`] holds a kubeconfig; each authentication method produces a
//! [`KubectlCli`] whose container has the tools and credentials ready so
//! commands can just run. EKS via aws-iam-authenticator is the first
//! method; others follow the same shape.

use crate::modules::AWS_IAM_AUTHENTICATOR_URL;
use anyhow::{Context, Result};
use containerkit::{Engine, ImageRef, ImageSpec, Invocation};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Pinned kubectl release.
pub const KUBECTL_VERSION: &str = "v1.29.1";

const BASE_IMAGE: &str = "debian:trixie-slim";

/// Entry point: a kubeconfig plus a choice of authentication method.
pub struct Kubectl {
    kubeconfig: PathBuf,
}

impl Kubectl {
    /// Create the module around an existing kubeconfig file.
    pub fn new(kubeconfig: impl Into<PathBuf>) -> Self {
        Self {
            kubeconfig: kubeconfig.into(),
        }
    }

    /// kubectl configured for EKS: aws-iam-authenticator plus AWS
    /// credentials mounted.
    pub fn eks(
        &self,
        engine: Box<dyn Engine>,
        aws_creds: impl Into<PathBuf>,
        aws_config: Option<PathBuf>,
        aws_profile: impl Into<String>,
    ) -> KubectlCli {
        KubectlCli {
            engine,
            kubeconfig: self.kubeconfig.clone(),
            aws_creds: aws_creds.into(),
            aws_config,
            aws_profile: aws_profile.into(),
            image: OnceLock::new(),
        }
    }
}

/// A container configured to talk to one cluster.
pub struct KubectlCli {
    engine: Box<dyn Engine>,
    kubeconfig: PathBuf,
    aws_creds: PathBuf,
    aws_config: Option<PathBuf>,
    aws_profile: String,
    image: OnceLock<ImageRef>,
}

impl KubectlCli {
    /// Run a kubectl command, returning stdout.
    ///
    /// `kubectl` itself is the entrypoint: to list pods pass
    /// `["get", "pods", "-n", "kube-system"]`.
    pub fn exec(&self, args: &[String]) -> Result<String> {
        let image = self.image()?;
        let invocation = self.mounts(Invocation::entrypoint_args(args.to_vec()));
        self.engine
            .exec_capture(&image, &invocation)
            .context("kubectl failed")
    }

    /// Drop into an interactive shell inside the configured container to
    /// troubleshoot auth problems.
    pub fn debug_shell(&self) -> Result<()> {
        let image = self.image()?;
        let invocation = self.mounts(Invocation::command(["bash"]).interactive());
        self.engine.run(&image, &invocation)?;
        Ok(())
    }

    fn image(&self) -> Result<ImageRef> {
        if let Some(image) = self.image.get() {
            return Ok(image.clone());
        }
        let image = self.engine.build(&spec())?;
        Ok(self.image.get_or_init(|| image).clone())
    }

    fn mounts(&self, invocation: Invocation) -> Invocation {
        let mut invocation = invocation
            .env("AWS_PROFILE", &self.aws_profile)
            .bind(&self.kubeconfig, "/root/.kube/config")
            .bind(&self.aws_creds, "/root/.aws/credentials");
        if let Some(config) = &self.aws_config {
            invocation = invocation.bind(config, "/root/.aws/config");
        }
        invocation
    }
}

fn spec() -> ImageSpec {
    let kubectl_url = format!("https://dl.k8s.io/release/{KUBECTL_VERSION}/bin/linux/amd64/kubectl");
    ImageSpec::from_image(BASE_IMAGE)
        .run(["apt", "update"])
        .run(["apt", "install", "-y", "curl", "gettext-base"])
        .run(["curl", "-sL", "-o", "/bin/kubectl", &kubectl_url])
        .run(["chmod", "+x", "/bin/kubectl"])
        .run([
            "curl",
            "-sL",
            "-o",
            "/bin/aws-iam-authenticator",
            AWS_IAM_AUTHENTICATOR_URL,
        ])
        .run(["chmod", "+x", "/bin/aws-iam-authenticator"])
        .entrypoint(["/bin/kubectl"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use containerkit::MockEngine;

    fn cli(mock: &MockEngine) -> KubectlCli {
        Kubectl::new("/home/ci/kubeconfig.yaml").eks(
            Box::new(mock.clone()),
            "/home/ci/.aws/credentials",
            None,
            "staging",
        )
    }

    #[test]
    fn test_image_pins_kubectl_version() {
        let mock = MockEngine::new();
        cli(&mock).exec(&["version".to_string()]).unwrap();

        let dockerfile = mock.builds()[0].render().unwrap();
        assert!(dockerfile.starts_with("FROM debian:trixie-slim\n"));
        assert!(dockerfile.contains("https://dl.k8s.io/release/v1.29.1/bin/linux/amd64/kubectl"));
        assert!(dockerfile.contains("gettext-base"));
        assert!(dockerfile.contains("ENTRYPOINT [\"/bin/kubectl\"]"));
    }

    #[test]
    fn test_exec_returns_stdout() {
        let mock = MockEngine::new();
        mock.push_stdout("pod-a\npod-b\n");

        let out = cli(&mock)
            .exec(&["get".to_string(), "pods".to_string()])
            .unwrap();
        assert_eq!(out, "pod-a\npod-b");

        let inv = &mock.runs()[0].1;
        assert_eq!(inv.args, vec!["get", "pods"]);
        assert!(inv.use_entrypoint);
    }

    #[test]
    fn test_mounts_kubeconfig_and_credentials() {
        let mock = MockEngine::new();
        cli(&mock).exec(&["version".to_string()]).unwrap();

        let inv = &mock.runs()[0].1;
        assert!(
            inv.binds
                .iter()
                .any(|b| b.container == "/root/.kube/config" && !b.writable)
        );
        assert!(
            inv.binds
                .iter()
                .any(|b| b.container == "/root/.aws/credentials")
        );
        assert!(
            inv.env
                .contains(&("AWS_PROFILE".to_string(), "staging".to_string()))
        );
    }

    #[test]
    fn test_debug_shell_is_interactive_without_entrypoint() {
        let mock = MockEngine::new();
        cli(&mock).debug_shell().unwrap();

        let inv = &mock.runs()[0].1;
        assert!(inv.interactive);
        assert!(!inv.use_entrypoint);
        assert_eq!(inv.args, vec!["bash"]);
    }

    #[test]
    fn test_chained_execs_share_image() {
        let mock = MockEngine::new();
        mock.push_stdout("'pod-a'");
        mock.push_stdout("log line");

        let cli = cli(&mock);
        let pod = cli
            .exec(&["get".to_string(), "pods".to_string()])
            .unwrap();
        let logs = cli.exec(&["logs".to_string(), pod]).unwrap();

        assert_eq!(logs, "log line");
        assert_eq!(mock.builds().len(), 1);
        assert_eq!(mock.runs()[1].1.args, vec!["logs", "'pod-a'"]);
    }
}
