//! eksctl wrapped in a container with AWS credentials mounted.
//!
//! The image installs a pinned eksctl release plus aws-iam-authenticator;
//! the cluster config and AWS credentials are mounted read-only at runtime
//! so nothing sensitive is baked into a layer.

use crate::modules::AWS_IAM_AUTHENTICATOR_URL;
use anyhow::{Context, Result};
use containerkit::{Engine, ImageRef, ImageSpec, Invocation};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Default eksctl release.
pub const DEFAULT_VERSION: &str = "latest";

const BASE_IMAGE: &str = "alpine:3.19";

/// eksctl against a cluster config file.
pub struct Eksctl {
    engine: Box<dyn Engine>,
    version: String,
    aws_creds: PathBuf,
    aws_config: Option<PathBuf>,
    aws_profile: String,
    cluster: PathBuf,
    image: OnceLock<ImageRef>,
}

impl Eksctl {
    /// Create the module. `aws_creds` and `cluster` must exist on the host.
    pub fn new(
        engine: Box<dyn Engine>,
        version: impl Into<String>,
        aws_creds: impl Into<PathBuf>,
        aws_config: Option<PathBuf>,
        aws_profile: impl Into<String>,
        cluster: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            version: version.into(),
            aws_creds: aws_creds.into(),
            aws_config,
            aws_profile: aws_profile.into(),
            cluster: cluster.into(),
            image: OnceLock::new(),
        }
    }

    /// Run eksctl with the given arguments, returning stdout.
    pub fn exec(&self, args: &[String]) -> Result<String> {
        let image = self.image()?;
        self.engine
            .exec_capture(&image, &self.invocation(args.to_vec()))
            .context("eksctl failed")
    }

    /// `eksctl create cluster -f /cluster.yaml`, plus extra flags.
    pub fn create(&self, flags: &[String]) -> Result<String> {
        self.exec(&with_cluster_args("create", flags))
    }

    /// `eksctl delete cluster -f /cluster.yaml`, plus extra flags.
    pub fn delete(&self, flags: &[String]) -> Result<String> {
        self.exec(&with_cluster_args("delete", flags))
    }

    /// Write the cluster kubeconfig to `dest` on the host.
    pub fn write_kubeconfig(&self, dest: &Path) -> Result<()> {
        let image = self.image()?;

        // eksctl logs to stderr; the kubeconfig itself comes back on stdout.
        let script = "/bin/eksctl utils write-kubeconfig -f /cluster.yaml \
                      --kubeconfig /tmp/kubeconfig.yaml && cat /tmp/kubeconfig.yaml";
        let mut invocation = Invocation::command(["sh", "-c", script]);
        invocation = self.mounts(invocation);

        let kubeconfig = self
            .engine
            .exec_capture(&image, &invocation)
            .context("eksctl write-kubeconfig failed")?;

        std::fs::write(dest, kubeconfig)
            .with_context(|| format!("could not write {}", dest.display()))?;
        Ok(())
    }

    fn image(&self) -> Result<ImageRef> {
        if let Some(image) = self.image.get() {
            return Ok(image.clone());
        }
        let image = self.engine.build(&self.spec())?;
        Ok(self.image.get_or_init(|| image).clone())
    }

    fn spec(&self) -> ImageSpec {
        ImageSpec::from_image(BASE_IMAGE)
            .run(["apk", "add", "--no-cache", "--update", "curl", "tar"])
            .workdir("/")
            .run(["curl", "-sL", "-o", "eksctl.tar.gz", &release_url(&self.version)])
            .run(["tar", "-xzf", "eksctl.tar.gz", "-C", "/bin"])
            .run(["rm", "eksctl.tar.gz"])
            .run([
                "curl",
                "-sL",
                "-o",
                "/bin/aws-iam-authenticator",
                AWS_IAM_AUTHENTICATOR_URL,
            ])
            .run(["chmod", "+x", "/bin/aws-iam-authenticator"])
            .entrypoint(["/bin/eksctl"])
    }

    fn invocation(&self, args: Vec<String>) -> Invocation {
        self.mounts(Invocation::entrypoint_args(args))
    }

    fn mounts(&self, invocation: Invocation) -> Invocation {
        let mut invocation = invocation
            .env("AWS_PROFILE", &self.aws_profile)
            .bind(&self.aws_creds, "/root/.aws/credentials")
            .bind(&self.cluster, "/cluster.yaml");
        if let Some(config) = &self.aws_config {
            invocation = invocation.bind(config, "/root/.aws/config");
        }
        invocation
    }
}

fn with_cluster_args(verb: &str, flags: &[String]) -> Vec<String> {
    let mut args = vec![
        verb.to_string(),
        "cluster".to_string(),
        "-f".to_string(),
        "/cluster.yaml".to_string(),
    ];
    args.extend_from_slice(flags);
    args
}

fn release_url(version: &str) -> String {
    if version == "latest" {
        "https://github.com/eksctl-io/eksctl/releases/latest/download/eksctl_Linux_amd64.tar.gz"
            .to_string()
    } else {
        format!(
            "https://github.com/eksctl-io/eksctl/releases/download/{version}/eksctl_Linux_amd64.tar.gz"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use containerkit::MockEngine;

    fn module(mock: &MockEngine) -> Eksctl {
        Eksctl::new(
            Box::new(mock.clone()),
            DEFAULT_VERSION,
            "/home/ci/.aws/credentials",
            None,
            "ci",
            "/home/ci/cluster.yaml",
        )
    }

    #[test]
    fn test_release_url_latest() {
        assert_eq!(
            release_url("latest"),
            "https://github.com/eksctl-io/eksctl/releases/latest/download/eksctl_Linux_amd64.tar.gz"
        );
    }

    #[test]
    fn test_release_url_pinned() {
        assert_eq!(
            release_url("v0.171.0"),
            "https://github.com/eksctl-io/eksctl/releases/download/v0.171.0/eksctl_Linux_amd64.tar.gz"
        );
    }

    #[test]
    fn test_image_installs_tools_and_entrypoint() {
        let mock = MockEngine::new();
        module(&mock).exec(&["version".to_string()]).unwrap();

        let builds = mock.builds();
        assert_eq!(builds.len(), 1);
        let dockerfile = builds[0].render().unwrap();
        assert!(dockerfile.starts_with("FROM alpine:3.19\n"));
        assert!(dockerfile.contains("eksctl_Linux_amd64.tar.gz"));
        assert!(dockerfile.contains("aws-iam-authenticator"));
        assert!(dockerfile.contains("ENTRYPOINT [\"/bin/eksctl\"]"));
    }

    #[test]
    fn test_image_is_built_once() {
        let mock = MockEngine::new();
        let eksctl = module(&mock);
        eksctl.exec(&["version".to_string()]).unwrap();
        eksctl.exec(&["version".to_string()]).unwrap();
        assert_eq!(mock.builds().len(), 1);
    }

    #[test]
    fn test_create_mounts_and_args() {
        let mock = MockEngine::new();
        module(&mock).create(&["--verbose".to_string()]).unwrap();

        let runs = mock.runs();
        assert_eq!(runs.len(), 1);
        let inv = &runs[0].1;
        assert_eq!(
            inv.args,
            vec!["create", "cluster", "-f", "/cluster.yaml", "--verbose"]
        );
        assert!(inv.use_entrypoint);
        assert!(inv.env.contains(&("AWS_PROFILE".to_string(), "ci".to_string())));
        assert!(
            inv.binds
                .iter()
                .any(|b| b.container == "/root/.aws/credentials" && !b.writable)
        );
        assert!(inv.binds.iter().any(|b| b.container == "/cluster.yaml"));
    }

    #[test]
    fn test_delete_args() {
        let mock = MockEngine::new();
        module(&mock).delete(&[]).unwrap();
        assert_eq!(
            mock.runs()[0].1.args,
            vec!["delete", "cluster", "-f", "/cluster.yaml"]
        );
    }

    #[test]
    fn test_optional_aws_config_mounted() {
        let mock = MockEngine::new();
        let eksctl = Eksctl::new(
            Box::new(mock.clone()),
            "latest",
            "/home/ci/.aws/credentials",
            Some(PathBuf::from("/home/ci/.aws/config")),
            "ci",
            "/home/ci/cluster.yaml",
        );
        eksctl.exec(&["version".to_string()]).unwrap();

        assert!(
            mock.runs()[0]
                .1
                .binds
                .iter()
                .any(|b| b.container == "/root/.aws/config")
        );
    }

    #[test]
    fn test_write_kubeconfig() {
        let mock = MockEngine::new();
        mock.push_stdout("apiVersion: v1\nkind: Config\n");

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("kubeconfig.yaml");
        module(&mock).write_kubeconfig(&dest).unwrap();

        assert_eq!(
            std::fs::read_to_string(&dest).unwrap(),
            "apiVersion: v1\nkind: Config"
        );
        let inv = &mock.runs()[0].1;
        assert!(!inv.use_entrypoint);
        assert!(inv.args[2].contains("utils write-kubeconfig"));
    }

    #[test]
    fn test_exec_propagates_failure() {
        let mock = MockEngine::new();
        mock.push_failure("cluster not found");

        let err = module(&mock).delete(&[]).unwrap_err();
        assert!(format!("{err:#}").contains("cluster not found"));
    }
}
