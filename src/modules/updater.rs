//! GitOps image bumps: clone a deployment repo, rewrite the container
//! image field of one or more Kubernetes manifests with `yq`, commit and
//! push.
//!
//! The git work happens on the host through [`gitkit`]; only the YAML
//! patching runs in a container, using the pinned `mikefarah/yq` image
//! against the cloned working tree.

use anyhow::{Context, Result, bail};
use containerkit::{Engine, ImageSpec, Invocation, Secret};
use gitkit::{BasicAuth, Repository};
use std::fs;
use std::path::Path;

/// Pinned yq image tag.
pub const YQ_VERSION: &str = "4.40.7";

const WORKDIR: &str = "/workdir";

/// Everything one image bump needs.
pub struct UpdateRequest {
    /// Application name, used in the commit message only.
    pub app: Option<String>,
    /// Repository clone URL (https).
    pub repo_url: String,
    /// Branch to clone and push back to.
    pub branch: String,
    /// Manifest paths relative to the repository root.
    pub files: Vec<String>,
    /// New image reference to write into the manifests.
    pub image_url: String,
    /// Indices into `.spec.template.spec.containers` to rewrite.
    pub containers: Vec<usize>,
    /// Commit author name.
    pub git_user: String,
    /// Commit author email.
    pub git_email: String,
    /// HTTP basic-auth password or token for clone and push.
    pub git_password: Secret,
    /// Push with `--force-with-lease`.
    pub force_push: bool,
}

impl UpdateRequest {
    fn commit_message(&self) -> String {
        match &self.app {
            Some(app) => format!("Updating {app} resource with image: {}", self.image_url),
            None => format!("Updating resource with image: {}", self.image_url),
        }
    }
}

/// The clone/patch/commit/push pipeline.
pub struct ImageUpdater {
    engine: Box<dyn Engine>,
}

impl ImageUpdater {
    /// Create the module on top of a container engine.
    pub fn new(engine: Box<dyn Engine>) -> Self {
        Self { engine }
    }

    /// Run one image bump end to end.
    ///
    /// A clone that the patches leave byte-identical is not an error:
    /// the update is logged as already applied and nothing is pushed.
    pub fn update(&self, request: &UpdateRequest) -> Result<()> {
        validate(request)?;

        let auth = BasicAuth::new(&request.git_user, request.git_password.clone());
        let checkout = tempfile::tempdir().context("could not create clone directory")?;
        let repo = Repository::clone_shallow(
            &request.repo_url,
            &request.branch,
            &auth,
            checkout.path().join("repo"),
        )?;

        self.patch_manifests(repo.path(), request)?;

        if !repo.has_changes()? {
            log::warn!(
                "{} already points at {}, nothing to push",
                request.repo_url,
                request.image_url
            );
            return Ok(());
        }

        for file in &request.files {
            repo.add(file)?;
        }
        repo.commit(&request.commit_message(), &request.git_user, &request.git_email)?;
        repo.push(&auth, request.force_push)?;
        Ok(())
    }

    /// Patch every (file, container index) pair with yq.
    ///
    /// The worktree is mounted read-only; yq prints the patched document
    /// and the file is rewritten on the host, so the clone keeps the
    /// invoking user's ownership.
    fn patch_manifests(&self, root: &Path, request: &UpdateRequest) -> Result<()> {
        let image = self.engine.build(&ImageSpec::from_image(yq_image()))?;

        for file in &request.files {
            for &index in &request.containers {
                let script = yq_script(file, index, &request.image_url);
                let invocation =
                    Invocation::command(["sh", "-c", script.as_str()]).bind(root, WORKDIR);
                let patched = self
                    .engine
                    .exec_capture(&image, &invocation)
                    .with_context(|| format!("could not patch {file}"))?;

                let dest = root.join(file);
                fs::write(&dest, format!("{patched}\n"))
                    .with_context(|| format!("could not write {}", dest.display()))?;
            }
        }
        Ok(())
    }
}

fn yq_image() -> String {
    format!("mikefarah/yq:{YQ_VERSION}")
}

/// The shell line run inside the yq container for one file and one
/// container index. The patched document goes to stdout.
fn yq_script(file: &str, index: usize, image_url: &str) -> String {
    format!(
        "yq '.spec.template.spec.containers[{index}].image = \"{image_url}\"' {WORKDIR}/{file}"
    )
}

/// Reject inputs that would escape the quoting in [`yq_script`].
fn validate(request: &UpdateRequest) -> Result<()> {
    if request.files.is_empty() {
        bail!("no manifest files to update");
    }
    if request.containers.is_empty() {
        bail!("no container indices to update");
    }
    for value in std::iter::once(&request.image_url).chain(&request.files) {
        if value.contains(['\'', '"', '\\', '\n', '$', '`']) {
            bail!("unsafe characters in {value:?}");
        }
    }
    for file in &request.files {
        if file.starts_with('/') || file.contains("..") {
            bail!("manifest path must stay inside the repository: {file:?}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> UpdateRequest {
        UpdateRequest {
            app: Some("api".to_string()),
            repo_url: "https://github.com/org/deploys.git".to_string(),
            branch: "main".to_string(),
            files: vec!["k8s/deployment.yaml".to_string()],
            image_url: "registry.example.com/api:v42".to_string(),
            containers: vec![0],
            git_user: "ci-bot".to_string(),
            git_email: "ci-bot@example.com".to_string(),
            git_password: Secret::new("token"),
            force_push: false,
        }
    }

    #[test]
    fn test_yq_script_shape() {
        assert_eq!(
            yq_script("k8s/deployment.yaml", 1, "img:v2"),
            "yq '.spec.template.spec.containers[1].image = \"img:v2\"' /workdir/k8s/deployment.yaml"
        );
    }

    #[test]
    fn test_patch_writes_yq_output_back_on_the_host() {
        let mock = containerkit::MockEngine::new();
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("k8s")).unwrap();
        let manifest = dir.path().join("k8s/deployment.yaml");
        fs::write(&manifest, "image: old\n").unwrap();
        mock.push_stdout("image: registry.example.com/api:v42");

        ImageUpdater::new(Box::new(mock.clone()))
            .patch_manifests(dir.path(), &request())
            .unwrap();

        // The container only reads the worktree; the rewrite happens on
        // the host so file ownership never changes.
        let inv = &mock.runs()[0].1;
        assert!(
            inv.binds
                .iter()
                .any(|b| b.container == "/workdir" && !b.writable)
        );
        assert_eq!(
            fs::read_to_string(&manifest).unwrap(),
            "image: registry.example.com/api:v42\n"
        );
    }

    #[test]
    fn test_patch_covers_every_file_and_index() {
        let mock = containerkit::MockEngine::new();
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("k8s")).unwrap();
        fs::write(dir.path().join("k8s/deployment.yaml"), "image: old\n").unwrap();

        let mut req = request();
        req.containers = vec![0, 2];
        ImageUpdater::new(Box::new(mock.clone()))
            .patch_manifests(dir.path(), &req)
            .unwrap();

        let scripts: Vec<String> = mock.runs().iter().map(|(_, inv)| inv.args[2].clone()).collect();
        assert_eq!(scripts.len(), 2);
        assert!(scripts[0].contains("containers[0]"));
        assert!(scripts[1].contains("containers[2]"));
    }

    #[test]
    fn test_commit_message_with_and_without_app() {
        let mut req = request();
        assert_eq!(
            req.commit_message(),
            "Updating api resource with image: registry.example.com/api:v42"
        );
        req.app = None;
        assert_eq!(
            req.commit_message(),
            "Updating resource with image: registry.example.com/api:v42"
        );
    }

    #[test]
    fn test_validate_accepts_normal_input() {
        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn test_validate_rejects_quote_breakout() {
        let mut req = request();
        req.image_url = "img:v2\"'; rm -rf / #".to_string();
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_validate_rejects_path_escape() {
        let mut req = request();
        req.files = vec!["../outside.yaml".to_string()];
        assert!(validate(&req).is_err());

        req.files = vec!["/etc/passwd".to_string()];
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_lists() {
        let mut req = request();
        req.files.clear();
        assert!(validate(&req).is_err());

        let mut req = request();
        req.containers.clear();
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_yq_image_pinned() {
        assert_eq!(yq_image(), "mikefarah/yq:4.40.7");
    }
}
