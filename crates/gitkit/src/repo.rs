//! Shallow clone, stage, commit and push through the git CLI.

use crate::auth::{BasicAuth, redact_url};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// A cloned working tree pinned to a single branch.
pub struct Repository {
    git: PathBuf,
    path: PathBuf,
    branch: String,
}

impl Repository {
    /// Shallow-clone a single branch of `url` into `dest`.
    pub fn clone_shallow(
        url: &str,
        branch: &str,
        auth: &BasicAuth,
        dest: impl Into<PathBuf>,
    ) -> Result<Self> {
        let git = which::which("git").map_err(|_| Error::GitNotFound)?;
        let dest = dest.into();

        log::info!("cloning {} (branch {})", redact_url(url), branch);

        let mut args = auth.config_args();
        args.extend(clone_args(url, branch, &dest));
        run_git(&git, None, &args, &auth.env(), "clone")?;

        Ok(Self {
            git,
            path: dest,
            branch: branch.to_string(),
        })
    }

    /// The working tree root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stage a file, given relative to the working tree root.
    pub fn add(&self, file: &str) -> Result<()> {
        run_git(
            &self.git,
            Some(&self.path),
            &["add".to_string(), file.to_string()],
            &[],
            "add",
        )?;
        Ok(())
    }

    /// Whether the working tree has uncommitted changes.
    pub fn has_changes(&self) -> Result<bool> {
        let stdout = run_git(
            &self.git,
            Some(&self.path),
            &["status".to_string(), "--porcelain".to_string()],
            &[],
            "status",
        )?;
        Ok(!stdout.trim().is_empty())
    }

    /// Commit staged changes with an explicit author identity.
    pub fn commit(&self, message: &str, name: &str, email: &str) -> Result<()> {
        run_git(
            &self.git,
            Some(&self.path),
            &commit_args(message, name, email),
            &[],
            "commit",
        )?;
        Ok(())
    }

    /// Push the branch to origin.
    pub fn push(&self, auth: &BasicAuth, force_with_lease: bool) -> Result<()> {
        let mut args = auth.config_args();
        args.extend(push_args(&self.branch, force_with_lease));

        log::info!("pushing {}", self.branch);
        run_git(&self.git, Some(&self.path), &args, &auth.env(), "push")?;
        Ok(())
    }
}

fn clone_args(url: &str, branch: &str, dest: &Path) -> Vec<String> {
    vec![
        "clone".to_string(),
        "--depth".to_string(),
        "1".to_string(),
        "--single-branch".to_string(),
        "--branch".to_string(),
        branch.to_string(),
        url.to_string(),
        dest.display().to_string(),
    ]
}

fn commit_args(message: &str, name: &str, email: &str) -> Vec<String> {
    vec![
        "-c".to_string(),
        format!("user.name={name}"),
        "-c".to_string(),
        format!("user.email={email}"),
        "commit".to_string(),
        "-m".to_string(),
        message.to_string(),
    ]
}

fn push_args(branch: &str, force_with_lease: bool) -> Vec<String> {
    let mut args = vec!["push".to_string()];
    if force_with_lease {
        args.push("--force-with-lease".to_string());
    }
    args.push("origin".to_string());
    args.push(format!("{branch}:{branch}"));
    args
}

/// Run git, returning stdout or a failure with captured stderr.
fn run_git(
    git: &Path,
    cwd: Option<&Path>,
    args: &[String],
    env: &[(String, String)],
    action: &str,
) -> Result<String> {
    let mut cmd = Command::new(git);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }
    // Never fall back to interactive prompts in CI.
    cmd.env("GIT_TERMINAL_PROMPT", "0");

    let output = cmd.output().map_err(|e| Error::io(git, e))?;

    if !output.status.success() {
        return Err(Error::command(
            action,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_args_shallow_single_branch() {
        let args = clone_args(
            "https://github.com/org/deploys.git",
            "main",
            Path::new("/tmp/repo"),
        );
        assert_eq!(
            args,
            vec![
                "clone",
                "--depth",
                "1",
                "--single-branch",
                "--branch",
                "main",
                "https://github.com/org/deploys.git",
                "/tmp/repo",
            ]
        );
    }

    #[test]
    fn test_commit_args_set_identity_inline() {
        let args = commit_args("Updating app resource with image: img:v2", "bot", "bot@ci");
        assert_eq!(
            args,
            vec![
                "-c",
                "user.name=bot",
                "-c",
                "user.email=bot@ci",
                "commit",
                "-m",
                "Updating app resource with image: img:v2",
            ]
        );
    }

    #[test]
    fn test_push_args_plain() {
        assert_eq!(push_args("main", false), vec!["push", "origin", "main:main"]);
    }

    #[test]
    fn test_push_args_force_with_lease() {
        assert_eq!(
            push_args("main", true),
            vec!["push", "--force-with-lease", "origin", "main:main"]
        );
    }
}
