//! Declarative image specs.
//!
//! An [`ImageSpec`] describes an ephemeral image the way the modules need
//! one: a base image, a handful of build steps that install a pinned tool,
//! env vars and an entrypoint. Specs render to a Dockerfile that the engine
//! feeds to `docker build` / `podman build`.

use crate::error::{Error, Result};

/// A single build step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStep {
    /// Exec-form RUN: no shell involved.
    Exec(Vec<String>),
    /// Shell-form RUN: the string is passed to the image's shell.
    Shell(String),
}

/// Declarative description of an ephemeral image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSpec {
    base: String,
    workdir: Option<String>,
    env: Vec<(String, String)>,
    steps: Vec<BuildStep>,
    entrypoint: Option<Vec<String>>,
}

impl ImageSpec {
    /// Start a spec from a base image reference.
    #[must_use]
    pub fn from_image(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            workdir: None,
            env: Vec::new(),
            steps: Vec::new(),
            entrypoint: None,
        }
    }

    /// Add an exec-form build step.
    #[must_use]
    pub fn run<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps
            .push(BuildStep::Exec(args.into_iter().map(Into::into).collect()));
        self
    }

    /// Add a shell-form build step.
    #[must_use]
    pub fn sh(mut self, script: impl Into<String>) -> Self {
        self.steps.push(BuildStep::Shell(script.into()));
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn workdir(mut self, dir: impl Into<String>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Set a build-time environment variable (baked into the image).
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set the entrypoint.
    #[must_use]
    pub fn entrypoint<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entrypoint = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// The base image reference.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Render the spec as a Dockerfile.
    pub fn render(&self) -> Result<String> {
        if self.base.is_empty() {
            return Err(Error::InvalidSpec("base image is empty".to_string()));
        }

        let mut out = format!("FROM {}\n", self.base);

        for (key, value) in &self.env {
            if key.is_empty() || key.contains(['=', ' ', '\n']) {
                return Err(Error::InvalidSpec(format!("invalid env key: {key:?}")));
            }
            out.push_str(&format!("ENV {}={}\n", key, quote(value)));
        }

        if let Some(dir) = &self.workdir {
            out.push_str(&format!("WORKDIR {dir}\n"));
        }

        for step in &self.steps {
            match step {
                BuildStep::Exec(args) => {
                    if args.is_empty() {
                        return Err(Error::InvalidSpec("empty exec build step".to_string()));
                    }
                    out.push_str(&format!("RUN {}\n", json_array(args)));
                }
                BuildStep::Shell(script) => {
                    if script.contains('\n') {
                        return Err(Error::InvalidSpec(
                            "shell build steps must be single-line".to_string(),
                        ));
                    }
                    out.push_str(&format!("RUN {script}\n"));
                }
            }
        }

        if let Some(entrypoint) = &self.entrypoint {
            out.push_str(&format!("ENTRYPOINT {}\n", json_array(entrypoint)));
        }

        Ok(out)
    }
}

/// Render a JSON string array for exec-form instructions.
fn json_array(args: &[String]) -> String {
    let quoted: Vec<String> = args.iter().map(|a| quote(a)).collect();
    format!("[{}]", quoted.join(", "))
}

/// JSON-style quoting for Dockerfile arguments.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_minimal() {
        let spec = ImageSpec::from_image("alpine:3.19");
        assert_eq!(spec.render().unwrap(), "FROM alpine:3.19\n");
    }

    #[test]
    fn test_render_full() {
        let spec = ImageSpec::from_image("alpine:3.19")
            .env("AWS_PROFILE", "ci")
            .workdir("/")
            .run(["apk", "add", "--no-cache", "curl"])
            .sh("curl -sL https://example.com/tool -o /bin/tool && chmod +x /bin/tool")
            .entrypoint(["/bin/tool"]);

        let dockerfile = spec.render().unwrap();
        assert_eq!(
            dockerfile,
            "FROM alpine:3.19\n\
             ENV AWS_PROFILE=\"ci\"\n\
             WORKDIR /\n\
             RUN [\"apk\", \"add\", \"--no-cache\", \"curl\"]\n\
             RUN curl -sL https://example.com/tool -o /bin/tool && chmod +x /bin/tool\n\
             ENTRYPOINT [\"/bin/tool\"]\n"
        );
    }

    #[test]
    fn test_render_escapes_quotes() {
        let spec = ImageSpec::from_image("alpine:3.19").run(["echo", "say \"hi\""]);
        let dockerfile = spec.render().unwrap();
        assert!(dockerfile.contains(r#"RUN ["echo", "say \"hi\""]"#));
    }

    #[test]
    fn test_render_rejects_empty_base() {
        assert!(ImageSpec::from_image("").render().is_err());
    }

    #[test]
    fn test_render_rejects_empty_exec_step() {
        let spec = ImageSpec::from_image("alpine:3.19").run(Vec::<String>::new());
        assert!(spec.render().is_err());
    }

    #[test]
    fn test_render_rejects_multiline_shell_step() {
        let spec = ImageSpec::from_image("alpine:3.19").sh("echo a\necho b");
        assert!(spec.render().is_err());
    }

    #[test]
    fn test_render_rejects_bad_env_key() {
        let spec = ImageSpec::from_image("alpine:3.19").env("A B", "c");
        assert!(spec.render().is_err());
    }
}
