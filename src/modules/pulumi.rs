//! Pulumi stacks run inside the official runtime images.
//!
//! The project's `Pulumi.yaml` decides which `pulumi/pulumi-<runtime>`
//! image to use. Every operation is a single `bash -c` pipeline: install
//! the runtime's dependencies, open the ESC environment when configured,
//! then run the pulumi command. Credentials are validated before any
//! container work starts.

use anyhow::{Context, Result, bail};
use containerkit::{Engine, ImageSpec, Invocation, Secret};
use std::fs;
use std::path::{Path, PathBuf};

/// Default pulumi image tag.
pub const DEFAULT_VERSION: &str = "latest";

const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Pulumi against a project directory.
pub struct Pulumi {
    engine: Box<dyn Engine>,
    version: Option<String>,
    token: Option<Secret>,
    aws_access_key: Option<Secret>,
    aws_secret_key: Option<Secret>,
    esc_env: Option<String>,
    docker: bool,
}

impl Pulumi {
    /// Create the module. Credentials come in through the builder methods.
    pub fn new(engine: Box<dyn Engine>) -> Self {
        Self {
            engine,
            version: None,
            token: None,
            aws_access_key: None,
            aws_secret_key: None,
            esc_env: None,
            docker: false,
        }
    }

    /// Use a specific tag of the pulumi runtime image.
    #[must_use]
    pub fn from_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the Pulumi access token (required).
    #[must_use]
    pub fn with_token(mut self, token: Secret) -> Self {
        self.token = Some(token);
        self
    }

    /// Point pulumi at AWS with static credentials.
    #[must_use]
    pub fn with_aws_credentials(mut self, access_key: Secret, secret_key: Secret) -> Self {
        self.aws_access_key = Some(access_key);
        self.aws_secret_key = Some(secret_key);
        self
    }

    /// Use a Pulumi ESC environment as the source of AWS OIDC credentials.
    #[must_use]
    pub fn with_esc(mut self, env: impl Into<String>) -> Self {
        self.esc_env = Some(env.into());
        self
    }

    /// Give the container access to the host Docker engine (for stacks
    /// that build images).
    #[must_use]
    pub fn with_docker(mut self) -> Self {
        self.docker = true;
        self
    }

    /// `pulumi up --yes` for a stack. This changes your cloud.
    pub fn up(&self, src: &Path, stack: &str) -> Result<String> {
        self.command_output(src, &format!("pulumi up --stack {stack} --yes --non-interactive"))
    }

    /// `pulumi preview --diff` for a stack.
    pub fn preview(&self, src: &Path, stack: &str) -> Result<String> {
        self.command_output(
            src,
            &format!("pulumi preview --stack {stack} --non-interactive --diff"),
        )
    }

    /// `pulumi refresh --diff` for a stack.
    pub fn refresh(&self, src: &Path, stack: &str) -> Result<String> {
        self.command_output(
            src,
            &format!("pulumi refresh --stack {stack} --non-interactive --diff"),
        )
    }

    /// `pulumi destroy --yes` for a stack. This destroys the stack's
    /// resources.
    pub fn destroy(&self, src: &Path, stack: &str) -> Result<String> {
        self.command_output(
            src,
            &format!("pulumi destroy --stack {stack} --non-interactive --yes"),
        )
    }

    /// Run a raw pulumi command, e.g. `stack ls`.
    pub fn run_command(&self, src: &Path, command: &str) -> Result<String> {
        self.command_output(src, &format!("pulumi {command}"))
    }

    /// Get one output value from a stack.
    pub fn output(&self, src: &Path, stack: &str, property: &str) -> Result<String> {
        self.command_output(
            src,
            &format!("pulumi stack select {stack} && pulumi stack output {property}"),
        )
    }

    fn command_output(&self, src: &Path, command: &str) -> Result<String> {
        let token = match &self.token {
            Some(token) => token.clone(),
            None => bail!("pulumi token is required. Use --token or PULUMI_ACCESS_TOKEN"),
        };
        if self.esc_env.is_none() && (self.aws_access_key.is_none() || self.aws_secret_key.is_none())
        {
            bail!("no cloud provider credentials provided: set AWS keys or an ESC environment");
        }

        let runtime = runtime_from_project(src)?;
        let spec = self.spec(&runtime);
        let image = self.engine.build(&spec)?;

        let script = pipeline(&runtime, self.esc_env.as_deref(), command);
        let mut invocation = Invocation::command(["/bin/bash", "-c", script.as_str()])
            .bind_writable(src, "/infra")
            .secret_env("PULUMI_ACCESS_TOKEN", token);

        if self.esc_env.is_none() {
            if let (Some(access), Some(secret)) = (&self.aws_access_key, &self.aws_secret_key) {
                invocation = invocation
                    .secret_env("AWS_ACCESS_KEY_ID", access.clone())
                    .secret_env("AWS_SECRET_ACCESS_KEY", secret.clone());
            }
        }

        if self.docker {
            invocation = invocation.bind_writable(DOCKER_SOCKET, DOCKER_SOCKET);
        }

        self.engine
            .exec_capture(&image, &invocation)
            .context("pulumi failed")
    }

    fn spec(&self, runtime: &str) -> ImageSpec {
        let version = self.version.as_deref().unwrap_or(DEFAULT_VERSION);
        ImageSpec::from_image(format!("pulumi/pulumi-{runtime}:{version}")).workdir("/infra")
    }
}

/// Read the `runtime:` field from the project's Pulumi.yaml.
fn runtime_from_project(src: &Path) -> Result<String> {
    let path = project_file(src)
        .with_context(|| format!("no Pulumi.yaml found in {}", src.display()))?;
    let contents =
        fs::read_to_string(&path).with_context(|| format!("could not read {}", path.display()))?;
    let runtime = parse_runtime(&contents)
        .with_context(|| format!("no runtime field in {}", path.display()))?;

    match runtime.as_str() {
        "go" | "nodejs" | "python" | "dotnet" => Ok(runtime),
        other => bail!("unsupported pulumi runtime: {other}"),
    }
}

fn project_file(src: &Path) -> Option<PathBuf> {
    for name in ["Pulumi.yaml", "Pulumi.yml"] {
        let path = src.join(name);
        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Extract the top-level `runtime:` scalar from Pulumi.yaml.
///
/// Projects that use the map form (`runtime:` followed by nested `name:`)
/// yield an empty scalar and fall through to the unsupported-runtime error.
fn parse_runtime(yaml: &str) -> Option<String> {
    for line in yaml.lines() {
        let Some(rest) = line.strip_prefix("runtime:") else {
            continue;
        };
        let value = rest.trim().trim_matches(['"', '\'']);
        return Some(value.to_string());
    }
    None
}

/// The full `bash -c` pipeline for one pulumi command.
fn pipeline(runtime: &str, esc_env: Option<&str>, command: &str) -> String {
    let mut parts = Vec::new();

    match runtime {
        "go" => parts.push("go mod tidy".to_string()),
        "nodejs" => parts.push("npm install".to_string()),
        "python" => parts.push("pip install -r requirements.txt".to_string()),
        _ => {}
    }

    if let Some(env) = esc_env {
        parts.push("curl -fsSL https://get.pulumi.com/esc/install.sh | sh".to_string());
        parts.push(format!("$HOME/.pulumi/bin/esc env open {env}"));
    }

    parts.push(command.to_string());
    parts.join(" && ")
}
