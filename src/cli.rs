use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "gantry")]
#[command(author = "Matias Pan")]
#[command(version)]
#[command(about = "Containerized CI automation for clusters, builds and previews", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage EKS clusters with eksctl
    #[command(subcommand)]
    Eksctl(EksctlCommand),

    /// Run kubectl against a cluster
    #[command(subcommand)]
    Kubectl(KubectlCommand),

    /// Run Gradle builds in a container
    #[command(subcommand)]
    Gradle(GradleCommand),

    /// Run Pulumi stacks in their runtime image
    #[command(subcommand)]
    Pulumi(PulumiCommand),

    /// Bump a container image reference in a deployment repo
    UpdateImage(UpdateImageArgs),

    /// Manage Neon preview databases
    #[command(subcommand)]
    Previews(PreviewsCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// eksctl
// ============================================================================

#[derive(Args)]
pub struct EksctlArgs {
    /// eksctl release to install
    #[arg(long, default_value = "latest")]
    pub version: String,

    /// AWS credentials file to mount
    #[arg(long, default_value = "~/.aws/credentials")]
    pub aws_credentials: String,

    /// AWS config file to mount
    #[arg(long)]
    pub aws_config: Option<String>,

    /// AWS profile to use
    #[arg(long, default_value = "default")]
    pub profile: String,

    /// Cluster config file (eksctl ClusterConfig YAML)
    #[arg(long)]
    pub cluster: String,
}

#[derive(Subcommand)]
pub enum EksctlCommand {
    /// Create the cluster described by the config file
    Create {
        #[command(flatten)]
        common: EksctlArgs,

        /// Extra flags passed through to eksctl
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        flags: Vec<String>,
    },

    /// Delete the cluster described by the config file
    Delete {
        #[command(flatten)]
        common: EksctlArgs,

        /// Extra flags passed through to eksctl
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        flags: Vec<String>,
    },

    /// Write the cluster kubeconfig to a host file
    WriteKubeconfig {
        #[command(flatten)]
        common: EksctlArgs,

        /// Where to write the kubeconfig
        #[arg(short, long)]
        output: String,
    },

    /// Run a raw eksctl command
    Exec {
        #[command(flatten)]
        common: EksctlArgs,

        /// Arguments passed to eksctl
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },
}

// ============================================================================
// kubectl
// ============================================================================

#[derive(Args)]
pub struct KubectlArgs {
    /// Kubeconfig file to mount
    #[arg(long, default_value = "~/.kube/config")]
    pub kubeconfig: String,

    /// AWS credentials file to mount (EKS auth)
    #[arg(long, default_value = "~/.aws/credentials")]
    pub aws_credentials: String,

    /// AWS config file to mount
    #[arg(long)]
    pub aws_config: Option<String>,

    /// AWS profile to use
    #[arg(long, default_value = "default")]
    pub profile: String,
}

#[derive(Subcommand)]
pub enum KubectlCommand {
    /// Run a kubectl command
    Exec {
        #[command(flatten)]
        common: KubectlArgs,

        /// Arguments passed to kubectl
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },

    /// Open an interactive shell in the kubectl container
    Shell {
        #[command(flatten)]
        common: KubectlArgs,
    },
}

// ============================================================================
// gradle
// ============================================================================

#[derive(Args)]
pub struct GradleArgs {
    /// Gradle image tag
    #[arg(long, default_value = "latest")]
    pub version: String,

    /// Full image reference, overrides --version
    #[arg(long)]
    pub image: Option<String>,

    /// Project directory
    #[arg(short, long, default_value = ".")]
    pub directory: String,

    /// Use the project's gradlew wrapper
    #[arg(long)]
    pub wrapper: bool,
}

#[derive(Subcommand)]
pub enum GradleCommand {
    /// clean build --no-daemon
    Build {
        #[command(flatten)]
        common: GradleArgs,
    },

    /// clean test --no-daemon
    Test {
        #[command(flatten)]
        common: GradleArgs,
    },

    /// Run an arbitrary gradle task
    Task {
        #[command(flatten)]
        common: GradleArgs,

        /// Task name
        name: String,

        /// Extra arguments for the task
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

// ============================================================================
// pulumi
// ============================================================================

#[derive(Args)]
pub struct PulumiArgs {
    /// Pulumi runtime image tag
    #[arg(long, default_value = "latest")]
    pub version: String,

    /// Project directory (contains Pulumi.yaml)
    #[arg(short, long, default_value = ".")]
    pub directory: String,

    /// Pulumi access token
    #[arg(long, env = "PULUMI_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// AWS access key id
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub aws_access_key_id: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub aws_secret_access_key: Option<String>,

    /// Pulumi ESC environment to open for cloud credentials
    #[arg(long)]
    pub esc_env: Option<String>,

    /// Give the stack access to the host Docker engine
    #[arg(long)]
    pub docker: bool,
}

#[derive(Subcommand)]
pub enum PulumiCommand {
    /// pulumi up --yes
    Up {
        #[command(flatten)]
        common: PulumiArgs,

        /// Stack name
        stack: String,
    },

    /// pulumi preview --diff
    Preview {
        #[command(flatten)]
        common: PulumiArgs,

        /// Stack name
        stack: String,
    },

    /// pulumi refresh --diff
    Refresh {
        #[command(flatten)]
        common: PulumiArgs,

        /// Stack name
        stack: String,
    },

    /// pulumi destroy --yes
    Destroy {
        #[command(flatten)]
        common: PulumiArgs,

        /// Stack name
        stack: String,
    },

    /// Run a raw pulumi command
    Run {
        #[command(flatten)]
        common: PulumiArgs,

        /// Command passed to pulumi
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },

    /// Print one stack output value
    Output {
        #[command(flatten)]
        common: PulumiArgs,

        /// Stack name
        stack: String,

        /// Output property name
        property: String,
    },
}

// ============================================================================
// update-image
// ============================================================================

#[derive(Args)]
pub struct UpdateImageArgs {
    /// Application name (commit message only)
    #[arg(long)]
    pub app: Option<String>,

    /// Deployment repository URL (https)
    #[arg(long)]
    pub repo: String,

    /// Branch to clone and push back to
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// Manifest file to patch, relative to the repo root (repeatable)
    #[arg(long = "file", required = true)]
    pub files: Vec<String>,

    /// New image reference
    #[arg(long)]
    pub image: String,

    /// Container index to patch (repeatable)
    #[arg(long = "container", default_values_t = [0usize])]
    pub containers: Vec<usize>,

    /// Commit author name and git username
    #[arg(long, default_value = "gantry")]
    pub git_user: String,

    /// Commit author email
    #[arg(long, default_value = "gantry@localhost")]
    pub git_email: String,

    /// Git password or token
    #[arg(long, env = "GIT_PASSWORD", hide_env_values = true)]
    pub git_password: String,

    /// Push with --force-with-lease
    #[arg(long)]
    pub force: bool,
}

// ============================================================================
// previews
// ============================================================================

#[derive(Args)]
pub struct PreviewsArgs {
    /// Git branch the preview belongs to
    pub branch: String,

    /// Neon project id
    #[arg(long)]
    pub project_id: String,

    /// Neon API key
    #[arg(long, env = "NEON_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// AWS config directory to mount for SSM access
    #[arg(long, default_value = "~/.aws")]
    pub aws_dir: String,

    /// AWS profile to use
    #[arg(long, default_value = "default")]
    pub profile: String,
}

#[derive(Subcommand)]
pub enum PreviewsCommand {
    /// Create the preview branch and publish its connection string
    Provision {
        #[command(flatten)]
        common: PreviewsArgs,
    },

    /// Delete the preview branch and its SSM parameter
    Destroy {
        #[command(flatten)]
        common: PreviewsArgs,
    },
}
