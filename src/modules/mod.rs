//! Automation modules, one per wrapped tool.
//!
//! Every module follows the same shape: describe an image that installs a
//! pinned tool, build it through a [`containerkit::Engine`], then run
//! one-shot commands with credentials mounted at runtime.

pub mod eksctl;
pub mod gradle;
pub mod kubectl;
pub mod neon;
pub mod pulumi;
pub mod updater;

/// Pinned aws-iam-authenticator release, shared by the EKS-facing modules.
pub(crate) const AWS_IAM_AUTHENTICATOR_URL: &str = "https://github.com/kubernetes-sigs/aws-iam-authenticator/releases/download/v0.6.14/aws-iam-authenticator_0.6.14_linux_amd64";
