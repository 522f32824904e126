//! # containerkit
//!
//! Declarative container build-and-exec pipelines over the Docker/Podman CLI.
//!
//! Every automation module in this repo does the same dance: describe an
//! image that installs a pinned tool, build it, then run one-shot commands
//! in it with credentials mounted. This crate provides that dance once:
//!
//! - [`ImageSpec`]: declarative image description, rendered to a Dockerfile
//! - [`Invocation`]: one runtime execution with mounts, env and secrets
//! - [`Engine`]: the seam to the container runtime, with a real
//!   [`DockerEngine`] and a recording [`MockEngine`] for tests
//! - [`Secret`]: sensitive values that never reach argv or logs
//!
//! ## Example
//!
//! ```no_run
//! use containerkit::{Engine, ImageSpec, Invocation, engine::default_engine};
//!
//! let engine = default_engine().expect("no container engine");
//!
//! let spec = ImageSpec::from_image("alpine:3.19")
//!     .run(["apk", "add", "--no-cache", "curl"])
//!     .entrypoint(["curl"]);
//!
//! let image = engine.build(&spec).expect("build failed");
//! let out = engine
//!     .exec_capture(&image, &Invocation::entrypoint_args(["--version"]))
//!     .expect("curl failed");
//! println!("{out}");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod retry;
pub mod secret;
pub mod spec;
pub mod types;

pub use engine::{Engine, MockEngine, docker::DockerEngine};
pub use error::{Error, Result};
pub use retry::RetryConfig;
pub use secret::Secret;
pub use spec::{BuildStep, ImageSpec};
pub use types::{Bind, ExecOutput, ImageRef, Invocation};
