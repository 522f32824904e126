//! # gitkit
//!
//! Minimal git CLI operations for GitOps automation: shallow single-branch
//! clone, stage, commit with an explicit author, push with optional
//! `--force-with-lease`. Authentication uses an env-based credential helper
//! so tokens never show up in argv, remote URLs or logs.
//!
//! ## Example
//!
//! ```no_run
//! use containerkit::Secret;
//! use gitkit::{BasicAuth, Repository};
//!
//! let auth = BasicAuth::new("ci-bot", Secret::from_env("GIT_PASSWORD").unwrap());
//! let repo = Repository::clone_shallow(
//!     "https://github.com/org/deploys.git",
//!     "main",
//!     &auth,
//!     "/tmp/deploys",
//! )
//! .unwrap();
//!
//! // ...edit files under repo.path()...
//!
//! repo.add("k8s/deployment.yaml").unwrap();
//! repo.commit("Updating app resource with image: img:v2", "ci-bot", "ci@org.dev")
//!     .unwrap();
//! repo.push(&auth, false).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod error;
pub mod repo;

pub use auth::{BasicAuth, redact_url};
pub use error::{Error, Result};
pub use repo::Repository;
