//! Gradle builds with the project mounted and caches persisted.
//!
//! The dependency and wrapper caches live in named engine volumes so
//! repeated builds don't re-download the world.

use anyhow::{Context, Result};
use containerkit::{Engine, ImageRef, ImageSpec, Invocation};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Default gradle image tag.
pub const DEFAULT_VERSION: &str = "latest";

const CACHES_VOLUME: &str = "gradle-caches";
const WRAPPER_VOLUME: &str = "gradle-wrapper";

/// Gradle against a project directory.
pub struct Gradle {
    engine: Box<dyn Engine>,
    version: Option<String>,
    image: Option<String>,
    directory: Option<PathBuf>,
    wrapper: bool,
    built: OnceLock<ImageRef>,
}

impl Gradle {
    /// Create the module with defaults: `gradle:latest`, no project mounted.
    pub fn new(engine: Box<dyn Engine>) -> Self {
        Self {
            engine,
            version: None,
            image: None,
            directory: None,
            wrapper: false,
            built: OnceLock::new(),
        }
    }

    /// Use a specific gradle version (tag of the official image).
    #[must_use]
    pub fn from_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Use a custom base image. Unless wrapper mode is on, the image must
    /// have gradle installed.
    #[must_use]
    pub fn from_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Mount the application directory to build.
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Run through `./gradlew` instead of the image's gradle.
    #[must_use]
    pub fn with_wrapper(mut self) -> Self {
        self.wrapper = true;
        self
    }

    /// `gradle clean build --no-daemon`.
    pub fn build(&self) -> Result<String> {
        self.exec(&["clean".to_string(), "build".to_string(), "--no-daemon".to_string()])
    }

    /// `gradle clean test --no-daemon`.
    pub fn test(&self) -> Result<String> {
        self.exec(&["clean".to_string(), "test".to_string(), "--no-daemon".to_string()])
    }

    /// Run an arbitrary gradle task.
    pub fn task(&self, task: &str, args: &[String]) -> Result<String> {
        let mut full = vec![task.to_string()];
        full.extend_from_slice(args);
        self.exec(&full)
    }

    fn exec(&self, args: &[String]) -> Result<String> {
        let image = self.image()?;
        self.engine
            .exec_capture(&image, &self.invocation(args.to_vec()))
            .context("gradle failed")
    }

    fn image(&self) -> Result<ImageRef> {
        if let Some(image) = self.built.get() {
            return Ok(image.clone());
        }
        let image = self.engine.build(&self.spec())?;
        Ok(self.built.get_or_init(|| image).clone())
    }

    fn base_image(&self) -> String {
        if let Some(image) = &self.image {
            return image.clone();
        }
        let version = self.version.as_deref().unwrap_or(DEFAULT_VERSION);
        format!("gradle:{version}")
    }

    fn spec(&self) -> ImageSpec {
        let entrypoint = if self.wrapper { "./gradlew" } else { "gradle" };
        ImageSpec::from_image(self.base_image())
            .workdir("/app")
            .entrypoint([entrypoint])
    }

    fn invocation(&self, args: Vec<String>) -> Invocation {
        let mut invocation = Invocation::entrypoint_args(args)
            .cache(CACHES_VOLUME, "/root/.gradle/caches");
        if let Some(directory) = &self.directory {
            invocation = invocation.bind_writable(directory, "/app");
        }
        if self.wrapper {
            invocation = invocation.cache(WRAPPER_VOLUME, "/root/.gradle/wrapper");
        }
        invocation
    }
}
