use anyhow::{Context, Result};
use containerkit::DockerEngine;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("gantry"))
}

/// Top-level gantry configuration (`~/.config/gantry/config.toml`).
///
/// Every field has a default so a missing file just means defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GantryConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub neon: NeonConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Container engine binary. Defaults to docker, falling back to podman.
    #[serde(default)]
    pub binary: Option<String>,
}

/// Defaults for preview database provisioning.
#[derive(Debug, Serialize, Deserialize)]
pub struct NeonConfig {
    #[serde(default = "default_parent")]
    pub parent: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_region")]
    pub aws_region: String,
    #[serde(default = "default_compute_units")]
    pub compute_units: String,
    #[serde(default = "default_suspend_timeout")]
    pub suspend_timeout: String,
}

fn default_parent() -> String {
    "main".to_string()
}

fn default_database() -> String {
    "example".to_string()
}

fn default_role() -> String {
    "example".to_string()
}

fn default_region() -> String {
    "us-east-2".to_string()
}

fn default_compute_units() -> String {
    "0.25".to_string()
}

fn default_suspend_timeout() -> String {
    "300".to_string()
}

impl Default for NeonConfig {
    fn default() -> Self {
        Self {
            parent: default_parent(),
            database: default_database(),
            role: default_role(),
            aws_region: default_region(),
            compute_units: default_compute_units(),
            suspend_timeout: default_suspend_timeout(),
        }
    }
}

impl GantryConfig {
    /// Load config.toml, falling back to defaults when it doesn't exist.
    pub fn load() -> Result<Self> {
        let path = config_dir()?.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Build the container engine this config points at.
    pub fn engine(&self) -> Result<DockerEngine> {
        let engine = match &self.engine.binary {
            Some(binary) => DockerEngine::with_binary(binary)?,
            None => containerkit::engine::default_engine()?,
        };
        Ok(engine)
    }
}
