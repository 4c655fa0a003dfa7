use serde::Deserialize;
use std::path::Path;

use crate::client::DEFAULT_SERVER;

/// Optional settings loaded from `drone-sentry.toml`. Flags and environment
/// variables take precedence over anything set here.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PluginConfig {
    #[serde(default)]
    pub sentry: SentryConfig,
    /// Projects every release is associated with, in addition to `--project(s)`.
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub deploy: DeployConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentryConfig {
    #[serde(default = "default_server")]
    pub server: String,
    pub organization: Option<String>,
    pub token: Option<String>,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            organization: None,
            token: None,
        }
    }
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeployConfig {
    pub environment: Option<String>,
}

impl PluginConfig {
    /// Load config from a TOML file. Returns defaults if the file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: PluginConfig = toml::from_str(&contents)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }
}
