//! Configuration file handling for energy-tracker

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use energy_tracker_client::{ClientConfig, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Configuration for the CLI tool
///
/// ```toml
/// token = "your-personal-access-token"
/// base_url = "https://public-api.energy-tracker.best-ios-apps.de"
/// timeout_secs = 10
/// output = "table"
/// no_color = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Personal access token
    pub token: Option<String>,
    /// API base URL
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Default output format
    pub output: Option<OutputFormat>,
    /// Disable colored output
    pub no_color: Option<bool>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("energy-tracker");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(&self, args: Overrides<'_>) -> MergedConfig {
        MergedConfig {
            token: args
                .token
                .map(String::from)
                .or_else(|| self.token.clone())
                .filter(|t| !t.trim().is_empty()),
            base_url: args
                .base_url
                .map(String::from)
                .or_else(|| self.base_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(args.timeout_secs.or(self.timeout_secs).unwrap_or(10)),
            output: args.output.or(self.output).unwrap_or_default(),
            no_color: args.no_color || self.no_color.unwrap_or(false),
        }
    }
}

/// Values given on the command line (or via environment)
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides<'a> {
    pub token: Option<&'a str>,
    pub base_url: Option<&'a str>,
    pub timeout_secs: Option<u64>,
    pub output: Option<OutputFormat>,
    pub no_color: bool,
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub token: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub output: OutputFormat,
    pub no_color: bool,
}

impl MergedConfig {
    /// Client configuration, failing if no token was supplied anywhere
    pub fn client_config(&self) -> Result<ClientConfig> {
        let token = self.token.as_deref().context(
            "No access token: pass --token, set ENERGY_TRACKER_TOKEN, or add `token` to the config file",
        )?;
        Ok(ClientConfig::builder(token)
            .base_url(self.base_url.as_str())
            .timeout(self.timeout)
            .build())
    }
}
