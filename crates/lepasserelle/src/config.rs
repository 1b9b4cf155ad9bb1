// Engine Configuration
//
// *La Configuration* (The Configuration) - Search, discovery and visualization settings for LeRegard

use anyhow::{Context, Result};
use ledecouverte::DiscoveryConfig;
use lerecherche::{SearchConfig, SurpriseConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration directory, relative to the working directory
pub const CONFIG_DIR: &str = ".leregard";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".leregard/config.toml";

/// Environment variable naming the default graph snapshot
pub const SNAPSHOT_ENV: &str = "LEREGARD_SNAPSHOT";

/// LeRegard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LeRegardConfig {
    /// Keyword search limits and scoring
    pub search: SearchConfig,

    /// Discovery limits and thresholds
    pub discovery: DiscoveryConfig,

    /// Surprise keyword settings
    pub surprise: SurpriseConfig,

    /// Visualization settings
    pub visualization: VisualizationConfig,
}

impl LeRegardConfig {
    /// Load configuration from a directory
    ///
    /// Looks for `.leregard/config.toml` in `dir`. If not found, returns the
    /// default configuration.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_FILE);

        if !config_path.exists() {
            return Ok(LeRegardConfig::default());
        }
        Self::load_file(&config_path)
    }

    /// Load configuration from an explicit file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: LeRegardConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Save configuration to a directory
    ///
    /// Creates the `.leregard` directory if it doesn't exist.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let config_dir = dir.as_ref().join(CONFIG_DIR);
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;

        let config_path = config_dir.join("config.toml");

        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(&config_path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }
}

/// Visualization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    /// Add discovery results to image subgraphs
    pub include_related: bool,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            include_related: true,
        }
    }
}
