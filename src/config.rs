//! Configuration loading from TOML.
//!
//! Reads `config.toml` (or the file named by `RAFFLE_CONFIG`) and
//! deserializes it into strongly-typed structs. Every field has a default,
//! so a missing file or section still yields a runnable configuration.

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Env var that overrides the config file location.
pub const CONFIG_ENV: &str = "RAFFLE_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Sent when no user-agent file is present.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/42.0.2311.135 Safari/537.36 Edge/12.246";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub platform: PlatformConfig,
    pub run: RunConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlatformConfig {
    pub base_url: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: "https://scrap.tf".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunConfig {
    /// Pause between successive entry attempts.
    pub entry_delay_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { entry_delay_secs: 5 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub cookies_path: PathBuf,
    pub user_agent_path: PathBuf,
    pub default_user_agent: String,
    pub timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookies_path: PathBuf::from("cookies.txt"),
            user_agent_path: PathBuf::from("user-agent.txt"),
            default_user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.base_url()?;
        Ok(config)
    }

    /// Load from `RAFFLE_CONFIG` or `config.toml`, falling back to defaults
    /// when the file does not exist.
    pub fn load_or_default() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        if path.exists() {
            Self::load(&path)
        } else {
            warn!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.platform.base_url)
            .with_context(|| format!("Invalid platform base_url: {}", self.platform.base_url))
    }

    pub fn entry_delay(&self) -> Duration {
        Duration::from_secs(self.run.entry_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.session.timeout_secs)
    }
}
