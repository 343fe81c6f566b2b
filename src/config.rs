use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{qlog_debug, Error, Result};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5009";
pub const DEFAULT_ERROR_DISMISS_SECS: u64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_error_dismiss_secs")]
    pub error_dismiss_secs: u64,
    /// No timeout unless set.
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_examples")]
    pub examples: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            error_dismiss_secs: default_error_dismiss_secs(),
            request_timeout_secs: None,
            examples: default_examples(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_error_dismiss_secs() -> u64 {
    DEFAULT_ERROR_DISMISS_SECS
}

fn default_examples() -> Vec<String> {
    [
        "What are the treatments for Kawasaki disease?",
        "How do I calibrate a blood glucose meter?",
        "What are the early symptoms of Lyme disease?",
        "What are the latest guidelines for hypertension management?",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Config {
    pub fn medq_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".medq"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::medq_dir()?.join("medq.toml"))
    }

    pub fn error_dismiss(&self) -> Duration {
        Duration::from_secs(self.error_dismiss_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        qlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            qlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        qlog_debug!(
            "Config loaded: endpoint={} dismiss={}s timeout={:?} examples={}",
            config.endpoint,
            config.error_dismiss_secs,
            config.request_timeout_secs,
            config.examples.len()
        );
        Ok(config)
    }

    /// Write the config, creating the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        qlog_debug!("Config saved to {}", path.display());
        Ok(())
    }

    /// Apply command-line overrides on top of the file.
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        self
    }
}
