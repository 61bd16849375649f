pub mod options;
pub mod setup;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::json_store::APP_DIR;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("declined to initialize the {0} config")]
    Declined(&'static str),
    #[error("no account matches {0:?}")]
    UnknownAccount(String),
    #[error("the accounts config does not contain any account")]
    NoAccounts,
}

/// Runtime settings for the driver and the session loop. Every field has a
/// default, so a missing or partial `settings.toml` is fine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_browser")]
    pub browser: String,
    #[serde(default)]
    pub headless: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_load_timeout_secs")]
    pub load_timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_safety_limit")]
    pub safety_limit: usize,
    #[serde(default = "default_interstitial_attempts")]
    pub interstitial_attempts: usize,
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: usize,
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}
fn default_browser() -> String {
    "chrome".to_string()
}
fn default_base_url() -> String {
    "https://instaling.pl".to_string()
}
fn default_load_timeout_secs() -> u64 {
    30
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_safety_limit() -> usize {
    200
}
fn default_interstitial_attempts() -> usize {
    10
}
fn default_max_consecutive_failures() -> usize {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            browser: default_browser(),
            headless: false,
            base_url: default_base_url(),
            load_timeout_secs: default_load_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            safety_limit: default_safety_limit(),
            interstitial_attempts: default_interstitial_attempts(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let path = Self::settings_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    pub fn settings_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("settings.toml")
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
