//! Configuration file handling

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Local WebDriver executables (chromedriver, geckodriver, ...)
    #[serde(default)]
    pub drivers: HashMap<String, DriverConfig>,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Configuration for a local driver executable
#[derive(Debug, Deserialize, Clone)]
pub struct DriverConfig {
    /// Path to the driver executable
    pub path: PathBuf,

    /// Additional arguments to pass to the driver
    #[serde(default)]
    pub args: Vec<String>,
}

/// Whether sessions live for the whole suite or for one scenario
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionScope {
    /// One session shared by every scenario of a suite
    #[default]
    Suite,
    /// A fresh session per scenario
    Scenario,
}

impl std::str::FromStr for SessionScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "suite" => Ok(Self::Suite),
            "scenario" => Ok(Self::Scenario),
            other => Err(format!(
                "unknown session scope '{}'. Supported: 'suite', 'scenario'",
                other
            )),
        }
    }
}

/// Default settings
#[derive(Debug, Deserialize)]
pub struct Defaults {
    /// Remote endpoint used for web targets without their own `remote_url`
    #[serde(default = "default_web_remote_url")]
    pub web_remote_url: String,

    /// Remote endpoint used for mobile targets without their own `remote_url`
    #[serde(default = "default_mobile_remote_url")]
    pub mobile_remote_url: String,

    /// Browser used when a web target does not name one
    #[serde(default = "default_browser")]
    pub browser: String,

    /// Session scope used when a suite does not declare one
    #[serde(default)]
    pub session_scope: SessionScope,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            web_remote_url: default_web_remote_url(),
            mobile_remote_url: default_mobile_remote_url(),
            browser: default_browser(),
            session_scope: SessionScope::default(),
        }
    }
}

fn default_web_remote_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_mobile_remote_url() -> String {
    "http://localhost:4723/wd/hub".to_string()
}

fn default_browser() -> String {
    "chrome".to_string()
}

/// Timeout settings
#[derive(Debug, Deserialize)]
pub struct Timeouts {
    /// Default element lookup timeout
    #[serde(default = "default_element")]
    pub element_secs: u64,

    /// Interval between locator polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Session creation and entry page load
    #[serde(default = "default_session_start")]
    pub session_start_secs: u64,

    /// Per-request HTTP timeout against the remote endpoint
    #[serde(default = "default_request")]
    pub request_secs: u64,

    /// Static server readiness
    #[serde(default = "default_server_start")]
    pub server_start_secs: u64,

    /// Local driver executable readiness
    #[serde(default = "default_driver_start")]
    pub driver_start_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_secs: default_element(),
            poll_interval_ms: default_poll_interval(),
            session_start_secs: default_session_start(),
            request_secs: default_request(),
            server_start_secs: default_server_start(),
            driver_start_secs: default_driver_start(),
        }
    }
}

impl Timeouts {
    pub fn element(&self) -> Duration {
        Duration::from_secs(self.element_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

fn default_element() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    250
}
fn default_session_start() -> u64 {
    60
}
fn default_request() -> u64 {
    30
}
fn default_server_start() -> u64 {
    10
}
fn default_driver_start() -> u64 {
    10
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    super::Error::FileRead {
                        path: path.display().to_string(),
                        error: e.to_string(),
                    }
                })?;
                return Self::from_toml(&content);
            }
        }
        Ok(Self::default())
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// Get driver configuration by name
    ///
    /// Falls back to searching PATH if not explicitly configured
    pub fn get_driver(&self, name: &str) -> Option<DriverConfig> {
        if let Some(config) = self.drivers.get(name) {
            return Some(config.clone());
        }

        which::which(name).ok().map(|path| DriverConfig {
            path,
            args: Vec::new(),
        })
    }
}
