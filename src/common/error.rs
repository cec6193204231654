//! Error types for uiflow
//!
//! Every failure that can end a scenario maps onto one of these variants.
//! Messages are written to be read in a test report, with the locator or
//! endpoint involved spelled out.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for uiflow
#[derive(Error, Debug)]
pub enum Error {
    // === Session Errors ===
    #[error("Failed to start session: {0}")]
    SessionStart(String),

    #[error("No session active. The session was already stopped")]
    SessionNotActive,

    // === Lookup Errors ===
    #[error("Element {locator} not found after {:.1}s", .timeout.as_secs_f64())]
    ElementNotFound { locator: String, timeout: Duration },

    #[error("Locator {locator} is not supported on {target} targets")]
    UnsupportedLocator { locator: String, target: String },

    // === Window Errors ===
    #[error("Unexpected window state: {0}")]
    UnexpectedWindowState(String),

    // === Assertion Errors ===
    #[error("Assertion failed: {0}")]
    Assertion(String),

    // === WebDriver Protocol Errors ===
    #[error("WebDriver error '{error}': {message}")]
    WebDriver { error: String, message: String },

    #[error("WebDriver protocol error: {0}")]
    WebDriverProtocol(String),

    // === Local Driver Errors ===
    #[error("Driver '{name}' not found. Searched: {searched}")]
    DriverNotFound { name: String, searched: String },

    #[error("Driver did not report ready after {0} seconds")]
    DriverSpawnTimeout(u64),

    // === Static Server Errors ===
    #[error("Static server failed to start: {0}")]
    ServerStart(String),

    #[error("Static server health check failed after {0} attempts")]
    ServerHealthCheck(usize),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Transport Errors ===
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an element not found error
    pub fn element_not_found(locator: impl std::fmt::Display, timeout: Duration) -> Self {
        Self::ElementNotFound {
            locator: locator.to_string(),
            timeout,
        }
    }

    /// Create a driver not found error with search paths
    pub fn driver_not_found<S: AsRef<str>>(name: &str, paths: &[S]) -> Self {
        Self::DriverNotFound {
            name: name.to_string(),
            searched: paths.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", "),
        }
    }

    /// Map a W3C error response onto the taxonomy
    ///
    /// Window errors get their own variant; everything else stays a
    /// generic WebDriver error carrying the remote error code.
    pub fn webdriver(error: &str, message: &str) -> Self {
        match error {
            "no such window" | "no such frame" => {
                Self::UnexpectedWindowState(format!("{}: {}", error, message))
            }
            _ => Self::WebDriver {
                error: error.to_string(),
                message: message.to_string(),
            },
        }
    }

    /// Whether this is a remote "no such element" / "stale element" response
    pub fn is_missing_element(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. }
        ) || matches!(
            self,
            Self::WebDriver { error, .. }
                if error == "no such element" || error == "stale element reference"
        )
    }

    /// Stable code used in reports
    pub fn code(&self) -> &'static str {
        match self {
            Error::SessionStart(_)
            | Error::SessionNotActive
            | Error::DriverNotFound { .. }
            | Error::DriverSpawnTimeout(_) => "SESSION_START",
            Error::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            Error::Assertion(_) => "ASSERTION_FAILED",
            Error::UnexpectedWindowState(_) => "UNEXPECTED_WINDOW_STATE",
            Error::WebDriver { .. } | Error::WebDriverProtocol(_) => "WEBDRIVER_ERROR",
            Error::UnsupportedLocator { .. } | Error::Config(_) | Error::ConfigParse(_) => "CONFIG",
            Error::ServerStart(_) | Error::ServerHealthCheck(_) => "SERVER_START",
            _ => "INTERNAL_ERROR",
        }
    }
}
