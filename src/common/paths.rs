//! Configuration and log paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/uiflow/`, `~/.local/share/uiflow/logs/`
//! - macOS: `~/Library/Application Support/uiflow/`
//! - Windows: `%APPDATA%\uiflow\`

use std::io;
use std::path::PathBuf;

/// Application name used for config and data directories
const APP_NAME: &str = "uiflow";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the log directory
pub fn log_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().join("logs"))
}

/// Get the path to the static server log file
pub fn server_log_path() -> Option<PathBuf> {
    log_dir().map(|d| d.join("server.log"))
}

/// Ensure the log directory exists
pub fn ensure_log_dir() -> io::Result<Option<PathBuf>> {
    if let Some(dir) = log_dir() {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(Some(dir))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_toml() {
        let path = config_path().expect("config path");
        assert!(path.ends_with("config.toml"));
    }

    #[test]
    fn test_server_log_under_log_dir() {
        let log = server_log_path().expect("log path");
        assert_eq!(log.parent(), log_dir().as_deref());
    }
}
