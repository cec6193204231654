//! Local driver spawning
//!
//! Starts a WebDriver executable such as `chromedriver` on a free port and
//! waits until it reports ready on `GET /status`.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::{Child, Command};

use crate::common::config::DriverConfig;
use crate::common::{Error, Result};

use super::client::WebDriverClient;

/// A driver executable running as a child process
pub struct DriverProcess {
    child: Child,
    url: String,
}

impl DriverProcess {
    /// Spawn the driver and wait for it to accept sessions
    pub async fn spawn(config: &DriverConfig, startup_timeout: Duration) -> Result<Self> {
        let port = find_free_port()?;
        let url = format!("http://127.0.0.1:{}", port);

        tracing::debug!("Spawning driver {} on port {}", config.path.display(), port);

        let child = Command::new(&config.path)
            .arg(format!("--port={}", port))
            .args(&config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::SessionStart(format!(
                    "Failed to spawn driver {}: {}",
                    config.path.display(),
                    e
                ))
            })?;

        let mut process = Self { child, url };

        let deadline = Instant::now() + startup_timeout;
        loop {
            if Instant::now() >= deadline {
                process.stop().await;
                return Err(Error::DriverSpawnTimeout(startup_timeout.as_secs()));
            }

            tokio::time::sleep(Duration::from_millis(50)).await;

            // Bail out early if the driver died on startup
            if let Ok(Some(status)) = process.child.try_wait() {
                return Err(Error::SessionStart(format!(
                    "Driver {} exited during startup with {}",
                    config.path.display(),
                    status
                )));
            }

            match WebDriverClient::status(&process.url, Duration::from_secs(1)).await {
                Ok(status) if status.ready => {
                    tracing::debug!("Driver ready at {}", process.url);
                    return Ok(process);
                }
                _ => continue,
            }
        }
    }

    /// Base URL of the driver's HTTP endpoint
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Terminate the driver process
    pub async fn stop(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::debug!("Driver process already gone: {}", e);
        }
    }
}

/// Find a free local port by binding to port 0
pub fn find_free_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_find_free_port() {
        let port = find_free_port().unwrap();
        assert!(port > 0);
    }

    #[tokio::test]
    async fn test_spawn_missing_executable_is_session_start_error() {
        let config = DriverConfig {
            path: PathBuf::from("/nonexistent/uiflow-test-driver"),
            args: Vec::new(),
        };
        let err = DriverProcess::spawn(&config, Duration::from_secs(1))
            .await
            .err()
            .expect("spawn should fail");
        assert_eq!(err.code(), "SESSION_START");
    }
}
