//! Local static file server
//!
//! Suites that test a page on disk serve it on a fixed local port for the
//! duration of the suite. By default the server is this binary's own
//! `serve` subcommand running as a child process; a suite may name another
//! command instead.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::process::{Child, Command};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::common::{Error, Result};
use crate::testing::ServeConfig;

/// A static server running as a child process
pub struct StaticServer {
    child: Child,
    url: String,
}

impl StaticServer {
    /// Start the server and wait until it answers HTTP requests
    pub async fn spawn(config: &ServeConfig, timeout: Duration) -> Result<Self> {
        if !config.root.is_dir() {
            return Err(Error::ServerStart(format!(
                "root directory {} does not exist",
                config.root.display()
            )));
        }
        // The child runs with the root as its working directory
        let root = config.root.canonicalize()?;

        let mut command = match config.command.as_deref() {
            Some([program, args @ ..]) => {
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
            Some([]) => {
                return Err(Error::Config("serve.command must not be empty".to_string()));
            }
            None => {
                let exe = std::env::current_exe().map_err(|e| {
                    Error::ServerStart(format!("cannot locate own executable: {}", e))
                })?;
                let mut cmd = Command::new(exe);
                cmd.arg("serve")
                    .arg("--root")
                    .arg(&root)
                    .arg("--port")
                    .arg(config.port.to_string());
                cmd
            }
        };

        tracing::debug!(
            "Starting static server for {} on port {}",
            root.display(),
            config.port
        );

        let child = command
            .current_dir(&root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::ServerStart(format!("failed to spawn server: {}", e)))?;

        let mut server = Self {
            child,
            url: format!("http://127.0.0.1:{}", config.port),
        };
        server.wait_healthy(timeout).await?;
        tracing::info!("Static server ready at {}", server.url);
        Ok(server)
    }

    async fn wait_healthy(&mut self, timeout: Duration) -> Result<()> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()?;
        let deadline = Instant::now() + timeout;
        let mut attempts = 0;

        loop {
            attempts += 1;

            if let Ok(Some(status)) = self.child.try_wait() {
                return Err(Error::ServerStart(format!(
                    "server exited during startup with {}",
                    status
                )));
            }

            // Any HTTP answer means the socket is serving
            if http.get(format!("{}/", self.url)).send().await.is_ok() {
                return Ok(());
            }

            if Instant::now() >= deadline {
                self.stop().await;
                return Err(Error::ServerHealthCheck(attempts));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Terminate the server process
    pub async fn stop(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::debug!("Static server already gone: {}", e);
        }
    }
}

/// Serve a directory over HTTP until interrupted
///
/// Prints a `listening at:` line once the socket is bound.
pub async fn serve(root: &Path, port: u16) -> Result<()> {
    let root: PathBuf = root.canonicalize().map_err(|e| {
        Error::ServerStart(format!("cannot serve {}: {}", root.display(), e))
    })?;

    let app = Router::new()
        .fallback_service(ServeDir::new(&root).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::ServerStart(format!("cannot bind {}: {}", addr, e)))?;
    let local = listener.local_addr()?;

    tracing::info!("Serving {} on http://{}", root.display(), local);
    println!("uiflow serve listening at: {}", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Static server shutting down");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_root_is_server_start_error() {
        let config = ServeConfig {
            root: PathBuf::from("/nonexistent/uiflow-site"),
            port: 3999,
            command: None,
        };
        let err = StaticServer::spawn(&config, Duration::from_millis(100))
            .await
            .err()
            .expect("spawn should fail");
        assert_eq!(err.code(), "SERVER_START");
    }

    #[tokio::test]
    async fn test_custom_command_that_exits_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServeConfig {
            root: dir.path().to_path_buf(),
            port: crate::webdriver::spawn::find_free_port().unwrap(),
            command: Some(vec!["sh".to_string(), "-c".to_string(), "exit 3".to_string()]),
        };
        let err = StaticServer::spawn(&config, Duration::from_secs(2))
            .await
            .err()
            .expect("spawn should fail");
        assert_eq!(err.code(), "SERVER_START");
    }

    #[tokio::test]
    async fn test_serve_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<p>hello</p>").unwrap();
        let port = crate::webdriver::spawn::find_free_port().unwrap();

        let root = dir.path().to_path_buf();
        let handle = tokio::spawn(async move { serve(&root, port).await });

        let http = reqwest::Client::new();
        let mut body = None;
        for _ in 0..50 {
            if let Ok(resp) = http.get(format!("http://127.0.0.1:{}/", port)).send().await {
                body = Some(resp.text().await.unwrap());
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        handle.abort();

        assert_eq!(body.as_deref(), Some("<p>hello</p>"));
    }
}
