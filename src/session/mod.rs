//! UI driver sessions
//!
//! A `Session` wraps one live remote-control session against a browser page
//! or a mobile app. It is opened through a `Connector`, reset between
//! scenarios, and stopped exactly once.

pub mod capabilities;
mod driver;
pub mod locator;
mod remote;
#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

pub use driver::{Connector, UiDriver};
pub use locator::{ElementLocator, TextMatch};
pub use remote::RemoteConnector;

use crate::common::config::Timeouts;
use crate::common::{Error, Result};
use crate::testing::TargetConfig;
use crate::webdriver::TargetKind;

/// Timing applied to a session's lookups
#[derive(Debug, Clone, Copy)]
pub struct WaitSettings {
    /// Default element lookup timeout
    pub element: Duration,
    /// Interval between polls
    pub poll_interval: Duration,
    /// Session creation and entry page load
    pub session_start: Duration,
}

impl WaitSettings {
    pub fn from_config(timeouts: &Timeouts) -> Self {
        Self {
            element: timeouts.element(),
            poll_interval: timeouts.poll_interval(),
            session_start: Duration::from_secs(timeouts.session_start_secs),
        }
    }
}

/// A live session against the target under test
pub struct Session {
    driver: Box<dyn UiDriver>,
    entry_url: Option<String>,
    waits: WaitSettings,
    /// Window in focus before the first switch to a new one
    main_window: Option<String>,
    /// URL stored by the last remember_url step
    remembered_url: Option<String>,
    stopped: bool,
}

impl Session {
    /// Open a session and load the entry page
    pub async fn start(
        connector: &dyn Connector,
        target: &TargetConfig,
        waits: WaitSettings,
    ) -> Result<Self> {
        let limit = target
            .timeout
            .map(Duration::from_secs)
            .unwrap_or(waits.session_start);

        tracing::debug!("Starting {} session (timeout {:?})", target.kind, limit);

        let driver = match tokio::time::timeout(limit, connector.connect(target)).await {
            Ok(Ok(driver)) => driver,
            Ok(Err(e)) if e.code() == "SESSION_START" => return Err(e),
            Ok(Err(e)) => return Err(Error::SessionStart(e.to_string())),
            Err(_) => {
                return Err(Error::SessionStart(format!(
                    "session creation exceeded {}s",
                    limit.as_secs()
                )))
            }
        };

        let mut session = Self {
            driver,
            entry_url: target.entry_url.clone(),
            waits,
            main_window: None,
            remembered_url: None,
            stopped: false,
        };

        if let Err(e) = session.load_entry(limit).await {
            // Release the remote session before reporting the failure
            if let Err(stop_err) = session.stop().await {
                tracing::warn!("Failed to stop session after load failure: {}", stop_err);
            }
            return Err(Error::SessionStart(format!(
                "failed to load {}: {}",
                session.entry_url.as_deref().unwrap_or_default(),
                e
            )));
        }

        Ok(session)
    }

    /// Release the session; only the first call reaches the remote end
    pub async fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        tracing::debug!("Stopping session");
        self.driver.quit().await
    }

    /// Return to the entry page (web) before the next scenario
    pub async fn reset(&mut self) -> Result<()> {
        self.remembered_url = None;

        if let Some(main) = self.main_window.take() {
            let driver = self.driver()?;
            if let Err(e) = driver.switch_to_window(&main).await {
                tracing::debug!("Could not return to main window: {}", e);
            }
        }

        let limit = self.waits.session_start;
        self.load_entry(limit).await
    }

    pub fn is_active(&self) -> bool {
        !self.stopped
    }

    pub fn target(&self) -> TargetKind {
        self.driver.target()
    }

    pub fn waits(&self) -> &WaitSettings {
        &self.waits
    }

    pub fn entry_url(&self) -> Option<&str> {
        self.entry_url.as_deref()
    }

    /// The underlying driver, as long as the session is running
    pub fn driver(&mut self) -> Result<&mut dyn UiDriver> {
        if self.stopped {
            return Err(Error::SessionNotActive);
        }
        Ok(self.driver.as_mut())
    }

    /// Element lookups against this session
    pub fn locator(&mut self) -> Result<ElementLocator<'_>> {
        let interval = self.waits.poll_interval;
        Ok(ElementLocator::new(self.driver()?, interval))
    }

    /// Store the current URL for a later comparison
    pub async fn remember_url(&mut self) -> Result<String> {
        let url = self.driver()?.current_url().await?;
        self.remembered_url = Some(url.clone());
        Ok(url)
    }

    pub fn remembered_url(&self) -> Option<&str> {
        self.remembered_url.as_deref()
    }

    /// Wait for a window other than the main one and switch to it
    pub async fn switch_to_new_window(&mut self, timeout: Duration) -> Result<String> {
        let interval = self.waits.poll_interval;
        let main = match self.main_window.clone() {
            Some(main) => main,
            None => {
                let current = self.driver()?.window_handle().await?;
                self.main_window = Some(current.clone());
                current
            }
        };

        let driver = self.driver()?;
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let handles = driver.window_handles().await?;
            if let Some(handle) = handles.into_iter().find(|h| *h != main) {
                driver.switch_to_window(&handle).await?;
                tracing::debug!("Switched to window {}", handle);
                return Ok(handle);
            }

            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Err(Error::UnexpectedWindowState(format!(
                    "no new window appeared within {:.1}s",
                    timeout.as_secs_f64()
                )));
            }
            tokio::time::sleep(interval.min(deadline - now)).await;
        }
    }

    /// Switch back to the window that was in focus before the first switch
    pub async fn switch_to_main_window(&mut self) -> Result<()> {
        let main = self.main_window.clone().ok_or_else(|| {
            Error::UnexpectedWindowState("no main window recorded; switch to a new window first".into())
        })?;
        self.driver()?.switch_to_window(&main).await
    }

    async fn load_entry(&mut self, limit: Duration) -> Result<()> {
        if self.driver.target() != TargetKind::Web {
            return Ok(());
        }
        let Some(url) = self.entry_url.clone() else {
            return Ok(());
        };

        tracing::debug!("Loading {}", url);
        let driver = self.driver()?;
        match tokio::time::timeout(limit, driver.navigate(&url)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Internal(format!(
                "page load exceeded {}s",
                limit.as_secs()
            ))),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.stopped {
            tracing::warn!("Session dropped without being stopped");
        }
    }
}
