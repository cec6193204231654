//! Connector for real WebDriver endpoints

use std::time::Duration;

use async_trait::async_trait;

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::testing::TargetConfig;
use crate::webdriver::types::Timeouts;
use crate::webdriver::{DriverProcess, TargetKind, WebDriverClient};

use super::{capabilities, Connector, UiDriver};

/// Opens sessions on a remote endpoint, spawning a local driver if asked to
pub struct RemoteConnector<'a> {
    config: &'a Config,
    /// Endpoint from the command line; wins over everything else
    remote_url: Option<String>,
}

impl<'a> RemoteConnector<'a> {
    pub fn new(config: &'a Config, remote_url: Option<String>) -> Self {
        Self { config, remote_url }
    }

    /// Pick the endpoint for a target
    ///
    /// Order: command-line override, the target's `remote_url`, a spawned
    /// local `driver`, then the configured default for the target kind.
    async fn resolve_endpoint(
        &self,
        target: &TargetConfig,
    ) -> Result<(String, Option<DriverProcess>)> {
        if let Some(url) = self.remote_url.as_ref().or(target.remote_url.as_ref()) {
            return Ok((url.clone(), None));
        }

        if let Some(name) = &target.driver {
            let driver = self.config.get_driver(name).ok_or_else(|| {
                Error::driver_not_found(name, &["config [drivers] section", "PATH"])
            })?;
            let startup = Duration::from_secs(self.config.timeouts.driver_start_secs);
            let process = DriverProcess::spawn(&driver, startup).await?;
            return Ok((process.url().to_string(), Some(process)));
        }

        let url = match target.kind {
            TargetKind::Web => &self.config.defaults.web_remote_url,
            TargetKind::Mobile => &self.config.defaults.mobile_remote_url,
        };
        Ok((url.clone(), None))
    }
}

#[async_trait]
impl Connector for RemoteConnector<'_> {
    async fn connect(&self, target: &TargetConfig) -> Result<Box<dyn UiDriver>> {
        let (url, process) = self.resolve_endpoint(target).await?;
        let caps = capabilities::build(target, &self.config.defaults);

        tracing::info!("Opening {} session on {}", target.kind, url);

        let request = self.config.timeouts.request();
        let create = Duration::from_secs(
            target
                .timeout
                .unwrap_or(self.config.timeouts.session_start_secs),
        )
        .max(request);

        let mut client = match WebDriverClient::new_session(&url, caps, target.kind, request, create)
            .await
        {
            Ok(client) => client,
            Err(e) => {
                if let Some(mut process) = process {
                    process.stop().await;
                }
                return Err(e);
            }
        };

        if target.kind == TargetKind::Web {
            let page_load = target
                .timeout
                .unwrap_or(self.config.timeouts.session_start_secs);
            let timeouts = Timeouts {
                page_load: Some(page_load * 1000),
                ..Default::default()
            };
            if let Err(e) = client.set_timeouts(&timeouts).await {
                tracing::debug!("Endpoint rejected timeouts: {}", e);
            }
        }

        if let Some(process) = process {
            client.attach_process(process);
        }

        Ok(Box::new(client))
    }
}
