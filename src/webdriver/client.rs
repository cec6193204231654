//! WebDriver client for communicating with remote automation endpoints
//!
//! This module speaks the W3C WebDriver HTTP protocol to chromedriver,
//! Selenium Grid or Appium. Every command is a JSON request against
//! `/session/{id}/...` and every reply wraps its payload in `value`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::common::{Error, Result};
use crate::session::UiDriver;

use super::spawn::DriverProcess;
use super::types::*;

/// WebDriver client bound to one remote session
pub struct WebDriverClient {
    /// HTTP client with the request timeout applied
    http: reqwest::Client,
    /// Endpoint base URL without trailing slash
    base_url: String,
    /// Remote session id
    session_id: String,
    /// Surface the session controls
    target: TargetKind,
    /// Local driver process owned by this session, if any
    process: Option<DriverProcess>,
}

impl WebDriverClient {
    /// Create a new remote session
    ///
    /// `create_timeout` bounds the `POST /session` call alone, which may have
    /// to install and launch an app; later commands use `request_timeout`.
    pub async fn new_session(
        base_url: &str,
        capabilities: Value,
        target: TargetKind,
        request_timeout: Duration,
        create_timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let body = json!({
            "capabilities": {
                "alwaysMatch": capabilities.clone(),
                "firstMatch": [{}],
            },
            "desiredCapabilities": capabilities,
        });

        tracing::debug!("WebDriver >>> POST {}/session {}", base_url, body);

        let resp = http
            .post(format!("{}/session", base_url))
            .timeout(create_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    Error::SessionStart(format!("Remote endpoint {} unreachable: {}", base_url, e))
                } else {
                    Error::SessionStart(format!("Session request to {} failed: {}", base_url, e))
                }
            })?;

        let reply = decode(resp).await.map_err(|e| match e {
            Error::WebDriver { error, message } => {
                Error::SessionStart(format!("{}: {}", error, message))
            }
            other => other,
        })?;
        let session = NewSession::from_response(&reply)?;

        tracing::info!("Session {} created at {}", session.session_id, base_url);
        tracing::debug!("Session capabilities: {}", session.capabilities);

        Ok(Self {
            http,
            base_url,
            session_id: session.session_id,
            target,
            process: None,
        })
    }

    /// Query endpoint readiness without creating a session
    pub async fn status(base_url: &str, timeout: Duration) -> Result<DriverStatus> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let resp = http
            .get(format!("{}/status", base_url.trim_end_matches('/')))
            .send()
            .await?;
        let reply = decode(resp).await?;

        let value = reply.get("value").cloned().unwrap_or(Value::Null);
        let mut status: DriverStatus = serde_json::from_value(value.clone()).unwrap_or_default();

        // Legacy endpoints report build info only; answering at all means ready
        if value.get("ready").is_none() {
            status.ready = true;
        }

        Ok(status)
    }

    /// Hand ownership of a spawned driver to this session
    pub fn attach_process(&mut self, process: DriverProcess) {
        self.process = Some(process);
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Apply session timeouts
    pub async fn set_timeouts(&self, timeouts: &Timeouts) -> Result<()> {
        self.command(Method::POST, "/timeouts", Some(serde_json::to_value(timeouts)?))
            .await?;
        Ok(())
    }

    /// Send a session command and return the unwrapped `value`
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        tracing::debug!("WebDriver >>> {} {}", method, path);

        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(&body);
        } else if method == Method::POST {
            request = request.json(&json!({}));
        }

        let reply = decode(request.send().await?).await?;
        tracing::trace!("WebDriver <<< {}", reply);

        Ok(reply.get("value").cloned().unwrap_or(Value::Null))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.command(Method::GET, path, None).await?;
        serde_json::from_value(value).map_err(|e| {
            Error::WebDriverProtocol(format!("Failed to parse {} response: {}", path, e))
        })
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.command(Method::POST, path, Some(body)).await
    }
}

/// Decode a reply, turning error statuses into the error taxonomy
async fn decode(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body: Value = resp.json().await.map_err(|e| {
        Error::WebDriverProtocol(format!("Invalid response body (HTTP {}): {}", status, e))
    })?;

    // Legacy wire protocol: HTTP 200 with a non-zero numeric status
    if let Some(code) = body.get("status").and_then(|s| s.as_i64()) {
        if code != 0 {
            let message = body["value"]["message"].as_str().unwrap_or("");
            return Err(Error::webdriver(legacy_error_name(code), message));
        }
    }

    if status.is_success() {
        return Ok(body);
    }

    let err: WireError = serde_json::from_value(body["value"].clone()).map_err(|_| {
        Error::WebDriverProtocol(format!("HTTP {} without error body: {}", status, body))
    })?;
    Err(Error::webdriver(&err.error, &err.message))
}

/// Map JSON Wire Protocol status codes onto W3C error names
fn legacy_error_name(code: i64) -> &'static str {
    match code {
        7 => "no such element",
        8 => "no such frame",
        10 => "stale element reference",
        21 => "timeout",
        23 => "no such window",
        33 => "session not created",
        _ => "unknown error",
    }
}

#[async_trait]
impl UiDriver for WebDriverClient {
    fn target(&self) -> TargetKind {
        self.target
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        self.get("/url").await
    }

    async fn back(&mut self) -> Result<()> {
        self.post("/back", json!({})).await?;
        Ok(())
    }

    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementRef>> {
        let wire = locator.to_wire(self.target)?;
        let value = self.post("/elements", serde_json::to_value(&wire)?).await?;
        serde_json::from_value(value).map_err(|e| {
            Error::WebDriverProtocol(format!("Failed to parse elements for {}: {}", locator, e))
        })
    }

    async fn click(&mut self, element: &ElementRef) -> Result<()> {
        self.post(&format!("/element/{}/click", element.id), json!({}))
            .await?;
        Ok(())
    }

    async fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<()> {
        let chars: Vec<String> = text.chars().map(String::from).collect();
        self.post(
            &format!("/element/{}/value", element.id),
            json!({ "text": text, "value": chars }),
        )
        .await?;
        Ok(())
    }

    async fn clear(&mut self, element: &ElementRef) -> Result<()> {
        self.post(&format!("/element/{}/clear", element.id), json!({}))
            .await?;
        Ok(())
    }

    async fn text(&mut self, element: &ElementRef) -> Result<String> {
        let value: Option<String> = self.get(&format!("/element/{}/text", element.id)).await?;
        Ok(value.unwrap_or_default())
    }

    async fn is_enabled(&mut self, element: &ElementRef) -> Result<bool> {
        self.get(&format!("/element/{}/enabled", element.id)).await
    }

    async fn is_displayed(&mut self, element: &ElementRef) -> Result<bool> {
        self.get(&format!("/element/{}/displayed", element.id)).await
    }

    async fn window_handle(&mut self) -> Result<String> {
        self.get("/window").await
    }

    async fn window_handles(&mut self) -> Result<Vec<String>> {
        self.get("/window/handles").await
    }

    async fn switch_to_window(&mut self, handle: &str) -> Result<()> {
        self.post("/window", json!({ "handle": handle, "name": handle }))
            .await?;
        Ok(())
    }

    async fn close_window(&mut self) -> Result<()> {
        self.command(Method::DELETE, "/window", None).await?;
        Ok(())
    }

    async fn switch_to_frame(&mut self, frame: Option<&ElementRef>) -> Result<()> {
        let id = frame.map(ElementRef::to_json).unwrap_or(Value::Null);
        self.post("/frame", json!({ "id": id })).await?;
        Ok(())
    }

    async fn execute_script(&mut self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.post("/execute/sync", json!({ "script": script, "args": args }))
            .await
    }

    async fn quit(&mut self) -> Result<()> {
        let result = self.command(Method::DELETE, "", None).await;
        tracing::info!("Session {} closed", self.session_id);

        if let Some(mut process) = self.process.take() {
            process.stop().await;
        }

        result.map(|_| ())
    }
}
