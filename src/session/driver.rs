//! The driver seam
//!
//! `UiDriver` is the set of primitive remote-control calls a scenario needs.
//! The WebDriver HTTP client implements it for real endpoints; tests plug in
//! in-memory fakes through a `Connector`.

use async_trait::async_trait;
use serde_json::Value;

use crate::common::Result;
use crate::webdriver::{ElementRef, Locator, TargetKind};

/// Primitive operations against a live browser page or mobile app
#[async_trait]
pub trait UiDriver: Send {
    /// Kind of surface this driver controls
    fn target(&self) -> TargetKind;

    async fn navigate(&mut self, url: &str) -> Result<()>;

    async fn current_url(&mut self) -> Result<String>;

    async fn back(&mut self) -> Result<()>;

    /// Find all elements matching the locator
    ///
    /// Returns an empty list, not an error, when nothing matches.
    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementRef>>;

    async fn click(&mut self, element: &ElementRef) -> Result<()>;

    async fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<()>;

    async fn clear(&mut self, element: &ElementRef) -> Result<()>;

    async fn text(&mut self, element: &ElementRef) -> Result<String>;

    async fn is_enabled(&mut self, element: &ElementRef) -> Result<bool>;

    async fn is_displayed(&mut self, element: &ElementRef) -> Result<bool>;

    /// Handle of the window currently in focus
    async fn window_handle(&mut self) -> Result<String>;

    async fn window_handles(&mut self) -> Result<Vec<String>>;

    async fn switch_to_window(&mut self, handle: &str) -> Result<()>;

    /// Close the window currently in focus
    async fn close_window(&mut self) -> Result<()>;

    /// Switch into a frame, or back to the top-level document with `None`
    async fn switch_to_frame(&mut self, frame: Option<&ElementRef>) -> Result<()>;

    async fn execute_script(&mut self, script: &str, args: Vec<Value>) -> Result<Value>;

    /// End the remote session and release anything the driver owns
    async fn quit(&mut self) -> Result<()>;
}

/// Turns a target description into a live driver
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, target: &crate::testing::TargetConfig) -> Result<Box<dyn UiDriver>>;
}
