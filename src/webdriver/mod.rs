//! W3C WebDriver protocol client
//!
//! This module handles the communication with remote automation endpoints
//! (chromedriver, Selenium, Appium), including local driver spawning.

pub mod client;
pub mod spawn;
pub mod types;

pub use client::WebDriverClient;
pub use spawn::DriverProcess;
pub use types::{ElementRef, Locator, LocatorKind, TargetKind};
