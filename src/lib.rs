//! uiflow - UI test suites over WebDriver
//!
//! This library drives browser pages and mobile apps through the W3C
//! WebDriver protocol and runs YAML-described scenarios against them.

pub mod cli;
pub mod commands;
pub mod common;
pub mod server;
pub mod session;
pub mod testing;
pub mod webdriver;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use session::{Connector, Session, UiDriver};
