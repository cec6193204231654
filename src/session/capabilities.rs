//! Capability building
//!
//! Translates a suite's target section into the W3C capability object sent
//! with `POST /session`.

use serde_json::{json, Map, Value};

use crate::common::config::Defaults;
use crate::testing::TargetConfig;
use crate::webdriver::TargetKind;

/// Default Appium idle timeout in seconds
const DEFAULT_NEW_COMMAND_TIMEOUT: u64 = 300;

/// Build the capabilities for a target
pub fn build(target: &TargetConfig, defaults: &Defaults) -> Value {
    let mut caps = match target.kind {
        TargetKind::Web => web(target, defaults),
        TargetKind::Mobile => mobile(target),
    };

    // Explicit capabilities from the suite win over anything derived
    for (key, value) in &target.capabilities {
        caps.insert(key.clone(), value.clone());
    }

    Value::Object(caps)
}

fn web(target: &TargetConfig, defaults: &Defaults) -> Map<String, Value> {
    let browser = target
        .browser
        .clone()
        .unwrap_or_else(|| defaults.browser.clone())
        .to_ascii_lowercase();

    let mut caps = Map::new();
    let mut args = target.browser_args.clone();

    match browser.as_str() {
        "chrome" | "chromium" => {
            if target.headless {
                args.push("--headless=new".to_string());
            }
            caps.insert("browserName".into(), json!("chrome"));
            caps.insert(
                "goog:chromeOptions".into(),
                json!({
                    "args": args,
                    "excludeSwitches": ["enable-automation"],
                    "useAutomationExtension": false,
                }),
            );
        }
        "firefox" => {
            if target.headless {
                args.push("-headless".to_string());
            }
            caps.insert("browserName".into(), json!("firefox"));
            caps.insert("moz:firefoxOptions".into(), json!({ "args": args }));
        }
        "edge" | "msedge" | "microsoftedge" => {
            if target.headless {
                args.push("--headless=new".to_string());
            }
            caps.insert("browserName".into(), json!("MicrosoftEdge"));
            caps.insert("ms:edgeOptions".into(), json!({ "args": args }));
        }
        other => {
            caps.insert("browserName".into(), json!(other));
        }
    }

    caps
}

fn mobile(target: &TargetConfig) -> Map<String, Value> {
    let mut caps = Map::new();

    caps.insert(
        "platformName".into(),
        json!(target.platform.as_deref().unwrap_or("Android")),
    );
    if let Some(device) = &target.device {
        caps.insert("appium:deviceName".into(), json!(device));
    }
    if let Some(automation) = &target.automation {
        caps.insert("appium:automationName".into(), json!(automation));
    }
    if let Some(app) = &target.app {
        caps.insert("appium:app".into(), json!(app.display().to_string()));
    }
    caps.insert(
        "appium:newCommandTimeout".into(),
        json!(target
            .new_command_timeout
            .unwrap_or(DEFAULT_NEW_COMMAND_TIMEOUT)),
    );

    caps
}
