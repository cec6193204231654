//! Test suite configuration types
//!
//! Defines the data structures for deserializing YAML test suites.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::config::SessionScope;
use crate::common::{Error, Result};
use crate::webdriver::{Locator, TargetKind};

/// A complete test suite loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct TestSuite {
    /// Name of the suite
    pub name: String,
    /// Optional description of what the suite verifies
    pub description: Option<String>,
    /// Session lifetime; falls back to the configured default
    pub session_scope: Option<SessionScope>,
    /// Optional setup steps to run before anything else (e.g., building the app)
    pub setup: Option<Vec<SetupStep>>,
    /// Local static server serving the page under test
    pub serve: Option<ServeConfig>,
    /// The surface under test
    pub target: TargetConfig,
    /// Scenarios, executed in order
    pub scenarios: Vec<Scenario>,
}

/// A setup step that runs before the suite
#[derive(Deserialize, Debug)]
pub struct SetupStep {
    /// Shell command to execute
    pub shell: String,
}

/// Static file server settings
#[derive(Deserialize, Debug, Clone)]
pub struct ServeConfig {
    /// Directory to serve (relative to the suite file)
    #[serde(default = "default_serve_root")]
    pub root: PathBuf,
    /// Fixed port the page is expected on
    #[serde(default = "default_serve_port")]
    pub port: u16,
    /// Custom server command; defaults to the built-in `uiflow serve`
    pub command: Option<Vec<String>>,
}

fn default_serve_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_serve_port() -> u16 {
    3000
}

/// Configuration for the surface under test
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TargetConfig {
    /// "web" (default) or "mobile"
    #[serde(default)]
    pub kind: TargetKind,
    /// Page loaded at session start and before each scenario (web)
    pub entry_url: Option<String>,
    /// Browser name for web targets (default from config)
    pub browser: Option<String>,
    /// Extra browser command-line switches
    #[serde(default)]
    pub browser_args: Vec<String>,
    /// Run the browser without a window
    #[serde(default)]
    pub headless: bool,
    /// Remote endpoint URL; overrides the configured default
    pub remote_url: Option<String>,
    /// Local driver executable to spawn (e.g., "chromedriver")
    pub driver: Option<String>,
    /// Mobile platform name (e.g., "Android", "iOS")
    pub platform: Option<String>,
    /// Mobile device name (e.g., "emulator-5554")
    pub device: Option<String>,
    /// Appium automation name (e.g., "Flutter", "UiAutomator2")
    pub automation: Option<String>,
    /// Path to the app package (relative to the suite file)
    pub app: Option<PathBuf>,
    /// Appium idle timeout in seconds
    pub new_command_timeout: Option<u64>,
    /// Session start / page load timeout in seconds
    pub timeout: Option<u64>,
    /// Extra capabilities merged verbatim
    #[serde(default)]
    pub capabilities: Map<String, Value>,
}

/// One ordered sequence of actions followed by a single predicate
#[derive(Deserialize, Debug)]
pub struct Scenario {
    /// Name of the scenario
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// The sequence of steps to execute
    #[serde(default)]
    pub steps: Vec<TestStep>,
    /// Final predicate; a scenario without one passes when all steps pass
    pub expect: Option<Expectation>,
}

/// A single step in the execution flow
#[derive(Deserialize, Debug)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Type text into an element
    Type {
        target: Locator,
        text: String,
        /// Clear the field before typing
        #[serde(default)]
        clear: bool,
    },
    /// Click an element
    Click { target: Locator },
    /// Click through a script call (for widgets that swallow native clicks)
    JsClick { target: Locator },
    /// Sleep for a fixed duration (prefer wait_for)
    Wait { seconds: f64 },
    /// Poll until the element reaches a state
    WaitFor {
        target: Locator,
        #[serde(default)]
        state: WaitState,
        /// Timeout in seconds (default: configured element timeout)
        timeout: Option<f64>,
    },
    /// Switch to another window
    SwitchWindow {
        window: WindowSelector,
        /// How long to wait for a new window to appear
        timeout: Option<f64>,
    },
    /// Switch into a frame, or back to the top-level document without a target
    SwitchFrame {
        target: Option<Locator>,
        timeout: Option<f64>,
    },
    /// Close the window in focus
    CloseWindow,
    /// Navigate back (or press the device back button)
    GoBack,
    /// Load a URL, resolved against the entry URL when relative
    Navigate { url: String },
    /// Run a script in the page
    ExecuteScript { script: String },
    /// Store the current URL for a later url_unchanged check
    RememberUrl,
    /// Print a message
    Log { message: String },
}

/// Element states a wait_for step can poll for
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Present,
    Absent,
    Visible,
    Enabled,
    TextNonEmpty,
}

/// Which window a switch_window step selects
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WindowSelector {
    /// The first window other than the main one
    New,
    /// The window that was in focus before the first switch
    Main,
}

/// Final predicate of a scenario
#[derive(Deserialize, Debug)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Expectation {
    /// Element text contains a substring
    TextContains {
        target: Locator,
        value: String,
        timeout: Option<f64>,
    },
    /// Element text equals a value exactly
    TextEquals {
        target: Locator,
        value: String,
        timeout: Option<f64>,
    },
    /// Element exists (and optionally is enabled)
    Exists {
        target: Locator,
        timeout: Option<f64>,
        enabled: Option<bool>,
    },
    /// Element is absent
    Absent {
        target: Locator,
        timeout: Option<f64>,
    },
    /// Current URL contains a substring
    UrlContains { value: String, timeout: Option<f64> },
    /// Current URL equals the one stored by remember_url
    UrlUnchanged,
}

impl TestStep {
    /// Locator this step acts on, if any
    pub fn locator(&self) -> Option<&Locator> {
        match self {
            TestStep::Type { target, .. }
            | TestStep::Click { target }
            | TestStep::JsClick { target }
            | TestStep::WaitFor { target, .. } => Some(target),
            TestStep::SwitchFrame { target, .. } => target.as_ref(),
            _ => None,
        }
    }

    /// Short human-readable label for progress output
    pub fn describe(&self) -> String {
        match self {
            TestStep::Type { target, text, .. } => format!("type '{}' into {}", text, target),
            TestStep::Click { target } => format!("click {}", target),
            TestStep::JsClick { target } => format!("js click {}", target),
            TestStep::Wait { seconds } => format!("wait {}s", seconds),
            TestStep::WaitFor { target, state, .. } => format!("wait for {} {:?}", target, state),
            TestStep::SwitchWindow { window, .. } => format!("switch to {:?} window", window),
            TestStep::SwitchFrame { target: Some(t), .. } => format!("switch to frame {}", t),
            TestStep::SwitchFrame { target: None, .. } => "switch to top-level document".to_string(),
            TestStep::CloseWindow => "close window".to_string(),
            TestStep::GoBack => "go back".to_string(),
            TestStep::Navigate { url } => format!("navigate to {}", url),
            TestStep::ExecuteScript { .. } => "execute script".to_string(),
            TestStep::RememberUrl => "remember url".to_string(),
            TestStep::Log { message } => format!("log: {}", message),
        }
    }
}

impl Expectation {
    /// Locator the predicate inspects, if any
    pub fn locator(&self) -> Option<&Locator> {
        match self {
            Expectation::TextContains { target, .. }
            | Expectation::TextEquals { target, .. }
            | Expectation::Exists { target, .. }
            | Expectation::Absent { target, .. } => Some(target),
            _ => None,
        }
    }
}

impl TestSuite {
    /// Parse a suite from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to parse test suite: {}", e)))
    }

    /// Load a suite from a file, resolving relative paths against its directory
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read test suite '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut suite = Self::from_yaml(&content)?;
        let suite_dir = path.parent().unwrap_or(Path::new("."));
        suite.resolve_paths(suite_dir);
        suite.validate()?;
        Ok(suite)
    }

    /// Resolve the serve root and app path relative to the suite directory
    pub fn resolve_paths(&mut self, suite_dir: &Path) {
        if let Some(serve) = &mut self.serve {
            if serve.root.is_relative() {
                serve.root = suite_dir.join(&serve.root);
            }
        }

        if let Some(app) = &self.target.app {
            if app.is_relative() {
                let joined = suite_dir.join(app);
                // The app may live on the Appium host, so a missing local file is not fatal
                self.target.app = Some(joined.canonicalize().unwrap_or(joined));
            }
        }
    }

    /// Check every locator is expressible on the target kind
    pub fn validate(&self) -> Result<()> {
        if self.scenarios.is_empty() {
            return Err(Error::Config(format!(
                "Suite '{}' has no scenarios",
                self.name
            )));
        }

        for scenario in &self.scenarios {
            let locators = scenario
                .steps
                .iter()
                .filter_map(TestStep::locator)
                .chain(scenario.expect.iter().filter_map(Expectation::locator));

            for locator in locators {
                locator.to_wire(self.target.kind).map_err(|e| {
                    Error::Config(format!("Scenario '{}': {}", scenario.name, e))
                })?;
            }
        }

        Ok(())
    }
}

/// Convert fractional seconds from a suite file into a Duration
pub fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webdriver::LocatorKind;

    const LOGIN_SUITE: &str = r#"
name: Login page
description: Standard and social login flows
session_scope: suite
serve:
  root: site
  port: 3000
target:
  kind: web
  entry_url: http://localhost:3000/index.html
  browser_args: ["--lang=en-US"]
scenarios:
  - name: valid standard login
    steps:
      - action: type
        target: { id: emailInput }
        text: john@example.com
      - action: type
        target: "id=passwordInput"
        text: "12345"
      - action: click
        target: { class: btn-login }
    expect:
      check: text_contains
      target: { id: message }
      value: Login Successful
      timeout: 10
  - name: google popup
    steps:
      - action: switch_frame
        target: { tag: iframe }
      - action: js_click
        target: { class: nsm7Bb-HzV7m-LgbsSe }
      - action: switch_frame
      - action: switch_window
        window: new
        timeout: 10
      - action: wait_for
        target: { name: identifier }
      - action: close_window
      - action: switch_window
        window: main
"#;

    #[test]
    fn test_parse_login_suite() {
        let suite = TestSuite::from_yaml(LOGIN_SUITE).unwrap();
        assert_eq!(suite.name, "Login page");
        assert_eq!(suite.session_scope, Some(SessionScope::Suite));
        assert_eq!(suite.scenarios.len(), 2);
        assert_eq!(suite.target.kind, TargetKind::Web);
        assert_eq!(suite.serve.as_ref().unwrap().port, 3000);

        let first = &suite.scenarios[0];
        assert_eq!(first.steps.len(), 3);
        match &first.steps[1] {
            TestStep::Type { target, text, clear } => {
                assert_eq!(target.kind, LocatorKind::Id);
                assert_eq!(text, "12345");
                assert!(!clear);
            }
            other => panic!("Expected Type step, got {:?}", other),
        }
        assert!(matches!(
            first.expect,
            Some(Expectation::TextContains { timeout: Some(t), .. }) if t == 10.0
        ));

        let second = &suite.scenarios[1];
        assert!(second.expect.is_none());
        assert!(matches!(
            second.steps[2],
            TestStep::SwitchFrame { target: None, .. }
        ));
        assert!(matches!(second.steps[5], TestStep::CloseWindow));
        assert!(matches!(
            second.steps[4],
            TestStep::WaitFor { state: WaitState::Present, timeout: None, .. }
        ));

        suite.validate().unwrap();
    }

    #[test]
    fn test_parse_mobile_suite() {
        let yaml = r#"
name: Survey app
target:
  kind: mobile
  platform: Android
  device: emulator-5554
  automation: Flutter
  app: build/app-debug.apk
  new_command_timeout: 300
  capabilities:
    appium:autoGrantPermissions: true
scenarios:
  - name: cons field toggles
    steps:
      - { action: click, target: { accessibility_id: ChatGPTCheckbox } }
      - { action: wait_for, target: { accessibility_id: ChatGPTConsField }, timeout: 2 }
      - { action: click, target: { accessibility_id: ChatGPTCheckbox } }
    expect:
      check: absent
      target: { value_key: ChatGPTConsField }
      timeout: 2.5
"#;
        let mut suite = TestSuite::from_yaml(yaml).unwrap();
        suite.resolve_paths(Path::new("/suites"));
        assert_eq!(suite.target.kind, TargetKind::Mobile);
        assert_eq!(
            suite.target.app.as_deref(),
            Some(Path::new("/suites/build/app-debug.apk"))
        );
        assert_eq!(
            suite.target.capabilities["appium:autoGrantPermissions"],
            Value::Bool(true)
        );
        suite.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_mobile_locator_on_web() {
        let yaml = r#"
name: Wrong locator
target:
  kind: web
scenarios:
  - name: uses accessibility id
    steps:
      - { action: click, target: { accessibility_id: GoogleLoginButton } }
"#;
        let suite = TestSuite::from_yaml(yaml).unwrap();
        let err = suite.validate().unwrap_err();
        assert!(err.to_string().contains("uses accessibility id"));
    }

    #[test]
    fn test_unknown_action_is_config_error() {
        let yaml = r#"
name: Bad
target: {}
scenarios:
  - name: bad step
    steps:
      - { action: hover, target: { id: x } }
"#;
        let err = TestSuite::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_secs_clamps() {
        assert_eq!(secs(1.5), Duration::from_millis(1500));
        assert_eq!(secs(-3.0), Duration::ZERO);
        assert_eq!(secs(f64::NAN), Duration::ZERO);
    }
}
