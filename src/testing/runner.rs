//! Test runner implementation
//!
//! Executes suites by driving a live session through the `UiDriver` seam.
//! Every scenario is a straight line of actions followed by one predicate;
//! the first failure ends that scenario and the suite moves on.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use colored::Colorize;
use serde::Serialize;
use tokio::process::Command as TokioCommand;
use url::Url;

use crate::common::config::{Config, SessionScope};
use crate::common::{Error, Result};
use crate::server::StaticServer;
use crate::session::{Connector, RemoteConnector, Session, WaitSettings};

use super::config::{secs, Expectation, Scenario, TestStep, TestSuite, WaitState, WindowSelector};

/// Script used for clicks that bypass native event dispatch
const JS_CLICK: &str = "arguments[0].click();";

/// Options from the command line
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    pub verbose: bool,
    /// Only run scenarios whose name contains this substring
    pub scenario_filter: Option<String>,
    /// Overrides the suite's session scope
    pub scope: Option<SessionScope>,
    /// Overrides every target's remote endpoint
    pub remote_url: Option<String>,
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub name: String,
    pub passed: bool,
    pub steps_run: usize,
    pub steps_total: usize,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub error_code: Option<&'static str>,
}

impl ScenarioResult {
    fn failed(scenario: &Scenario, steps_run: usize, started: Instant, error: &Error) -> Self {
        Self {
            name: scenario.name.clone(),
            passed: false,
            steps_run,
            steps_total: steps_total(scenario),
            duration_ms: elapsed_ms(started),
            error: Some(error.to_string()),
            error_code: Some(error.code()),
        }
    }
}

/// Result of one suite file
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResult {
    pub name: String,
    pub path: Option<PathBuf>,
    pub scenarios: Vec<ScenarioResult>,
    pub duration_ms: u64,
    /// Suite-level failure (setup, server) that prevented scenarios from running
    pub error: Option<String>,
    pub error_code: Option<&'static str>,
}

impl SuiteResult {
    /// A suite that could not be run at all
    pub fn aborted(name: impl Into<String>, path: Option<&Path>, error: &Error) -> Self {
        Self {
            name: name.into(),
            path: path.map(Path::to_path_buf),
            scenarios: Vec::new(),
            duration_ms: 0,
            error: Some(error.to_string()),
            error_code: Some(error.code()),
        }
    }

    pub fn passed(&self) -> bool {
        self.error.is_none() && self.scenarios.iter().all(|s| s.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.scenarios.iter().filter(|s| s.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.scenarios.len() - self.passed_count()
    }
}

/// Aggregate over every suite of a run
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub suites: Vec<SuiteResult>,
    pub passed: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn push(&mut self, suite: SuiteResult) {
        self.passed += suite.passed_count();
        self.failed += suite.failed_count();
        if suite.error.is_some() {
            self.failed += 1;
        }
        self.suites.push(suite);
    }

    pub fn all_passed(&self) -> bool {
        self.suites.iter().all(SuiteResult::passed)
    }

    /// Write the report as pretty JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Run a suite from a YAML file against real endpoints
pub async fn run_suite(path: &Path, config: &Config, options: &RunOptions) -> Result<SuiteResult> {
    let suite = TestSuite::from_file(path)?;

    println!(
        "\n{} {}",
        "Running Suite:".blue().bold(),
        suite.name.white().bold()
    );

    if let Some(desc) = &suite.description {
        println!("  {}", desc.dimmed());
    }

    if let Some(setup_steps) = &suite.setup {
        println!("\n{}", "Setup:".cyan());
        for step in setup_steps {
            if let Err(e) = run_setup_step(&step.shell, path, options.verbose).await {
                println!("  {} {}", "✗".red(), e);
                return Ok(SuiteResult::aborted(&suite.name, Some(path), &e));
            }
            println!("  {} {}", "✓".green(), step.shell.dimmed());
        }
    }

    let mut server = None;
    if let Some(serve) = &suite.serve {
        println!("\n{}", "Server:".cyan());
        let timeout = Duration::from_secs(config.timeouts.server_start_secs);
        match StaticServer::spawn(serve, timeout).await {
            Ok(s) => {
                println!(
                    "  {} Serving {} at {}",
                    "✓".green(),
                    serve.root.display().to_string().dimmed(),
                    s.url()
                );
                server = Some(s);
            }
            Err(e) => {
                println!("  {} {}", "✗".red(), e);
                return Ok(SuiteResult::aborted(&suite.name, Some(path), &e));
            }
        }
    }

    let scope = options
        .scope
        .or(suite.session_scope)
        .unwrap_or(config.defaults.session_scope);
    let connector = RemoteConnector::new(config, options.remote_url.clone());
    let waits = WaitSettings::from_config(&config.timeouts);

    let mut result = run_loaded_suite(&suite, &connector, waits, scope, options).await;
    result.path = Some(path.to_path_buf());

    if let Some(mut server) = server {
        server.stop().await;
    }

    Ok(result)
}

/// Run a shell setup command from the suite's directory
async fn run_setup_step(shell: &str, suite_path: &Path, verbose: bool) -> Result<()> {
    if verbose {
        println!("  $ {}", shell.dimmed());
    }

    let suite_dir = suite_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let stdio = || if verbose { Stdio::inherit() } else { Stdio::null() };
    let status = TokioCommand::new("sh")
        .arg("-c")
        .arg(shell)
        .current_dir(suite_dir)
        .stdin(Stdio::null())
        .stdout(stdio())
        .stderr(stdio())
        .status()
        .await
        .map_err(|e| Error::Config(format!("Setup command failed to execute: {}", e)))?;

    if !status.success() {
        return Err(Error::Config(format!(
            "Setup command '{}' failed with exit code {:?}",
            shell,
            status.code()
        )));
    }
    Ok(())
}

/// Run an already-loaded suite through a connector
///
/// Sessions are stopped exactly once on every path, including failures.
pub async fn run_loaded_suite(
    suite: &TestSuite,
    connector: &dyn Connector,
    waits: WaitSettings,
    scope: SessionScope,
    options: &RunOptions,
) -> SuiteResult {
    let started = Instant::now();
    let selected: Vec<&Scenario> = suite
        .scenarios
        .iter()
        .filter(|s| match &options.scenario_filter {
            Some(filter) => s.name.contains(filter.as_str()),
            None => true,
        })
        .collect();

    tracing::debug!(
        "Suite '{}': {} of {} scenarios selected, scope {:?}",
        suite.name,
        selected.len(),
        suite.scenarios.len(),
        scope
    );

    println!("\n{}", "Scenarios:".cyan());

    let scenarios = match scope {
        SessionScope::Suite => run_shared_session(suite, &selected, connector, waits, options).await,
        SessionScope::Scenario => {
            let mut results = Vec::with_capacity(selected.len());
            for scenario in &selected {
                let scenario_started = Instant::now();
                print_scenario_header(scenario);
                let result = match Session::start(connector, &suite.target, waits).await {
                    Ok(mut session) => {
                        let result = run_scenario(&mut session, scenario, options.verbose).await;
                        stop_session(&mut session).await;
                        result
                    }
                    Err(e) => {
                        println!("    {} {}", "✗".red(), e);
                        ScenarioResult::failed(scenario, 0, scenario_started, &e)
                    }
                };
                print_scenario_outcome(&result);
                results.push(result);
            }
            results
        }
    };

    SuiteResult {
        name: suite.name.clone(),
        path: None,
        scenarios,
        duration_ms: elapsed_ms(started),
        error: None,
        error_code: None,
    }
}

/// One session for every selected scenario, reset in between
async fn run_shared_session(
    suite: &TestSuite,
    selected: &[&Scenario],
    connector: &dyn Connector,
    waits: WaitSettings,
    options: &RunOptions,
) -> Vec<ScenarioResult> {
    let started = Instant::now();
    let mut session = match Session::start(connector, &suite.target, waits).await {
        Ok(session) => session,
        Err(e) => {
            println!("  {} {}", "✗".red(), e);
            return selected
                .iter()
                .map(|scenario| {
                    let result = ScenarioResult::failed(scenario, 0, started, &e);
                    print_scenario_header(scenario);
                    print_scenario_outcome(&result);
                    result
                })
                .collect();
        }
    };

    let mut results = Vec::with_capacity(selected.len());
    for (i, scenario) in selected.iter().enumerate() {
        print_scenario_header(scenario);

        let result = if i == 0 {
            run_scenario(&mut session, scenario, options.verbose).await
        } else {
            let reset_started = Instant::now();
            match session.reset().await {
                Ok(()) => run_scenario(&mut session, scenario, options.verbose).await,
                Err(e) => {
                    println!("    {} Reset: {}", "✗".red(), e);
                    ScenarioResult::failed(scenario, 0, reset_started, &e)
                }
            }
        };

        print_scenario_outcome(&result);
        results.push(result);
    }

    stop_session(&mut session).await;
    results
}

async fn stop_session(session: &mut Session) {
    if let Err(e) = session.stop().await {
        tracing::warn!("Failed to stop session cleanly: {}", e);
    }
}

/// Execute one scenario's steps and predicate on a live session
pub async fn run_scenario(session: &mut Session, scenario: &Scenario, verbose: bool) -> ScenarioResult {
    let started = Instant::now();
    let total = steps_total(scenario);

    if verbose {
        if let Some(desc) = &scenario.description {
            println!("    {}", desc.dimmed());
        }
    }

    for (i, step) in scenario.steps.iter().enumerate() {
        let step_num = i + 1;
        match execute_step(session, step).await {
            Ok(()) => {
                println!(
                    "    {} Step {}: {}",
                    "✓".green(),
                    step_num,
                    step.describe().dimmed()
                );
            }
            Err(e) => {
                println!("    {} Step {}: {}", "✗".red(), step_num, e);
                return ScenarioResult::failed(scenario, step_num, started, &e);
            }
        }
    }

    if let Some(expect) = &scenario.expect {
        if let Err(e) = evaluate(session, expect).await {
            println!("    {} Expect: {}", "✗".red(), e);
            return ScenarioResult::failed(scenario, total, started, &e);
        }
        println!("    {} Expect: {}", "✓".green(), describe_expectation(expect).dimmed());
    }

    ScenarioResult {
        name: scenario.name.clone(),
        passed: true,
        steps_run: total,
        steps_total: total,
        duration_ms: elapsed_ms(started),
        error: None,
        error_code: None,
    }
}

/// Execute a single test step
async fn execute_step(session: &mut Session, step: &TestStep) -> Result<()> {
    let element_timeout = session.waits().element;
    let timeout_or_default = |t: &Option<f64>| t.map(secs).unwrap_or(element_timeout);

    match step {
        TestStep::Type {
            target,
            text,
            clear,
        } => {
            let element = session.locator()?.find(target, element_timeout).await?;
            let driver = session.driver()?;
            if *clear {
                driver.clear(&element).await?;
            }
            driver.send_keys(&element, text).await
        }
        TestStep::Click { target } => {
            let element = session.locator()?.find(target, element_timeout).await?;
            session.driver()?.click(&element).await
        }
        TestStep::JsClick { target } => {
            let element = session.locator()?.find(target, element_timeout).await?;
            session
                .driver()?
                .execute_script(JS_CLICK, vec![element.to_json()])
                .await?;
            Ok(())
        }
        TestStep::Wait { seconds } => {
            tokio::time::sleep(secs(*seconds)).await;
            Ok(())
        }
        TestStep::WaitFor {
            target,
            state,
            timeout,
        } => {
            session
                .locator()?
                .wait_for(target, *state, timeout_or_default(timeout))
                .await
        }
        TestStep::SwitchWindow { window, timeout } => match window {
            WindowSelector::New => {
                session
                    .switch_to_new_window(timeout_or_default(timeout))
                    .await?;
                Ok(())
            }
            WindowSelector::Main => session.switch_to_main_window().await,
        },
        TestStep::SwitchFrame { target, timeout } => match target {
            Some(target) => {
                let frame = session
                    .locator()?
                    .find(target, timeout_or_default(timeout))
                    .await?;
                session.driver()?.switch_to_frame(Some(&frame)).await
            }
            None => session.driver()?.switch_to_frame(None).await,
        },
        TestStep::CloseWindow => session.driver()?.close_window().await,
        TestStep::GoBack => session.driver()?.back().await,
        TestStep::Navigate { url } => {
            let url = resolve_url(session.entry_url(), url)?;
            session.driver()?.navigate(&url).await
        }
        TestStep::ExecuteScript { script } => {
            let value = session.driver()?.execute_script(script, Vec::new()).await?;
            tracing::debug!("Script returned {}", value);
            Ok(())
        }
        TestStep::RememberUrl => {
            let url = session.remember_url().await?;
            tracing::debug!("Remembered {}", url);
            Ok(())
        }
        TestStep::Log { message } => {
            println!("    {}", message);
            Ok(())
        }
    }
}

/// Evaluate a scenario's final predicate
async fn evaluate(session: &mut Session, expect: &Expectation) -> Result<()> {
    let default_timeout = session.waits().element;
    let timeout_or_default = |t: &Option<f64>| t.map(secs).unwrap_or(default_timeout);

    match expect {
        Expectation::TextContains {
            target,
            value,
            timeout,
        } => {
            let timeout = timeout_or_default(timeout);
            let outcome = session
                .locator()?
                .text_until(target, timeout, |text| text.contains(value.as_str()))
                .await?;
            match outcome.last {
                _ if outcome.matched => Ok(()),
                None => Err(Error::element_not_found(target, timeout)),
                Some(last) => Err(Error::Assertion(format!(
                    "text of {} is {:?}, expected it to contain {:?}",
                    target, last, value
                ))),
            }
        }
        Expectation::TextEquals {
            target,
            value,
            timeout,
        } => {
            let timeout = timeout_or_default(timeout);
            let outcome = session
                .locator()?
                .text_until(target, timeout, |text| text == value.as_str())
                .await?;
            match outcome.last {
                _ if outcome.matched => Ok(()),
                None => Err(Error::element_not_found(target, timeout)),
                Some(last) => Err(Error::Assertion(format!(
                    "text of {} is {:?}, expected {:?}",
                    target, last, value
                ))),
            }
        }
        Expectation::Exists {
            target,
            timeout,
            enabled,
        } => {
            let timeout = timeout_or_default(timeout);
            let state = if enabled.unwrap_or(false) {
                WaitState::Enabled
            } else {
                WaitState::Present
            };
            if session.locator()?.check(target, state, timeout).await? {
                Ok(())
            } else if state == WaitState::Enabled {
                Err(Error::Assertion(format!(
                    "{} is not present and enabled after {:.1}s",
                    target,
                    timeout.as_secs_f64()
                )))
            } else {
                Err(Error::Assertion(format!(
                    "{} does not exist after {:.1}s",
                    target,
                    timeout.as_secs_f64()
                )))
            }
        }
        Expectation::Absent { target, timeout } => {
            let timeout = timeout_or_default(timeout);
            if session.locator()?.absent(target, timeout).await? {
                Ok(())
            } else {
                Err(Error::Assertion(format!(
                    "{} still present after {:.1}s",
                    target,
                    timeout.as_secs_f64()
                )))
            }
        }
        Expectation::UrlContains { value, timeout } => {
            let timeout = timeout_or_default(timeout);
            let outcome = session
                .locator()?
                .url_until(timeout, |url| url.contains(value.as_str()))
                .await?;
            if outcome.matched {
                Ok(())
            } else {
                Err(Error::Assertion(format!(
                    "url {:?} does not contain {:?}",
                    outcome.last.unwrap_or_default(),
                    value
                )))
            }
        }
        Expectation::UrlUnchanged => {
            let remembered = session.remembered_url().map(str::to_string).ok_or_else(|| {
                Error::Config("url_unchanged requires an earlier remember_url step".to_string())
            })?;
            let current = session.driver()?.current_url().await?;
            if current == remembered {
                Ok(())
            } else {
                Err(Error::Assertion(format!(
                    "url changed from {:?} to {:?}",
                    remembered, current
                )))
            }
        }
    }
}

/// Resolve a navigate target against the entry URL
///
/// Absolute URLs (including `about:` and `data:`) pass through unchanged;
/// anything else is joined onto the entry URL.
fn resolve_url(base: Option<&str>, url: &str) -> Result<String> {
    match Url::parse(url) {
        Ok(absolute) => return Ok(absolute.into()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {}
        Err(e) => return Err(Error::Config(format!("invalid url '{}': {}", url, e))),
    }

    let base = base.ok_or_else(|| {
        Error::Config(format!("relative url '{}' needs a target entry_url", url))
    })?;
    let base = Url::parse(base)
        .map_err(|e| Error::Config(format!("entry_url '{}' is not absolute: {}", base, e)))?;

    base.join(url)
        .map(String::from)
        .map_err(|e| Error::Config(format!("cannot resolve '{}' against {}: {}", url, base, e)))
}

fn describe_expectation(expect: &Expectation) -> String {
    match expect {
        Expectation::TextContains { target, value, .. } => {
            format!("{} contains '{}'", target, value)
        }
        Expectation::TextEquals { target, value, .. } => format!("{} equals '{}'", target, value),
        Expectation::Exists {
            target,
            enabled: Some(true),
            ..
        } => format!("{} exists and is enabled", target),
        Expectation::Exists { target, .. } => format!("{} exists", target),
        Expectation::Absent { target, .. } => format!("{} absent", target),
        Expectation::UrlContains { value, .. } => format!("url contains '{}'", value),
        Expectation::UrlUnchanged => "url unchanged".to_string(),
    }
}

fn print_scenario_header(scenario: &Scenario) {
    println!("  {} {}", "Scenario:".bold(), scenario.name);
}

fn print_scenario_outcome(result: &ScenarioResult) {
    if result.passed {
        println!("  {} {}", "✓".green().bold(), "Passed".green());
    } else {
        println!(
            "  {} {} [{}]",
            "✗".red().bold(),
            "Failed".red(),
            result.error_code.unwrap_or("UNKNOWN")
        );
    }
}

fn steps_total(scenario: &Scenario) -> usize {
    scenario.steps.len() + usize::from(scenario.expect.is_some())
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::{FakeConnector, FakeDriver};

    const SUITE: &str = r#"
name: Fake login
target:
  kind: web
  entry_url: http://localhost:3000/index.html
scenarios:
  - name: valid login
    steps:
      - { action: type, target: { id: emailInput }, text: john@example.com }
      - { action: click, target: { class: btn-login } }
    expect: { check: text_contains, target: { id: message }, value: Login Successful, timeout: 0.2 }
  - name: missing element
    steps:
      - { action: click, target: { id: doesNotExist } }
      - { action: click, target: { class: btn-login } }
  - name: url kept after script click
    steps:
      - { action: remember_url }
      - { action: js_click, target: { class: btn-login } }
    expect: { check: url_unchanged }
"#;

    fn login_page(driver: &mut FakeDriver) {
        driver.add_element("emailInput", "");
        driver.add_element("btn-login", "Login");
        driver.reveal_on_click("btn-login", "message", "Login Successful");
    }

    fn waits() -> WaitSettings {
        WaitSettings {
            element: Duration::from_millis(50),
            poll_interval: Duration::from_millis(5),
            session_start: Duration::from_secs(1),
        }
    }

    fn suite() -> TestSuite {
        let suite = TestSuite::from_yaml(SUITE).unwrap();
        suite.validate().unwrap();
        suite
    }

    #[tokio::test]
    async fn test_suite_scope_shares_one_session_and_isolates_failures() {
        let connector = FakeConnector::new(login_page);
        let result = run_loaded_suite(
            &suite(),
            &connector,
            waits(),
            SessionScope::Suite,
            &RunOptions::default(),
        )
        .await;

        let passed: Vec<bool> = result.scenarios.iter().map(|s| s.passed).collect();
        assert_eq!(passed, vec![true, false, true]);
        assert_eq!(connector.connects(), 1);
        assert_eq!(connector.quits(), 1);

        let failed = &result.scenarios[1];
        assert_eq!(failed.steps_run, 1);
        assert_eq!(failed.steps_total, 2);
        assert_eq!(failed.error_code, Some("ELEMENT_NOT_FOUND"));
        assert!(!result.passed());
    }

    #[tokio::test]
    async fn test_scenario_scope_stops_every_session_once() {
        let connector = FakeConnector::new(login_page);
        let result = run_loaded_suite(
            &suite(),
            &connector,
            waits(),
            SessionScope::Scenario,
            &RunOptions::default(),
        )
        .await;

        assert_eq!(result.scenarios.len(), 3);
        assert_eq!(connector.connects(), 3);
        assert_eq!(connector.quits(), 3);
        assert_eq!(result.passed_count(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_every_scenario() {
        let connector = FakeConnector::failing();
        let result = run_loaded_suite(
            &suite(),
            &connector,
            waits(),
            SessionScope::Suite,
            &RunOptions::default(),
        )
        .await;

        assert_eq!(result.failed_count(), 3);
        assert!(result
            .scenarios
            .iter()
            .all(|s| s.error_code == Some("SESSION_START") && s.steps_run == 0));
        assert_eq!(connector.quits(), 0);
    }

    #[tokio::test]
    async fn test_scenario_filter() {
        let connector = FakeConnector::new(login_page);
        let options = RunOptions {
            scenario_filter: Some("valid".to_string()),
            ..Default::default()
        };
        let result =
            run_loaded_suite(&suite(), &connector, waits(), SessionScope::Suite, &options).await;

        assert_eq!(result.scenarios.len(), 1);
        assert_eq!(result.scenarios[0].name, "valid login");
        assert!(result.passed());
    }

    #[tokio::test]
    async fn test_failed_predicate_reports_assertion() {
        let yaml = r#"
name: Wrong message
target: { entry_url: "http://localhost:3000/index.html" }
scenarios:
  - name: expects failure text
    steps:
      - { action: click, target: { class: btn-login } }
    expect: { check: text_equals, target: { id: message }, value: Invalid credentials. Please try again., timeout: 0.05 }
  - name: url_unchanged without remember_url
    expect: { check: url_unchanged }
"#;
        let suite = TestSuite::from_yaml(yaml).unwrap();
        let connector = FakeConnector::new(login_page);
        let result = run_loaded_suite(
            &suite,
            &connector,
            waits(),
            SessionScope::Suite,
            &RunOptions::default(),
        )
        .await;

        let first = &result.scenarios[0];
        assert_eq!(first.error_code, Some("ASSERTION_FAILED"));
        assert_eq!(first.steps_run, 2);
        assert!(first.error.as_deref().unwrap().contains("Login Successful"));

        assert_eq!(result.scenarios[1].error_code, Some("CONFIG"));
        assert_eq!(connector.quits(), 1);
    }

    #[test]
    fn test_resolve_url() {
        let base = Some("http://localhost:3000/app/index.html?x=1");
        assert_eq!(
            resolve_url(base, "survey.html").unwrap(),
            "http://localhost:3000/app/survey.html"
        );
        assert_eq!(
            resolve_url(base, "/other.html").unwrap(),
            "http://localhost:3000/other.html"
        );
        assert_eq!(
            resolve_url(base, "https://example.com/").unwrap(),
            "https://example.com/"
        );
        assert_eq!(
            resolve_url(Some("http://localhost:3000"), "index.html").unwrap(),
            "http://localhost:3000/index.html"
        );
        assert!(resolve_url(None, "index.html").is_err());
    }

    #[test]
    fn test_resolve_url_special_forms() {
        let base = Some("http://localhost:3000/index.html");
        assert_eq!(resolve_url(base, "about:blank").unwrap(), "about:blank");
        assert_eq!(
            resolve_url(base, "data:text/html,hi").unwrap(),
            "data:text/html,hi"
        );
        assert_eq!(
            resolve_url(base, "//cdn.example.com/x").unwrap(),
            "http://cdn.example.com/x"
        );
        assert_eq!(
            resolve_url(base, "?lang=en").unwrap(),
            "http://localhost:3000/index.html?lang=en"
        );
        assert_eq!(
            resolve_url(Some("not a url"), "index.html").unwrap_err().code(),
            "CONFIG"
        );
    }

    #[test]
    fn test_report_counts() {
        let mut report = RunReport::default();
        report.push(SuiteResult::aborted(
            "broken",
            None,
            &Error::ServerHealthCheck(3),
        ));
        assert_eq!(report.failed, 1);
        assert!(!report.all_passed());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["suites"][0]["error_code"], "SERVER_START");
    }
}
