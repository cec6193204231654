//! CLI command handling
//!
//! Dispatches CLI commands and formats output.

use std::path::Path;
use std::time::Duration;

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::{Config, SessionScope};
use crate::common::{logging, paths, Error, Result};
use crate::testing::{self, RunOptions, RunReport, SuiteResult};
use crate::webdriver::WebDriverClient;

/// Dispatch a CLI command
///
/// Returns whether the command succeeded as a whole; a test run with
/// failing scenarios is not an error but still ends with exit code 1.
pub async fn dispatch(command: Commands) -> Result<bool> {
    match command {
        Commands::Serve { .. } => {
            // Should never happen - serve mode is handled in main
            Err(Error::Internal("serve must be handled by main".to_string()))
        }

        Commands::Test {
            suites,
            verbose,
            remote_url,
            scenario,
            scope,
            report,
        } => {
            let config = Config::load()?;
            let options = RunOptions {
                verbose,
                scenario_filter: scenario,
                scope,
                remote_url,
            };

            let mut run = RunReport::default();
            for path in &suites {
                let result = match testing::run_suite(path, &config, &options).await {
                    Ok(result) => result,
                    Err(e) => {
                        println!("\n{} {}: {}", "✗".red().bold(), path.display(), e);
                        SuiteResult::aborted(path.display().to_string(), Some(path.as_path()), &e)
                    }
                };
                run.push(result);
            }

            print_summary(&run);

            if let Some(report) = report {
                run.write(&report)?;
                println!("Report written to {}", report.display());
            }

            Ok(run.all_passed())
        }

        Commands::Status { remote_url } => {
            let config = Config::load()?;
            let url = remote_url.unwrap_or_else(|| config.defaults.web_remote_url.clone());

            match WebDriverClient::status(&url, Duration::from_secs(5)).await {
                Ok(status) => {
                    println!("Endpoint: {}", url);
                    println!("Ready: {}", if status.ready { "yes" } else { "no" });
                    if !status.message.is_empty() {
                        println!("Message: {}", status.message);
                    }
                    Ok(status.ready)
                }
                Err(Error::Http(e)) if e.is_connect() || e.is_timeout() => {
                    println!("Endpoint: {}", url);
                    println!("Ready: no (unreachable)");
                    Ok(false)
                }
                Err(e) => Err(e),
            }
        }

        Commands::Logs { lines, clear } => {
            if clear {
                logging::truncate_server_log()?;
                println!("Log file cleared");
                return Ok(true);
            }

            let Some(path) = paths::server_log_path() else {
                return Err(Error::Internal("could not determine log directory".to_string()));
            };
            print_log_tail(&path, lines)?;
            Ok(true)
        }

        Commands::Config => {
            let config = Config::load()?;
            match paths::config_path() {
                Some(path) if path.exists() => println!("Config file: {}", path.display()),
                Some(path) => println!("Config file: {} (not present, using defaults)", path.display()),
                None => println!("Config file: none (no home directory)"),
            }

            println!("\n[defaults]");
            println!("web_remote_url = {:?}", config.defaults.web_remote_url);
            println!("mobile_remote_url = {:?}", config.defaults.mobile_remote_url);
            println!("browser = {:?}", config.defaults.browser);
            let scope = match config.defaults.session_scope {
                SessionScope::Suite => "suite",
                SessionScope::Scenario => "scenario",
            };
            println!("session_scope = {:?}", scope);

            println!("\n[timeouts]");
            let t = &config.timeouts;
            println!("element_secs = {}", t.element_secs);
            println!("poll_interval_ms = {}", t.poll_interval_ms);
            println!("session_start_secs = {}", t.session_start_secs);
            println!("request_secs = {}", t.request_secs);
            println!("server_start_secs = {}", t.server_start_secs);
            println!("driver_start_secs = {}", t.driver_start_secs);

            let mut names: Vec<_> = config.drivers.keys().collect();
            names.sort();
            for name in names {
                let driver = &config.drivers[name];
                println!("\n[drivers.{}]", name);
                println!("path = {:?}", driver.path.display().to_string());
                println!("args = {:?}", driver.args);
            }

            Ok(true)
        }
    }
}

fn print_summary(run: &RunReport) {
    println!("\n{}", "Summary:".cyan().bold());
    for suite in &run.suites {
        let mark = if suite.passed() {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            "  {} {} ({} passed, {} failed)",
            mark,
            suite.name,
            suite.passed_count(),
            suite.failed_count()
        );
        if let Some(error) = &suite.error {
            println!("      {}", error.red());
        }
        for scenario in suite.scenarios.iter().filter(|s| !s.passed) {
            println!(
                "      {} {}: {}",
                "✗".red(),
                scenario.name,
                scenario.error.as_deref().unwrap_or("failed").dimmed()
            );
        }
    }

    let line = format!("{} passed, {} failed", run.passed, run.failed);
    if run.all_passed() {
        println!("\n{}\n", line.green().bold());
    } else {
        println!("\n{}\n", line.red().bold());
    }
}

fn print_log_tail(path: &Path, lines: usize) -> Result<()> {
    if !path.exists() {
        println!("No log file at {}", path.display());
        return Ok(());
    }

    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;

    let all: Vec<&str> = content.lines().collect();
    let start = all.len().saturating_sub(lines);
    for line in &all[start..] {
        println!("{}", line);
    }
    Ok(())
}
