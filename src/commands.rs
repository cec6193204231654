//! CLI command definitions
//!
//! Defines the clap commands for the uiflow CLI.

use clap::Subcommand;
use std::path::PathBuf;

use crate::common::config::SessionScope;

#[derive(Subcommand)]
pub enum Commands {
    /// Run one or more YAML test suites
    Test {
        /// Paths to the YAML suite files
        #[arg(required = true)]
        suites: Vec<PathBuf>,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,

        /// Remote WebDriver/Appium endpoint, overriding suites and config
        #[arg(long)]
        remote_url: Option<String>,

        /// Only run scenarios whose name contains this text
        #[arg(long)]
        scenario: Option<String>,

        /// Session lifetime: suite (one session per file) or scenario
        #[arg(long)]
        scope: Option<SessionScope>,

        /// Write a JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Serve a directory over HTTP (used for pages under test)
    Serve {
        /// Directory to serve
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Port to listen on (0 picks a free one)
        #[arg(long, default_value = "3000")]
        port: u16,
    },

    /// Check whether a remote endpoint is ready for sessions
    Status {
        /// Endpoint to query (default: configured web endpoint)
        #[arg(long)]
        remote_url: Option<String>,
    },

    /// View static server logs
    Logs {
        /// Number of lines to show (default: 50)
        #[arg(long, short = 'n', default_value = "50")]
        lines: usize,

        /// Clear the log file
        #[arg(long)]
        clear: bool,
    },

    /// Show the config file location and effective settings
    Config,
}
