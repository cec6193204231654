//! Suite runner
//!
//! Reads YAML test suites and executes their scenarios against a live
//! browser page or mobile app. One runner serves every suite: the suites
//! are data, the actions and predicates live here.

mod config;
mod runner;

pub use config::*;
pub use runner::{
    run_loaded_suite, run_scenario, run_suite, RunOptions, RunReport, ScenarioResult, SuiteResult,
};
