//! Scenario simulator module
//!
//! Replays a list of trial batches from a YAML file against a fresh session
//! and reports how each strategy converged.

pub mod config;
pub mod runner;
pub mod stats;

pub use config::{scenario_files, ScenarioFile};
pub use runner::ScenarioRunner;
