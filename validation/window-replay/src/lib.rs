//! Time-window replay tool for particle grids.
//!
//! This crate provides tools to:
//! - Describe a grid and a stepping schedule in a YAML scenario
//! - Step the grid's time window through the schedule
//! - Record every window transition
//! - Output results as a console table or JSON

pub mod config;
pub mod replay;
pub mod report;

pub use config::{ScenarioAxis, HaloConfig, ScenarioConfig, SteppingConfig};
pub use replay::{ReplayResults, Replayer, StepRecord};
pub use report::ResultsReport;
