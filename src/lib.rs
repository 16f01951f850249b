//! Scenario Runner - declarative browser-test scenarios
//!
//! A scenario is an ordered list of typed steps. Steps run through the
//! command invoker under a composable execution strategy, emit lifecycle
//! events to registered observers, and reach the browser only through the
//! [`driver::Driver`] capability.

pub mod actions;
pub mod cli;
pub mod command;
pub mod commands;
pub mod common;
pub mod driver;
pub mod events;
pub mod execution;
pub mod manager;
pub mod model;
pub mod strategy;
pub mod validation;

// Re-export commonly used types for tests
pub use common::{Error, ErrorKind, Result};
pub use execution::{ActionSettings, ExecutionContext, ExecutionScope};
pub use manager::{ParallelRunner, RunSummary, ScenarioManager, ScenarioStatus};
pub use model::{Action, Scenario, Step, Target};
pub use strategy::Strategy;
