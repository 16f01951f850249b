//! Scenario execution plumbing
//!
//! [`ExecutionScope`] carries the per-scenario handles every step needs;
//! [`ExecutionContext`] validates a step list and hands it to a strategy.

mod context;
mod scope;

pub use context::ExecutionContext;
pub use scope::{ActionSettings, ExecutionScope};
