//! Scenario lifecycle and parallel execution

mod parallel;
mod scenario;

pub use parallel::{ParallelRunner, RunSummary, ScenarioOutcome, ScenarioStatus};
pub use scenario::ScenarioManager;
