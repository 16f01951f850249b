//! Scenario, step and locator types

mod scenario;
mod step;
mod target;

pub use scenario::{Scenario, ScenarioFormat};
pub use step::{Action, ActionCategory, ActionKind, ElementState, Step, UNNAMED_STEP};
pub use target::{Target, LOCATOR_STRATEGIES};
