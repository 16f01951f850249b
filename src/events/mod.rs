//! Scenario and step lifecycle events
//!
//! Events are created once by the engine, published synchronously to every
//! interested observer in registration order, and then dropped. Observers are
//! sinks: they cannot mutate an event or influence control flow.

mod observers;
mod publisher;

pub use observers::{
    for_environment, ChannelObserver, LoggingObserver, MetricsObserver, MetricsSnapshot,
};
pub use publisher::{EventPublisher, ExecutionObserver};

use std::fmt;
use std::time::{Instant, SystemTime};

use crate::common::{Error, FailureInfo};
use crate::model::Step;

/// Lifecycle transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    ScenarioStarted,
    ScenarioCompleted,
    ScenarioFailed,
    StepStarted,
    StepCompleted,
    StepFailed,
    StepSkipped,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScenarioStarted => "SCENARIO_STARTED",
            Self::ScenarioCompleted => "SCENARIO_COMPLETED",
            Self::ScenarioFailed => "SCENARIO_FAILED",
            Self::StepStarted => "STEP_STARTED",
            Self::StepCompleted => "STEP_COMPLETED",
            Self::StepFailed => "STEP_FAILED",
            Self::StepSkipped => "STEP_SKIPPED",
        }
    }

    /// Whether this event ends a scenario or step lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ScenarioCompleted
                | Self::ScenarioFailed
                | Self::StepCompleted
                | Self::StepFailed
                | Self::StepSkipped
        )
    }

    pub fn is_step(&self) -> bool {
        matches!(
            self,
            Self::StepStarted | Self::StepCompleted | Self::StepFailed | Self::StepSkipped
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable lifecycle notification
#[derive(Debug, Clone)]
pub struct TestExecutionEvent {
    kind: EventType,
    step: Option<Step>,
    step_index: Option<usize>,
    message: String,
    failure: Option<FailureInfo>,
    timestamp: SystemTime,
    instant: Instant,
    origin: String,
    run: u64,
    attempt: u32,
}

impl TestExecutionEvent {
    pub fn new(kind: EventType, origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            step: None,
            step_index: None,
            message: message.into(),
            failure: None,
            timestamp: SystemTime::now(),
            instant: Instant::now(),
            origin: origin.into(),
            run: 0,
            attempt: 1,
        }
    }

    pub fn with_step(mut self, index: usize, step: &Step) -> Self {
        self.step_index = Some(index);
        self.step = Some(step.clone());
        self
    }

    pub fn with_failure(mut self, error: &Error) -> Self {
        self.failure = Some(FailureInfo::from(error));
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    pub fn with_run(mut self, run: u64) -> Self {
        self.run = run;
        self
    }

    pub fn kind(&self) -> EventType {
        self.kind
    }

    pub fn step(&self) -> Option<&Step> {
        self.step.as_ref()
    }

    /// 0-based index of the step in its original list
    pub fn step_index(&self) -> Option<usize> {
        self.step_index
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn failure(&self) -> Option<&FailureInfo> {
        self.failure.as_ref()
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Monotonic creation time, for durations
    pub fn instant(&self) -> Instant {
        self.instant
    }

    /// Label of the scenario that produced the event
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Id of the scenario run within its origin
    pub fn run(&self) -> u64 {
        self.run
    }

    /// 1-based attempt number under retry
    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

impl fmt::Display for TestExecutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.origin, self.kind)?;
        if let Some(index) = self.step_index {
            write!(f, " step {}", index + 1)?;
        }
        if self.attempt > 1 {
            write!(f, " (attempt {})", self.attempt)?;
        }
        write!(f, ": {}", self.message)
    }
}
