//! Per-scenario execution scope
//!
//! Everything a running step needs travels in one explicit value: the driver
//! session, the event publisher, the cancellation token and the wait
//! settings. Nothing is looked up from ambient state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::common::{Config, Error, Result};
use crate::driver::{BrowserOp, DriverHandle, OpOutput};
use crate::events::{EventPublisher, EventType, TestExecutionEvent};
use crate::model::Step;

/// Settings consumed by leaf executors
#[derive(Debug, Clone)]
pub struct ActionSettings {
    /// Default bound for element, alert and script waits
    pub explicit_wait: Duration,
    pub poll_interval: Duration,
    pub screenshot_dir: PathBuf,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ActionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            explicit_wait: config.explicit_wait(),
            poll_interval: config.poll_interval(),
            screenshot_dir: config.output.screenshot_dir.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ExecutionScope {
    driver: DriverHandle,
    events: EventPublisher,
    cancel: CancellationToken,
    settings: Arc<ActionSettings>,
    attempt: u32,
}

impl std::fmt::Debug for ExecutionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionScope")
            .field("driver", &self.driver.name())
            .field("origin", &self.events.origin())
            .field("attempt", &self.attempt)
            .finish()
    }
}

impl ExecutionScope {
    pub fn new(driver: DriverHandle, events: EventPublisher) -> Self {
        Self {
            driver,
            events,
            cancel: CancellationToken::new(),
            settings: Arc::new(ActionSettings::default()),
            attempt: 1,
        }
    }

    pub fn with_settings(mut self, settings: ActionSettings) -> Self {
        self.settings = Arc::new(settings);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn driver(&self) -> &DriverHandle {
        &self.driver
    }

    pub fn events(&self) -> &EventPublisher {
        &self.events
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn settings(&self) -> &ActionSettings {
        &self.settings
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Same scope, stamping events with another attempt number
    pub fn for_attempt(&self, attempt: u32) -> Self {
        let mut scope = self.clone();
        scope.attempt = attempt;
        scope
    }

    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep that wakes early with `Error::Cancelled`
    pub async fn pause(&self, duration: Duration) -> Result<()> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    /// Run one driver operation, abandoning it on cancellation
    pub async fn perform(&self, op: BrowserOp) -> Result<OpOutput> {
        self.check_cancelled()?;
        tracing::trace!(op = op.name(), driver = self.driver.name(), "Driver operation");
        tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = self.driver.perform(op) => result.map_err(Error::from),
        }
    }

    /// Step lifecycle event stamped with this scope's origin and attempt
    pub fn step_event(
        &self,
        kind: EventType,
        index: usize,
        step: &Step,
        message: impl Into<String>,
    ) -> TestExecutionEvent {
        self.events
            .event(kind, message)
            .with_step(index, step)
            .with_attempt(self.attempt)
    }

    pub fn publish(&self, event: TestExecutionEvent) {
        self.events.publish(event);
    }
}
