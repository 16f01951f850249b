//! Command executing one scenario step

use async_trait::async_trait;

use super::Command;
use crate::actions;
use crate::common::{Error, Result};
use crate::events::EventType;
use crate::execution::ExecutionScope;
use crate::model::Step;

/// Runs one step through the action registry and publishes its lifecycle
pub struct StepCommand {
    scope: ExecutionScope,
    step: Step,
    index: usize,
    executed: bool,
}

impl StepCommand {
    pub fn new(scope: ExecutionScope, step: Step, index: usize) -> Self {
        Self {
            scope,
            step,
            index,
            executed: false,
        }
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    /// 0-based position in the original step list
    pub fn index(&self) -> usize {
        self.index
    }
}

#[async_trait]
impl Command for StepCommand {
    async fn execute(&mut self) -> Result<()> {
        // Cancellation between steps ends the run, it is not a step failure
        self.scope.check_cancelled()?;
        let label = self.step.label(self.index);
        tracing::debug!("Executing command: {}", label);

        self.scope.publish(self.scope.step_event(
            EventType::StepStarted,
            self.index,
            &self.step,
            label.clone(),
        ));

        match actions::dispatch(&self.step, &self.scope).await {
            Ok(()) => {
                self.executed = true;
                tracing::debug!("Successfully executed command: {}", label);
                self.scope.publish(self.scope.step_event(
                    EventType::StepCompleted,
                    self.index,
                    &self.step,
                    "Step executed successfully",
                ));
                Ok(())
            }
            Err(e) => {
                tracing::error!("Command execution failed: {} - {}", label, e);
                let message = e.to_string();
                let err = Error::step_failed(self.index, self.step.display_name(), e);
                self.scope.publish(
                    self.scope
                        .step_event(EventType::StepFailed, self.index, &self.step, message)
                        .with_failure(&err),
                );
                Err(err)
            }
        }
    }

    async fn undo(&mut self) -> Result<()> {
        let inverse = self.step.inverse().ok_or_else(|| {
            Error::Unsupported(format!("{} has no inverse action", self.step.kind()))
        })?;
        tracing::info!(
            "Undoing {} with {}",
            self.step.label(self.index),
            inverse.kind()
        );
        actions::dispatch(&inverse, &self.scope).await?;
        self.executed = false;
        Ok(())
    }

    fn can_undo(&self) -> bool {
        self.executed && self.step.inverse().is_some()
    }

    fn name(&self) -> String {
        format!("StepExecution[{}]", self.step.display_name())
    }

    fn description(&self) -> String {
        format!("Execute {}", self.step.label(self.index))
    }
}
