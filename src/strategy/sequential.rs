//! Base strategy: steps in order through the command invoker

use super::IndexedStep;
use crate::command::{CommandInvoker, StepCommand};
use crate::common::{Error, Result};
use crate::execution::ExecutionScope;

fn command(scope: &ExecutionScope, (index, step): IndexedStep<'_>) -> Box<StepCommand> {
    Box::new(StepCommand::new(scope.clone(), step.clone(), index))
}

pub(super) async fn run(
    scope: &ExecutionScope,
    steps: &[IndexedStep<'_>],
    stop_on_first_failure: bool,
) -> Result<()> {
    if steps.is_empty() {
        tracing::warn!("No steps provided to execute");
        return Ok(());
    }

    tracing::info!(
        origin = scope.events().origin(),
        "Executing {} steps sequentially (stop on first failure: {})",
        steps.len(),
        stop_on_first_failure
    );

    let mut invoker = CommandInvoker::new(false);

    if stop_on_first_failure {
        for &step in steps {
            invoker.add_command(command(scope, step));
        }
        invoker.execute_all().await?;
        tracing::info!("All {} steps executed successfully", steps.len());
        return Ok(());
    }

    let mut failures = Vec::new();
    for &step in steps {
        match invoker.execute_command(command(scope, step)).await {
            Ok(()) => {}
            // Cancellation and configuration errors end the pass
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!("Step {} failed, continuing: {}", step.0 + 1, e);
                failures.push(e);
            }
        }
    }

    if failures.is_empty() {
        tracing::info!("All {} steps executed successfully", steps.len());
        return Ok(());
    }

    let failed = failures.len();
    tracing::error!(
        "Sequential execution completed with {} failed steps out of {} total steps",
        failed,
        steps.len()
    );
    Err(Error::StepsFailed {
        succeeded: steps.len() - failed,
        failed,
        total: steps.len(),
        failures,
    })
}
