//! Conditional decorator

use super::{IndexedStep, StepFilter, Strategy};
use crate::common::{Error, Result};
use crate::events::EventType;
use crate::execution::ExecutionScope;

pub(super) async fn run(
    inner: &Strategy,
    filter: &StepFilter,
    scope: &ExecutionScope,
    steps: &[IndexedStep<'_>],
) -> Result<()> {
    let mut accepted = Vec::with_capacity(steps.len());
    for &(index, step) in steps {
        if filter.matches(step) {
            accepted.push((index, step));
        } else {
            tracing::debug!("Skipping {} ({})", step.label(index), filter.description());
            scope.publish(scope.step_event(
                EventType::StepSkipped,
                index,
                step,
                format!("Skipped by condition: {}", filter.description()),
            ));
        }
    }

    let skipped = steps.len() - accepted.len();
    if accepted.is_empty() {
        tracing::warn!("All {} steps filtered out; nothing to execute", steps.len());
        return Ok(());
    }

    tracing::info!(
        "Executing {} of {} steps ({} skipped by condition)",
        accepted.len(),
        steps.len(),
        skipped
    );
    match inner.run(scope, &accepted).await {
        Err(e) if skipped > 0 && !e.is_fatal() => Err(Error::ConditionalFailed {
            skipped,
            total: steps.len(),
            source: Box::new(e),
        }),
        other => other,
    }
}
