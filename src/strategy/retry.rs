//! Retry decorator
//!
//! Every attempt re-runs the whole step list from the start; there is no
//! resume from the failed step.

use std::time::Duration;

use super::{IndexedStep, Strategy};
use crate::common::{Error, Result};
use crate::execution::ExecutionScope;

pub(super) async fn run(
    inner: &Strategy,
    scope: &ExecutionScope,
    steps: &[IndexedStep<'_>],
    max_retries: u32,
    delay: Duration,
) -> Result<()> {
    if steps.is_empty() {
        tracing::warn!("No steps provided to execute");
        return Ok(());
    }

    tracing::info!(
        "Executing {} steps with retry strategy (max retries: {}, delay: {}ms)",
        steps.len(),
        max_retries,
        delay.as_millis()
    );

    let attempts = max_retries.saturating_add(1);
    let mut last = None;

    for attempt in 1..=attempts {
        if attempt > 1 {
            tracing::info!("Retry attempt {} of {}", attempt - 1, max_retries);
            if !delay.is_zero() {
                tracing::debug!("Waiting {}ms before retry", delay.as_millis());
                scope.pause(delay).await?;
            }
        }

        let attempt_scope = scope.for_attempt(attempt);
        match inner.run(&attempt_scope, steps).await {
            Ok(()) => {
                if attempt > 1 {
                    tracing::info!("Execution succeeded on attempt {}", attempt);
                }
                return Ok(());
            }
            Err(e) if e.is_fatal() => {
                tracing::warn!("Not retrying after fatal error: {}", e);
                return Err(e);
            }
            Err(e) => {
                if attempt < attempts {
                    tracing::warn!("Execution attempt {} failed: {}. Will retry.", attempt, e);
                } else {
                    tracing::error!(
                        "Execution failed after {} attempts. Last error: {}",
                        attempts,
                        e
                    );
                }
                last = Some(e);
            }
        }
    }

    Err(Error::RetriesExhausted {
        attempts,
        last: Box::new(last.unwrap_or_else(|| Error::Internal("no attempt ran".into()))),
    })
}
