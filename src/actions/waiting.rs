//! Bounded waits and condition checks
//!
//! Every wait polls through [`ExecutionScope::pause`], so a cancelled scope
//! interrupts it with `Error::Cancelled`.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::common::{DriverError, Error, Result};
use crate::driver::BrowserOp;
use crate::execution::ExecutionScope;
use crate::model::{ElementState, Target};

/// Poll `check` until it yields true or `timeout` elapses
///
/// Transient driver errors (element not found yet, stale element, no alert)
/// count as "not yet"; any other error ends the wait.
pub(crate) async fn wait_until<F, Fut>(
    scope: &ExecutionScope,
    timeout: Duration,
    what: &str,
    mut check: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    // A timeout past the clock's range leaves the wait bounded by cancellation only
    let deadline = Instant::now().checked_add(timeout);
    loop {
        match check().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(Error::Driver(e)) if e.is_transient() => {}
            Err(e) => return Err(e),
        }

        let poll = scope.settings().poll_interval;
        let delay = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    tracing::debug!(what, ?timeout, "Wait timed out");
                    return Err(Error::timeout(what, timeout));
                }
                poll.min(deadline - now)
            }
            None => poll,
        };
        scope.pause(delay).await?;
    }
}

pub(crate) async fn probe(
    scope: &ExecutionScope,
    target: &Target,
    state: ElementState,
) -> Result<bool> {
    let flag = scope
        .perform(BrowserOp::Probe {
            target: target.clone(),
            state,
        })
        .await?
        .into_flag()?;
    Ok(flag)
}

/// Wait until `target` reaches `state`, reporting a missing element as such
pub(crate) async fn require(
    scope: &ExecutionScope,
    target: &Target,
    state: ElementState,
) -> Result<()> {
    let what = format!("{} to be {}", target, state);
    let timeout = scope.settings().explicit_wait;
    match wait_until(scope, timeout, &what, || probe(scope, target, state)).await {
        Err(Error::Timeout { .. }) if state == ElementState::Present => {
            Err(DriverError::ElementNotFound(target.to_string()).into())
        }
        Err(Error::Timeout { .. }) => {
            Err(DriverError::NotInteractable(format!("{} is not {}", target, state)).into())
        }
        other => other,
    }
}

fn timeout_or_default(scope: &ExecutionScope, timeout: Option<u64>) -> Duration {
    timeout
        .map(Duration::from_secs)
        .unwrap_or(scope.settings().explicit_wait)
}

/// WAIT: block until the element reaches the requested state
pub(crate) async fn wait(
    scope: &ExecutionScope,
    target: &Target,
    state: ElementState,
    timeout: Option<u64>,
) -> Result<()> {
    let timeout = timeout_or_default(scope, timeout);
    let what = format!("{} to be {}", target, state);
    wait_until(scope, timeout, &what, || probe(scope, target, state)).await
}

/// CONDITION: assert that the element state matches `expected`
pub(crate) async fn condition(
    scope: &ExecutionScope,
    target: &Target,
    state: ElementState,
    expected: bool,
    timeout: Option<u64>,
) -> Result<()> {
    let timeout = timeout_or_default(scope, timeout);
    let what = format!("{} {} to be {}", target, state, expected);
    let check = move || async move {
        match probe(scope, target, state).await {
            Ok(actual) => Ok(actual == expected),
            // An absent element is neither visible, clickable nor selected
            Err(Error::Driver(DriverError::ElementNotFound(_))) => Ok(!expected),
            Err(e) => Err(e),
        }
    };
    match wait_until(scope, timeout, &what, check).await {
        Err(Error::Timeout { .. }) => Err(Error::Assertion(format!(
            "Expected {} to be {} for {} but was {}",
            state, expected, target, !expected
        ))),
        other => other,
    }
}
