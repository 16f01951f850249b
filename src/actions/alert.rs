//! JavaScript alert handling

use std::time::Duration;

use super::waiting::wait_until;
use crate::common::Result;
use crate::driver::BrowserOp;
use crate::execution::ExecutionScope;

async fn alert_present(scope: &ExecutionScope) -> Result<bool> {
    Ok(scope.perform(BrowserOp::AlertPresent).await?.into_flag()?)
}

async fn await_alert(scope: &ExecutionScope, timeout: Option<u64>) -> Result<()> {
    if let Some(secs) = timeout {
        wait_until(scope, Duration::from_secs(secs), "alert", || alert_present(scope)).await?;
    }
    Ok(())
}

pub(crate) async fn accept(scope: &ExecutionScope, timeout: Option<u64>) -> Result<()> {
    await_alert(scope, timeout).await?;
    scope.perform(BrowserOp::AcceptAlert).await?;
    Ok(())
}

pub(crate) async fn dismiss(scope: &ExecutionScope, timeout: Option<u64>) -> Result<()> {
    await_alert(scope, timeout).await?;
    scope.perform(BrowserOp::DismissAlert).await?;
    Ok(())
}

pub(crate) async fn send_value(scope: &ExecutionScope, value: &str) -> Result<()> {
    scope
        .perform(BrowserOp::SendKeysToAlert {
            text: value.to_string(),
        })
        .await?;
    Ok(())
}
