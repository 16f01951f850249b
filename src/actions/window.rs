//! Window and history operations

use crate::common::Result;
use crate::driver::BrowserOp;
use crate::execution::ExecutionScope;

/// Switch by handle, else by title or URL fragment, else to the other window
pub(crate) async fn switch_to_window(
    scope: &ExecutionScope,
    handle: Option<&str>,
    title_or_url: Option<&str>,
) -> Result<()> {
    scope
        .perform(BrowserOp::SwitchToWindow {
            handle: handle.map(str::to_string),
            title_or_url: title_or_url.map(str::to_string),
        })
        .await?;
    Ok(())
}

pub(crate) async fn close(scope: &ExecutionScope) -> Result<()> {
    scope.perform(BrowserOp::CloseWindow).await?;
    Ok(())
}

pub(crate) async fn back(scope: &ExecutionScope) -> Result<()> {
    scope.perform(BrowserOp::Back).await?;
    Ok(())
}

pub(crate) async fn forward(scope: &ExecutionScope) -> Result<()> {
    scope.perform(BrowserOp::Forward).await?;
    Ok(())
}

pub(crate) async fn refresh(scope: &ExecutionScope) -> Result<()> {
    scope.perform(BrowserOp::Refresh).await?;
    Ok(())
}
