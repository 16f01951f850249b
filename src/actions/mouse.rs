//! Pointer interactions

use super::waiting::require;
use crate::common::Result;
use crate::driver::BrowserOp;
use crate::execution::ExecutionScope;
use crate::model::{ElementState, Target};

pub(crate) async fn hover(scope: &ExecutionScope, target: &Target) -> Result<()> {
    require(scope, target, ElementState::Visible).await?;
    scope
        .perform(BrowserOp::Hover {
            target: target.clone(),
        })
        .await?;
    Ok(())
}

pub(crate) async fn right_click(scope: &ExecutionScope, target: &Target) -> Result<()> {
    require(scope, target, ElementState::Clickable).await?;
    scope
        .perform(BrowserOp::RightClick {
            target: target.clone(),
        })
        .await?;
    Ok(())
}

pub(crate) async fn double_click(scope: &ExecutionScope, target: &Target) -> Result<()> {
    require(scope, target, ElementState::Clickable).await?;
    scope
        .perform(BrowserOp::DoubleClick {
            target: target.clone(),
        })
        .await?;
    Ok(())
}

pub(crate) async fn drag_and_drop(
    scope: &ExecutionScope,
    source: &Target,
    destination: &Target,
) -> Result<()> {
    require(scope, source, ElementState::Visible).await?;
    require(scope, destination, ElementState::Visible).await?;
    scope
        .perform(BrowserOp::DragAndDrop {
            source: source.clone(),
            destination: destination.clone(),
        })
        .await?;
    Ok(())
}
