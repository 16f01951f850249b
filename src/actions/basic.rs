//! Navigation, typing, selection, assertions and screenshots

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use super::waiting::require;
use crate::common::{Error, Result};
use crate::driver::BrowserOp;
use crate::execution::ExecutionScope;
use crate::model::{ElementState, Target};

pub(crate) async fn navigate(scope: &ExecutionScope, url: &str) -> Result<()> {
    scope
        .perform(BrowserOp::Navigate {
            url: url.to_string(),
        })
        .await?;
    Ok(())
}

pub(crate) async fn click(scope: &ExecutionScope, target: &Target) -> Result<()> {
    require(scope, target, ElementState::Clickable).await?;
    scope
        .perform(BrowserOp::Click {
            target: target.clone(),
        })
        .await?;
    Ok(())
}

pub(crate) async fn send_value(scope: &ExecutionScope, target: &Target, value: &str) -> Result<()> {
    require(scope, target, ElementState::Visible).await?;
    scope
        .perform(BrowserOp::SendKeys {
            target: target.clone(),
            text: value.to_string(),
        })
        .await?;
    Ok(())
}

pub(crate) async fn select_option(
    scope: &ExecutionScope,
    target: &Target,
    value: &str,
) -> Result<()> {
    require(scope, target, ElementState::Visible).await?;
    scope
        .perform(BrowserOp::SelectOption {
            target: target.clone(),
            value: value.to_string(),
        })
        .await?;
    Ok(())
}

pub(crate) async fn clear(scope: &ExecutionScope, target: &Target) -> Result<()> {
    require(scope, target, ElementState::Visible).await?;
    scope
        .perform(BrowserOp::Clear {
            target: target.clone(),
        })
        .await?;
    Ok(())
}

/// Passes when the element text contains `expected`
pub(crate) async fn assert_text(
    scope: &ExecutionScope,
    target: &Target,
    expected: &str,
) -> Result<()> {
    require(scope, target, ElementState::Present).await?;
    let actual = scope
        .perform(BrowserOp::ReadText {
            target: target.clone(),
        })
        .await?
        .into_text()?;
    if actual.contains(expected) {
        Ok(())
    } else {
        Err(Error::Assertion(format!(
            "Expected text: {}, but found: {}",
            expected, actual
        )))
    }
}

/// Capture the viewport into the configured screenshot directory
pub(crate) async fn screenshot(scope: &ExecutionScope, name: Option<&str>) -> Result<PathBuf> {
    let bytes = scope.perform(BrowserOp::Screenshot).await?.into_bytes()?;

    let dir = &scope.settings().screenshot_dir;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(screenshot_file_name(name, unix_millis()));
    tokio::fs::write(&path, bytes).await?;

    tracing::info!(path = %path.display(), "Screenshot saved");
    Ok(path)
}

fn screenshot_file_name(name: Option<&str>, millis: u128) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => {
            let sanitized: String = name
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect();
            format!("{}_{}.png", sanitized, millis)
        }
        None => format!("screenshot_{}.png", millis),
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screenshot_file_name_is_sanitized() {
        assert_eq!(
            screenshot_file_name(Some(" login page/final "), 42),
            "login_page_final_42.png"
        );
        assert_eq!(screenshot_file_name(None, 7), "screenshot_7.png");
        assert_eq!(screenshot_file_name(Some("  "), 7), "screenshot_7.png");
    }
}
