//! Browser driver capability
//!
//! The engine never constructs or configures a browser. It talks to an opaque
//! [`Driver`] through a single primitive, [`Driver::perform`], which carries
//! out one locator-based or global browser operation. Sessions are created
//! per scenario by a [`DriverFactory`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::common::{DriverError, Result};
use crate::model::{ElementState, Scenario, Target};

/// One browser-level operation
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserOp {
    CurrentUrl,
    Navigate { url: String },
    Back,
    Forward,
    Refresh,

    Click { target: Target },
    DoubleClick { target: Target },
    RightClick { target: Target },
    Hover { target: Target },
    DragAndDrop { source: Target, destination: Target },
    Clear { target: Target },
    SendKeys { target: Target, text: String },
    SelectOption { target: Target, value: String },
    ReadText { target: Target },
    /// Check an element state without failing when the element is absent
    Probe { target: Target, state: ElementState },

    ScrollToElement { target: Target },
    ScrollBy { x: i64, y: i64 },
    ExecuteScript {
        script: String,
        arguments: Vec<serde_json::Value>,
    },
    /// PNG capture of the current viewport
    Screenshot,

    SwitchToWindow {
        handle: Option<String>,
        title_or_url: Option<String>,
    },
    CloseWindow,

    AlertPresent,
    AcceptAlert,
    DismissAlert,
    SendKeysToAlert { text: String },
}

impl BrowserOp {
    /// Short operation name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::CurrentUrl => "current_url",
            Self::Navigate { .. } => "navigate",
            Self::Back => "back",
            Self::Forward => "forward",
            Self::Refresh => "refresh",
            Self::Click { .. } => "click",
            Self::DoubleClick { .. } => "double_click",
            Self::RightClick { .. } => "right_click",
            Self::Hover { .. } => "hover",
            Self::DragAndDrop { .. } => "drag_and_drop",
            Self::Clear { .. } => "clear",
            Self::SendKeys { .. } => "send_keys",
            Self::SelectOption { .. } => "select_option",
            Self::ReadText { .. } => "read_text",
            Self::Probe { .. } => "probe",
            Self::ScrollToElement { .. } => "scroll_to_element",
            Self::ScrollBy { .. } => "scroll_by",
            Self::ExecuteScript { .. } => "execute_script",
            Self::Screenshot => "screenshot",
            Self::SwitchToWindow { .. } => "switch_to_window",
            Self::CloseWindow => "close_window",
            Self::AlertPresent => "alert_present",
            Self::AcceptAlert => "accept_alert",
            Self::DismissAlert => "dismiss_alert",
            Self::SendKeysToAlert { .. } => "send_keys_to_alert",
        }
    }
}

/// Result of a browser operation
#[derive(Debug, Clone, PartialEq)]
pub enum OpOutput {
    Done,
    Text(String),
    Flag(bool),
    Value(serde_json::Value),
    Bytes(Vec<u8>),
}

impl OpOutput {
    pub fn into_text(self) -> std::result::Result<String, DriverError> {
        match self {
            Self::Text(s) => Ok(s),
            other => Err(unexpected("text", &other)),
        }
    }

    pub fn into_flag(self) -> std::result::Result<bool, DriverError> {
        match self {
            Self::Flag(b) => Ok(b),
            other => Err(unexpected("flag", &other)),
        }
    }

    /// Script results; `Done` reads as JSON null
    pub fn into_value(self) -> std::result::Result<serde_json::Value, DriverError> {
        match self {
            Self::Value(v) => Ok(v),
            Self::Done => Ok(serde_json::Value::Null),
            other => Err(unexpected("value", &other)),
        }
    }

    pub fn into_bytes(self) -> std::result::Result<Vec<u8>, DriverError> {
        match self {
            Self::Bytes(b) => Ok(b),
            other => Err(unexpected("bytes", &other)),
        }
    }
}

fn unexpected(wanted: &str, got: &OpOutput) -> DriverError {
    DriverError::Other(format!("expected {} output, got {:?}", wanted, got))
}

/// A controllable browser session
#[async_trait]
pub trait Driver: Send + Sync {
    /// Perform one browser operation
    async fn perform(&self, op: BrowserOp) -> std::result::Result<OpOutput, DriverError>;

    /// Driver name for logs
    fn name(&self) -> &str {
        "driver"
    }
}

/// Shared handle to a driver session
pub type DriverHandle = Arc<dyn Driver>;

/// Creates one isolated driver session per scenario
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn create(&self, scenario: &Scenario) -> Result<DriverHandle>;

    /// Release a session after its scenario finished
    async fn dispose(&self, _driver: DriverHandle) -> Result<()> {
        Ok(())
    }
}

/// Extra helpers on top of [`Driver::perform`]
#[async_trait]
pub trait DriverExt {
    async fn current_url(&self) -> std::result::Result<String, DriverError>;
    async fn read_text(&self, target: &Target) -> std::result::Result<String, DriverError>;
    async fn probe(
        &self,
        target: &Target,
        state: ElementState,
    ) -> std::result::Result<bool, DriverError>;
}

#[async_trait]
impl<D: Driver + ?Sized> DriverExt for D {
    async fn current_url(&self) -> std::result::Result<String, DriverError> {
        self.perform(BrowserOp::CurrentUrl).await?.into_text()
    }

    async fn read_text(&self, target: &Target) -> std::result::Result<String, DriverError> {
        self.perform(BrowserOp::ReadText {
            target: target.clone(),
        })
        .await?
        .into_text()
    }

    async fn probe(
        &self,
        target: &Target,
        state: ElementState,
    ) -> std::result::Result<bool, DriverError> {
        self.perform(BrowserOp::Probe {
            target: target.clone(),
            state,
        })
        .await?
        .into_flag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_accessors() {
        assert_eq!(OpOutput::Text("a".into()).into_text().unwrap(), "a");
        assert!(OpOutput::Flag(true).into_flag().unwrap());
        assert_eq!(OpOutput::Done.into_value().unwrap(), serde_json::Value::Null);
        assert!(matches!(
            OpOutput::Done.into_text(),
            Err(DriverError::Other(_))
        ));
    }
}
