//! Action registry
//!
//! [`dispatch`] is the total mapping from action kind to executor. Each
//! executor performs one browser-level side effect, optionally after a
//! bounded wait for its precondition. Retry and continue decisions belong to
//! the strategy layer, never to an executor.

mod alert;
mod basic;
mod browser;
mod mouse;
mod waiting;
mod window;

use crate::common::Result;
use crate::execution::ExecutionScope;
use crate::model::{Action, ActionKind, Step};

/// Execute one step against the scope's driver
pub async fn dispatch(step: &Step, scope: &ExecutionScope) -> Result<()> {
    scope.check_cancelled()?;
    tracing::debug!(action = %step.kind(), step = step.display_name(), "Dispatching");

    match &step.action {
        Action::Navigate { url } => basic::navigate(scope, url).await,
        Action::Click { target } => basic::click(scope, target).await,
        Action::SendValue { target, value } => basic::send_value(scope, target, value).await,
        Action::SelectOption { target, value } => {
            basic::select_option(scope, target, value).await
        }
        Action::AssertText { target, value } => basic::assert_text(scope, target, value).await,
        Action::Screenshot { file_name } => {
            let name = file_name.as_deref().or(step.name.as_deref());
            basic::screenshot(scope, name).await.map(|_| ())
        }
        Action::Clear { target } => basic::clear(scope, target).await,

        Action::ExecuteScript { script, arguments } => {
            browser::execute_script(scope, script, arguments).await.map(|_| ())
        }
        Action::ScrollTo { target, x, y } => {
            browser::scroll_to(scope, target.as_ref(), *x, *y).await
        }
        Action::WaitForJs {
            script,
            timeout,
            arguments,
        } => browser::wait_for_js(scope, script, *timeout, arguments).await,

        Action::SwitchToWindow {
            window_handle,
            window_title_or_url,
        } => {
            window::switch_to_window(
                scope,
                window_handle.as_deref(),
                window_title_or_url.as_deref(),
            )
            .await
        }
        Action::CloseWindow => window::close(scope).await,
        Action::BackWindow => window::back(scope).await,
        Action::ForwardWindow => window::forward(scope).await,
        Action::RefreshWindow => window::refresh(scope).await,

        Action::AcceptAlert { timeout } => alert::accept(scope, *timeout).await,
        Action::DismissAlert { timeout } => alert::dismiss(scope, *timeout).await,
        Action::SendValueToAlert { value } => alert::send_value(scope, value).await,

        Action::Hover { target } => mouse::hover(scope, target).await,
        Action::RightClick { target } => mouse::right_click(scope, target).await,
        Action::DoubleClick { target } => mouse::double_click(scope, target).await,
        Action::DragAndDrop {
            source,
            destination,
        } => mouse::drag_and_drop(scope, source, destination).await,

        Action::Wait {
            target,
            wait_type,
            timeout,
        } => waiting::wait(scope, target, *wait_type, *timeout).await,
        Action::Condition {
            target,
            condition,
            value,
            timeout,
        } => waiting::condition(scope, target, *condition, *value, *timeout).await,
    }
}

/// Fields a step of this kind must carry (optional ones in brackets)
pub fn required_fields(kind: ActionKind) -> &'static [&'static str] {
    match kind {
        ActionKind::Navigate => &["url"],
        ActionKind::Click
        | ActionKind::Clear
        | ActionKind::Hover
        | ActionKind::RightClick
        | ActionKind::DoubleClick => &["target"],
        ActionKind::SendValue | ActionKind::SelectOption | ActionKind::AssertText => {
            &["target", "value"]
        }
        ActionKind::Screenshot => &["[file_name]"],
        ActionKind::ExecuteScript => &["script", "[arguments]"],
        ActionKind::ScrollTo => &["target | x,y"],
        ActionKind::WaitForJs => &["script", "[timeout]", "[arguments]"],
        ActionKind::SwitchToWindow => &["window_handle | window_title_or_url"],
        ActionKind::CloseWindow
        | ActionKind::BackWindow
        | ActionKind::ForwardWindow
        | ActionKind::RefreshWindow => &[],
        ActionKind::AcceptAlert | ActionKind::DismissAlert => &["[timeout]"],
        ActionKind::SendValueToAlert => &["value"],
        ActionKind::DragAndDrop => &["source", "destination"],
        ActionKind::Wait => &["target", "[wait_type]", "[timeout]"],
        ActionKind::Condition => &["target", "type", "value", "[timeout]"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{DriverError, Error};
    use crate::driver::{BrowserOp, Driver, OpOutput};
    use crate::events::EventPublisher;
    use crate::execution::ActionSettings;
    use crate::model::{ElementState, Target};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Records operations; every element is present, visible and clickable
    #[derive(Default)]
    struct Journal {
        ops: Mutex<Vec<BrowserOp>>,
        text: String,
    }

    #[async_trait]
    impl Driver for Journal {
        async fn perform(&self, op: BrowserOp) -> std::result::Result<OpOutput, DriverError> {
            let out = match &op {
                BrowserOp::Probe { state, .. } => OpOutput::Flag(*state != ElementState::Selected),
                BrowserOp::ReadText { .. } => OpOutput::Text(self.text.clone()),
                BrowserOp::Screenshot => OpOutput::Bytes(vec![0x89, b'P', b'N', b'G']),
                BrowserOp::ExecuteScript { .. } => OpOutput::Value(serde_json::json!(true)),
                BrowserOp::AlertPresent => OpOutput::Flag(true),
                _ => OpOutput::Done,
            };
            self.ops.lock().unwrap().push(op);
            Ok(out)
        }
    }

    impl Journal {
        fn actions(&self) -> Vec<&'static str> {
            self.ops
                .lock()
                .unwrap()
                .iter()
                .filter(|op| !matches!(op, BrowserOp::Probe { .. } | BrowserOp::AlertPresent))
                .map(|op| op.name())
                .collect()
        }
    }

    fn scope(driver: Arc<Journal>, dir: &std::path::Path) -> ExecutionScope {
        ExecutionScope::new(driver, EventPublisher::new()).with_settings(ActionSettings {
            explicit_wait: Duration::from_millis(100),
            poll_interval: Duration::from_millis(5),
            screenshot_dir: dir.to_path_buf(),
        })
    }

    fn sample(kind: ActionKind) -> Step {
        let t = || Target::id("field");
        let action = match kind {
            ActionKind::Navigate => Action::Navigate { url: "https://example.com".into() },
            ActionKind::Click => Action::Click { target: t() },
            ActionKind::SendValue => Action::SendValue { target: t(), value: "v".into() },
            ActionKind::SelectOption => Action::SelectOption { target: t(), value: "v".into() },
            ActionKind::AssertText => Action::AssertText { target: t(), value: "Hello".into() },
            ActionKind::Screenshot => Action::Screenshot { file_name: Some("shot".into()) },
            ActionKind::Clear => Action::Clear { target: t() },
            ActionKind::ExecuteScript => Action::ExecuteScript {
                script: "return 1".into(),
                arguments: vec![],
            },
            ActionKind::ScrollTo => Action::ScrollTo { target: None, x: Some(0), y: Some(400) },
            ActionKind::WaitForJs => Action::WaitForJs {
                script: "return ready".into(),
                timeout: 1,
                arguments: vec![],
            },
            ActionKind::SwitchToWindow => Action::SwitchToWindow {
                window_handle: Some("w2".into()),
                window_title_or_url: None,
            },
            ActionKind::CloseWindow => Action::CloseWindow,
            ActionKind::BackWindow => Action::BackWindow,
            ActionKind::ForwardWindow => Action::ForwardWindow,
            ActionKind::RefreshWindow => Action::RefreshWindow,
            ActionKind::AcceptAlert => Action::AcceptAlert { timeout: Some(1) },
            ActionKind::DismissAlert => Action::DismissAlert { timeout: None },
            ActionKind::SendValueToAlert => Action::SendValueToAlert { value: "ok".into() },
            ActionKind::Hover => Action::Hover { target: t() },
            ActionKind::RightClick => Action::RightClick { target: t() },
            ActionKind::DoubleClick => Action::DoubleClick { target: t() },
            ActionKind::DragAndDrop => Action::DragAndDrop {
                source: t(),
                destination: Target::id("bin"),
            },
            ActionKind::Wait => Action::Wait {
                target: t(),
                wait_type: ElementState::Visible,
                timeout: Some(1),
            },
            ActionKind::Condition => Action::Condition {
                target: t(),
                condition: ElementState::Visible,
                value: true,
                timeout: Some(1),
            },
        };
        Step::new(action)
    }

    #[tokio::test]
    async fn test_every_kind_dispatches() {
        let dir = tempfile::tempdir().unwrap();
        for kind in ActionKind::ALL {
            let driver = Arc::new(Journal {
                text: "Hello world".into(),
                ..Default::default()
            });
            let scope = scope(driver.clone(), dir.path());
            let step = sample(kind);
            assert_eq!(step.kind(), kind);
            dispatch(&step, &scope)
                .await
                .unwrap_or_else(|e| panic!("{} failed: {}", kind, e));
        }
    }

    #[tokio::test]
    async fn test_one_side_effect_per_step() {
        let dir = tempfile::tempdir().unwrap();
        let driver = Arc::new(Journal::default());
        let scope = scope(driver.clone(), dir.path());
        dispatch(&sample(ActionKind::Click), &scope).await.unwrap();
        dispatch(&sample(ActionKind::DragAndDrop), &scope).await.unwrap();
        dispatch(&sample(ActionKind::BackWindow), &scope).await.unwrap();
        assert_eq!(driver.actions(), vec!["click", "drag_and_drop", "back"]);
    }

    #[tokio::test]
    async fn test_assert_text_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let driver = Arc::new(Journal {
            text: "Goodbye".into(),
            ..Default::default()
        });
        let err = dispatch(&sample(ActionKind::AssertText), &scope(driver, dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Assertion(_)));
        assert!(err.to_string().contains("but found: Goodbye"));
    }

    #[tokio::test]
    async fn test_screenshot_written_to_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let shots = dir.path().join("shots");
        let driver = Arc::new(Journal::default());
        dispatch(&sample(ActionKind::Screenshot), &scope(driver, &shots))
            .await
            .unwrap();
        let files: Vec<_> = std::fs::read_dir(&shots).unwrap().collect();
        assert_eq!(files.len(), 1);
        let name = files[0].as_ref().unwrap().file_name();
        let name = name.to_string_lossy();
        assert!(name.starts_with("shot_") && name.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_cancelled_scope_never_reaches_driver() {
        let dir = tempfile::tempdir().unwrap();
        let driver = Arc::new(Journal::default());
        let scope = scope(driver.clone(), dir.path());
        scope.cancel_token().cancel();
        let err = dispatch(&sample(ActionKind::Navigate), &scope).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(driver.ops.lock().unwrap().is_empty());
    }

    #[test]
    fn test_required_fields_cover_every_kind() {
        assert_eq!(required_fields(ActionKind::Navigate), &["url"]);
        assert!(required_fields(ActionKind::CloseWindow).is_empty());
        for kind in ActionKind::ALL {
            let _ = required_fields(kind);
        }
    }
}
