//! Script execution and scrolling

use std::time::Duration;

use serde_json::Value;

use super::waiting::{require, wait_until};
use crate::common::{Error, Result};
use crate::driver::BrowserOp;
use crate::execution::ExecutionScope;
use crate::model::{ElementState, Target};

pub(crate) async fn execute_script(
    scope: &ExecutionScope,
    script: &str,
    arguments: &[Value],
) -> Result<Value> {
    let value = scope
        .perform(BrowserOp::ExecuteScript {
            script: script.to_string(),
            arguments: arguments.to_vec(),
        })
        .await?
        .into_value()?;
    tracing::debug!(result = %value, "Script executed");
    Ok(value)
}

pub(crate) async fn scroll_to(
    scope: &ExecutionScope,
    target: Option<&Target>,
    x: Option<i64>,
    y: Option<i64>,
) -> Result<()> {
    let op = match (target, x, y) {
        (Some(target), _, _) => {
            require(scope, target, ElementState::Present).await?;
            BrowserOp::ScrollToElement {
                target: target.clone(),
            }
        }
        (None, None, None) => {
            return Err(Error::Config(
                "SCROLL_TO requires a target or coordinates".to_string(),
            ))
        }
        (None, x, y) => BrowserOp::ScrollBy {
            x: x.unwrap_or(0),
            y: y.unwrap_or(0),
        },
    };
    scope.perform(op).await?;
    Ok(())
}

/// Poll `script` until it returns a truthy value
pub(crate) async fn wait_for_js(
    scope: &ExecutionScope,
    script: &str,
    timeout_secs: u64,
    arguments: &[Value],
) -> Result<()> {
    let timeout = Duration::from_secs(timeout_secs);
    let what = format!("script to return true: {}", script);
    wait_until(scope, timeout, &what, move || async move {
        let value = execute_script(scope, script, arguments).await?;
        Ok::<bool, Error>(is_truthy(&value))
    })
    .await
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness_follows_javascript() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!("complete")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!({})));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
    }
}
