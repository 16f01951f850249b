//! Step structure checks

use super::{TargetValidator, ValidationResult, Validator};
use crate::model::{Action, Step, Target};

/// Required fields per action kind
#[derive(Debug, Clone, Copy, Default)]
pub struct StepStructureValidator;

impl StepStructureValidator {
    const NAME: &'static str = "StepStructureValidator";

    fn fail(&self, step: &Step, reason: impl std::fmt::Display) -> ValidationResult {
        ValidationResult::failure(Self::NAME, format!("{}: {}", step.kind(), reason))
    }

    fn check_target(&self, step: &Step, target: &Target) -> Option<ValidationResult> {
        if target.by.trim().is_empty() {
            return Some(self.fail(step, "target locator type cannot be empty"));
        }
        if target.value.trim().is_empty() {
            return Some(self.fail(step, "target locator value cannot be empty"));
        }
        None
    }
}

/// Longest wait a step may request, in seconds
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

fn timeout_problem(secs: u64) -> Option<String> {
    if secs == 0 {
        Some("timeout must be greater than 0".to_string())
    } else if secs > MAX_TIMEOUT_SECS {
        Some(format!("timeout must not exceed {} seconds", MAX_TIMEOUT_SECS))
    } else {
        None
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl Validator<Step> for StepStructureValidator {
    fn validate(&self, step: &Step) -> ValidationResult {
        for target in step.targets() {
            if let Some(failure) = self.check_target(step, target) {
                return failure;
            }
        }

        let failure = match &step.action {
            Action::Navigate { url } => {
                let url = url.trim();
                if url.is_empty() {
                    Some("url cannot be empty".to_string())
                } else if !["http://", "https://", "file://"]
                    .iter()
                    .any(|scheme| url.starts_with(scheme))
                {
                    Some(format!("url must use http, https or file scheme: {}", url))
                } else {
                    None
                }
            }
            Action::SendValue { value, .. }
            | Action::SelectOption { value, .. }
            | Action::SendValueToAlert { value } => {
                value.is_empty().then(|| "value cannot be empty".to_string())
            }
            Action::ExecuteScript { script, .. } => {
                script.trim().is_empty().then(|| "script cannot be empty".to_string())
            }
            Action::WaitForJs {
                script, timeout, ..
            } => {
                if script.trim().is_empty() {
                    Some("script cannot be empty".to_string())
                } else {
                    timeout_problem(*timeout)
                }
            }
            Action::ScrollTo { target, x, y } => (target.is_none() && x.is_none() && y.is_none())
                .then(|| "either a target or x/y coordinates are required".to_string()),
            Action::SwitchToWindow {
                window_handle,
                window_title_or_url,
            } => (!has_text(window_handle) && !has_text(window_title_or_url))
                .then(|| "window_handle or window_title_or_url is required".to_string()),
            Action::AcceptAlert { timeout }
            | Action::DismissAlert { timeout }
            | Action::Wait { timeout, .. }
            | Action::Condition { timeout, .. } => timeout.and_then(timeout_problem),
            _ => None,
        };

        if let Some(reason) = failure {
            return self.fail(step, reason);
        }

        if !has_text(&step.name) {
            return ValidationResult::warning(
                Self::NAME,
                format!(
                    "{} step has no name; consider a descriptive name for reporting",
                    step.kind()
                ),
            );
        }
        ValidationResult::success()
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Validates that a step carries the fields its action requires"
    }
}

/// Applies a [`TargetValidator`] to every locator a step carries
#[derive(Debug, Clone, Copy, Default)]
pub struct StepTargetsValidator {
    targets: TargetValidator,
}

impl Validator<Step> for StepTargetsValidator {
    fn validate(&self, step: &Step) -> ValidationResult {
        step.targets()
            .into_iter()
            .map(|target| {
                let mut result = self.targets.validate(target);
                result.errors = result
                    .errors
                    .into_iter()
                    .map(|e| format!("{} ({}): {}", step.kind(), target, e))
                    .collect();
                result
            })
            .fold(ValidationResult::success(), ValidationResult::merge)
    }

    fn name(&self) -> &str {
        "StepTargetsValidator"
    }

    fn description(&self) -> &str {
        "Validates every locator carried by a step"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementState;

    fn check(action: Action) -> ValidationResult {
        StepStructureValidator.validate(&Step::named("step", action))
    }

    #[test]
    fn test_required_fields() {
        assert!(check(Action::Navigate { url: "https://example.com".into() }).valid);
        assert!(check(Action::Navigate { url: "file:///tmp/a.html".into() }).valid);
        assert!(check(Action::Navigate { url: "".into() }).is_invalid());
        assert!(check(Action::Navigate { url: "ftp://host".into() }).is_invalid());
        assert!(check(Action::SendValue { target: Target::id("q"), value: "".into() }).is_invalid());
        assert!(check(Action::SendValueToAlert { value: "".into() }).is_invalid());
        assert!(check(Action::ExecuteScript { script: " ".into(), arguments: vec![] }).is_invalid());
        assert!(check(Action::ScrollTo { target: None, x: None, y: None }).is_invalid());
        assert!(check(Action::ScrollTo { target: None, x: Some(0), y: Some(200) }).valid);
        assert!(check(Action::SwitchToWindow {
            window_handle: None,
            window_title_or_url: Some(" ".into())
        })
        .is_invalid());
        assert!(check(Action::AcceptAlert { timeout: Some(0) }).is_invalid());
        assert!(check(Action::Click { target: Target::new("id", "") }).is_invalid());
    }

    #[test]
    fn test_timeout_bounds() {
        let wait = |timeout| Action::Wait {
            target: Target::id("modal"),
            wait_type: ElementState::Visible,
            timeout,
        };
        assert!(check(wait(None)).valid);
        assert!(check(wait(Some(MAX_TIMEOUT_SECS))).valid);
        assert!(check(wait(Some(MAX_TIMEOUT_SECS + 1))).is_invalid());
        assert!(check(wait(Some(u64::MAX))).is_invalid());
        assert!(check(Action::DismissAlert { timeout: Some(u64::MAX) }).is_invalid());

        let result = check(Action::WaitForJs {
            script: "return true".into(),
            timeout: u64::MAX,
            arguments: vec![],
        });
        assert!(result.errors[0].contains("must not exceed"));
    }

    #[test]
    fn test_failure_names_kind() {
        let result = check(Action::Navigate { url: "".into() });
        assert_eq!(result.handler.as_deref(), Some("StepStructureValidator"));
        assert!(result.errors[0].starts_with("NAVIGATE: "));
    }

    #[test]
    fn test_unnamed_step_warns() {
        let result = StepStructureValidator.validate(&Step::new(Action::RefreshWindow));
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_targets_of_drag_and_drop() {
        let step = Step::named(
            "drag",
            Action::DragAndDrop {
                source: Target::css("//li"),
                destination: Target::id("#bin"),
            },
        );
        let result = StepTargetsValidator::default().validate(&step);
        assert!(result.is_invalid());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("css=//li"));
        assert_eq!(result.warnings.len(), 1);
    }
}
