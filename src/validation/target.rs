//! Locator lint checks

use super::{ValidationResult, Validator};
use crate::model::{Target, LOCATOR_STRATEGIES};

const NAME: &str = "TargetValidator";

/// Known strategy, non-empty value, and per-strategy syntax checks
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetValidator;

impl Validator<Target> for TargetValidator {
    fn validate(&self, target: &Target) -> ValidationResult {
        let by = target.by.trim();
        if by.is_empty() {
            return ValidationResult::failure(NAME, "Target locator type cannot be empty");
        }
        if !LOCATOR_STRATEGIES.contains(&by) {
            return ValidationResult::failure(
                NAME,
                format!(
                    "Invalid locator type: '{}'. Valid types: {}",
                    by,
                    LOCATOR_STRATEGIES.join(", ")
                ),
            );
        }
        let value = target.value.as_str();
        if value.trim().is_empty() {
            return ValidationResult::failure(
                NAME,
                format!("Target locator value cannot be empty for type: {}", by),
            );
        }

        match by {
            "id" => check_id(value),
            "css" => check_css(value),
            "xpath" => check_xpath(value),
            "className" => check_class_name(value),
            "tagName" => check_tag_name(value),
            "linkText" | "partialLinkText" => check_link_text(value),
            _ => ValidationResult::success(),
        }
    }

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Validates locator strategies and selector syntax"
    }
}

fn check_id(id: &str) -> ValidationResult {
    if id.contains(' ') {
        return ValidationResult::failure(NAME, format!("ID locator should not contain spaces: {}", id));
    }
    if id.starts_with('#') {
        return ValidationResult::warning(
            NAME,
            "ID locator starts with '#', which looks like a CSS selector",
        );
    }
    ValidationResult::success()
}

fn check_css(css: &str) -> ValidationResult {
    if css.starts_with("//") {
        return ValidationResult::failure(
            NAME,
            "CSS selector starts with '//', which looks like XPath syntax",
        );
    }
    if css.contains("text()") || css.contains("contains(") {
        return ValidationResult::failure(
            NAME,
            "CSS selector contains XPath functions; use the xpath locator type instead",
        );
    }
    ValidationResult::success()
}

fn check_xpath(xpath: &str) -> ValidationResult {
    if !(xpath.starts_with('/') || xpath.starts_with('(')) {
        return ValidationResult::warning(
            NAME,
            "XPath does not start with '//' or '/' and might not be a valid expression",
        );
    }
    if xpath.contains('#') && !xpath.contains("[@id=") {
        return ValidationResult::warning(NAME, "XPath contains '#', which looks like CSS syntax");
    }
    ValidationResult::success()
}

fn check_class_name(class: &str) -> ValidationResult {
    if class.contains(' ') {
        return ValidationResult::failure(
            NAME,
            format!("Class name locator should contain a single class name: {}", class),
        );
    }
    if class.starts_with('.') {
        return ValidationResult::warning(
            NAME,
            "Class name starts with '.', which looks like a CSS selector",
        );
    }
    ValidationResult::success()
}

fn check_tag_name(tag: &str) -> ValidationResult {
    if tag.contains([' ', '.', '#']) {
        return ValidationResult::failure(
            NAME,
            format!("Tag name should be a simple HTML tag name: {}", tag),
        );
    }
    if tag.to_lowercase() != tag {
        return ValidationResult::warning(NAME, "Tag name contains uppercase letters");
    }
    ValidationResult::success()
}

fn check_link_text(text: &str) -> ValidationResult {
    if text.starts_with("//") || text.contains("[@") {
        return ValidationResult::warning(
            NAME,
            "Link text looks like XPath; consider the xpath locator type",
        );
    }
    ValidationResult::success()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(by: &str, value: &str) -> ValidationResult {
        TargetValidator.validate(&Target::new(by, value))
    }

    #[test]
    fn test_unknown_or_empty_locator() {
        assert!(check("label", "x").is_invalid());
        assert!(check("", "x").is_invalid());
        assert!(check("id", "  ").is_invalid());
        assert!(check("name", "q").valid);
    }

    #[test]
    fn test_lint_errors() {
        assert!(check("id", "first name").is_invalid());
        assert!(check("css", "//div").is_invalid());
        assert!(check("css", "a:contains(x)").is_invalid());
        assert!(check("className", "btn primary").is_invalid());
        assert!(check("tagName", "div.card").is_invalid());
    }

    #[test]
    fn test_lint_warnings() {
        for (by, value) in [
            ("id", "#submit"),
            ("xpath", "div/span"),
            ("xpath", "//div#main"),
            ("className", ".btn"),
            ("tagName", "DIV"),
            ("linkText", "//a[@href]"),
        ] {
            let result = check(by, value);
            assert!(result.valid, "{} {} should be valid", by, value);
            assert_eq!(result.warnings.len(), 1, "{} {} should warn", by, value);
        }
        assert!(check("xpath", "//div[@id='main']").warnings.is_empty());
        assert!(check("css", "#submit").warnings.is_empty());
    }
}
