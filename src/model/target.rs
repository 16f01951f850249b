//! Element locators

use serde::{Deserialize, Serialize};
use std::fmt;

/// Locator strategies understood by browser drivers
pub const LOCATOR_STRATEGIES: &[&str] = &[
    "id",
    "name",
    "css",
    "xpath",
    "className",
    "tagName",
    "linkText",
    "partialLinkText",
];

/// Opaque element locator `{by, value}`
///
/// The engine passes targets through to the driver untouched; only the
/// validation chain looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Locator strategy, e.g. `id` or `css`
    pub by: String,
    /// Strategy-specific selector
    pub value: String,
}

impl Target {
    pub fn new(by: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            by: by.into(),
            value: value.into(),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new("id", value)
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::new("name", value)
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new("css", value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new("xpath", value)
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new("className", value)
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new("linkText", value)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.by, self.value)
    }
}
