//! Step model
//!
//! A step is a tagged union keyed by the `action` field. The set of actions
//! is closed: every [`ActionKind`] has exactly one executor in
//! [`crate::actions`], and dispatch is an exhaustive match.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Target;
use crate::common::Error;

/// Name reported for steps without one
pub const UNNAMED_STEP: &str = "Unnamed Step";

/// One declarative unit of browser interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub action: Action,
}

/// Element states a bounded wait or condition can probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementState {
    #[default]
    Visible,
    Invisible,
    Present,
    Clickable,
    Selected,
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Visible => "visible",
            Self::Invisible => "invisible",
            Self::Present => "present",
            Self::Clickable => "clickable",
            Self::Selected => "selected",
        };
        f.write_str(s)
    }
}

fn default_js_timeout() -> u64 {
    10
}

/// Kind-specific step payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    // === Basic ===
    Navigate {
        url: String,
    },
    Click {
        target: Target,
    },
    SendValue {
        target: Target,
        value: String,
    },
    SelectOption {
        target: Target,
        value: String,
    },
    AssertText {
        target: Target,
        value: String,
    },
    Screenshot {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
    },
    Clear {
        target: Target,
    },

    // === Browser ===
    ExecuteScript {
        script: String,
        #[serde(default)]
        arguments: Vec<serde_json::Value>,
    },
    ScrollTo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<Target>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<i64>,
    },
    WaitForJs {
        script: String,
        /// Seconds
        #[serde(default = "default_js_timeout")]
        timeout: u64,
        #[serde(default)]
        arguments: Vec<serde_json::Value>,
    },

    // === Window ===
    SwitchToWindow {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        window_handle: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        window_title_or_url: Option<String>,
    },
    CloseWindow,
    BackWindow,
    ForwardWindow,
    RefreshWindow,

    // === Alert ===
    AcceptAlert {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout: Option<u64>,
    },
    DismissAlert {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout: Option<u64>,
    },
    SendValueToAlert {
        value: String,
    },

    // === Mouse ===
    Hover {
        target: Target,
    },
    RightClick {
        target: Target,
    },
    DoubleClick {
        target: Target,
    },
    DragAndDrop {
        source: Target,
        destination: Target,
    },

    // === Waiting ===
    Wait {
        target: Target,
        #[serde(default)]
        wait_type: ElementState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout: Option<u64>,
    },
    Condition {
        target: Target,
        #[serde(rename = "type")]
        condition: ElementState,
        value: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout: Option<u64>,
    },
}

/// Discriminator selecting a step's executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Navigate,
    Click,
    SendValue,
    SelectOption,
    AssertText,
    Screenshot,
    Clear,
    ExecuteScript,
    ScrollTo,
    WaitForJs,
    SwitchToWindow,
    CloseWindow,
    BackWindow,
    ForwardWindow,
    RefreshWindow,
    AcceptAlert,
    DismissAlert,
    SendValueToAlert,
    Hover,
    RightClick,
    DoubleClick,
    DragAndDrop,
    Wait,
    Condition,
}

/// Grouping of action kinds by the browser surface they touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCategory {
    Basic,
    Browser,
    Window,
    Alert,
    Mouse,
    Waiting,
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Basic => "basic",
            Self::Browser => "browser",
            Self::Window => "window",
            Self::Alert => "alert",
            Self::Mouse => "mouse",
            Self::Waiting => "waiting",
        };
        f.write_str(s)
    }
}

impl ActionKind {
    pub const ALL: [ActionKind; 24] = [
        Self::Navigate,
        Self::Click,
        Self::SendValue,
        Self::SelectOption,
        Self::AssertText,
        Self::Screenshot,
        Self::Clear,
        Self::ExecuteScript,
        Self::ScrollTo,
        Self::WaitForJs,
        Self::SwitchToWindow,
        Self::CloseWindow,
        Self::BackWindow,
        Self::ForwardWindow,
        Self::RefreshWindow,
        Self::AcceptAlert,
        Self::DismissAlert,
        Self::SendValueToAlert,
        Self::Hover,
        Self::RightClick,
        Self::DoubleClick,
        Self::DragAndDrop,
        Self::Wait,
        Self::Condition,
    ];

    /// Wire name used in scenario files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Navigate => "NAVIGATE",
            Self::Click => "CLICK",
            Self::SendValue => "SEND_VALUE",
            Self::SelectOption => "SELECT_OPTION",
            Self::AssertText => "ASSERT_TEXT",
            Self::Screenshot => "SCREENSHOT",
            Self::Clear => "CLEAR",
            Self::ExecuteScript => "EXECUTE_SCRIPT",
            Self::ScrollTo => "SCROLL_TO",
            Self::WaitForJs => "WAIT_FOR_JS",
            Self::SwitchToWindow => "SWITCH_TO_WINDOW",
            Self::CloseWindow => "CLOSE_WINDOW",
            Self::BackWindow => "BACK_WINDOW",
            Self::ForwardWindow => "FORWARD_WINDOW",
            Self::RefreshWindow => "REFRESH_WINDOW",
            Self::AcceptAlert => "ACCEPT_ALERT",
            Self::DismissAlert => "DISMISS_ALERT",
            Self::SendValueToAlert => "SEND_VALUE_TO_ALERT",
            Self::Hover => "HOVER",
            Self::RightClick => "RIGHT_CLICK",
            Self::DoubleClick => "DOUBLE_CLICK",
            Self::DragAndDrop => "DRAG_AND_DROP",
            Self::Wait => "WAIT",
            Self::Condition => "CONDITION",
        }
    }

    pub fn category(&self) -> ActionCategory {
        match self {
            Self::Navigate
            | Self::Click
            | Self::SendValue
            | Self::SelectOption
            | Self::AssertText
            | Self::Screenshot
            | Self::Clear => ActionCategory::Basic,
            Self::ExecuteScript | Self::ScrollTo | Self::WaitForJs => ActionCategory::Browser,
            Self::SwitchToWindow
            | Self::CloseWindow
            | Self::BackWindow
            | Self::ForwardWindow
            | Self::RefreshWindow => ActionCategory::Window,
            Self::AcceptAlert | Self::DismissAlert | Self::SendValueToAlert => {
                ActionCategory::Alert
            }
            Self::Hover | Self::RightClick | Self::DoubleClick | Self::DragAndDrop => {
                ActionCategory::Mouse
            }
            Self::Wait | Self::Condition => ActionCategory::Waiting,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| Error::UnknownAction(s.to_string()))
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Navigate { .. } => ActionKind::Navigate,
            Action::Click { .. } => ActionKind::Click,
            Action::SendValue { .. } => ActionKind::SendValue,
            Action::SelectOption { .. } => ActionKind::SelectOption,
            Action::AssertText { .. } => ActionKind::AssertText,
            Action::Screenshot { .. } => ActionKind::Screenshot,
            Action::Clear { .. } => ActionKind::Clear,
            Action::ExecuteScript { .. } => ActionKind::ExecuteScript,
            Action::ScrollTo { .. } => ActionKind::ScrollTo,
            Action::WaitForJs { .. } => ActionKind::WaitForJs,
            Action::SwitchToWindow { .. } => ActionKind::SwitchToWindow,
            Action::CloseWindow => ActionKind::CloseWindow,
            Action::BackWindow => ActionKind::BackWindow,
            Action::ForwardWindow => ActionKind::ForwardWindow,
            Action::RefreshWindow => ActionKind::RefreshWindow,
            Action::AcceptAlert { .. } => ActionKind::AcceptAlert,
            Action::DismissAlert { .. } => ActionKind::DismissAlert,
            Action::SendValueToAlert { .. } => ActionKind::SendValueToAlert,
            Action::Hover { .. } => ActionKind::Hover,
            Action::RightClick { .. } => ActionKind::RightClick,
            Action::DoubleClick { .. } => ActionKind::DoubleClick,
            Action::DragAndDrop { .. } => ActionKind::DragAndDrop,
            Action::Wait { .. } => ActionKind::Wait,
            Action::Condition { .. } => ActionKind::Condition,
        }
    }

    /// Every locator referenced by this action
    pub fn targets(&self) -> Vec<&Target> {
        match self {
            Action::Click { target }
            | Action::SendValue { target, .. }
            | Action::SelectOption { target, .. }
            | Action::AssertText { target, .. }
            | Action::Clear { target }
            | Action::Hover { target }
            | Action::RightClick { target }
            | Action::DoubleClick { target }
            | Action::Wait { target, .. }
            | Action::Condition { target, .. } => vec![target],
            Action::ScrollTo { target, .. } => target.iter().collect(),
            Action::DragAndDrop {
                source,
                destination,
            } => vec![source, destination],
            _ => Vec::new(),
        }
    }
}

impl Step {
    pub fn new(action: Action) -> Self {
        Self { name: None, action }
    }

    pub fn named(name: impl Into<String>, action: Action) -> Self {
        Self {
            name: Some(name.into()),
            action,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }

    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => UNNAMED_STEP,
        }
    }

    /// Human-readable label, e.g. `Step 2: Click submit (CLICK)`
    pub fn label(&self, index: usize) -> String {
        format!("Step {}: {} ({})", index + 1, self.display_name(), self.kind())
    }

    pub fn targets(&self) -> Vec<&Target> {
        self.action.targets()
    }

    /// The step that reverts this one, if the action has a natural inverse
    pub fn inverse(&self) -> Option<Step> {
        let action = match &self.action {
            Action::Navigate { .. } | Action::ForwardWindow => Action::BackWindow,
            Action::BackWindow => Action::ForwardWindow,
            Action::SendValue { target, .. } => Action::Clear {
                target: target.clone(),
            },
            _ => return None,
        };
        Some(Step::named(format!("Undo {}", self.display_name()), action))
    }
}
