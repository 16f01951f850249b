//! Error types for the scenario runner
//!
//! Errors fall into a small taxonomy (see [`ErrorKind`]): configuration
//! problems are raised before any browser interaction, step failures are
//! subject to the active execution policy, aggregates wrap several failures,
//! and undo failures are always surfaced to the caller.

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by a browser driver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    #[error("Element click intercepted: {0}")]
    ClickIntercepted(String),

    #[error("Stale element reference: {0}")]
    StaleElement(String),

    #[error("No such window: {0}")]
    NoSuchWindow(String),

    #[error("No alert is present")]
    NoAlert,

    #[error("Browser session is closed")]
    SessionClosed,

    #[error("Script error: {0}")]
    Script(String),

    #[error("Operation not supported by this driver: {0}")]
    Unsupported(String),

    #[error("Driver error: {0}")]
    Other(String),
}

impl DriverError {
    /// Whether a bounded wait should keep polling after this error
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound(_) | Self::StaleElement(_) | Self::NoAlert
        )
    }
}

/// Main error type for the scenario runner
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    #[error("Failed to load scenario '{path}': {message}")]
    ScenarioParse { path: String, message: String },

    #[error("Step {} validation failed: {reason}", .index + 1)]
    InvalidStep { index: usize, reason: String },

    #[error("Driver validation failed: {0}")]
    InvalidDriver(String),

    #[error("Strategy '{strategy}' does not support the provided steps")]
    UnsupportedSteps { strategy: String },

    // === Step Execution Errors ===
    #[error("Failed to execute Step {}: {name}: {source}", .index + 1)]
    StepFailed {
        index: usize,
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("Command {command} failed at position {} of {total}: {source}", .index + 1)]
    CommandFailed {
        index: usize,
        total: usize,
        command: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Command cannot be executed: {0}")]
    CommandRejected(String),

    // === Aggregate Errors ===
    #[error("Sequential execution completed with {failed} failed steps out of {total} total steps")]
    StepsFailed {
        succeeded: usize,
        failed: usize,
        total: usize,
        failures: Vec<Error>,
    },

    #[error("Execution failed after {attempts} attempts. Last error: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<Error>,
    },

    #[error("Conditional execution failed with {skipped} of {total} steps skipped: {source}")]
    ConditionalFailed {
        skipped: usize,
        total: usize,
        #[source]
        source: Box<Error>,
    },

    // === Undo Errors ===
    #[error("Failed to undo {command}: {source}")]
    UndoFailed {
        command: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    // === Cancellation ===
    #[error("Execution cancelled")]
    Cancelled,

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Classification of errors into the execution taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid input detected before dispatch; always fatal
    Configuration,
    /// A leaf step failed; recoverable per active policy
    StepExecution,
    /// Several failures collected under continue-on-failure or retries
    Aggregate,
    /// An undo attempt failed; the command stays in history
    Undo,
    /// Execution was interrupted
    Cancelled,
    /// Anything else
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::StepExecution => "STEP_EXECUTION_ERROR",
            Self::Aggregate => "AGGREGATE_EXECUTION_ERROR",
            Self::Undo => "COMMAND_UNDO_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Error {
    /// Wrap a leaf failure with the step that produced it
    pub fn step_failed(index: usize, name: &str, source: Error) -> Self {
        Self::StepFailed {
            index,
            name: name.to_string(),
            source: Box::new(source),
        }
    }

    /// Create an invalid step error
    pub fn invalid_step(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidStep {
            index,
            reason: reason.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(what: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            what: what.into(),
            after,
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_)
            | Error::ConfigParse(_)
            | Error::UnknownAction(_)
            | Error::ScenarioParse { .. }
            | Error::InvalidStep { .. }
            | Error::InvalidDriver(_)
            | Error::UnsupportedSteps { .. } => ErrorKind::Configuration,

            Error::StepFailed { source, .. } => match source.kind() {
                ErrorKind::Cancelled => ErrorKind::Cancelled,
                ErrorKind::Configuration => ErrorKind::Configuration,
                _ => ErrorKind::StepExecution,
            },
            Error::CommandFailed { source, .. } | Error::ConditionalFailed { source, .. } => {
                source.kind()
            }

            Error::Driver(_)
            | Error::Assertion(_)
            | Error::Timeout { .. }
            | Error::CommandRejected(_) => ErrorKind::StepExecution,

            Error::StepsFailed { .. } | Error::RetriesExhausted { .. } => ErrorKind::Aggregate,

            Error::UndoFailed { .. } | Error::Unsupported(_) => ErrorKind::Undo,

            Error::Cancelled => ErrorKind::Cancelled,

            Error::Io(_) | Error::Json(_) | Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Errors that no execution policy may retry or skip past
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Configuration | ErrorKind::Cancelled
        )
    }

    /// 0-based index of the first failing step referenced by this error
    pub fn step_index(&self) -> Option<usize> {
        match self {
            Error::StepFailed { index, .. } | Error::InvalidStep { index, .. } => Some(*index),
            Error::CommandFailed { source, index, .. } => source.step_index().or(Some(*index)),
            Error::StepsFailed { failures, .. } => failures.iter().find_map(Error::step_index),
            Error::RetriesExhausted { last, .. } => last.step_index(),
            Error::ConditionalFailed { source, .. } => source.step_index(),
            _ => None,
        }
    }

    /// Number of attempts reported by an exhausted retry
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Error::RetriesExhausted { attempts, .. } => Some(*attempts),
            Error::ConditionalFailed { source, .. } => source.attempts(),
            _ => None,
        }
    }

    /// Number of failed steps carried by an aggregate, if any
    pub fn failure_count(&self) -> Option<usize> {
        match self {
            Error::StepsFailed { failed, .. } => Some(*failed),
            Error::RetriesExhausted { last, .. } | Error::ConditionalFailed { source: last, .. } => {
                last.failure_count()
            }
            _ => None,
        }
    }
}

/// Failure summary carried by lifecycle events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureInfo {
    pub kind: ErrorKind,
    pub message: String,
    /// Messages of the source chain, outermost first
    pub causes: Vec<String>,
}

impl From<&Error> for FailureInfo {
    fn from(e: &Error) -> Self {
        let mut causes = Vec::new();
        let mut source = std::error::Error::source(e);
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = std::error::Error::source(cause);
        }
        Self {
            kind: e.kind(),
            message: e.to_string(),
            causes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_kind_survives_wrapping() {
        let leaf = Error::Driver(DriverError::ElementNotFound("#missing".into()));
        let step = Error::step_failed(2, "Click submit", leaf);
        let command = Error::CommandFailed {
            index: 2,
            total: 3,
            command: "StepExecution[Click submit]".into(),
            source: Box::new(step),
        };
        assert_eq!(command.kind(), ErrorKind::StepExecution);
        assert_eq!(command.step_index(), Some(2));
    }

    #[test]
    fn test_configuration_errors_are_fatal() {
        assert!(Error::invalid_step(0, "missing url").is_fatal());
        assert!(Error::Cancelled.is_fatal());
        assert!(!Error::Assertion("text mismatch".into()).is_fatal());
    }

    #[test]
    fn test_cancelled_step_stays_cancelled() {
        let err = Error::step_failed(0, "Wait", Error::Cancelled);
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_aggregate_reports_first_index() {
        let err = Error::StepsFailed {
            succeeded: 1,
            failed: 2,
            total: 3,
            failures: vec![
                Error::step_failed(1, "a", Error::Assertion("x".into())),
                Error::step_failed(2, "b", Error::Assertion("y".into())),
            ],
        };
        assert_eq!(err.kind(), ErrorKind::Aggregate);
        assert_eq!(err.step_index(), Some(1));
        assert_eq!(err.failure_count(), Some(2));
    }

    #[test]
    fn test_conditional_failure_forwards_details() {
        let err = Error::ConditionalFailed {
            skipped: 2,
            total: 5,
            source: Box::new(Error::RetriesExhausted {
                attempts: 3,
                last: Box::new(Error::step_failed(4, "e", Error::Assertion("z".into()))),
            }),
        };
        assert_eq!(err.kind(), ErrorKind::Aggregate);
        assert_eq!(err.step_index(), Some(4));
        assert_eq!(err.attempts(), Some(3));
        assert!(err.to_string().starts_with("Conditional execution failed with 2 of 5 steps skipped"));
    }

    #[test]
    fn test_step_numbers_are_one_based_in_messages() {
        let err = Error::invalid_step(0, "URL cannot be empty");
        assert_eq!(err.to_string(), "Step 1 validation failed: URL cannot be empty");
    }

    #[test]
    fn test_failure_info_collects_causes() {
        let err = Error::step_failed(0, "Click", Error::Assertion("missing".into()));
        let info = FailureInfo::from(&err);
        assert_eq!(info.kind, ErrorKind::StepExecution);
        assert_eq!(info.causes, vec!["Assertion failed: missing".to_string()]);
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(ErrorKind::Configuration.code(), "CONFIGURATION_ERROR");
        assert_eq!(ErrorKind::Undo.to_string(), "COMMAND_UNDO_ERROR");
    }
}
