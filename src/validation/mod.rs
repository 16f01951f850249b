//! Pre-execution validation
//!
//! Validators run before the first browser interaction. A chain stops at the
//! first invalid result; warnings from every validator that ran are kept so
//! the caller can log them.

mod driver;
mod step;
mod target;

pub use driver::DriverValidator;
pub use step::{StepStructureValidator, StepTargetsValidator};
pub use target::TargetValidator;

use std::sync::Arc;

use crate::model::Step;

/// Outcome of one validator, or of a whole chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Name of the validator that produced the verdict
    pub handler: Option<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::success()
    }
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            handler: None,
        }
    }

    pub fn failure(handler: &str, error: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![error.into()],
            warnings: Vec::new(),
            handler: Some(handler.to_string()),
        }
    }

    pub fn warning(handler: &str, warning: impl Into<String>) -> Self {
        Self::success().with_warning(handler, warning)
    }

    pub fn with_warning(mut self, handler: &str, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        if self.handler.is_none() {
            self.handler = Some(handler.to_string());
        }
        self
    }

    /// Fold `other` into `self`; any invalid part makes the whole invalid
    pub fn merge(mut self, other: ValidationResult) -> Self {
        if !other.valid && self.valid {
            self.handler = other.handler.clone();
        }
        self.valid &= other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        if self.handler.is_none() {
            self.handler = other.handler;
        }
        self
    }

    pub fn is_invalid(&self) -> bool {
        !self.valid
    }

    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// A synchronous check over values of type `T`
pub trait Validator<T: ?Sized>: Send + Sync {
    fn validate(&self, value: &T) -> ValidationResult;

    fn name(&self) -> &str;

    fn description(&self) -> &str {
        self.name()
    }
}

/// Ordered validators; evaluation stops at the first invalid result
pub struct ValidationChain<T: ?Sized> {
    validators: Vec<Arc<dyn Validator<T>>>,
}

impl<T: ?Sized> Clone for ValidationChain<T> {
    fn clone(&self) -> Self {
        Self {
            validators: self.validators.clone(),
        }
    }
}

impl<T: ?Sized> Default for ValidationChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for ValidationChain<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<T: ?Sized> ValidationChain<T> {
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    pub fn with(mut self, validator: impl Validator<T> + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn push(&mut self, validator: Arc<dyn Validator<T>>) {
        self.validators.push(validator);
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    pub fn validate(&self, value: &T) -> ValidationResult {
        let mut warnings = Vec::new();
        for validator in &self.validators {
            let result = validator.validate(value);
            warnings.extend(result.warnings.iter().cloned());
            if result.is_invalid() {
                return ValidationResult { warnings, ..result };
            }
        }
        ValidationResult {
            warnings,
            ..ValidationResult::success()
        }
    }
}

impl ValidationChain<Step> {
    /// Structure only in ci/prod; every other environment also lints targets
    pub fn for_environment(env: &str) -> Self {
        let chain = Self::new().with(StepStructureValidator);
        match env.trim().to_lowercase().as_str() {
            "ci" | "continuous-integration" | "prod" | "production" => chain,
            _ => chain.with(StepTargetsValidator::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, Target};

    struct Reject;

    impl Validator<Step> for Reject {
        fn validate(&self, _: &Step) -> ValidationResult {
            ValidationResult::failure(self.name(), "rejected")
        }

        fn name(&self) -> &str {
            "Reject"
        }
    }

    #[test]
    fn test_chain_stops_at_first_failure() {
        let chain = ValidationChain::new()
            .with(StepStructureValidator)
            .with(Reject)
            .with(StepTargetsValidator::default());

        // Unnamed: the structure validator warns, then Reject fails
        let result = chain.validate(&Step::new(Action::Click {
            target: Target::id("a b"),
        }));
        assert!(result.is_invalid());
        assert_eq!(result.handler.as_deref(), Some("Reject"));
        assert_eq!(result.errors, vec!["rejected".to_string()]);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_for_environment() {
        assert_eq!(
            ValidationChain::for_environment("ci").names(),
            vec!["StepStructureValidator"]
        );
        assert_eq!(
            ValidationChain::for_environment("dev").names(),
            vec!["StepStructureValidator", "StepTargetsValidator"]
        );
    }

    #[test]
    fn test_merge() {
        let merged = ValidationResult::warning("A", "careful")
            .merge(ValidationResult::failure("B", "broken"));
        assert!(merged.is_invalid());
        assert_eq!(merged.handler.as_deref(), Some("B"));
        assert_eq!(merged.warnings, vec!["careful".to_string()]);
        assert_eq!(merged.error_message(), "broken");
    }
}
