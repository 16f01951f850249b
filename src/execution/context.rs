//! Validation gate in front of a strategy

use crate::common::{Config, Error, Result};
use crate::model::Step;
use crate::strategy::Strategy;
use crate::validation::{DriverValidator, ValidationChain, ValidationResult};

use super::ExecutionScope;

/// One strategy plus the checks that must pass before it may touch the browser
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    strategy: Strategy,
    driver_validator: DriverValidator,
    step_validators: ValidationChain<Step>,
}

impl ExecutionContext {
    /// Context with the default step chain (structure and targets)
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            driver_validator: DriverValidator,
            step_validators: ValidationChain::for_environment("default"),
        }
    }

    /// Strategy and validation chain chosen for a deployment environment
    pub fn for_environment(env: &str, config: &Config) -> Self {
        Self {
            strategy: Strategy::for_environment(env, config),
            driver_validator: DriverValidator,
            step_validators: ValidationChain::for_environment(env),
        }
    }

    pub fn with_step_validators(mut self, chain: ValidationChain<Step>) -> Self {
        self.step_validators = chain;
        self
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn step_validators(&self) -> &ValidationChain<Step> {
        &self.step_validators
    }

    /// Validate, then delegate to the strategy
    ///
    /// Every validation failure is a configuration error raised before the
    /// first step is dispatched.
    pub async fn execute(&self, scope: &ExecutionScope, steps: &[Step]) -> Result<()> {
        tracing::info!(
            origin = scope.events().origin(),
            "Executing {} steps with strategy {}",
            steps.len(),
            self.strategy
        );

        let driver = self.driver_validator.validate(scope.driver().as_ref()).await;
        log_warnings(&driver);
        if driver.is_invalid() {
            tracing::error!("Driver validation failed: {}", driver.error_message());
            return Err(Error::InvalidDriver(driver.error_message()));
        }

        self.validate_steps(steps)?;

        if !self.strategy.supports(steps) {
            tracing::error!("Strategy {} does not support the provided steps", self.strategy);
            return Err(Error::UnsupportedSteps {
                strategy: self.strategy.name(),
            });
        }

        self.strategy.execute(scope, steps).await
    }

    /// Run the step chain over every step; no driver involved
    pub fn validate_steps(&self, steps: &[Step]) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            let result = self.step_validators.validate(step);
            log_warnings(&result);
            if result.is_invalid() {
                tracing::error!(
                    "Validation failed for {}: {}",
                    step.label(index),
                    result.error_message()
                );
                return Err(Error::invalid_step(index, result.error_message()));
            }
        }
        Ok(())
    }
}

fn log_warnings(result: &ValidationResult) {
    for warning in &result.warnings {
        tracing::warn!(
            handler = result.handler.as_deref().unwrap_or("validation"),
            "{}",
            warning
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{DriverError, ErrorKind};
    use crate::driver::{BrowserOp, Driver, OpOutput};
    use crate::events::EventPublisher;
    use crate::model::{Action, Target};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts operations other than the URL probe
    struct Counting {
        url: std::result::Result<String, DriverError>,
        ops: AtomicUsize,
    }

    impl Counting {
        fn new(url: std::result::Result<&str, DriverError>) -> Arc<Self> {
            Arc::new(Self {
                url: url.map(str::to_string),
                ops: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Driver for Counting {
        async fn perform(&self, op: BrowserOp) -> std::result::Result<OpOutput, DriverError> {
            match op {
                BrowserOp::CurrentUrl => self.url.clone().map(OpOutput::Text),
                BrowserOp::Probe { .. } => Ok(OpOutput::Flag(true)),
                _ => {
                    self.ops.fetch_add(1, Ordering::SeqCst);
                    Ok(OpOutput::Done)
                }
            }
        }
    }

    fn steps() -> Vec<Step> {
        vec![
            Step::named("Open", Action::Navigate { url: "https://example.com".into() }),
            Step::named("Press", Action::Click { target: Target::id("submit") }),
        ]
    }

    #[tokio::test]
    async fn test_valid_steps_delegate() {
        let driver = Counting::new(Ok("about:blank"));
        let scope = ExecutionScope::new(driver.clone(), EventPublisher::new());
        ExecutionContext::new(Strategy::sequential(true))
            .execute(&scope, &steps())
            .await
            .unwrap();
        assert_eq!(driver.ops.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_step_short_circuits() {
        let driver = Counting::new(Ok("https://example.com"));
        let scope = ExecutionScope::new(driver.clone(), EventPublisher::new());
        let mut bad = steps();
        bad.push(Step::named("Broken", Action::Click { target: Target::new("label", "x") }));

        let err = ExecutionContext::new(Strategy::sequential(true))
            .execute(&scope, &bad)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.step_index(), Some(2));
        assert_eq!(driver.ops.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_closed_driver_and_empty_list() {
        let closed = Counting::new(Err(DriverError::SessionClosed));
        let scope = ExecutionScope::new(closed, EventPublisher::new());
        let context = ExecutionContext::new(Strategy::sequential(true));
        assert!(matches!(
            context.execute(&scope, &steps()).await,
            Err(Error::InvalidDriver(_))
        ));

        let scope = ExecutionScope::new(Counting::new(Ok("https://a")), EventPublisher::new());
        assert!(matches!(
            context.execute(&scope, &[]).await,
            Err(Error::UnsupportedSteps { .. })
        ));
    }
}
