//! Execution strategies
//!
//! A strategy is a small combinator tree: [`Strategy::Sequential`] at the
//! leaves actually runs steps, while [`Strategy::Retry`] and
//! [`Strategy::Conditional`] wrap an inner strategy. Boxing the inner value
//! guarantees every chain terminates in a base strategy and never cycles.

mod conditional;
mod factory;
mod filter;
mod retry;
mod sequential;

pub use factory::StrategyKind;
pub use filter::StepFilter;

use std::fmt;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::common::Result;
use crate::execution::ExecutionScope;
use crate::model::Step;

/// Step paired with its index in the list handed to [`Strategy::execute`]
pub(crate) type IndexedStep<'a> = (usize, &'a Step);

#[derive(Debug, Clone)]
pub enum Strategy {
    /// Run steps in order through the command invoker
    Sequential { stop_on_first_failure: bool },
    /// Re-run the whole inner strategy up to `max_retries` more times
    Retry {
        inner: Box<Strategy>,
        max_retries: u32,
        delay: Duration,
    },
    /// Hand only the steps accepted by `filter` to the inner strategy
    Conditional {
        inner: Box<Strategy>,
        filter: StepFilter,
    },
}

/// Delay between retry attempts when none is given
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

impl Strategy {
    pub fn sequential(stop_on_first_failure: bool) -> Self {
        Self::Sequential {
            stop_on_first_failure,
        }
    }

    pub fn retry(inner: Strategy, max_retries: u32, delay: Duration) -> Self {
        Self::Retry {
            inner: Box::new(inner),
            max_retries,
            delay,
        }
    }

    pub fn conditional(inner: Strategy, filter: StepFilter) -> Self {
        Self::Conditional {
            inner: Box::new(inner),
            filter,
        }
    }

    /// Compact structural name, e.g. `Retry(Sequential(StopOnFailure))`
    pub fn name(&self) -> String {
        match self {
            Self::Sequential {
                stop_on_first_failure: true,
            } => "Sequential(StopOnFailure)".to_string(),
            Self::Sequential {
                stop_on_first_failure: false,
            } => "Sequential(ContinueOnFailure)".to_string(),
            Self::Retry { inner, .. } => format!("Retry({})", inner.name()),
            Self::Conditional { inner, .. } => format!("Conditional({})", inner.name()),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Sequential {
                stop_on_first_failure,
            } => format!(
                "Sequential execution ({})",
                if *stop_on_first_failure {
                    "stop on first failure"
                } else {
                    "continue on failure"
                }
            ),
            Self::Retry {
                inner,
                max_retries,
                delay,
            } => format!(
                "Retry up to {} times with {}ms delay: {}",
                max_retries,
                delay.as_millis(),
                inner.description()
            ),
            Self::Conditional { inner, filter } => format!(
                "Conditional execution ({}): {}",
                filter.description(),
                inner.description()
            ),
        }
    }

    /// Whether this strategy can run `steps`; decorators ask their delegate
    pub fn supports(&self, steps: &[Step]) -> bool {
        match self {
            Self::Sequential { .. } => !steps.is_empty(),
            Self::Retry { inner, .. } | Self::Conditional { inner, .. } => inner.supports(steps),
        }
    }

    /// The base strategy at the end of the decorator chain
    pub fn base(&self) -> &Strategy {
        match self {
            Self::Sequential { .. } => self,
            Self::Retry { inner, .. } | Self::Conditional { inner, .. } => inner.base(),
        }
    }

    /// Run `steps` under this policy
    pub async fn execute(&self, scope: &ExecutionScope, steps: &[Step]) -> Result<()> {
        let indexed: Vec<IndexedStep<'_>> = steps.iter().enumerate().collect();
        self.run(scope, &indexed).await
    }

    pub(crate) fn run<'a>(
        &'a self,
        scope: &'a ExecutionScope,
        steps: &'a [IndexedStep<'a>],
    ) -> BoxFuture<'a, Result<()>> {
        match self {
            Self::Sequential {
                stop_on_first_failure,
            } => sequential::run(scope, steps, *stop_on_first_failure).boxed(),
            Self::Retry {
                inner,
                max_retries,
                delay,
            } => retry::run(inner, scope, steps, *max_retries, *delay).boxed(),
            Self::Conditional { inner, filter } => {
                conditional::run(inner, filter, scope, steps).boxed()
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
