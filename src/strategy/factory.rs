//! Strategy assembly from configuration and environment names

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use super::{StepFilter, Strategy, DEFAULT_RETRY_DELAY};
use crate::common::Config;

/// Named strategy presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    SequentialStopOnFailure,
    SequentialContinueOnFailure,
    RetrySequential,
    ConditionalSequential,
    /// Derived from the configuration
    #[default]
    Auto,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SequentialStopOnFailure => "sequential-stop-on-failure",
            Self::SequentialContinueOnFailure => "sequential-continue-on-failure",
            Self::RetrySequential => "retry-sequential",
            Self::ConditionalSequential => "conditional-sequential",
            Self::Auto => "auto",
        };
        f.write_str(s)
    }
}

impl Strategy {
    /// Build a preset; `Auto` follows the configured policy inputs
    pub fn build(kind: StrategyKind, config: &Config) -> Self {
        tracing::debug!(
            "Creating execution strategy: {} for environment: {}",
            kind,
            config.environment()
        );
        let execution = &config.execution;
        match kind {
            StrategyKind::SequentialStopOnFailure => Strategy::sequential(true),
            StrategyKind::SequentialContinueOnFailure => Strategy::sequential(false),
            StrategyKind::RetrySequential => Strategy::retry(
                Strategy::sequential(true),
                execution.retry_count,
                execution.retry_delay(),
            ),
            StrategyKind::ConditionalSequential => {
                Strategy::conditional(Strategy::sequential(true), StepFilter::Always)
            }
            StrategyKind::Auto => Self::auto(config),
        }
    }

    fn auto(config: &Config) -> Self {
        let execution = &config.execution;
        let mut strategy = Strategy::sequential(execution.stop_on_first_failure);

        if execution.retry_count > 0 {
            tracing::debug!("Wrapping with retry strategy: {} retries", execution.retry_count);
            strategy = Strategy::retry(strategy, execution.retry_count, execution.retry_delay());
        }

        if config.environment() == "ci" {
            tracing::debug!("Wrapping with conditional strategy for CI environment");
            strategy = Strategy::conditional(strategy, StepFilter::Always);
        }

        strategy
    }

    /// Preset policy for a deployment environment
    pub fn for_environment(env: &str, config: &Config) -> Self {
        tracing::debug!("Creating strategy for environment: {}", env);
        match env.trim().to_lowercase().as_str() {
            "dev" | "development" => Strategy::sequential(true),
            "test" | "testing" => {
                Strategy::retry(Strategy::sequential(false), 1, DEFAULT_RETRY_DELAY)
            }
            "ci" | "continuous-integration" => Strategy::conditional(
                Strategy::retry(Strategy::sequential(true), 2, DEFAULT_RETRY_DELAY),
                StepFilter::Always,
            ),
            "prod" | "production" => Strategy::retry(
                Strategy::sequential(true),
                3,
                Duration::from_millis(2000),
            ),
            _ => Self::auto(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_presets() {
        let config = Config::default();
        assert_eq!(
            Strategy::build(StrategyKind::SequentialContinueOnFailure, &config).name(),
            "Sequential(ContinueOnFailure)"
        );
        assert_eq!(
            Strategy::build(StrategyKind::ConditionalSequential, &config).name(),
            "Conditional(Sequential(StopOnFailure))"
        );
        assert_eq!(
            Strategy::build(StrategyKind::Auto, &config).name(),
            "Sequential(StopOnFailure)"
        );
    }

    #[test]
    fn test_auto_wraps_retry_and_ci_conditional() {
        let mut config = Config::default();
        config.execution.retry_count = 2;
        config.execution.environment = "CI".into();
        let strategy = Strategy::build(StrategyKind::Auto, &config);
        assert_eq!(strategy.name(), "Conditional(Retry(Sequential(StopOnFailure)))");
    }

    #[test]
    fn test_for_environment() {
        let config = Config::default();
        let name = |env| Strategy::for_environment(env, &config).name();
        assert_eq!(name("dev"), "Sequential(StopOnFailure)");
        assert_eq!(name("test"), "Retry(Sequential(ContinueOnFailure))");
        assert_eq!(name("ci"), "Conditional(Retry(Sequential(StopOnFailure)))");
        assert_eq!(name("prod"), "Retry(Sequential(StopOnFailure))");
        assert_eq!(name("staging"), "Sequential(StopOnFailure)");

        match Strategy::for_environment("production", &config) {
            Strategy::Retry {
                max_retries, delay, ..
            } => {
                assert_eq!(max_retries, 3);
                assert_eq!(delay, Duration::from_millis(2000));
            }
            other => panic!("unexpected strategy {:?}", other),
        }
    }

    #[test]
    fn test_kind_deserializes_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            strategy: StrategyKind,
        }
        let w: Wrapper = toml::from_str("strategy = \"sequential-continue-on-failure\"").unwrap();
        assert_eq!(w.strategy, StrategyKind::SequentialContinueOnFailure);
    }
}
