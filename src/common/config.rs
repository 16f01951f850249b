//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};
use crate::strategy::StrategyKind;

/// Environment variable overriding `execution.environment`
pub const ENVIRONMENT_VAR: &str = "SCENARIO_RUNNER_ENV";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Execution policy inputs
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Parallel runner settings
    #[serde(default)]
    pub parallel: ParallelConfig,

    /// Timeout settings for leaf executors
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Event pipeline settings
    #[serde(default)]
    pub events: EventsConfig,
}

/// Execution policy settings
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// Environment name (dev, test, ci, prod, default)
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_stop_on_first_failure")]
    pub stop_on_first_failure: bool,

    /// Number of extra attempts after the first failure
    #[serde(default)]
    pub retry_count: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Strategy assembled by the factory
    #[serde(default)]
    pub strategy: StrategyKind,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            stop_on_first_failure: default_stop_on_first_failure(),
            retry_count: 0,
            retry_delay_ms: default_retry_delay(),
            strategy: StrategyKind::default(),
        }
    }
}

impl ExecutionConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_environment() -> String {
    "default".to_string()
}
fn default_stop_on_first_failure() -> bool {
    true
}
fn default_retry_delay() -> u64 {
    1000
}

/// Parallel runner settings
#[derive(Debug, Clone, Deserialize)]
pub struct ParallelConfig {
    /// Worker pool size
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Upper bound for a whole parallel run
    #[serde(default = "default_run_timeout")]
    pub timeout_secs: u64,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            timeout_secs: default_run_timeout(),
        }
    }
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
fn default_run_timeout() -> u64 {
    1800
}

/// Timeout settings for bounded waits
#[derive(Debug, Clone, Deserialize)]
pub struct Timeouts {
    /// Default bound for element and alert waits
    #[serde(default = "default_explicit_wait")]
    pub explicit_wait_secs: u64,

    /// Delay between polls inside a bounded wait
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            explicit_wait_secs: default_explicit_wait(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_explicit_wait() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    250
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            screenshot_dir: default_screenshot_dir(),
        }
    }
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

/// Event pipeline settings
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Capacity of channel observers
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Include the full error chain in failure logs
    #[serde(default)]
    pub log_stack_traces: bool,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            log_stack_traces: false,
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Self::read(&path)?,
            _ => Self::default(),
        };
        config.apply_env_override();
        Ok(config)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read(path)?;
        config.apply_env_override();
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigParse(format!("{}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    fn check(&self) -> Result<()> {
        if self.parallel.threads == 0 {
            return Err(Error::Config("parallel.threads must be at least 1".into()));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(Error::Config(
                "timeouts.poll_interval_ms must be positive".into(),
            ));
        }
        if self.events.channel_capacity == 0 {
            return Err(Error::Config(
                "events.channel_capacity must be positive".into(),
            ));
        }
        Ok(())
    }

    fn apply_env_override(&mut self) {
        if let Ok(env) = std::env::var(ENVIRONMENT_VAR) {
            let env = env.trim();
            if !env.is_empty() {
                tracing::debug!(environment = env, "Environment overridden by {}", ENVIRONMENT_VAR);
                self.execution.environment = env.to_string();
            }
        }
    }

    /// Normalized environment name
    pub fn environment(&self) -> String {
        self.execution.environment.trim().to_lowercase()
    }

    pub fn explicit_wait(&self) -> Duration {
        Duration::from_secs(self.timeouts.explicit_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.timeouts.poll_interval_ms)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.parallel.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.execution.environment, "default");
        assert!(config.execution.stop_on_first_failure);
        assert_eq!(config.execution.retry_count, 0);
        assert_eq!(config.execution.retry_delay_ms, 1000);
        assert_eq!(config.execution.strategy, StrategyKind::Auto);
        assert!(config.parallel.threads >= 1);
        assert_eq!(config.parallel.timeout_secs, 1800);
        assert_eq!(config.explicit_wait(), Duration::from_secs(10));
        assert_eq!(config.output.screenshot_dir, PathBuf::from("screenshots"));
        assert_eq!(config.events.channel_capacity, 256);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            [execution]
            environment = "CI"
            retry_count = 2
            strategy = "retry-sequential"

            [timeouts]
            poll_interval_ms = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.environment(), "ci");
        assert_eq!(config.execution.retry_count, 2);
        assert_eq!(config.execution.strategy, StrategyKind::RetrySequential);
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.timeouts.explicit_wait_secs, 10);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::parse("[parallel]\nthreads = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::parse("[execution]\nretry_count = \"many\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nscreenshot_dir = \"shots\"").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.output.screenshot_dir, PathBuf::from("shots"));
    }
}
