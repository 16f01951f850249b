//! Bounded worker pool over independent scenarios
//!
//! Each scenario gets its own driver from the factory and its own execution
//! scope; nothing mutable is shared between workers except observers, which
//! are required to be thread-safe. A failing or panicking scenario never
//! affects its siblings. When the run timeout elapses the run token is
//! cancelled, stragglers get a short grace period to unwind, then their
//! tasks are aborted.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use super::ScenarioManager;
use crate::common::{Config, ErrorKind, Result};
use crate::driver::DriverFactory;
use crate::model::Scenario;

/// Time cancelled scenarios get to finish before their tasks are aborted
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioStatus {
    Passed,
    Failed { kind: ErrorKind, message: String },
    /// Still running when the run timeout elapsed
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub name: String,
    pub status: ScenarioStatus,
    pub duration: Duration,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            ScenarioStatus::Passed => write!(f, "{}: passed in {:?}", self.name, self.duration),
            ScenarioStatus::Failed { kind, message } => {
                write!(f, "{}: failed [{}] {}", self.name, kind, message)
            }
            ScenarioStatus::TimedOut => write!(f, "{}: timed out", self.name),
        }
    }
}

/// Outcomes in input order
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub outcomes: Vec<ScenarioOutcome>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn timed_out(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == ScenarioStatus::TimedOut)
            .count()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    pub fn outcome(&self, name: &str) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

pub struct ParallelRunner {
    workers: usize,
    timeout: Duration,
    manager: ScenarioManager,
    factory: Arc<dyn DriverFactory>,
}

impl ParallelRunner {
    pub fn new(manager: ScenarioManager, factory: Arc<dyn DriverFactory>) -> Self {
        let parallel = Config::default().parallel;
        Self {
            workers: parallel.threads,
            timeout: Duration::from_secs(parallel.timeout_secs),
            manager,
            factory,
        }
    }

    pub fn from_config(config: &Config, factory: Arc<dyn DriverFactory>) -> Self {
        Self::new(ScenarioManager::from_config(config), factory)
            .with_workers(config.parallel.threads)
            .with_timeout(config.run_timeout())
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub async fn run(&self, scenarios: Vec<Scenario>) -> RunSummary {
        let started = Instant::now();
        let names: Vec<String> = scenarios.iter().map(|s| s.name.clone()).collect();
        tracing::info!(
            "Running {} scenarios on {} workers (timeout {:?})",
            scenarios.len(),
            self.workers,
            self.timeout
        );

        let run_token = CancellationToken::new();
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for (position, scenario) in scenarios.into_iter().enumerate() {
            let permits = permits.clone();
            let manager = self
                .manager
                .clone()
                .with_cancellation(run_token.child_token());
            let factory = self.factory.clone();

            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let begun = Instant::now();
                let result = AssertUnwindSafe(run_one(&manager, factory.as_ref(), &scenario))
                    .catch_unwind()
                    .await;
                let status = match result {
                    Ok(Ok(())) => ScenarioStatus::Passed,
                    Ok(Err(e)) => ScenarioStatus::Failed {
                        kind: e.kind(),
                        message: e.to_string(),
                    },
                    Err(panic) => ScenarioStatus::Failed {
                        kind: ErrorKind::Internal,
                        message: format!("Scenario panicked: {}", panic_message(&*panic)),
                    },
                };
                (
                    position,
                    ScenarioOutcome {
                        name: scenario.name,
                        status,
                        duration: begun.elapsed(),
                    },
                )
            });
        }

        let mut outcomes: Vec<Option<ScenarioOutcome>> = vec![None; names.len()];
        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);

        let timed_out = loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(joined) => record(&mut outcomes, joined, false),
                    None => break false,
                },
                _ = &mut deadline => break true,
            }
        };

        if timed_out {
            tracing::warn!(
                "Parallel execution timed out after {:?}; cancelling {} remaining scenarios",
                self.timeout,
                tasks.len()
            );
            run_token.cancel();

            let grace = tokio::time::sleep(SHUTDOWN_GRACE);
            tokio::pin!(grace);
            let mut aborted = false;
            loop {
                tokio::select! {
                    joined = tasks.join_next() => match joined {
                        Some(joined) => record(&mut outcomes, joined, true),
                        None => break,
                    },
                    _ = &mut grace, if !aborted => {
                        tracing::warn!("Aborting {} scenarios that ignored cancellation", tasks.len());
                        tasks.abort_all();
                        aborted = true;
                    }
                }
            }
        }

        let outcomes: Vec<ScenarioOutcome> = outcomes
            .into_iter()
            .zip(names)
            .map(|(outcome, name)| {
                outcome.unwrap_or_else(|| ScenarioOutcome {
                    name,
                    status: if timed_out {
                        ScenarioStatus::TimedOut
                    } else {
                        ScenarioStatus::Failed {
                            kind: ErrorKind::Internal,
                            message: "Scenario task ended unexpectedly".to_string(),
                        }
                    },
                    duration: started.elapsed(),
                })
            })
            .collect();

        let summary = RunSummary {
            outcomes,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            "Parallel run finished: {} passed, {} failed ({} timed out) in {:?}",
            summary.passed(),
            summary.failed(),
            summary.timed_out(),
            summary.elapsed
        );
        summary
    }
}

async fn run_one(
    manager: &ScenarioManager,
    factory: &dyn DriverFactory,
    scenario: &Scenario,
) -> Result<()> {
    let driver = factory.create(scenario).await?;
    let result = manager.run_scenario(driver.clone(), scenario).await;
    if let Err(e) = factory.dispose(driver).await {
        tracing::warn!("Failed to dispose driver for '{}': {}", scenario.name, e);
    }
    result
}

fn record(
    outcomes: &mut [Option<ScenarioOutcome>],
    joined: std::result::Result<(usize, ScenarioOutcome), JoinError>,
    cancelled_by_timeout: bool,
) {
    match joined {
        Ok((position, mut outcome)) => {
            let cancelled = matches!(
                outcome.status,
                ScenarioStatus::Failed {
                    kind: ErrorKind::Cancelled,
                    ..
                }
            );
            if cancelled_by_timeout && cancelled {
                outcome.status = ScenarioStatus::TimedOut;
            }
            match &outcome.status {
                ScenarioStatus::Passed => tracing::info!("{}", outcome),
                _ => tracing::error!("{}", outcome),
            }
            if let Some(slot) = outcomes.get_mut(position) {
                *slot = Some(outcome);
            }
        }
        Err(e) if e.is_cancelled() => tracing::debug!("Scenario task aborted"),
        Err(e) => tracing::error!("Scenario task failed: {}", e),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
