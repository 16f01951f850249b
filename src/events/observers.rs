//! Built-in observers

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use super::{EventType, ExecutionObserver, TestExecutionEvent};
use crate::common::{Config, Error, Result};

/// Logs every lifecycle event through `tracing`
#[derive(Debug, Default)]
pub struct LoggingObserver {
    log_stack_traces: bool,
}

impl LoggingObserver {
    pub fn new(log_stack_traces: bool) -> Self {
        Self { log_stack_traces }
    }
}

impl ExecutionObserver for LoggingObserver {
    fn on_event(&self, event: &TestExecutionEvent) -> Result<()> {
        let origin = event.origin();
        let number = event.step_index().map(|i| i + 1).unwrap_or(0);
        let step_name = event.step().map(|s| s.display_name()).unwrap_or("Unnamed");

        match event.kind() {
            EventType::ScenarioStarted => {
                tracing::info!(origin, "Scenario started: {}", event.message())
            }
            EventType::ScenarioCompleted => {
                tracing::info!(origin, "Scenario completed: {}", event.message())
            }
            EventType::ScenarioFailed => {
                tracing::error!(origin, "Scenario failed: {}", event.message());
                self.log_failure(event);
            }
            EventType::StepStarted => {
                let kind = event.step().map(|s| s.kind().as_str()).unwrap_or("?");
                tracing::info!(
                    origin,
                    attempt = event.attempt(),
                    "Step {} started: {} ({})",
                    number,
                    step_name,
                    kind
                )
            }
            EventType::StepCompleted => {
                tracing::info!(origin, "Step {} completed: {}", number, step_name)
            }
            EventType::StepFailed => {
                tracing::error!(
                    origin,
                    attempt = event.attempt(),
                    "Step {} failed: {} - {}",
                    number,
                    step_name,
                    event.message()
                );
                self.log_failure(event);
            }
            EventType::StepSkipped => {
                tracing::warn!(origin, "Step {} skipped: {}", number, event.message())
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        if self.log_stack_traces {
            "LoggingObserver (with stack traces)"
        } else {
            "LoggingObserver"
        }
    }
}

impl LoggingObserver {
    fn log_failure(&self, event: &TestExecutionEvent) {
        if !self.log_stack_traces {
            return;
        }
        if let Some(failure) = event.failure() {
            tracing::error!(
                origin = event.origin(),
                code = failure.kind.code(),
                "Failure details: {}",
                failure.message
            );
            for cause in &failure.causes {
                tracing::error!(origin = event.origin(), "  caused by: {}", cause);
            }
        }
    }
}

/// Point-in-time copy of [`MetricsObserver`] counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub scenarios_started: u64,
    pub scenarios_completed: u64,
    pub scenarios_failed: u64,
    pub steps_started: u64,
    pub steps_completed: u64,
    pub steps_failed: u64,
    pub steps_skipped: u64,
    pub total_execution_time: Duration,
}

impl MetricsSnapshot {
    /// Percentage of finished scenarios that passed
    pub fn scenario_success_rate(&self) -> f64 {
        rate(self.scenarios_completed, self.scenarios_failed)
    }

    /// Percentage of finished steps that passed
    pub fn step_success_rate(&self) -> f64 {
        rate(self.steps_completed, self.steps_failed)
    }
}

fn rate(ok: u64, failed: u64) -> f64 {
    let total = ok + failed;
    if total == 0 {
        0.0
    } else {
        ok as f64 / total as f64 * 100.0
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scenarios: {} started, {} completed, {} failed ({:.1}% success); \
             steps: {} started, {} completed, {} failed, {} skipped ({:.1}% success); \
             total time: {}ms",
            self.scenarios_started,
            self.scenarios_completed,
            self.scenarios_failed,
            self.scenario_success_rate(),
            self.steps_started,
            self.steps_completed,
            self.steps_failed,
            self.steps_skipped,
            self.step_success_rate(),
            self.total_execution_time.as_millis()
        )
    }
}

/// Thread-safe execution counters
///
/// Scenario durations are tracked per origin and run id, so one instance can
/// watch parallel scenarios even when they share a name. A scenario aborted
/// before its terminal event stays in flight until [`MetricsObserver::reset`].
#[derive(Debug, Default)]
pub struct MetricsObserver {
    scenarios_started: AtomicU64,
    scenarios_completed: AtomicU64,
    scenarios_failed: AtomicU64,
    steps_started: AtomicU64,
    steps_completed: AtomicU64,
    steps_failed: AtomicU64,
    steps_skipped: AtomicU64,
    total_execution_ms: AtomicU64,
    scenario_starts: Mutex<HashMap<(String, u64), Instant>>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            scenarios_started: self.scenarios_started.load(Ordering::Relaxed),
            scenarios_completed: self.scenarios_completed.load(Ordering::Relaxed),
            scenarios_failed: self.scenarios_failed.load(Ordering::Relaxed),
            steps_started: self.steps_started.load(Ordering::Relaxed),
            steps_completed: self.steps_completed.load(Ordering::Relaxed),
            steps_failed: self.steps_failed.load(Ordering::Relaxed),
            steps_skipped: self.steps_skipped.load(Ordering::Relaxed),
            total_execution_time: Duration::from_millis(
                self.total_execution_ms.load(Ordering::Relaxed),
            ),
        }
    }

    /// Scenarios started but not yet finished
    pub fn in_flight(&self) -> usize {
        self.scenario_starts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn reset(&self) {
        for counter in [
            &self.scenarios_started,
            &self.scenarios_completed,
            &self.scenarios_failed,
            &self.steps_started,
            &self.steps_completed,
            &self.steps_failed,
            &self.steps_skipped,
            &self.total_execution_ms,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        self.scenario_starts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        tracing::debug!("Metrics reset");
    }

    fn finish_scenario(&self, event: &TestExecutionEvent) {
        let started = self
            .scenario_starts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&(event.origin().to_string(), event.run()));
        if let Some(started) = started {
            let elapsed = event.instant().saturating_duration_since(started);
            let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            self.total_execution_ms.fetch_add(ms, Ordering::Relaxed);
            tracing::debug!(origin = event.origin(), "Scenario finished in {}ms", ms);
        }
    }
}

impl ExecutionObserver for MetricsObserver {
    fn on_event(&self, event: &TestExecutionEvent) -> Result<()> {
        match event.kind() {
            EventType::ScenarioStarted => {
                self.scenarios_started.fetch_add(1, Ordering::Relaxed);
                self.scenario_starts
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert((event.origin().to_string(), event.run()), event.instant());
            }
            EventType::ScenarioCompleted => {
                self.scenarios_completed.fetch_add(1, Ordering::Relaxed);
                self.finish_scenario(event);
            }
            EventType::ScenarioFailed => {
                self.scenarios_failed.fetch_add(1, Ordering::Relaxed);
                self.finish_scenario(event);
            }
            EventType::StepStarted => {
                self.steps_started.fetch_add(1, Ordering::Relaxed);
            }
            EventType::StepCompleted => {
                self.steps_completed.fetch_add(1, Ordering::Relaxed);
            }
            EventType::StepFailed => {
                self.steps_failed.fetch_add(1, Ordering::Relaxed);
            }
            EventType::StepSkipped => {
                self.steps_skipped.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MetricsObserver"
    }
}

/// Forwards events into a bounded channel for asynchronous consumers
///
/// Delivery never blocks the executor: a full or closed channel is reported
/// as this observer's failure.
#[derive(Debug)]
pub struct ChannelObserver {
    sender: mpsc::Sender<TestExecutionEvent>,
    filter: Option<Vec<EventType>>,
}

impl ChannelObserver {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<TestExecutionEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender,
                filter: None,
            },
            receiver,
        )
    }

    /// Only forward the listed event types
    pub fn only(mut self, kinds: &[EventType]) -> Self {
        self.filter = Some(kinds.to_vec());
        self
    }
}

impl ExecutionObserver for ChannelObserver {
    fn on_event(&self, event: &TestExecutionEvent) -> Result<()> {
        self.sender.try_send(event.clone()).map_err(|e| {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "full",
                mpsc::error::TrySendError::Closed(_) => "closed",
            };
            Error::Internal(format!("event channel {}", reason))
        })
    }

    fn name(&self) -> &str {
        "ChannelObserver"
    }

    fn should_notify(&self, kind: EventType) -> bool {
        self.filter.as_ref().map_or(true, |kinds| kinds.contains(&kind))
    }
}

/// Default observer set for an environment
///
/// dev logs with failure details; prod only logs; every other environment
/// logs and collects metrics.
pub fn for_environment(env: &str, config: &Config) -> Vec<Arc<dyn ExecutionObserver>> {
    let details = config.events.log_stack_traces;
    let observers: Vec<Arc<dyn ExecutionObserver>> = match env.trim().to_lowercase().as_str() {
        "dev" | "development" => vec![Arc::new(LoggingObserver::new(true))],
        "prod" | "production" => vec![Arc::new(LoggingObserver::new(details))],
        _ => vec![
            Arc::new(LoggingObserver::new(details)),
            Arc::new(MetricsObserver::new()),
        ],
    };
    tracing::debug!(
        environment = env,
        count = observers.len(),
        "Observers created"
    );
    observers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventPublisher;

    #[test]
    fn test_metrics_counts_per_origin() {
        let metrics = Arc::new(MetricsObserver::new());
        let publisher = EventPublisher::new();
        publisher.add_observer(metrics.clone());

        let a = publisher.with_origin("a");
        let b = publisher.with_origin("b");
        a.publish(a.event(EventType::ScenarioStarted, "a"));
        b.publish(b.event(EventType::ScenarioStarted, "b"));
        a.publish(a.event(EventType::StepStarted, "s"));
        a.publish(a.event(EventType::StepCompleted, "s"));
        b.publish(b.event(EventType::StepStarted, "s"));
        b.publish(b.event(EventType::StepFailed, "s"));
        a.publish(a.event(EventType::ScenarioCompleted, "a"));
        b.publish(b.event(EventType::ScenarioFailed, "b"));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.scenarios_started, 2);
        assert_eq!(snapshot.scenarios_completed, 1);
        assert_eq!(snapshot.scenarios_failed, 1);
        assert_eq!(snapshot.steps_failed, 1);
        assert!((snapshot.scenario_success_rate() - 50.0).abs() < f64::EPSILON);

        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_metrics_tracks_same_name_runs_apart() {
        let metrics = Arc::new(MetricsObserver::new());
        let publisher = EventPublisher::new();
        publisher.add_observer(metrics.clone());

        let first = publisher.with_origin("login");
        let second = publisher.with_origin("login");
        first.publish(first.event(EventType::ScenarioStarted, "login"));
        second.publish(second.event(EventType::ScenarioStarted, "login"));
        assert_eq!(metrics.in_flight(), 2);

        first.publish(first.event(EventType::ScenarioCompleted, "login"));
        assert_eq!(metrics.in_flight(), 1);
        second.publish(second.event(EventType::ScenarioFailed, "login"));
        assert_eq!(metrics.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_channel_observer_forwards_and_reports_full() {
        let (observer, mut rx) = ChannelObserver::channel(1);
        let event = TestExecutionEvent::new(EventType::StepStarted, "x", "one");
        observer.on_event(&event).unwrap();
        assert!(observer.on_event(&event).is_err());

        let received = rx.recv().await.unwrap();
        assert_eq!(received.message(), "one");
    }

    #[test]
    fn test_channel_observer_filter() {
        let (observer, _rx) = ChannelObserver::channel(4);
        let observer = observer.only(&[EventType::StepFailed]);
        assert!(observer.should_notify(EventType::StepFailed));
        assert!(!observer.should_notify(EventType::StepStarted));
    }

    #[test]
    fn test_for_environment() {
        let config = Config::default();
        let names = |env: &str| -> Vec<String> {
            for_environment(env, &config)
                .iter()
                .map(|o| o.name().to_string())
                .collect()
        };
        assert_eq!(names("dev"), vec!["LoggingObserver (with stack traces)"]);
        assert_eq!(names("prod"), vec!["LoggingObserver"]);
        assert_eq!(names("ci"), vec!["LoggingObserver", "MetricsObserver"]);
    }
}
