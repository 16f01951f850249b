//! Observer registration and event dispatch

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use super::{EventType, TestExecutionEvent};
use crate::common::Result;

/// Lifecycle-event subscriber
///
/// Implementations must be thread-safe: one observer may be shared by
/// scenarios running in parallel.
pub trait ExecutionObserver: Send + Sync {
    /// Handle one event. Errors are logged by the publisher and never reach
    /// the executor.
    fn on_event(&self, event: &TestExecutionEvent) -> Result<()>;

    fn name(&self) -> &str;

    /// Filter applied before `on_event`
    fn should_notify(&self, _kind: EventType) -> bool {
        true
    }
}

type ObserverList = Arc<RwLock<Vec<Arc<dyn ExecutionObserver>>>>;

/// Deduplicated, ordered set of observers
///
/// Clones share the same observer set. [`EventPublisher::with_origin`] yields
/// a publisher that shares the set but stamps events with another origin.
#[derive(Clone)]
pub struct EventPublisher {
    observers: ObserverList,
    origin: Arc<str>,
    run: u64,
}

/// Source of per-origin run ids; 0 is the root publisher
static NEXT_RUN: AtomicU64 = AtomicU64::new(1);

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPublisher")
            .field("origin", &self.origin)
            .field("observers", &self.observer_names())
            .finish()
    }
}

fn same_observer(a: &Arc<dyn ExecutionObserver>, b: &Arc<dyn ExecutionObserver>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            observers: Arc::new(RwLock::new(Vec::new())),
            origin: Arc::from("main"),
            run: 0,
        }
    }

    /// Share this observer set under another origin label
    ///
    /// Each call opens a new run id, so two runs under the same label stay
    /// distinguishable.
    pub fn with_origin(&self, origin: impl Into<String>) -> Self {
        Self {
            observers: Arc::clone(&self.observers),
            origin: Arc::from(origin.into()),
            run: NEXT_RUN.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn run(&self) -> u64 {
        self.run
    }

    /// Register an observer; returns false if it was already registered
    pub fn add_observer(&self, observer: Arc<dyn ExecutionObserver>) -> bool {
        let mut observers = self.observers.write().unwrap_or_else(|e| e.into_inner());
        if observers.iter().any(|o| same_observer(o, &observer)) {
            return false;
        }
        tracing::debug!(observer = observer.name(), "Observer registered");
        observers.push(observer);
        true
    }

    pub fn remove_observer(&self, observer: &Arc<dyn ExecutionObserver>) -> bool {
        let mut observers = self.observers.write().unwrap_or_else(|e| e.into_inner());
        let before = observers.len();
        observers.retain(|o| !same_observer(o, observer));
        before != observers.len()
    }

    pub fn clear_observers(&self) {
        self.observers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn observer_names(&self) -> Vec<String> {
        self.observers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|o| o.name().to_string())
            .collect()
    }

    /// Start an event stamped with this publisher's origin
    pub fn event(&self, kind: EventType, message: impl Into<String>) -> TestExecutionEvent {
        TestExecutionEvent::new(kind, self.origin.as_ref(), message).with_run(self.run)
    }

    /// Deliver an event to every interested observer, in registration order
    ///
    /// A failing or panicking observer is logged and skipped.
    pub fn publish(&self, event: TestExecutionEvent) {
        // Snapshot so observers may register others without deadlocking
        let observers: Vec<_> = self
            .observers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        for observer in observers {
            if !observer.should_notify(event.kind()) {
                continue;
            }
            match panic::catch_unwind(AssertUnwindSafe(|| observer.on_event(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(
                        observer = observer.name(),
                        event = %event.kind(),
                        "Observer failed to handle event: {}",
                        e
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        observer = observer.name(),
                        event = %event.kind(),
                        "Observer panicked while handling event"
                    );
                }
            }
        }
    }
}
