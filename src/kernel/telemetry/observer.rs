use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::error::{ObserverError, ObserverFailure};
use super::event::{EntryHandle, LogEntry, LogEvent};

pub const DEFAULT_MAX_FAILURES: usize = 100;

/// Receives the full state of an entry after every mutation.
///
/// Observers run on the recording thread, after the store lock is released. They
/// should return quickly; a slow observer slows recorders down but cannot deadlock
/// them.
pub trait LogObserver: Send + Sync {
    fn name(&self) -> &str;

    fn on_event(
        &self,
        event: LogEvent,
        handle: EntryHandle,
        entry: &LogEntry,
    ) -> Result<(), ObserverError>;
}

/// Adapts a closure into a [`LogObserver`].
pub struct FnObserver<F> {
    name: String,
    f: F,
}

impl<F> FnObserver<F>
where
    F: Fn(LogEvent, EntryHandle, &LogEntry) -> Result<(), ObserverError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> LogObserver for FnObserver<F>
where
    F: Fn(LogEvent, EntryHandle, &LogEntry) -> Result<(), ObserverError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(
        &self,
        event: LogEvent,
        handle: EntryHandle,
        entry: &LogEntry,
    ) -> Result<(), ObserverError> {
        (self.f)(event, handle, entry)
    }
}

/// A notification forwarded by [`ChannelObserver`].
#[derive(Debug, Clone)]
pub struct LogUpdate {
    pub event: LogEvent,
    pub handle: EntryHandle,
    pub entry: LogEntry,
}

/// Forwards every update into an unbounded channel for real-time consumers.
pub struct ChannelObserver {
    name: String,
    tx: mpsc::UnboundedSender<LogUpdate>,
}

impl ChannelObserver {
    pub fn new(name: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<LogUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { name: name.into(), tx }, rx)
    }
}

impl LogObserver for ChannelObserver {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(
        &self,
        event: LogEvent,
        handle: EntryHandle,
        entry: &LogEntry,
    ) -> Result<(), ObserverError> {
        self.tx
            .send(LogUpdate { event, handle, entry: entry.clone() })
            .map_err(|_| ObserverError::Closed)
    }
}

/// Ordered set of observers with per-observer failure isolation.
pub struct ObserverRegistry {
    observers: RwLock<Vec<Arc<dyn LogObserver>>>,
    failures: Mutex<VecDeque<ObserverFailure>>,
    max_failures: usize,
}

impl ObserverRegistry {
    pub fn new(max_failures: usize) -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            max_failures: max_failures.max(1),
        }
    }

    pub fn register(&self, observer: Arc<dyn LogObserver>) {
        tracing::debug!(observer = observer.name(), "Observer registered");
        self.observers.write().push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Call every observer once, in registration order.
    ///
    /// Errors and panics are logged and queued on the failure channel; they never reach
    /// the caller and never stop the remaining observers.
    pub fn notify(&self, event: LogEvent, handle: EntryHandle, entry: &LogEntry) {
        // Clone the list so an observer may register another without deadlocking.
        let observers: Vec<Arc<dyn LogObserver>> = self.observers.read().clone();

        for observer in observers {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| observer.on_event(event, handle, entry)));
            let err = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(payload) => ObserverError::Panicked(panic_message(payload.as_ref())),
            };

            tracing::warn!(
                observer = observer.name(),
                %event,
                %handle,
                error = %err,
                "Log observer failed"
            );
            self.push_failure(ObserverFailure {
                observer: observer.name().to_string(),
                event,
                handle,
                message: err.to_string(),
            });
        }
    }

    /// Reported failures, oldest first. The channel keeps the most recent ones only.
    pub fn failures(&self) -> Vec<ObserverFailure> {
        self.failures.lock().iter().cloned().collect()
    }

    pub fn take_failures(&self) -> Vec<ObserverFailure> {
        self.failures.lock().drain(..).collect()
    }

    fn push_failure(&self, failure: ObserverFailure) {
        let mut failures = self.failures.lock();
        if failures.len() >= self.max_failures {
            failures.pop_front();
        }
        failures.push_back(failure);
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FAILURES)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
