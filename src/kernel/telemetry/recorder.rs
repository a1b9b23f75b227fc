use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{ObserverFailure, TelemetryError};
use super::event::{EntryHandle, LogEntry, LogEvent};
use super::export::Exporter;
use super::observer::{LogObserver, ObserverRegistry};
use super::render::TableRenderer;
use super::store::LogStore;
use crate::config::TelemetryConfig;

/// The telemetry log handed to operation handlers.
///
/// Each mutator updates the store under its lock, releases it, then notifies
/// observers with a snapshot of the mutated entry. None of the recording methods can
/// fail from the caller's point of view.
pub struct TelemetryLog {
    store: LogStore,
    observers: ObserverRegistry,
    exporter: Exporter,
    renderer: TableRenderer,
    table_limit: usize,
}

impl TelemetryLog {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            store: LogStore::new(config.capacity),
            observers: ObserverRegistry::new(config.max_observer_failures),
            exporter: Exporter::new(config.export_dir.clone(), config.export_prefix.clone()),
            renderer: TableRenderer,
            table_limit: config.table_limit,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(&TelemetryConfig {
            capacity,
            ..TelemetryConfig::default()
        })
    }

    pub fn register(&self, observer: Arc<dyn LogObserver>) {
        self.observers.register(observer);
    }

    pub fn record_request(
        &self,
        kind: &str,
        operation: &str,
        name: Option<&str>,
        parameters: Map<String, Value>,
        payload: Value,
    ) -> EntryHandle {
        let (handle, entry) = self.store.record_request(kind, operation, name, parameters, payload);

        tracing::info!(
            %handle,
            request_type = kind,
            operation,
            name = name.unwrap_or("-"),
            "REQUEST"
        );
        self.observers.notify(LogEvent::Request, handle, &entry);
        handle
    }

    pub fn record_response(
        &self,
        handle: EntryHandle,
        payload: Option<Value>,
        error: Option<String>,
        latency_ms: Option<f64>,
    ) {
        match self.store.record_response(handle, payload, error, latency_ms) {
            Ok(entry) => {
                tracing::info!(
                    %handle,
                    operation = %entry.operation,
                    success = entry.success(),
                    latency_ms = entry.response_time_ms(),
                    error = entry.error(),
                    "RESPONSE"
                );
                self.observers.notify(LogEvent::Response, handle, &entry);
            }
            Err(e) => tracing::debug!(error = %e, "Response dropped"),
        }
    }

    /// Append a stream event. Call this before the entry's final `record_response`.
    pub fn record_stream_event(&self, handle: EntryHandle, payload: Value) {
        match self.store.record_stream_event(handle, payload) {
            Ok(entry) => {
                tracing::info!(
                    %handle,
                    operation = %entry.operation,
                    events = entry.stream_events().len(),
                    "STREAM"
                );
                self.observers.notify(LogEvent::StreamEvent, handle, &entry);
            }
            Err(e) => tracing::debug!(error = %e, "Stream event dropped"),
        }
    }

    pub fn recent(&self, limit: Option<usize>) -> Vec<LogEntry> {
        self.store.recent(limit)
    }

    pub fn get(&self, handle: EntryHandle) -> Option<LogEntry> {
        self.store.get(handle)
    }

    pub fn export(&self, destination: Option<&Path>) -> Result<PathBuf, TelemetryError> {
        let snapshot = self.store.recent(None);
        self.exporter.export(&snapshot, destination)
    }

    /// Table of the last `limit` entries, or of the configured default count.
    pub fn render(&self, limit: Option<usize>) -> String {
        let limit = limit.unwrap_or(self.table_limit);
        let snapshot = self.store.recent(Some(limit));
        self.renderer.render(&snapshot, None)
    }

    pub fn observer_failures(&self) -> Vec<ObserverFailure> {
        self.observers.failures()
    }

    pub fn take_observer_failures(&self) -> Vec<ObserverFailure> {
        self.observers.take_failures()
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for TelemetryLog {
    fn default() -> Self {
        Self::new(&TelemetryConfig::default())
    }
}
