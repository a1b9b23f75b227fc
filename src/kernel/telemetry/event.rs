use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::kernel::time::{self, Timestamp};

/// Opaque address of a recorded entry.
///
/// Handles are sequence numbers handed out by the store, never references into it.
/// A handle stays valid until its entry is evicted; after that every mutation through
/// it is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryHandle(pub(crate) u64);

impl EntryHandle {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which mutation produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEvent {
    Request,
    Response,
    StreamEvent,
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogEvent::Request => "request",
            LogEvent::Response => "response",
            LogEvent::StreamEvent => "stream_event",
        };
        f.write_str(s)
    }
}

/// One intermediate event of a streaming operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(with = "time::iso_format")]
    pub timestamp: Timestamp,
    pub data: Value,
}

/// One recorded request and, once it completes, its response.
///
/// The request half is fixed at creation. The response half can only be written
/// through [`LogEntry::apply_response`], which keeps `success` tied to `error`.
/// Stream events are expected to arrive before the response; this is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "time::iso_format")]
    pub timestamp: Timestamp,
    pub request_type: String,
    pub operation: String,
    pub name: Option<String>,
    pub parameters: Map<String, Value>,
    pub request_payload: Value,
    response_payload: Option<Value>,
    response_time_ms: Option<f64>,
    error: Option<String>,
    success: bool,
    #[serde(default)]
    streaming: bool,
    #[serde(default)]
    stream_events: Vec<StreamEvent>,
}

impl LogEntry {
    pub fn new(
        request_type: impl Into<String>,
        operation: impl Into<String>,
        name: Option<String>,
        parameters: Map<String, Value>,
        request_payload: Value,
    ) -> Self {
        Self {
            timestamp: time::now(),
            request_type: request_type.into(),
            operation: operation.into(),
            name,
            parameters,
            request_payload,
            response_payload: None,
            response_time_ms: None,
            error: None,
            success: true,
            streaming: false,
            stream_events: Vec::new(),
        }
    }

    pub fn apply_response(
        &mut self,
        payload: Option<Value>,
        error: Option<String>,
        latency_ms: Option<f64>,
    ) {
        self.response_payload = payload;
        self.success = error.is_none();
        self.error = error;
        self.response_time_ms = latency_ms;
    }

    pub fn push_stream_event(&mut self, data: Value) {
        self.streaming = true;
        self.stream_events.push(StreamEvent {
            timestamp: time::now(),
            data,
        });
    }

    pub fn response_payload(&self) -> Option<&Value> {
        self.response_payload.as_ref()
    }

    pub fn response_time_ms(&self) -> Option<f64> {
        self.response_time_ms
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn stream_events(&self) -> &[StreamEvent] {
        &self.stream_events
    }
}
