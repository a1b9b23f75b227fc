use std::path::PathBuf;
use thiserror::Error;

use super::event::{EntryHandle, LogEvent};

#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The entry behind this handle was already evicted.
    #[error("entry {0} is no longer retained")]
    StaleHandle(EntryHandle),

    #[error("failed to write export {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read export {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Error returned by a [`LogObserver`](super::observer::LogObserver).
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("observer channel closed")]
    Closed,

    #[error("observer panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Failed(String),
}

impl ObserverError {
    pub fn failed(msg: impl Into<String>) -> Self {
        ObserverError::Failed(msg.into())
    }
}

/// A swallowed observer failure, kept for later inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverFailure {
    pub observer: String,
    pub event: LogEvent,
    pub handle: EntryHandle,
    pub message: String,
}
