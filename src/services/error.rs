use thiserror::Error;

use super::calc::CalcError;
use crate::kernel::telemetry::TelemetryError;

/// Failure of a single operation. Its `Display` text is what gets recorded as the
/// entry's error.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown resource URI: {0}")]
    UnknownResource(String),

    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// Raised on purpose by `fail_on_purpose`.
    #[error("{0}")]
    Intentional(String),

    #[error("Calculation error: {0}")]
    Calculation(#[from] CalcError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl OperationError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        OperationError::InvalidArgument {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
