//! Harness configuration.
//!
//! Every section has defaults, so an empty file (or no file) is a valid config.
//! Loading separates syntactic checks (serde) from semantic ones (`validate`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::kernel::telemetry::export::DEFAULT_PREFIX;
use crate::kernel::telemetry::observer::DEFAULT_MAX_FAILURES;
use crate::kernel::telemetry::store::DEFAULT_CAPACITY;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    pub telemetry: TelemetryConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Maximum number of entries kept in memory.
    pub capacity: usize,

    /// Directory for exports written without an explicit destination.
    pub export_dir: PathBuf,

    /// File name prefix for default export names.
    pub export_prefix: String,

    /// Rows shown by the log table when no limit is given.
    pub table_limit: usize,

    /// Observer failures kept for inspection.
    pub max_observer_failures: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            export_dir: PathBuf::from("."),
            export_prefix: DEFAULT_PREFIX.to_string(),
            table_limit: 20,
            max_observer_failures: DEFAULT_MAX_FAILURES,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,

    /// Pause between countdown stream events.
    pub countdown_delay_ms: u64,

    /// Largest accepted countdown start value.
    pub max_countdown: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "MCP Playground Server".to_string(),
            version: "1.0.0".to_string(),
            countdown_delay_ms: 100,
            max_countdown: 10,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<PlaygroundConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<PlaygroundConfig, ConfigError> {
    let config: PlaygroundConfig = toml::from_str(content)?;
    validate(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Returns every problem found, not just the first.
pub fn validate(config: &PlaygroundConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.telemetry.capacity == 0 {
        errors.push("telemetry.capacity must be greater than 0".to_string());
    }
    if config.telemetry.export_prefix.is_empty() {
        errors.push("telemetry.export_prefix must not be empty".to_string());
    }
    if config.telemetry.table_limit == 0 {
        errors.push("telemetry.table_limit must be greater than 0".to_string());
    }
    if config.server.name.trim().is_empty() {
        errors.push("server.name must not be empty".to_string());
    }
    if !(1..=100).contains(&config.server.max_countdown) {
        errors.push("server.max_countdown must be between 1 and 100".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
