pub mod config;
pub mod harness;
pub mod kernel;
pub mod services;

// Re-export specific items for convenient access
pub use config::PlaygroundConfig;
pub use kernel::context::ServerContext;
pub use kernel::dispatch::{dispatch, Reply, Request};
pub use kernel::telemetry::TelemetryLog;
