use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use uuid::Uuid;

use super::telemetry::TelemetryLog;
use super::time::{self, Timestamp};
use crate::config::PlaygroundConfig;

/// Everything an operation handler may touch.
///
/// Built once at startup and shared as `Arc<ServerContext>`; there is no other
/// process-wide state.
pub struct ServerContext {
    pub config: PlaygroundConfig,
    pub telemetry: TelemetryLog,
    pub instance_id: Uuid,
    pub started_at: Timestamp,
    started: Instant,
    counter: AtomicU64,
}

impl ServerContext {
    pub fn new(config: PlaygroundConfig) -> Self {
        let telemetry = TelemetryLog::new(&config.telemetry);
        Self {
            config,
            telemetry,
            instance_id: Uuid::new_v4(),
            started_at: time::now(),
            started: Instant::now(),
            counter: AtomicU64::new(0),
        }
    }

    /// Increment the shared counter and return the new value.
    pub fn increment_counter(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn counter(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

impl Default for ServerContext {
    fn default() -> Self {
        Self::new(PlaygroundConfig::default())
    }
}
