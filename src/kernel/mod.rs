pub mod context;
pub mod dispatch;
pub mod telemetry;
pub mod time;
