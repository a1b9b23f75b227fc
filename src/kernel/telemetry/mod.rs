//! Request/response telemetry log.
//!
//! # CAPACITY INVARIANT
//! The store holds at most `capacity` entries. Once full, every new request evicts the
//! oldest entry (strict FIFO). Recording never blocks on capacity.
//!
//! # LOCKING INVARIANT
//! All store mutations and snapshots go through a single mutex. Observers are notified
//! after that lock is released, with a cloned snapshot of the entry.
//!
//! # FAILURE INVARIANT
//! Recording never fails for the caller. A stale handle is a silent no-op and a failing
//! observer is logged and queued on the registry's failure channel. Only `export`
//! surfaces errors.

pub mod error;
pub mod event;
pub mod export;
pub mod observer;
pub mod recorder;
pub mod render;
pub mod store;

pub use error::{ObserverError, ObserverFailure, TelemetryError};
pub use event::{EntryHandle, LogEntry, LogEvent, StreamEvent};
pub use export::Exporter;
pub use observer::{ChannelObserver, FnObserver, LogObserver, LogUpdate, ObserverRegistry};
pub use recorder::TelemetryLog;
pub use render::TableRenderer;
pub use store::LogStore;
