//! Shared mutable stores: the snapshot sequence and the entry table.
//!
//! These are the only shared mutable resources in the core; all mutation
//! goes through their documented operations.

pub mod entries;
pub mod log;
pub mod persist;
pub mod snapshots;

pub use entries::{DeleteOutcome, EntryStore, RevocationOutcome};
pub use log::{LogEvent, LogRecord, RequestLog};
pub use persist::{load, load_or_default, save, PersistError, StandingsState};
pub use snapshots::SnapshotStore;
