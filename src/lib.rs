#![forbid(unsafe_code)]

//! Standing reconciliation core.
//!
//! Mediates between a user-facing "desired standing" workflow and an
//! authoritative, periodically-refreshed external ledger of standings.
//! Requests and revocations live in the [`store::EntryStore`]; the
//! [`engine::ReconciliationEngine`] moves them through
//! pending -> actioned -> effective as ledger snapshots arrive, with
//! timeout and grace-period regressions.

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod ports;
pub mod purge;
pub mod store;
pub mod sweep;
pub mod telemetry;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

// Re-export the working set at crate root for convenience.
pub use crate::config::Config;
pub use crate::core::{
    AcceptanceBand, Contact, CoreError, EntityId, EntityKind, EntryId, EntryKind, EntryReason,
    LabelId, LedgerSnapshot, SnapshotId, StandingEntry, UnknownTypeCode, UserId, WallClock,
};
pub use crate::engine::{PassOutcome, ReconciliationEngine, SyncError, SyncReport};
pub use crate::ports::{
    EligibilityChecker, LedgerSource, NotificationSink, NotifyError, OwnerResolver, ResolveError,
    SourceError,
};
pub use crate::purge::{PurgeReport, RetentionPurge};
pub use crate::store::{
    DeleteOutcome, EntryStore, LogEvent, RequestLog, RevocationOutcome, SnapshotStore,
    StandingsState,
};
pub use crate::sweep::ValidationSweep;
