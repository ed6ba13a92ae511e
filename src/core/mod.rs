//! Core domain types for the standings workflow.
//!
//! Module hierarchy follows type dependency order:
//! - time: wall-clock stamps for domain timeouts
//! - identity: id newtypes
//! - domain: EntityKind, EntryKind, EntryReason, AcceptanceBand
//! - contact: Contact, LedgerSnapshot
//! - entry: StandingEntry and its transitions

pub mod contact;
pub mod domain;
pub mod entry;
pub mod error;
pub mod identity;
pub mod time;

pub use contact::{Contact, LedgerSnapshot};
pub use domain::{AcceptanceBand, EntityKind, EntryKind, EntryReason};
pub use entry::StandingEntry;
pub use error::{CoreError, UnknownTypeCode};
pub use identity::{EntityId, EntryId, LabelId, SnapshotId, UserId};
pub use time::{WallClock, MS_PER_DAY, MS_PER_HOUR};
