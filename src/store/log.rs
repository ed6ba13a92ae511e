//! Append-only log of entry-store actions.
//!
//! One record per store mutation. Read-only after the fact; there is no
//! richer audit trail than this by design.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, EntryId, EntryKind, WallClock};

/// What happened to an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEvent {
    RequestCreated,
    RevocationCreated,
    /// A revocation synthesized while deleting an actioned/effective request.
    RevocationSynthesized,
    Actioned,
    Effective,
    ActionTimedOut,
    ResetToInitial,
    Deleted,
}

/// One logged store action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub at: WallClock,
    pub entry_id: EntryId,
    pub entity_id: EntityId,
    pub kind: EntryKind,
    pub event: LogEvent,
}

/// The append-only record sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestLog {
    records: Vec<LogRecord>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(
        &mut self,
        at: WallClock,
        entry_id: EntryId,
        entity_id: EntityId,
        kind: EntryKind,
        event: LogEvent,
    ) {
        self.records.push(LogRecord {
            at,
            entry_id,
            entity_id,
            kind,
            event,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
