//! Append-only store of ledger snapshots.
//!
//! Snapshot ids are monotonic, so the newest snapshot is the max key.
//! Creation is atomic: either a full new snapshot with all contacts exists,
//! or the prior one remains latest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{Contact, EntityId, EntityKind, LedgerSnapshot, SnapshotId, WallClock};

/// Stores immutable, timestamped snapshots of the external ledger.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SnapshotStore {
    by_id: BTreeMap<SnapshotId, LedgerSnapshot>,
    next_id: u64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new immutable snapshot built from a fetched contact list.
    pub fn create(&mut self, contacts: Vec<Contact>, now: WallClock) -> SnapshotId {
        self.next_id += 1;
        let id = SnapshotId::new(self.next_id);
        let snapshot = LedgerSnapshot::new(id, now, contacts);
        tracing::debug!(snapshot = %id, contacts = snapshot.len(), "stored new ledger snapshot");
        self.by_id.insert(id, snapshot);
        id
    }

    /// The most recently completed snapshot, if any has ever been created.
    pub fn latest(&self) -> Option<&LedgerSnapshot> {
        self.by_id.values().next_back()
    }

    pub fn get(&self, id: SnapshotId) -> Option<&LedgerSnapshot> {
        self.by_id.get(&id)
    }

    /// Standing for the entity in the given snapshot; `None` when absent.
    pub fn standing_for(
        &self,
        id: SnapshotId,
        entity_id: EntityId,
        entity_kind: EntityKind,
    ) -> Option<f64> {
        self.get(id)?.standing_for(entity_id, entity_kind)
    }

    /// Delete snapshots created before `cutoff`, always preserving the
    /// single newest snapshot even if it is stale. Returns the count
    /// removed.
    pub(crate) fn remove_older_than(&mut self, cutoff: WallClock) -> usize {
        let Some(newest) = self.by_id.keys().next_back().copied() else {
            return 0;
        };
        let before = self.by_id.len();
        self.by_id
            .retain(|id, snapshot| *id == newest || snapshot.created_at() >= cutoff);
        before - self.by_id.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerSnapshot> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
