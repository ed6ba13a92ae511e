//! Ledger contacts and immutable snapshots.
//!
//! A snapshot is the external ledger's contact list at one point in time.
//! Contacts are held sorted by `(entity_id, entity_kind)` and deduplicated
//! at construction, so the at-most-one-contact-per-pair invariant holds by
//! construction and point lookups are a binary search.

use serde::{Deserialize, Serialize};

use super::domain::EntityKind;
use super::error::UnknownTypeCode;
use super::identity::{EntityId, LabelId, SnapshotId};
use super::time::WallClock;

/// One relationship value from the external ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub entity_id: EntityId,
    pub entity_kind: EntityKind,
    pub standing: f64,
    pub labels: Vec<LabelId>,
}

impl Contact {
    pub fn new(entity_id: EntityId, entity_kind: EntityKind, standing: f64) -> Self {
        Self {
            entity_id,
            entity_kind,
            standing,
            labels: Vec::new(),
        }
    }

    pub fn with_labels(mut self, labels: Vec<LabelId>) -> Self {
        self.labels = labels;
        self
    }

    /// Build a contact from raw source data, classifying the type code.
    ///
    /// This is the ingestion boundary: raw codes never travel past it.
    pub fn from_raw(
        entity_id: u64,
        type_code: u32,
        standing: f64,
        labels: Vec<u64>,
    ) -> Result<Self, UnknownTypeCode> {
        Ok(Self {
            entity_id: EntityId::new(entity_id),
            entity_kind: EntityKind::from_type_code(type_code)?,
            standing,
            labels: labels.into_iter().map(LabelId::new).collect(),
        })
    }

    fn key(&self) -> (EntityId, EntityKind) {
        (self.entity_id, self.entity_kind)
    }
}

/// Immutable, timestamped copy of the external standings ledger.
///
/// Append-only: a new snapshot never mutates a prior one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    id: SnapshotId,
    created_at: WallClock,
    contacts: Vec<Contact>,
}

impl LedgerSnapshot {
    /// Build a snapshot from a fetched contact list.
    ///
    /// Duplicate `(entity_id, entity_kind)` pairs collapse to the last
    /// occurrence, matching how the source reports amended contacts.
    pub(crate) fn new(id: SnapshotId, created_at: WallClock, contacts: Vec<Contact>) -> Self {
        let mut contacts = contacts;
        // Stable sort: among duplicates the last occurrence sorts last and
        // survives the dedup below.
        contacts.sort_by_key(Contact::key);
        let before = contacts.len();
        contacts.dedup_by(|next, prev| {
            if next.key() == prev.key() {
                *prev = next.clone();
                true
            } else {
                false
            }
        });
        if contacts.len() != before {
            tracing::debug!(
                snapshot = %id,
                dropped = before - contacts.len(),
                "collapsed duplicate contacts at ingestion"
            );
        }
        Self {
            id,
            created_at,
            contacts,
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn created_at(&self) -> WallClock {
        self.created_at
    }

    /// Point lookup; `None` means the entity is absent from the ledger.
    pub fn standing_for(&self, entity_id: EntityId, entity_kind: EntityKind) -> Option<f64> {
        self.contact_for(entity_id, entity_kind).map(|c| c.standing)
    }

    pub fn contact_for(&self, entity_id: EntityId, entity_kind: EntityKind) -> Option<&Contact> {
        self.contacts
            .binary_search_by_key(&(entity_id, entity_kind), Contact::key)
            .ok()
            .map(|idx| &self.contacts[idx])
    }

    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
