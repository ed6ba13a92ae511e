//! The standing entry and its transition methods.
//!
//! One type carries both requests and revocations behind a kind tag; the
//! behavioral differences live in the per-kind acceptance band, not a type
//! hierarchy.
//!
//! Per entry: pending -> actioned -> effective, with actioned -> pending on
//! timeout and effective -> pending when the grace period expires on a
//! desatisfied standing. Deletion is the only terminal transition and is an
//! [`EntryStore`](crate::store::EntryStore) operation.

use serde::{Deserialize, Serialize};

use super::domain::{EntityKind, EntryKind, EntryReason};
use super::identity::{EntityId, EntryId, UserId};
use super::time::WallClock;

/// A request for a favorable standing, or a revocation walking one back.
///
/// Fields are private: all mutation flows through the store's documented
/// operations, which call the `pub(crate)` transition methods below.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingEntry {
    id: EntryId,
    kind: EntryKind,
    entity_id: EntityId,
    entity_kind: EntityKind,
    /// Requesting user. Always set for requests; `None` for revocations
    /// synthesized by the engine.
    requested_by: Option<UserId>,
    created_at: WallClock,
    action_by: Option<UserId>,
    action_at: Option<WallClock>,
    is_effective: bool,
    effective_at: Option<WallClock>,
    reason: EntryReason,
}

impl StandingEntry {
    pub(crate) fn new_request(
        id: EntryId,
        user: UserId,
        entity_id: EntityId,
        entity_kind: EntityKind,
        created_at: WallClock,
    ) -> Self {
        Self {
            id,
            kind: EntryKind::Request,
            entity_id,
            entity_kind,
            requested_by: Some(user),
            created_at,
            action_by: None,
            action_at: None,
            is_effective: false,
            effective_at: None,
            reason: EntryReason::UserRequest,
        }
    }

    pub(crate) fn new_revocation(
        id: EntryId,
        entity_id: EntityId,
        entity_kind: EntityKind,
        reason: EntryReason,
        created_at: WallClock,
    ) -> Self {
        Self {
            id,
            kind: EntryKind::Revocation,
            entity_id,
            entity_kind,
            requested_by: None,
            created_at,
            action_by: None,
            action_at: None,
            is_effective: false,
            effective_at: None,
            reason,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn entity_kind(&self) -> EntityKind {
        self.entity_kind
    }

    pub fn requested_by(&self) -> Option<UserId> {
        self.requested_by
    }

    pub fn created_at(&self) -> WallClock {
        self.created_at
    }

    pub fn action_by(&self) -> Option<UserId> {
        self.action_by
    }

    pub fn action_at(&self) -> Option<WallClock> {
        self.action_at
    }

    pub fn is_effective(&self) -> bool {
        self.is_effective
    }

    pub fn effective_at(&self) -> Option<WallClock> {
        self.effective_at
    }

    pub fn reason(&self) -> EntryReason {
        self.reason
    }

    /// Never actioned and not yet confirmed in the ledger.
    pub fn is_pending(&self) -> bool {
        self.action_by.is_none() && !self.is_effective
    }

    /// Actioned by a manager but not yet confirmed in the ledger.
    pub fn is_actioned(&self) -> bool {
        self.action_by.is_some() && !self.is_effective
    }

    /// Mark the standing as confirmed in the external ledger.
    ///
    /// Returns true only on the false -> true transition; repeated calls
    /// leave `effective_at` untouched, which is what makes reconciliation
    /// passes idempotent with respect to notifications.
    pub(crate) fn mark_effective(&mut self, now: WallClock) -> bool {
        if self.is_effective {
            return false;
        }
        self.is_effective = true;
        self.effective_at = Some(now);
        true
    }

    /// Record that a manager has made the change in the external system.
    pub(crate) fn mark_actioned(&mut self, user: UserId, now: WallClock) {
        self.action_by = Some(user);
        self.action_at = Some(now);
    }

    /// Back to the initial creation state: not actioned, not effective.
    pub(crate) fn reset_to_initial(&mut self) {
        self.is_effective = false;
        self.effective_at = None;
        self.action_by = None;
        self.action_at = None;
    }

    /// Clear only the actioned flag (timeout reset); the entry returns to
    /// pending. Returns the actioner that timed out, if any.
    pub(crate) fn clear_action(&mut self) -> Option<UserId> {
        let actioner = self.action_by.take();
        self.action_at = None;
        actioner
    }
}
