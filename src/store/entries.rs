//! Store of standing entries (requests and revocations).
//!
//! All entry mutation flows through this store's documented operations;
//! each one appends to the request log. The side-effecting [`delete`]
//! is the mechanism by which "a standing once granted is always explicitly
//! walked back": deleting an actioned or effective request synthesizes a
//! compensating revocation atomically with the delete.
//!
//! [`delete`]: EntryStore::delete

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{
    CoreError, EntityId, EntityKind, EntryId, EntryKind, EntryReason, StandingEntry, UserId,
    WallClock,
};

use super::log::{LogEvent, RequestLog};

/// Result of attempting to create a revocation.
///
/// `AlreadyPending` is a normal negative result, not an error: the existing
/// pending revocation is sufficient and no duplicate external action should
/// be taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevocationOutcome {
    Created(EntryId),
    AlreadyPending(EntryId),
}

impl RevocationOutcome {
    pub fn id(self) -> EntryId {
        match self {
            Self::Created(id) | Self::AlreadyPending(id) => id,
        }
    }

    pub fn is_created(self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// What a delete did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: StandingEntry,
    /// Revocation synthesized because the deleted entry was an actioned or
    /// effective request with no pending revocation.
    pub synthesized_revocation: Option<EntryId>,
}

/// Persists standing entries and supports the queries the engine needs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EntryStore {
    by_id: BTreeMap<EntryId, StandingEntry>,
    next_id: u64,
    log: RequestLog,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> EntryId {
        self.next_id += 1;
        EntryId::new(self.next_id)
    }

    /// Add a new standings request.
    ///
    /// Idempotent: if any request already exists for the `(entity, kind)`
    /// pair it is returned unchanged rather than duplicated.
    pub fn add_request(
        &mut self,
        user: UserId,
        entity_id: EntityId,
        entity_kind: EntityKind,
        now: WallClock,
    ) -> EntryId {
        if let Some(existing) = self.by_id.values().find(|e| {
            e.kind() == EntryKind::Request
                && e.entity_id() == entity_id
                && e.entity_kind() == entity_kind
        }) {
            tracing::debug!(
                entity = %entity_id,
                entry = %existing.id(),
                "request already exists, returning existing"
            );
            return existing.id();
        }

        let id = self.next_id();
        tracing::debug!(entity = %entity_id, user = %user, entry = %id, "adding standings request");
        self.by_id.insert(
            id,
            StandingEntry::new_request(id, user, entity_id, entity_kind, now),
        );
        self.log
            .append(now, id, entity_id, EntryKind::Request, LogEvent::RequestCreated);
        id
    }

    /// Add a new standings revocation.
    ///
    /// At most one pending revocation may exist per entity; a second attempt
    /// returns [`RevocationOutcome::AlreadyPending`] without creating an
    /// entry, so no duplicate external action is ever queued.
    pub fn add_revocation(
        &mut self,
        entity_id: EntityId,
        entity_kind: EntityKind,
        reason: EntryReason,
        now: WallClock,
    ) -> RevocationOutcome {
        if let Some(pending) = self.find_pending_revocation(entity_id) {
            tracing::debug!(
                entity = %entity_id,
                entry = %pending,
                "revocation already pending, not creating another"
            );
            return RevocationOutcome::AlreadyPending(pending);
        }

        let id = self.next_id();
        tracing::debug!(entity = %entity_id, entry = %id, "adding standings revocation");
        self.by_id.insert(
            id,
            StandingEntry::new_revocation(id, entity_id, entity_kind, reason, now),
        );
        self.log.append(
            now,
            id,
            entity_id,
            EntryKind::Revocation,
            LogEvent::RevocationCreated,
        );
        RevocationOutcome::Created(id)
    }

    /// Side-effecting delete.
    ///
    /// If the deleted entry is a request that was actioned or effective and
    /// no pending revocation exists for its entity, a compensating
    /// revocation is synthesized before the delete returns - both happen or
    /// neither does. Returns `None` if the id is unknown.
    pub fn delete(&mut self, id: EntryId, now: WallClock) -> Option<DeleteOutcome> {
        self.delete_with_reason(id, EntryReason::RequestWithdrawn, now)
    }

    /// [`delete`](Self::delete) with an explicit reason recorded on any
    /// synthesized revocation.
    pub fn delete_with_reason(
        &mut self,
        id: EntryId,
        reason: EntryReason,
        now: WallClock,
    ) -> Option<DeleteOutcome> {
        let entry = self.by_id.get(&id)?.clone();

        let needs_revocation = entry.kind() == EntryKind::Request
            && (entry.action_by().is_some() || entry.is_effective())
            && self.find_pending_revocation(entry.entity_id()).is_none();

        let deleted = self.by_id.remove(&id).expect("entry present");
        self.log
            .append(now, id, entry.entity_id(), entry.kind(), LogEvent::Deleted);

        let synthesized_revocation = if needs_revocation {
            let rev_id = self.next_id();
            tracing::debug!(
                entity = %entry.entity_id(),
                request = %id,
                revocation = %rev_id,
                "synthesizing revocation for deleted request"
            );
            self.by_id.insert(
                rev_id,
                StandingEntry::new_revocation(
                    rev_id,
                    entry.entity_id(),
                    entry.entity_kind(),
                    reason,
                    now,
                ),
            );
            self.log.append(
                now,
                rev_id,
                entry.entity_id(),
                EntryKind::Revocation,
                LogEvent::RevocationSynthesized,
            );
            Some(rev_id)
        } else {
            None
        };

        Some(DeleteOutcome {
            deleted,
            synthesized_revocation,
        })
    }

    /// Convert a pending revocation back into a request owned by `owner`.
    ///
    /// Returns the request id, or `None` if no revocation exists for the
    /// entity.
    pub fn undo_revocation(
        &mut self,
        entity_id: EntityId,
        owner: UserId,
        now: WallClock,
    ) -> Option<EntryId> {
        let revocation = self
            .by_id
            .values()
            .find(|e| e.kind() == EntryKind::Revocation && e.entity_id() == entity_id)?
            .clone();

        tracing::debug!(entity = %entity_id, "undoing revocation");
        let request = self.add_request(owner, entity_id, revocation.entity_kind(), now);
        self.by_id.remove(&revocation.id());
        self.log.append(
            now,
            revocation.id(),
            entity_id,
            EntryKind::Revocation,
            LogEvent::Deleted,
        );
        Some(request)
    }

    /// Remove every request for the entity through the side-effecting
    /// delete. Returns the count removed.
    pub fn remove_requests(&mut self, entity_id: EntityId, now: WallClock) -> usize {
        let ids: Vec<EntryId> = self
            .by_id
            .values()
            .filter(|e| e.kind() == EntryKind::Request && e.entity_id() == entity_id)
            .map(StandingEntry::id)
            .collect();
        tracing::debug!(entity = %entity_id, count = ids.len(), "removing requests for entity");
        for id in &ids {
            self.delete(*id, now);
        }
        ids.len()
    }

    /// Remove every request belonging to the user through the
    /// side-effecting delete. Returns the count removed.
    pub fn delete_for_user(&mut self, user: UserId, now: WallClock) -> usize {
        let ids: Vec<EntryId> = self
            .by_id
            .values()
            .filter(|e| e.kind() == EntryKind::Request && e.requested_by() == Some(user))
            .map(StandingEntry::id)
            .collect();
        for id in &ids {
            self.delete(*id, now);
        }
        ids.len()
    }

    // ---- queries ----

    pub fn get(&self, id: EntryId) -> Option<&StandingEntry> {
        self.by_id.get(&id)
    }

    /// A request exists that was never actioned and is not effective.
    pub fn pending_request(&self, entity_id: EntityId) -> bool {
        self.by_id
            .values()
            .any(|e| e.kind() == EntryKind::Request && e.entity_id() == entity_id && e.is_pending())
    }

    /// A request exists that was actioned but is not yet effective.
    pub fn actioned_request(&self, entity_id: EntityId) -> bool {
        self.by_id
            .values()
            .any(|e| e.kind() == EntryKind::Request && e.entity_id() == entity_id && e.is_actioned())
    }

    /// A non-effective revocation exists for the entity.
    pub fn pending_revocation(&self, entity_id: EntityId) -> bool {
        self.find_pending_revocation(entity_id).is_some()
    }

    fn find_pending_revocation(&self, entity_id: EntityId) -> Option<EntryId> {
        self.by_id
            .values()
            .find(|e| {
                e.kind() == EntryKind::Revocation
                    && e.entity_id() == entity_id
                    && !e.is_effective()
            })
            .map(StandingEntry::id)
    }

    /// Ids of every entry of the given kind, in id (creation) order.
    pub fn entry_ids(&self, kind: EntryKind) -> Vec<EntryId> {
        self.by_id
            .values()
            .filter(|e| e.kind() == kind)
            .map(StandingEntry::id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StandingEntry> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn log(&self) -> &RequestLog {
        &self.log
    }

    // ---- engine-facing mutations ----

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut StandingEntry, CoreError> {
        self.by_id.get_mut(&id).ok_or(CoreError::NoSuchEntry(id))
    }

    /// Record that a manager actioned the entry in the external system.
    pub fn mark_actioned(
        &mut self,
        id: EntryId,
        user: UserId,
        now: WallClock,
    ) -> Result<(), CoreError> {
        let entry = self.entry_mut(id)?;
        entry.mark_actioned(user, now);
        let (entity_id, kind) = (entry.entity_id(), entry.kind());
        self.log.append(now, id, entity_id, kind, LogEvent::Actioned);
        Ok(())
    }

    /// Mark the entry effective. Returns true only on the false -> true
    /// transition.
    pub fn mark_effective(&mut self, id: EntryId, now: WallClock) -> Result<bool, CoreError> {
        let entry = self.entry_mut(id)?;
        let transitioned = entry.mark_effective(now);
        if transitioned {
            let (entity_id, kind) = (entry.entity_id(), entry.kind());
            self.log.append(now, id, entity_id, kind, LogEvent::Effective);
        }
        Ok(transitioned)
    }

    /// Reset the entry to its initial creation state.
    pub fn reset_to_initial(&mut self, id: EntryId, now: WallClock) -> Result<(), CoreError> {
        let entry = self.entry_mut(id)?;
        entry.reset_to_initial();
        let (entity_id, kind) = (entry.entity_id(), entry.kind());
        self.log
            .append(now, id, entity_id, kind, LogEvent::ResetToInitial);
        Ok(())
    }

    /// Clear only the actioned flag (timeout reset). Returns the actioner
    /// that timed out, if any.
    pub fn clear_action(&mut self, id: EntryId, now: WallClock) -> Result<Option<UserId>, CoreError> {
        let entry = self.entry_mut(id)?;
        let actioner = entry.clear_action();
        let (entity_id, kind) = (entry.entity_id(), entry.kind());
        self.log
            .append(now, id, entity_id, kind, LogEvent::ActionTimedOut);
        Ok(actioner)
    }
}
