//! The standing reconciliation state machine.
//!
//! One sync cycle: fetch a fresh contact list, store it as a new snapshot,
//! then process every open request followed by every open revocation
//! against the latest snapshot. A fetch failure aborts the whole cycle
//! before any entry is touched; per-entry failures are isolated and
//! retried on the next cycle because the persisted state is unchanged.

use thiserror::Error;

use crate::config::Config;
use crate::core::{EntryKind, SnapshotId, StandingEntry, UserId, WallClock};
use crate::ports::{LedgerSource, NotificationSink, OwnerResolver, SourceError};
use crate::store::{EntryStore, SnapshotStore};

/// Errors that abort a whole sync cycle.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    /// The external ledger fetch failed; the prior snapshot remains
    /// authoritative and no entry was processed.
    #[error(transparent)]
    SourceUnavailable(#[from] SourceError),
}

/// Counters for one `process_entries` pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassOutcome {
    pub examined: usize,
    pub newly_effective: usize,
    pub grace_resets: usize,
    pub action_timeouts: usize,
    pub errors: usize,
}

/// Result of one full sync cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncReport {
    pub snapshot_id: SnapshotId,
    pub requests: PassOutcome,
    pub revocations: PassOutcome,
}

/// The reconciliation state machine.
///
/// Holds configuration and the notification collaborators; the shared
/// stores are passed into each run so the host controls their lifetime.
pub struct ReconciliationEngine<'a> {
    config: &'a Config,
    notifier: &'a dyn NotificationSink,
    owners: &'a dyn OwnerResolver,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(
        config: &'a Config,
        notifier: &'a dyn NotificationSink,
        owners: &'a dyn OwnerResolver,
    ) -> Self {
        Self {
            config,
            notifier,
            owners,
        }
    }

    /// Run one full sync cycle: fetch, snapshot, reconcile requests, then
    /// revocations.
    pub fn run_sync_cycle(
        &self,
        source: &dyn LedgerSource,
        snapshots: &mut SnapshotStore,
        entries: &mut EntryStore,
        now: WallClock,
    ) -> Result<SyncReport, SyncError> {
        tracing::info!("standings sync cycle started");
        let contacts = source.fetch_contacts(self.config.source_owner)?;
        let snapshot_id = snapshots.create(contacts, now);

        let requests = self.process_entries(EntryKind::Request, snapshots, entries, now);
        let revocations = self.process_entries(EntryKind::Revocation, snapshots, entries, now);

        tracing::info!(
            snapshot = %snapshot_id,
            requests = requests.examined,
            revocations = revocations.examined,
            "standings sync cycle finished"
        );
        Ok(SyncReport {
            snapshot_id,
            requests,
            revocations,
        })
    }

    /// Process every open entry of `kind` against the latest snapshot.
    ///
    /// No snapshot yet means a graceful no-op. Entries are independent:
    /// no transition depends on another entry's, and a per-entry failure
    /// never aborts the batch.
    pub fn process_entries(
        &self,
        kind: EntryKind,
        snapshots: &SnapshotStore,
        entries: &mut EntryStore,
        now: WallClock,
    ) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        let Some(snapshot_id) = snapshots.latest().map(|s| s.id()) else {
            tracing::debug!("no ledger snapshot available, skipping pass");
            return outcome;
        };

        for id in entries.entry_ids(kind) {
            let Some(entry) = entries.get(id).cloned() else {
                continue;
            };
            outcome.examined += 1;

            let standing =
                snapshots.standing_for(snapshot_id, entry.entity_id(), entry.entity_kind());
            let satisfied = self.config.band_for(kind).satisfied_by(standing);

            if satisfied {
                self.settle_satisfied(&entry, entries, now, &mut outcome);
            } else if entry.is_effective() {
                self.maybe_reset_after_grace(&entry, entries, now, &mut outcome);
            } else {
                self.maybe_reset_timed_out_action(&entry, entries, now, &mut outcome);
            }
        }
        outcome
    }

    /// The ledger reflects the entry's desired standing: mark effective and
    /// notify exactly once.
    fn settle_satisfied(
        &self,
        entry: &StandingEntry,
        entries: &mut EntryStore,
        now: WallClock,
        outcome: &mut PassOutcome,
    ) {
        match entries.mark_effective(entry.id(), now) {
            Ok(true) => {
                tracing::debug!(entity = %entry.entity_id(), entry = %entry.id(), "standing now effective");
                outcome.newly_effective += 1;
                self.notify_effective(entry, outcome);
            }
            Ok(false) => {} // already effective, nothing to do or re-notify
            Err(e) => {
                tracing::warn!(entry = %entry.id(), "mark_effective failed: {e}");
                outcome.errors += 1;
            }
        }
    }

    /// Previously-confirmed standing no longer in the ledger: reset once
    /// the grace period has elapsed. The grace period exists so a transient
    /// single-cycle ledger gap does not immediately un-confirm an entry.
    fn maybe_reset_after_grace(
        &self,
        entry: &StandingEntry,
        entries: &mut EntryStore,
        now: WallClock,
        outcome: &mut PassOutcome,
    ) {
        let Some(effective_at) = entry.effective_at() else {
            tracing::warn!(entry = %entry.id(), "effective entry without effective_at");
            outcome.errors += 1;
            return;
        };
        if now <= effective_at.plus_hours(self.config.effective_grace_hours) {
            return;
        }
        tracing::info!(
            entity = %entry.entity_id(),
            entry = %entry.id(),
            "standing marked effective but no longer satisfied in ledger, resetting to initial"
        );
        if let Err(e) = entries.reset_to_initial(entry.id(), now) {
            tracing::warn!(entry = %entry.id(), "reset_to_initial failed: {e}");
            outcome.errors += 1;
            return;
        }
        outcome.grace_resets += 1;
    }

    /// Actioned but never confirmed: clear the actioned flag after the
    /// timeout and tell both the actioner and the requestor.
    fn maybe_reset_timed_out_action(
        &self,
        entry: &StandingEntry,
        entries: &mut EntryStore,
        now: WallClock,
        outcome: &mut PassOutcome,
    ) {
        let Some(action_at) = entry.action_at() else {
            return; // never actioned, cannot time out
        };
        if now <= action_at.plus_hours(self.config.action_timeout_hours) {
            return;
        }
        let actioner = match entries.clear_action(entry.id(), now) {
            Ok(actioner) => actioner,
            Err(e) => {
                tracing::warn!(entry = %entry.id(), "clear_action failed: {e}");
                outcome.errors += 1;
                return;
            }
        };
        tracing::info!(
            entity = %entry.entity_id(),
            entry = %entry.id(),
            "standing action timed out, resetting actioned flag"
        );
        outcome.action_timeouts += 1;

        let title = format!("Standing request reset for entity {}", entry.entity_id());
        let message = format!(
            "The standing {} for entity {} was reset because it did not \
             appear in the ledger before the timeout period expired.",
            entry.kind().as_str(),
            entry.entity_id()
        );
        if let Some(actioner) = actioner {
            self.notify(actioner, &title, &message);
        }
        if let Some(requestor) = entry.requested_by() {
            self.notify(requestor, &title, &message);
        }
    }

    /// One-shot "now effective" notification.
    ///
    /// Requests notify their requestor. Person-level revocations notify the
    /// entity's owner when resolvable; group-level entities have no single
    /// owner, so group revocations (which carry no requestor) notify no
    /// one.
    fn notify_effective(&self, entry: &StandingEntry, outcome: &mut PassOutcome) {
        let target = match entry.kind() {
            EntryKind::Request => entry.requested_by(),
            EntryKind::Revocation => {
                if entry.entity_kind().is_person_level() {
                    match self.owners.owner_of(entry.entity_id()) {
                        Ok(owner) => owner,
                        Err(e) => {
                            tracing::warn!(entity = %entry.entity_id(), "owner lookup failed: {e}");
                            outcome.errors += 1;
                            None
                        }
                    }
                } else {
                    entry.requested_by()
                }
            }
        };
        let Some(user) = target else {
            return;
        };

        let (title, message) = match entry.kind() {
            EntryKind::Request => (
                format!("Standing for entity {} now in effect", entry.entity_id()),
                format!(
                    "Entity {} now has a favorable standing with the organization.",
                    entry.entity_id()
                ),
            ),
            EntryKind::Revocation => (
                format!("Standing for entity {} revoked", entry.entity_id()),
                format!(
                    "Entity {} no longer has a favorable standing with the organization.",
                    entry.entity_id()
                ),
            ),
        };
        self.notify(user, &title, &message);
    }

    fn notify(&self, user: UserId, title: &str, message: &str) {
        if !self.config.notifications_enabled {
            return;
        }
        if let Err(e) = self.notifier.notify(user, title, message) {
            tracing::warn!("notification delivery failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::core::{Contact, EntityId, EntityKind, EntryReason};
    use crate::ports::{NotifyError, ResolveError};

    #[derive(Default)]
    struct RecordingSink {
        sent: RefCell<Vec<(UserId, String)>>,
    }

    impl NotificationSink for RecordingSink {
        fn notify(&self, user: UserId, title: &str, _message: &str) -> Result<(), NotifyError> {
            self.sent.borrow_mut().push((user, title.to_string()));
            Ok(())
        }
    }

    struct StaticOwners(Option<UserId>);

    impl OwnerResolver for StaticOwners {
        fn owner_of(&self, _entity_id: EntityId) -> Result<Option<UserId>, ResolveError> {
            Ok(self.0)
        }
    }

    struct FailingOwners;

    impl OwnerResolver for FailingOwners {
        fn owner_of(&self, entity_id: EntityId) -> Result<Option<UserId>, ResolveError> {
            Err(ResolveError {
                entity_id,
                reason: "auth backend down".to_string(),
            })
        }
    }

    const T0: WallClock = WallClock(1_000_000);

    fn character(id: u64, standing: f64) -> Contact {
        Contact::new(EntityId::new(id), EntityKind::Character, standing)
    }

    #[test]
    fn no_snapshot_is_a_graceful_noop() {
        let config = Config::default();
        let sink = RecordingSink::default();
        let engine = ReconciliationEngine::new(&config, &sink, &StaticOwners(None));

        let snapshots = SnapshotStore::new();
        let mut entries = EntryStore::new();
        entries.add_request(UserId::new(1), EntityId::new(10), EntityKind::Character, T0);

        let outcome = engine.process_entries(EntryKind::Request, &snapshots, &mut entries, T0);
        assert_eq!(outcome, PassOutcome::default());
    }

    #[test]
    fn satisfied_request_becomes_effective_and_notifies_once() {
        let config = Config::default();
        let sink = RecordingSink::default();
        let engine = ReconciliationEngine::new(&config, &sink, &StaticOwners(None));

        let mut snapshots = SnapshotStore::new();
        snapshots.create(vec![character(10, 5.0)], T0);
        let mut entries = EntryStore::new();
        let id = entries.add_request(UserId::new(1), EntityId::new(10), EntityKind::Character, T0);

        let first = engine.process_entries(EntryKind::Request, &snapshots, &mut entries, T0);
        assert_eq!(first.newly_effective, 1);
        let effective_at = entries.get(id).unwrap().effective_at();
        assert!(effective_at.is_some());

        // Second pass over the same snapshot: no second notification and
        // effective_at unchanged.
        let second = engine.process_entries(EntryKind::Request, &snapshots, &mut entries, WallClock(T0.0 + 60_000));
        assert_eq!(second.newly_effective, 0);
        assert_eq!(entries.get(id).unwrap().effective_at(), effective_at);
        assert_eq!(sink.sent.borrow().len(), 1);
        assert_eq!(sink.sent.borrow()[0].0, UserId::new(1));
    }

    #[test]
    fn revocation_satisfied_by_absence_notifies_owner() {
        let config = Config::default();
        let sink = RecordingSink::default();
        let owners = StaticOwners(Some(UserId::new(77)));
        let engine = ReconciliationEngine::new(&config, &sink, &owners);

        let mut snapshots = SnapshotStore::new();
        snapshots.create(vec![], T0);
        let mut entries = EntryStore::new();
        entries.add_revocation(
            EntityId::new(10),
            EntityKind::Character,
            EntryReason::Manual,
            T0,
        );

        let outcome = engine.process_entries(EntryKind::Revocation, &snapshots, &mut entries, T0);
        assert_eq!(outcome.newly_effective, 1);
        let sent = sink.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, UserId::new(77));
        assert!(sent[0].1.contains("revoked"));
    }

    #[test]
    fn owner_lookup_failure_is_isolated() {
        let config = Config::default();
        let sink = RecordingSink::default();
        let engine = ReconciliationEngine::new(&config, &sink, &FailingOwners);

        let mut snapshots = SnapshotStore::new();
        snapshots.create(vec![], T0);
        let mut entries = EntryStore::new();
        let a = entries.add_revocation(
            EntityId::new(10),
            EntityKind::Character,
            EntryReason::Manual,
            T0,
        );
        let b = entries.add_revocation(
            EntityId::new(20),
            EntityKind::Character,
            EntryReason::Manual,
            T0,
        );

        let outcome = engine.process_entries(EntryKind::Revocation, &snapshots, &mut entries, T0);
        // Both entries still transitioned despite the lookup failures.
        assert_eq!(outcome.newly_effective, 2);
        assert_eq!(outcome.errors, 2);
        assert!(entries.get(a.id()).unwrap().is_effective());
        assert!(entries.get(b.id()).unwrap().is_effective());
        assert!(sink.sent.borrow().is_empty());
    }

    #[test]
    fn group_revocation_notifies_no_one() {
        let config = Config::default();
        let sink = RecordingSink::default();
        let owners = StaticOwners(Some(UserId::new(77)));
        let engine = ReconciliationEngine::new(&config, &sink, &owners);

        let mut snapshots = SnapshotStore::new();
        snapshots.create(vec![], T0);
        let mut entries = EntryStore::new();
        entries.add_revocation(
            EntityId::new(500),
            EntityKind::Corporation,
            EntryReason::RequestWithdrawn,
            T0,
        );

        let outcome = engine.process_entries(EntryKind::Revocation, &snapshots, &mut entries, T0);
        assert_eq!(outcome.newly_effective, 1);
        assert!(sink.sent.borrow().is_empty());
    }

    #[test]
    fn notifications_can_be_disabled() {
        let mut config = Config::default();
        config.notifications_enabled = false;
        let sink = RecordingSink::default();
        let engine = ReconciliationEngine::new(&config, &sink, &StaticOwners(None));

        let mut snapshots = SnapshotStore::new();
        snapshots.create(vec![character(10, 5.0)], T0);
        let mut entries = EntryStore::new();
        let id = entries.add_request(UserId::new(1), EntityId::new(10), EntityKind::Character, T0);

        engine.process_entries(EntryKind::Request, &snapshots, &mut entries, T0);
        assert!(entries.get(id).unwrap().is_effective());
        assert!(sink.sent.borrow().is_empty());
    }

    #[test]
    fn grace_period_defers_reset() {
        let config = Config::default();
        let sink = RecordingSink::default();
        let engine = ReconciliationEngine::new(&config, &sink, &StaticOwners(None));

        let mut snapshots = SnapshotStore::new();
        snapshots.create(vec![character(10, 5.0)], T0);
        let mut entries = EntryStore::new();
        let id = entries.add_request(UserId::new(1), EntityId::new(10), EntityKind::Character, T0);
        engine.process_entries(EntryKind::Request, &snapshots, &mut entries, T0);
        assert!(entries.get(id).unwrap().is_effective());

        // Standing disappears from the ledger.
        snapshots.create(vec![], WallClock(T0.0 + 1));

        // Within the grace period: still effective across multiple passes.
        let within = T0.plus_hours(config.effective_grace_hours);
        for _ in 0..3 {
            let outcome = engine.process_entries(EntryKind::Request, &snapshots, &mut entries, within);
            assert_eq!(outcome.grace_resets, 0);
            assert!(entries.get(id).unwrap().is_effective());
        }

        // One millisecond past the grace period: reset to initial.
        let past = WallClock(within.0 + 1);
        let outcome = engine.process_entries(EntryKind::Request, &snapshots, &mut entries, past);
        assert_eq!(outcome.grace_resets, 1);
        let entry = entries.get(id).unwrap();
        assert!(entry.is_pending());
        assert_eq!(entry.effective_at(), None);
    }

    #[test]
    fn action_timeout_boundary() {
        let config = Config::default();
        let sink = RecordingSink::default();
        let engine = ReconciliationEngine::new(&config, &sink, &StaticOwners(None));

        let mut snapshots = SnapshotStore::new();
        snapshots.create(vec![], T0);
        let mut entries = EntryStore::new();
        let id = entries.add_request(UserId::new(1), EntityId::new(10), EntityKind::Character, T0);
        entries.mark_actioned(id, UserId::new(9), T0).unwrap();

        // One second before the deadline: untouched.
        let before = WallClock(T0.plus_hours(config.action_timeout_hours).0 - 1_000);
        let outcome = engine.process_entries(EntryKind::Request, &snapshots, &mut entries, before);
        assert_eq!(outcome.action_timeouts, 0);
        assert!(entries.get(id).unwrap().is_actioned());

        // One second past the deadline: actioned flag cleared, both the
        // actioner and the requestor are notified.
        let after = WallClock(T0.plus_hours(config.action_timeout_hours).0 + 1_000);
        let outcome = engine.process_entries(EntryKind::Request, &snapshots, &mut entries, after);
        assert_eq!(outcome.action_timeouts, 1);
        assert!(entries.get(id).unwrap().is_pending());
        let sent = sink.sent.borrow();
        let recipients: Vec<UserId> = sent.iter().map(|(u, _)| *u).collect();
        assert!(recipients.contains(&UserId::new(9)));
        assert!(recipients.contains(&UserId::new(1)));
    }
}
