//! Retention purge of stale snapshots and satisfied revocations.
//!
//! Runs on its own schedule; there is no harm in never running it beyond
//! unbounded growth.

use crate::config::Config;
use crate::core::{EntryKind, StandingEntry, WallClock};
use crate::store::{EntryStore, SnapshotStore};

/// Counts of what a purge run removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub snapshots: usize,
    pub revocations: usize,
}

/// Deletes data beyond its configured retention windows.
pub struct RetentionPurge<'a> {
    config: &'a Config,
}

impl<'a> RetentionPurge<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Run both purges.
    pub fn run(
        &self,
        snapshots: &mut SnapshotStore,
        entries: &mut EntryStore,
        now: WallClock,
    ) -> PurgeReport {
        PurgeReport {
            snapshots: self.purge_snapshots(snapshots, now),
            revocations: self.purge_revocations(entries, now),
        }
    }

    /// Delete snapshots older than the retention window, always keeping
    /// the single newest snapshot so `latest()` keeps resolving.
    pub fn purge_snapshots(&self, snapshots: &mut SnapshotStore, now: WallClock) -> usize {
        let cutoff = now.minus_hours(self.config.snapshot_retention_hours);
        let removed = snapshots.remove_older_than(cutoff);
        if removed > 0 {
            tracing::info!(removed, "purged stale ledger snapshots");
        } else {
            tracing::debug!("no stale ledger snapshots to purge");
        }
        removed
    }

    /// Delete effective revocations whose `effective_at` is past retention.
    ///
    /// Non-effective revocations are never purged here: they remain
    /// actionable.
    pub fn purge_revocations(&self, entries: &mut EntryStore, now: WallClock) -> usize {
        let cutoff = now.minus_days(self.config.revocation_retention_days);
        let stale: Vec<_> = entries
            .iter()
            .filter(|e| {
                e.kind() == EntryKind::Revocation
                    && e.is_effective()
                    && e.effective_at().is_some_and(|at| at < cutoff)
            })
            .map(StandingEntry::id)
            .collect();

        for id in &stale {
            entries.delete(*id, now);
        }
        if !stale.is_empty() {
            tracing::info!(removed = stale.len(), "purged satisfied revocations");
        }
        stale.len()
    }
}
