//! Periodic eligibility re-check of outstanding requests.
//!
//! Runs independently of reconciliation, usually on a slower cadence.
//! Invalid requests are deleted through the store's side-effecting delete,
//! so a previously granted standing still gets walked back.

use crate::core::{EntryKind, EntryReason, StandingEntry, WallClock};
use crate::ports::EligibilityChecker;
use crate::store::EntryStore;

/// Deletes requests whose preconditions no longer hold.
pub struct ValidationSweep<'a> {
    checker: &'a dyn EligibilityChecker,
}

impl<'a> ValidationSweep<'a> {
    pub fn new(checker: &'a dyn EligibilityChecker) -> Self {
        Self { checker }
    }

    /// Validate every open request.
    ///
    /// A request is invalid when its requestor no longer holds the request
    /// permission, or (for group-level entities) when not all required
    /// credentials across the group's members are recorded. Returns the
    /// count deleted.
    pub fn validate_requests(&self, entries: &mut EntryStore, now: WallClock) -> usize {
        tracing::debug!("validating standings requests");
        let invalid: Vec<_> = entries
            .iter()
            .filter(|entry| !self.is_valid(entry))
            .map(StandingEntry::id)
            .collect();

        for id in &invalid {
            tracing::info!(entry = %id, "deleting invalid standings request");
            entries.delete_with_reason(*id, EntryReason::InvalidRequest, now);
        }
        invalid.len()
    }

    fn is_valid(&self, entry: &StandingEntry) -> bool {
        if entry.kind() != EntryKind::Request {
            return true; // revocations are never swept
        }
        let Some(requestor) = entry.requested_by() else {
            return false;
        };
        if !self.checker.has_permission(requestor) {
            tracing::debug!(entry = %entry.id(), "requestor lost the request permission");
            return false;
        }
        if entry.entity_kind().is_group_level()
            && !self.checker.has_all_group_credentials(entry.entity_id())
        {
            tracing::debug!(entry = %entry.id(), "group credentials incomplete");
            return false;
        }
        true
    }
}
