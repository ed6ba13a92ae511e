//! Collaborator interfaces the core consumes.
//!
//! Implementations live outside this crate (transport, auth, notification
//! delivery). The core only depends on these seams, which keeps every
//! reconciliation path testable with in-memory fakes.

use thiserror::Error;

use crate::core::{Contact, EntityId, UserId};

/// External ledger fetch failed; the sync cycle aborts before touching any
/// entry and the prior snapshot remains authoritative.
#[derive(Debug, Error, Clone)]
#[error("ledger source unavailable: {reason}")]
pub struct SourceError {
    pub reason: String,
}

impl SourceError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Notification delivery failed. Logged, never fatal to reconciliation.
#[derive(Debug, Error, Clone)]
#[error("notification to user {user} failed: {reason}")]
pub struct NotifyError {
    pub user: UserId,
    pub reason: String,
}

/// Owner lookup failed. Isolated per entry and retried next cycle.
#[derive(Debug, Error, Clone)]
#[error("owner lookup for entity {entity_id} failed: {reason}")]
pub struct ResolveError {
    pub entity_id: EntityId,
    pub reason: String,
}

/// Supplies the raw contact list used to build a new ledger snapshot.
///
/// Expected to be slow (network, possibly paginated); it is the only
/// blocking step of a sync cycle.
pub trait LedgerSource {
    fn fetch_contacts(&self, owner: EntityId) -> Result<Vec<Contact>, SourceError>;
}

/// Eligibility preconditions checked by the validation sweep.
pub trait EligibilityChecker {
    /// Does the user still hold the permission required to hold a request?
    fn has_permission(&self, user: UserId) -> bool;

    /// For group-level entities: are all required credentials across the
    /// group's members currently recorded?
    fn has_all_group_credentials(&self, entity_id: EntityId) -> bool;
}

/// Fire-and-forget user notification delivery.
pub trait NotificationSink {
    fn notify(&self, user: UserId, title: &str, message: &str) -> Result<(), NotifyError>;
}

/// Routes revocation-effective notifications to the right user when
/// resolvable.
pub trait OwnerResolver {
    fn owner_of(&self, entity_id: EntityId) -> Result<Option<UserId>, ResolveError>;
}
