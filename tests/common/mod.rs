//! Shared in-memory fakes for the collaborator seams.

// Not every test binary exercises every fake.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use standings_rs::{
    Contact, EligibilityChecker, EntityId, LedgerSource, NotificationSink, NotifyError,
    OwnerResolver, ResolveError, SourceError, UserId,
};

/// A ledger source returning a preset contact list, or failing on demand.
pub struct FakeSource {
    pub contacts: RefCell<Vec<Contact>>,
    pub fail: RefCell<bool>,
}

impl FakeSource {
    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        Self {
            contacts: RefCell::new(contacts),
            fail: RefCell::new(false),
        }
    }

    pub fn set_contacts(&self, contacts: Vec<Contact>) {
        *self.contacts.borrow_mut() = contacts;
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.borrow_mut() = fail;
    }
}

impl LedgerSource for FakeSource {
    fn fetch_contacts(&self, _owner: EntityId) -> Result<Vec<Contact>, SourceError> {
        if *self.fail.borrow() {
            return Err(SourceError::new("simulated transport outage"));
        }
        Ok(self.contacts.borrow().clone())
    }
}

/// Records every delivered notification.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: RefCell<Vec<Notification>>,
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub user: UserId,
    pub title: String,
    pub message: String,
}

impl RecordingSink {
    pub fn recipients(&self) -> Vec<UserId> {
        self.sent.borrow().iter().map(|n| n.user).collect()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, user: UserId, title: &str, message: &str) -> Result<(), NotifyError> {
        self.sent.borrow_mut().push(Notification {
            user,
            title: title.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

/// Owner lookup backed by a fixed map.
#[derive(Default)]
pub struct MapOwners {
    pub owners: BTreeMap<EntityId, UserId>,
}

impl OwnerResolver for MapOwners {
    fn owner_of(&self, entity_id: EntityId) -> Result<Option<UserId>, ResolveError> {
        Ok(self.owners.get(&entity_id).copied())
    }
}

/// Eligibility backed by explicit allow-sets.
#[derive(Default)]
pub struct SetChecker {
    pub permitted: BTreeSet<UserId>,
    pub credentialed: BTreeSet<EntityId>,
}

impl EligibilityChecker for SetChecker {
    fn has_permission(&self, user: UserId) -> bool {
        self.permitted.contains(&user)
    }

    fn has_all_group_credentials(&self, entity_id: EntityId) -> bool {
        self.credentialed.contains(&entity_id)
    }
}
