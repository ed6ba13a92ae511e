//! Identifier newtypes.
//!
//! Entity and user ids come from the external ledger / auth system and are
//! opaque here. Snapshot and entry ids are store-assigned and monotonic,
//! so ordering by id is ordering by creation.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype! {
    /// Id of an individual or group entity in the external ledger.
    EntityId
}

id_newtype! {
    /// Id of a user of the request workflow.
    UserId
}

id_newtype! {
    /// Id of a contact label in the external ledger.
    LabelId
}

id_newtype! {
    /// Store-assigned id of a ledger snapshot. Monotonic per store.
    SnapshotId
}

id_newtype! {
    /// Store-assigned id of a standing entry. Monotonic per store.
    EntryId
}
