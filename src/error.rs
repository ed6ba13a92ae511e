use thiserror::Error;

use crate::config::ConfigError;
use crate::core::CoreError;
use crate::engine::SyncError;
use crate::store::PersistError;

/// Crate-level convenience error.
///
/// Not a "god error": it is a thin wrapper over the canonical per-concern
/// errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}
