//! Core domain errors.
//!
//! These are bounded and stable: they represent domain/refusal states at the
//! ingestion boundary and store operations, not library implementation
//! details.

use thiserror::Error;

use super::identity::EntryId;

/// A raw contact type code that maps to no known entity kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("contact type code {code} maps to no known entity kind")]
pub struct UnknownTypeCode {
    pub code: u32,
}

/// Canonical error enum for the core domain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoreError {
    #[error(transparent)]
    UnknownTypeCode(#[from] UnknownTypeCode),

    #[error("no standing entry with id {0}")]
    NoSuchEntry(EntryId),
}
