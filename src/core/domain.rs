//! Domain enums and acceptance bands.
//!
//! EntityKind: character, corporation, alliance
//! EntryKind: request, revocation
//! AcceptanceBand: the per-kind standing interval that satisfies an entry

use serde::{Deserialize, Serialize};

use super::error::UnknownTypeCode;

/// Classification of a ledger entity.
///
/// Produced only by [`EntityKind::from_type_code`] at the ingestion
/// boundary - raw numeric type codes never travel past it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Character,
    Corporation,
    Alliance,
}

impl EntityKind {
    /// Map a raw source type code to an entity kind.
    ///
    /// The code space comes from the external ledger: 2 is a corporation,
    /// 16159 an alliance, and 1373-1386 plus 34574 are the character
    /// variants (the source encodes bloodline in the type code).
    pub fn from_type_code(code: u32) -> Result<Self, UnknownTypeCode> {
        match code {
            2 => Ok(Self::Corporation),
            16159 => Ok(Self::Alliance),
            1373..=1386 | 34574 => Ok(Self::Character),
            _ => Err(UnknownTypeCode { code }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Corporation => "corporation",
            Self::Alliance => "alliance",
        }
    }

    /// True for entities owned by a single user.
    pub fn is_person_level(&self) -> bool {
        matches!(self, Self::Character)
    }

    /// True for corporation/alliance entities, which have no single owner.
    pub fn is_group_level(&self) -> bool {
        !self.is_person_level()
    }
}

/// Whether an entry asks for a standing or walks one back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Request,
    Revocation,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Revocation => "revocation",
        }
    }
}

/// Why a standing entry exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryReason {
    /// Created explicitly by a user.
    UserRequest,
    /// Synthesized when an actioned or effective request was deleted.
    RequestWithdrawn,
    /// Created because a request failed the eligibility sweep.
    InvalidRequest,
    /// Created by an operator outside the normal workflow.
    Manual,
}

impl EntryReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRequest => "user_request",
            Self::RequestWithdrawn => "request_withdrawn",
            Self::InvalidRequest => "invalid_request",
            Self::Manual => "manual",
        }
    }
}

/// Closed standing interval `[low, high]` that satisfies an entry kind.
///
/// An entity absent from the ledger counts as neutral; absence satisfies a
/// band exactly when its lower bound admits zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceBand {
    pub low: f64,
    pub high: f64,
}

impl AcceptanceBand {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Default band for requests: strictly non-negative standing.
    pub const fn request_default() -> Self {
        Self::new(0.01, 10.0)
    }

    /// Default band for revocations: neutral or negative standing.
    pub const fn revocation_default() -> Self {
        Self::new(-10.0, 0.0)
    }

    pub fn contains(&self, standing: f64) -> bool {
        self.low <= standing && standing <= self.high
    }

    pub fn absent_satisfies(&self) -> bool {
        self.low <= 0.0
    }

    /// Satisfaction for a point lookup result, absence rule included.
    pub fn satisfied_by(&self, standing: Option<f64>) -> bool {
        match standing {
            Some(value) => self.contains(value),
            None => self.absent_satisfies(),
        }
    }
}
