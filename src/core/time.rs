//! Wall-clock primitives for domain timeouts.
//!
//! Action timeouts, grace periods and retention windows are measured in
//! wall-clock hours against stored stamps - there is no execution-level
//! cancellation anywhere in the core.

use serde::{Deserialize, Serialize};

pub const MS_PER_HOUR: u64 = 3_600_000;
pub const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Wall clock in milliseconds since the Unix epoch.
///
/// Copy is fine here - it's just a measurement, not causality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WallClock(pub u64);

impl WallClock {
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self(ms)
    }

    pub fn plus_hours(self, hours: u64) -> Self {
        Self(self.0.saturating_add(hours.saturating_mul(MS_PER_HOUR)))
    }

    pub fn plus_days(self, days: u64) -> Self {
        Self(self.0.saturating_add(days.saturating_mul(MS_PER_DAY)))
    }

    pub fn minus_hours(self, hours: u64) -> Self {
        Self(self.0.saturating_sub(hours.saturating_mul(MS_PER_HOUR)))
    }

    pub fn minus_days(self, days: u64) -> Self {
        Self(self.0.saturating_sub(days.saturating_mul(MS_PER_DAY)))
    }
}
