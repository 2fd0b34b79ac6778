// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifespan edits and expiry arithmetic.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Window before expiry in which a cluster counts as nearing expiry
pub const NEAR_EXPIRY: Duration = Duration::from_secs(30 * 60);

/// How a requested lifespan combines with the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LifespanMethod {
    Replace,
    Add,
    Subtract,
}

crate::simple_display! {
    LifespanMethod {
        Replace => "REPLACE",
        Add => "ADD",
        Subtract => "SUBTRACT",
    }
}

/// New lifespan after applying `method`; never negative.
pub fn compute_lifespan(
    method: LifespanMethod,
    requested: Duration,
    current: Duration,
) -> Duration {
    match method {
        LifespanMethod::Replace => requested,
        LifespanMethod::Add => current.saturating_add(requested),
        LifespanMethod::Subtract => current.saturating_sub(requested),
    }
}

/// Instant at which a cluster started at `start` with `lifespan` expires.
pub fn expires_at(start: DateTime<Utc>, lifespan: Duration) -> DateTime<Utc> {
    let delta = TimeDelta::from_std(lifespan).unwrap_or(TimeDelta::MAX);
    start.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Time left before expiry, clamped at zero.
pub fn remaining(start: DateTime<Utc>, lifespan: Duration, now: DateTime<Utc>) -> Duration {
    (expires_at(start, lifespan) - now).to_std().unwrap_or(Duration::ZERO)
}

pub fn is_expired(start: DateTime<Utc>, lifespan: Duration, now: DateTime<Utc>) -> bool {
    now > expires_at(start, lifespan)
}

pub fn is_nearing_expiry(start: DateTime<Utc>, lifespan: Duration, now: DateTime<Utc>) -> bool {
    let near = TimeDelta::from_std(NEAR_EXPIRY).unwrap_or(TimeDelta::zero());
    now + near > expires_at(start, lifespan)
}

#[cfg(test)]
#[path = "lifespan_tests.rs"]
mod tests;
