// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable remaining-time strings used in notification messages.

use chrono::TimeDelta;

/// Format how long a cluster has left before it is torn down.
///
/// Coarser units are used the further away expiration is; anything at or
/// below zero reads `expired`.
pub fn format_expiration(remaining: TimeDelta) -> String {
    let total_secs = remaining.num_seconds();
    let days = total_secs / 86_400;
    let hours = (total_secs / 3600) % 24;
    let minutes = (total_secs / 60) % 60;
    let seconds = total_secs % 60;

    if remaining >= TimeDelta::hours(24) {
        format!("{days}d remaining")
    } else if remaining > TimeDelta::hours(8) {
        format!("{hours}h remaining")
    } else if remaining > TimeDelta::hours(1) {
        format!("{hours}h{minutes}m remaining")
    } else if remaining > TimeDelta::minutes(5) {
        format!("{minutes}m remaining")
    } else if remaining > TimeDelta::minutes(1) {
        format!("{minutes}m{seconds}s remaining")
    } else if remaining > TimeDelta::seconds(15) {
        format!("{seconds}s remaining")
    } else if remaining > TimeDelta::zero() {
        "expiring now".to_string()
    } else {
        "expired".to_string()
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
