// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle notification state machine.
//!
//! Each cluster carries the phase it was last notified for. Given the
//! cluster's current status, [`next_notification`] decides whether a new
//! message is due and which phase to persist afterwards. Feeding the returned
//! phase back in is always a no-op, so repeated sweeps never re-notify.

use crate::status::ClusterStatus;
use serde::{Deserialize, Serialize};

/// Last lifecycle stage a notification was sent for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPhase {
    /// Notifications are disabled for this cluster
    Skip,
    Creating,
    Ready,
    NearingExpiry,
    Failed,
    Destroyed,
}

crate::simple_display! {
    NotificationPhase {
        Skip => "skip",
        Creating => "creating",
        Ready => "ready",
        NearingExpiry => "nearing_expiry",
        Failed => "failed",
        Destroyed => "destroyed",
    }
}

impl NotificationPhase {
    /// Decode a persisted phase. Blank or unrecognised values mean no
    /// notification has been recorded yet.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "skip" => Some(Self::Skip),
            "creating" => Some(Self::Creating),
            "ready" => Some(Self::Ready),
            "nearing_expiry" => Some(Self::NearingExpiry),
            "failed" => Some(Self::Failed),
            "destroyed" => Some(Self::Destroyed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Creating => "creating",
            Self::Ready => "ready",
            Self::NearingExpiry => "nearing_expiry",
            Self::Failed => "failed",
            Self::Destroyed => "destroyed",
        }
    }
}

/// Which message template to send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Creating,
    Ready,
    NearingExpiry,
    Failed,
    Destroyed,
}

crate::simple_display! {
    MessageKind {
        Creating => "creating",
        Ready => "ready",
        NearingExpiry => "nearing_expiry",
        Failed => "failed",
        Destroyed => "destroyed",
    }
}

/// Outcome of one notification step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Phase to persist once any message has been delivered
    pub phase: Option<NotificationPhase>,
    pub message: Option<MessageKind>,
}

impl Transition {
    fn stay(phase: Option<NotificationPhase>) -> Self {
        Self { phase, message: None }
    }

    fn to(phase: NotificationPhase, message: MessageKind) -> Self {
        Self { phase: Some(phase), message: Some(message) }
    }

    /// Whether the persisted phase must be rewritten
    pub fn changes(&self, current: Option<NotificationPhase>) -> bool {
        self.phase != current
    }
}

/// Decide the next notification for a cluster.
pub fn next_notification(
    status: ClusterStatus,
    nearing_expiry: bool,
    current: Option<NotificationPhase>,
) -> Transition {
    use NotificationPhase as P;

    if current == Some(P::Skip) {
        return Transition::stay(current);
    }

    match status {
        ClusterStatus::Failed if current != Some(P::Failed) => {
            Transition::to(P::Failed, MessageKind::Failed)
        }
        ClusterStatus::Destroying | ClusterStatus::Finished if current != Some(P::Destroyed) => {
            Transition::to(P::Destroyed, MessageKind::Destroyed)
        }
        ClusterStatus::Ready => {
            if nearing_expiry && current != Some(P::NearingExpiry) {
                Transition::to(P::NearingExpiry, MessageKind::NearingExpiry)
            } else if !nearing_expiry && current == Some(P::NearingExpiry) {
                // Lifespan was extended; correct silently
                Transition { phase: Some(P::Ready), message: None }
            } else if !nearing_expiry && current != Some(P::Ready) {
                Transition::to(P::Ready, MessageKind::Ready)
            } else {
                Transition::stay(current)
            }
        }
        ClusterStatus::Creating if current != Some(P::Creating) => {
            Transition::to(P::Creating, MessageKind::Creating)
        }
        _ => Transition::stay(current),
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
