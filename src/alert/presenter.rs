//! Overlay visibility decisions for the full-screen SOS notification.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alert::cooldown::CooldownGate;
use crate::types::FeedSnapshot;

/// Fallback shown when the critical subject carries no display name.
const UNKNOWN_WEARER: &str = "Unknown";
/// Fallback shown when the critical subject carries no sector.
const UNKNOWN_SECTOR: &str = "Unknown Sector";

/// Payload of a raised SOS overlay.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SosAlert {
    pub wearer: String,
    pub sector: String,
    pub raised_at: DateTime<Utc>,
}

/// Decides whether to (re)display the SOS overlay for each new snapshot.
///
/// The overlay has no automatic timeout: once raised it stays visible
/// until an explicit `dismiss`, which also restarts the cooldown window.
#[derive(Clone, Debug)]
pub struct AlertPresenter {
    gate: CooldownGate,
    overlay: Option<SosAlert>,
}

impl AlertPresenter {
    pub fn new(gate: CooldownGate) -> Self {
        Self {
            gate,
            overlay: None,
        }
    }

    /// Consume one applied snapshot. Raises (or re-raises) the overlay
    /// when the aggregate is critical and the gate is open, committing the
    /// fire to the gate. Returns true if the overlay was raised by this
    /// call.
    ///
    /// The subject is the FIRST wearer in server order whose own status
    /// is critical. Input order is the tiebreak, not severity ranking.
    pub fn observe(&mut self, now: Instant, feed: &FeedSnapshot) -> bool {
        if !self.gate.should_fire(now, feed.status) {
            return false;
        }

        let subject = feed.first_critical();
        let wearer = subject
            .map(|v| v.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_WEARER)
            .to_string();
        let sector = subject
            .map(|v| v.sector.as_str())
            .filter(|sector| !sector.is_empty())
            .unwrap_or(UNKNOWN_SECTOR)
            .to_string();

        self.overlay = Some(SosAlert {
            wearer,
            sector,
            raised_at: Utc::now(),
        });
        self.gate.record(now);
        true
    }

    /// Explicit operator acknowledgment: hide the overlay and restart the
    /// cooldown window from `now`.
    pub fn dismiss(&mut self, now: Instant) {
        self.overlay = None;
        self.gate.dismiss(now);
    }

    pub fn overlay(&self) -> Option<&SosAlert> {
        self.overlay.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.overlay.is_some()
    }
}
