//! Cooldown gate for disruptive SOS notifications.

use std::time::{Duration, Instant};

use crate::types::Severity;

/// Minimum time between successive SOS notifications.
pub const DEFAULT_SOS_COOLDOWN: Duration = Duration::from_millis(60_000);

/// Stateful guard that rate-limits full-screen SOS alerts.
///
/// `should_fire` never self-updates; committing a fire is the caller's
/// explicit `record` call, so a caller can evaluate without committing.
#[derive(Clone, Debug)]
pub struct CooldownGate {
    cooldown: Duration,
    last_fired: Option<Instant>,
}

impl CooldownGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fired: None,
        }
    }

    /// True only if `severity` is `CriticalSos` and the cooldown window
    /// since the last recorded fire has fully elapsed (strictly greater).
    /// A gate that has never fired is open.
    pub fn should_fire(&self, now: Instant, severity: Severity) -> bool {
        if severity != Severity::CriticalSos {
            return false;
        }
        match self.last_fired {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.cooldown,
        }
    }

    /// Commit a fire at `now`, starting a fresh cooldown window.
    pub fn record(&mut self, now: Instant) {
        self.last_fired = Some(now);
    }

    /// Acknowledge/dismiss at `now`. Stamps unconditionally: an operator's
    /// acknowledgment must not immediately re-trigger on the same
    /// lingering critical state.
    pub fn dismiss(&mut self, now: Instant) {
        self.last_fired = Some(now);
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_fired(&self) -> Option<Instant> {
        self.last_fired
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(DEFAULT_SOS_COOLDOWN)
    }
}
