//! Severity classification for the vitals feed.
//!
//! Two concerns live here: deriving the aggregate feed severity from a
//! list of wearer snapshots, and the per-metric "is this reading abnormal"
//! predicates used by the presentation layer. The thresholds are
//! safety-relevant policy and are carried as named configuration, never
//! inline literals.

use serde::{Deserialize, Serialize};

use crate::types::{FeedSnapshot, Severity, VitalSnapshot};

/// Heart rate above this is flagged abnormal (BPM).
pub const DEFAULT_HEART_RATE_LIMIT_BPM: f32 = 115.0;
/// Fear/sweat index above this is flagged abnormal (microsiemens).
pub const DEFAULT_FEAR_INDEX_LIMIT_US: f32 = 3.0;
/// Kinetic-impact magnitude above this is flagged abnormal (g).
pub const DEFAULT_KINETIC_FORCE_LIMIT_G: f32 = 2.0;

/// Per-metric abnormality thresholds. All comparisons are strict `>`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SeverityThresholds {
    pub heart_rate_bpm: f32,
    pub fear_sweat_index_us: f32,
    pub kinetic_force_g: f32,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            heart_rate_bpm: DEFAULT_HEART_RATE_LIMIT_BPM,
            fear_sweat_index_us: DEFAULT_FEAR_INDEX_LIMIT_US,
            kinetic_force_g: DEFAULT_KINETIC_FORCE_LIMIT_G,
        }
    }
}

impl SeverityThresholds {
    pub fn heart_rate_exceeded(&self, bpm: f32) -> bool {
        bpm > self.heart_rate_bpm
    }

    pub fn fear_index_exceeded(&self, microsiemens: f32) -> bool {
        microsiemens > self.fear_sweat_index_us
    }

    pub fn kinetic_force_exceeded(&self, g_force: f32) -> bool {
        g_force > self.kinetic_force_g
    }

    /// Whether any metric of this snapshot crosses its threshold.
    pub fn any_exceeded(&self, vital: &VitalSnapshot) -> bool {
        self.heart_rate_exceeded(vital.heart_rate)
            || self.fear_index_exceeded(vital.gsr_fear_sweat_index)
            || self.kinetic_force_exceeded(vital.kinetic_struggle_g_force)
    }
}

/// Aggregate severity derived from a vitals list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AggregateSeverity {
    pub status: Severity,
    pub alert_count: usize,
    pub critical_count: usize,
}

/// Derive the aggregate severity for one poll cycle.
///
/// Pure and total: an empty list is `Safe`. The aggregate is
/// `CriticalSos` iff any wearer is critical, else `Alert` iff any wearer
/// is alerting, else `Safe`.
pub fn aggregate(vitals: &[VitalSnapshot]) -> AggregateSeverity {
    let critical_count = vitals
        .iter()
        .filter(|v| v.status == Severity::CriticalSos)
        .count();
    let alert_count = vitals
        .iter()
        .filter(|v| v.status == Severity::Alert)
        .count();

    let status = if critical_count > 0 {
        Severity::CriticalSos
    } else if alert_count > 0 {
        Severity::Alert
    } else {
        Severity::Safe
    };

    AggregateSeverity {
        status,
        alert_count,
        critical_count,
    }
}

/// Rewrite a snapshot's aggregate fields from its own vitals list.
///
/// The classifier is the authority for the aggregate, not the feed
/// service: a payload whose counts disagree with its wearer list is
/// repaired here so the aggregate invariant always holds downstream.
pub fn reconcile(feed: &mut FeedSnapshot) {
    let derived = aggregate(&feed.vitals);
    feed.status = derived.status;
    feed.alert_count = derived.alert_count;
    feed.critical_count = derived.critical_count;
    feed.total_active = feed.vitals.len();
}
