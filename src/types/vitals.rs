//! types/vitals.rs
//!
//! Wire model for the Kavalan Sentinel vitals feed. These structs mirror
//! the JSON returned by the feed service's `/api/vitals` endpoint; one
//! `FeedSnapshot` is one poll cycle. Snapshots are immutable once
//! received; a new poll produces entirely new values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity classification for a wearer or the whole feed.
///
/// Ordered: `Safe < Alert < CriticalSos`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    #[serde(rename = "SAFE")]
    Safe,
    #[serde(rename = "ALERT")]
    Alert,
    #[serde(rename = "CRITICAL_SOS")]
    CriticalSos,
}

impl Severity {
    /// Display form as it appears on the wire ("SAFE", "ALERT", "CRITICAL_SOS").
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Safe => "SAFE",
            Severity::Alert => "ALERT",
            Severity::CriticalSos => "CRITICAL_SOS",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Safe
    }
}

/// Static risk classification of a wearer's assigned sector.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskZone {
    High,
    Medium,
    Low,
}

/// Latitude/longitude pair reported by the wearer's device.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One point-in-time reading set for one wearer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VitalSnapshot {
    /// Stable wearer identifier (e.g. "KVL-F-001")
    pub user_id: String,
    /// Demographic profile blurb
    #[serde(default)]
    pub profile: String,
    /// Display name; may be absent on the wire
    #[serde(default)]
    pub name: String,
    /// Assigned sector/zone; may be absent on the wire
    #[serde(default)]
    pub sector: String,
    pub risk_zone: RiskZone,
    /// Heart rate in BPM
    pub heart_rate: f32,
    /// Galvanic skin response in microsiemens
    pub gsr_fear_sweat_index: f32,
    /// Kinetic-impact magnitude in g
    pub kinetic_struggle_g_force: f32,
    /// Severity derived by the feed service for this wearer
    pub status: Severity,
    /// Response tier assigned by the feed service
    #[serde(default)]
    pub threat_level: Option<String>,
    /// Free-text assessment from the feed service
    #[serde(default)]
    pub ai_assessment: String,
    pub location: GeoPoint,
    /// Capture time of this sample
    pub timestamp: DateTime<Utc>,
}

/// One poll cycle of the feed: all active wearers plus aggregate severity.
///
/// `vitals` order is server-provided and is preserved; it is the tiebreak
/// order for SOS subject selection. The aggregate `status` and the two
/// counts are re-derived locally on ingest (see `classify::reconcile`), so
/// downstream consumers can rely on the invariant
/// `status == CriticalSos iff critical_count > 0, else Alert iff
/// alert_count > 0, else Safe`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FeedSnapshot {
    /// Feed-level tag from the service (e.g. "LIVE")
    #[serde(default)]
    pub feed_status: String,
    pub total_active: usize,
    pub critical_count: usize,
    pub alert_count: usize,
    /// Aggregate severity across all wearers
    pub status: Severity,
    pub vitals: Vec<VitalSnapshot>,
}

impl FeedSnapshot {
    /// An empty feed cycle, aggregate `Safe`.
    pub fn empty() -> Self {
        Self {
            feed_status: String::new(),
            total_active: 0,
            critical_count: 0,
            alert_count: 0,
            status: Severity::Safe,
            vitals: Vec::new(),
        }
    }

    /// First wearer in server order whose own status is `CriticalSos`.
    pub fn first_critical(&self) -> Option<&VitalSnapshot> {
        self.vitals
            .iter()
            .find(|v| v.status == Severity::CriticalSos)
    }
}
