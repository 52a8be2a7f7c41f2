//! Rolling chart history: a count-bounded FIFO window of feed samples.
//!
//! The window is purely count-bounded, not time-bucketed: every applied
//! poll appends exactly one point and the oldest point is evicted once
//! capacity is exceeded. A poll with zero wearers still appends a point
//! carrying only the timestamp, so the time axis tracks the polling
//! cadence without gaps.

use std::collections::HashMap;
use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::VitalSnapshot;

/// Default window capacity, matching the dashboards' 20-sample mini charts.
pub const DEFAULT_CHART_CAPACITY: usize = 20;

/// One chart sample: per-wearer metrics captured at one poll, keyed by
/// wearer id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    pub time: DateTime<Utc>,
    /// Heart rate in BPM per wearer id
    pub heart_rate: HashMap<String, f32>,
    /// Fear/sweat index in microsiemens per wearer id
    pub fear_index: HashMap<String, f32>,
}

impl ChartPoint {
    /// Build a point from one poll cycle's wearer list.
    pub fn from_vitals(time: DateTime<Utc>, vitals: &[VitalSnapshot]) -> Self {
        let mut heart_rate = HashMap::with_capacity(vitals.len());
        let mut fear_index = HashMap::with_capacity(vitals.len());
        for v in vitals {
            heart_rate.insert(v.user_id.clone(), v.heart_rate);
            fear_index.insert(v.user_id.clone(), v.gsr_fear_sweat_index);
        }
        Self {
            time,
            heart_rate,
            fear_index,
        }
    }
}

/// Fixed-capacity, append-only window over chart points.
///
/// Exactly one writer (the poller) by construction; reads are snapshots
/// of current contents in insertion order.
#[derive(Clone, Debug)]
pub struct RollingHistory {
    points: VecDeque<ChartPoint>,
    capacity: usize,
}

impl RollingHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one point at the tail, evicting the oldest beyond capacity.
    /// Never fails.
    pub fn push(&mut self, point: ChartPoint) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChartPoint> {
        self.points.iter()
    }

    /// Cloned snapshot of the window in insertion order, for handing to
    /// the presentation layer.
    pub fn points(&self) -> Vec<ChartPoint> {
        self.points.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&ChartPoint> {
        self.points.back()
    }
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CHART_CAPACITY)
    }
}
