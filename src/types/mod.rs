pub mod vitals;

pub use vitals::{FeedSnapshot, GeoPoint, RiskZone, Severity, VitalSnapshot};
