use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One timestamped vehicle-state reading.
///
/// Latitude, longitude and depth are required; the loader drops any row
/// missing them before analysis. Everything else is best-effort and each
/// consumer decides how to handle an absent field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub timestamp: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub roll: Option<f64>,
    pub pitch: Option<f64>,
    pub yaw: Option<f64>,
    pub error_state: Option<i32>,
    pub distance_to_floor: Option<f64>,
    pub velocity: Option<Vec3>,
    pub battery_volts: Option<f64>,
    pub nav_mode: Option<i32>,
    pub altimeter: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// One node of the planned route. Sequence order is traversal order and is
/// never reordered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(rename = "waypoint_number")]
    pub number: u32,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub radius: f64,
    /// Free-form attributes (transect type, light power, ...).
    #[serde(rename = "additional_data", default)]
    pub metadata: Map<String, Value>,
}

/// A single sample that tripped at least one anomaly rule.
///
/// `reasons` holds one human-readable string per tripped rule, in
/// rule-evaluation order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncidentFlag {
    pub source_index: usize,
    pub timestamp: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub reasons: Vec<String>,
}

/// A temporal cluster of incident flags with aggregated position and
/// ranked causes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    /// Arithmetic mean over the members.
    pub latitude: f64,
    pub longitude: f64,
    /// Timestamp of the flag that seeded the cluster.
    pub representative_timestamp: f64,
    pub member_count: usize,
    pub members: Vec<IncidentFlag>,
    /// Most frequent reason; ties keep first-encountered order.
    pub primary_reason: String,
    /// Distinct reasons by descending frequency, stable ties.
    pub all_reasons: Vec<String>,
}

/// Min/max over one scalar channel. `max == min` is a valid degenerate
/// range and normalization must not divide by zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Range over a value sequence; `None` when the sequence is empty.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut range: Option<ValueRange> = None;
        for v in values {
            range = Some(match range {
                None => ValueRange { min: v, max: v },
                Some(r) => ValueRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                },
            });
        }
        range
    }

    /// Maps `value` into [0, 1] against this range, clamped. A degenerate
    /// range normalizes everything to 0 rather than NaN.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}
