use serde::{Deserialize, Serialize};

use crate::types::{IncidentFlag, TelemetrySample};

/// Thresholds for the per-sample anomaly rules.
///
/// These are declarative configuration constants, not derived from data.
/// They deserialize from JSON so deployments can tune them without a code
/// change; missing fields fall back to the defaults below.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Roll magnitude above this trips the roll rule (degrees).
    pub roll_limit_deg: f64,
    /// Pitch magnitude above this trips the pitch rule (degrees).
    pub pitch_limit_deg: f64,
    /// Error states above this trip the error rule; 0 means any non-zero
    /// state.
    pub error_state_floor: i32,
    /// Distance to the ocean floor below this trips the proximity rule
    /// (meters).
    pub min_floor_distance_m: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            roll_limit_deg: 45.0,
            pitch_limit_deg: 45.0,
            error_state_floor: 0,
            min_floor_distance_m: 0.5,
        }
    }
}

/// Evaluates the threshold rules over the full, non-decimated telemetry
/// sequence and returns one flag per sample that tripped at least one rule.
///
/// Rule order is fixed and determines the order of `reasons` within a
/// flag. A sample without a timestamp is skipped outright; a rule whose
/// input field is absent is skipped without affecting the other rules.
pub fn detect_incidents(samples: &[TelemetrySample], config: &DetectorConfig) -> Vec<IncidentFlag> {
    let mut flags = Vec::new();

    for (index, sample) in samples.iter().enumerate() {
        let timestamp = match sample.timestamp {
            Some(t) => t,
            None => continue,
        };

        let mut reasons = Vec::new();

        if let Some(roll) = sample.roll {
            if roll.abs() > config.roll_limit_deg {
                reasons.push(format!("Extreme roll: {:.2}°", roll));
            }
        }

        if let Some(pitch) = sample.pitch {
            if pitch.abs() > config.pitch_limit_deg {
                reasons.push(format!("Extreme pitch: {:.2}°", pitch));
            }
        }

        if let Some(error_state) = sample.error_state {
            if error_state > config.error_state_floor {
                reasons.push(format!("Error state: {}", error_state));
            }
        }

        if let Some(distance) = sample.distance_to_floor {
            if distance < config.min_floor_distance_m {
                reasons.push(format!("Near floor: {:.2}m", distance));
            }
        }

        if !reasons.is_empty() {
            flags.push(IncidentFlag {
                source_index: index,
                timestamp,
                latitude: sample.latitude,
                longitude: sample.longitude,
                reasons,
            });
        }
    }

    flags
}
