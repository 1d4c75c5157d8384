use anyhow::{bail, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::cluster::{cluster_flags, DEFAULT_CLUSTER_WINDOW_SECS};
use crate::detector::{detect_incidents, DetectorConfig};
use crate::projection::{BoundingBox, CanvasTransform, DEFAULT_PADDING_FACTOR};
use crate::sampler::{decimate, DEFAULT_DISPLAY_CAP};
use crate::types::{IncidentReport, TelemetrySample, ValueRange, Waypoint};

/// Knobs for one analysis pass. Deserializes from JSON so operators can
/// override any subset of fields; the rest keep their defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Cap on the decimated display sequence.
    pub display_cap: usize,
    /// Temporal clustering window in seconds. The product default is 5;
    /// the legacy 10-second behavior is one config edit away.
    pub cluster_window_secs: f64,
    pub detector: DetectorConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            display_cap: DEFAULT_DISPLAY_CAP,
            cluster_window_secs: DEFAULT_CLUSTER_WINDOW_SECS,
            detector: DetectorConfig::default(),
        }
    }
}

/// Output of one analysis pass: plain serializable values with no UI
/// dependency. Rebuilt wholesale on every load; nothing here is mutated
/// after construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MissionAnalysis {
    /// Decimated telemetry for display. Detection ran over the full
    /// sequence, not this one.
    pub sampled: Vec<TelemetrySample>,
    pub waypoints: Vec<Waypoint>,
    pub reports: Vec<IncidentReport>,
    /// Shared, padded box over sampled coords, waypoints and report
    /// positions. Single source of truth for every rendered layer.
    pub bounds: BoundingBox,
    pub depth_range: ValueRange,
    pub velocity_range: Option<ValueRange>,
    pub battery_range: Option<ValueRange>,
    pub altimeter_range: Option<ValueRange>,
}

impl MissionAnalysis {
    /// Transform for placing points on a `width x height` canvas, built on
    /// the shared bounds.
    pub fn transform(&self, width: f64, height: f64) -> CanvasTransform {
        CanvasTransform::new(self.bounds, width, height)
    }
}

/// Runs the full batch pipeline over pre-validated input: decimate for
/// display, detect and cluster incidents over the full sequence, compute
/// per-channel value ranges, and derive the shared padded bounding box.
///
/// Pure over its inputs; independent missions can be analyzed in parallel.
/// Empty telemetry is outside the documented domain (the loader rejects it
/// first) and fails fast here rather than producing a partial result.
pub fn analyze(
    telemetry: &[TelemetrySample],
    waypoints: &[Waypoint],
    config: &AnalysisConfig,
) -> Result<MissionAnalysis> {
    if telemetry.is_empty() {
        bail!("no telemetry samples to analyze");
    }

    let sampled = decimate(telemetry, config.display_cap);
    debug!(
        "decimated {} samples to {} display points (cap {})",
        telemetry.len(),
        sampled.len(),
        config.display_cap
    );

    // Detection always sees the full sequence so rare events survive
    // decimation.
    let flags = detect_incidents(telemetry, &config.detector);
    let reports = cluster_flags(&flags, config.cluster_window_secs);
    info!(
        "{} flagged samples grouped into {} incident reports (window {}s)",
        flags.len(),
        reports.len(),
        config.cluster_window_secs
    );

    let depth_range = ValueRange::from_values(sampled.iter().map(|s| s.depth))
        .unwrap_or(ValueRange { min: 0.0, max: 0.0 });
    let velocity_range = ValueRange::from_values(
        sampled.iter().filter_map(|s| s.velocity.map(|v| v.magnitude())),
    );
    let battery_range = ValueRange::from_values(sampled.iter().filter_map(|s| s.battery_volts));
    let altimeter_range = ValueRange::from_values(sampled.iter().filter_map(|s| s.altimeter));

    let points = sampled
        .iter()
        .map(|s| (s.latitude, s.longitude))
        .chain(waypoints.iter().map(|w| (w.latitude, w.longitude)))
        .chain(reports.iter().map(|r| (r.latitude, r.longitude)));
    let bounds = match BoundingBox::from_points(points) {
        Some(b) => b.padded(DEFAULT_PADDING_FACTOR),
        // Unreachable with non-empty telemetry, but stay total.
        None => bail!("no coordinates available for bounding box"),
    };

    Ok(MissionAnalysis {
        sampled,
        waypoints: waypoints.to_vec(),
        reports,
        bounds,
        depth_range,
        velocity_range,
        battery_range,
        altimeter_range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(t: f64, lat: f64, long: f64) -> TelemetrySample {
        TelemetrySample {
            timestamp: Some(t),
            latitude: lat,
            longitude: long,
            depth: 1.0 + t * 0.001,
            roll: Some(0.0),
            pitch: Some(0.0),
            yaw: None,
            error_state: Some(0),
            distance_to_floor: Some(3.0),
            velocity: None,
            battery_volts: None,
            nav_mode: None,
            altimeter: None,
        }
    }

    #[test]
    fn test_end_to_end_single_pitch_incident() {
        // 2001 samples spanning 2000 seconds, one extreme pitch at t=1000.
        let mut telemetry: Vec<_> = (0..=2000)
            .map(|i| sample(i as f64, 18.35 + i as f64 * 1e-6, -64.69))
            .collect();
        telemetry[1000].pitch = Some(50.0);

        let analysis = analyze(&telemetry, &[], &AnalysisConfig::default()).unwrap();

        assert_eq!(analysis.reports.len(), 1);
        assert_eq!(analysis.reports[0].member_count, 1);
        assert!(analysis.reports[0].primary_reason.contains("pitch"));
        assert_eq!(analysis.reports[0].representative_timestamp, 1000.0);

        // Decimation bounded the display sequence and kept the endpoints.
        assert!(analysis.sampled.len() <= 2000);
        assert_eq!(analysis.sampled[0], telemetry[0]);
        assert_eq!(
            analysis.sampled[analysis.sampled.len() - 1],
            telemetry[2000]
        );
    }

    #[test]
    fn test_bounds_cover_waypoints_and_reports() {
        let telemetry = vec![sample(0.0, 10.0, 20.0), sample(1.0, 10.5, 20.5)];
        let waypoints = vec![Waypoint {
            number: 1,
            latitude: 12.0,
            longitude: 22.0,
            speed: 1.0,
            radius: 5.0,
            metadata: Default::default(),
        }];

        let analysis = analyze(&telemetry, &waypoints, &AnalysisConfig::default()).unwrap();

        // Union over telemetry and waypoints, padded by 10% per side.
        assert_relative_eq!(analysis.bounds.min_lat, 9.8);
        assert_relative_eq!(analysis.bounds.max_lat, 12.2);
        assert_relative_eq!(analysis.bounds.min_long, 19.8);
        assert_relative_eq!(analysis.bounds.max_long, 22.2);
    }

    #[test]
    fn test_incident_detection_survives_decimation() {
        // The incident sits at an odd index that stride-2 decimation drops;
        // it must still be reported.
        let mut telemetry: Vec<_> = (0..4000).map(|i| sample(i as f64, 18.35, -64.69)).collect();
        telemetry[1001].roll = Some(80.0);

        let config = AnalysisConfig::default();
        let analysis = analyze(&telemetry, &[], &config).unwrap();

        assert_eq!(analysis.reports.len(), 1);
        assert!(analysis.reports[0].primary_reason.contains("roll"));
        assert!(analysis
            .sampled
            .iter()
            .all(|s| s.timestamp != Some(1001.0)));
    }

    #[test]
    fn test_empty_telemetry_fails_fast() {
        assert!(analyze(&[], &[], &AnalysisConfig::default()).is_err());
    }

    #[test]
    fn test_value_ranges_follow_display_sequence() {
        let mut telemetry = vec![sample(0.0, 18.0, -64.0), sample(1.0, 18.0, -64.0)];
        telemetry[0].battery_volts = Some(12.0);
        telemetry[1].battery_volts = Some(15.5);

        let analysis = analyze(&telemetry, &[], &AnalysisConfig::default()).unwrap();

        let battery = analysis.battery_range.unwrap();
        assert_relative_eq!(battery.min, 12.0);
        assert_relative_eq!(battery.max, 15.5);
        assert!(analysis.velocity_range.is_none());
        assert_relative_eq!(analysis.depth_range.min, 1.0);
    }

    #[test]
    fn test_config_overrides_from_json() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{ "cluster_window_secs": 10.0, "detector": { "roll_limit_deg": 30.0 } }"#,
        )
        .unwrap();

        assert_eq!(config.cluster_window_secs, 10.0);
        assert_eq!(config.detector.roll_limit_deg, 30.0);
        // Untouched fields keep their defaults.
        assert_eq!(config.display_cap, DEFAULT_DISPLAY_CAP);
        assert_eq!(config.detector.pitch_limit_deg, 45.0);
    }
}
