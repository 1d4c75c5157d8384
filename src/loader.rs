use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::types::{TelemetrySample, Vec3, Waypoint};

/// One raw CSV row before validation. Every field is optional here; rows
/// are filtered before they become [`TelemetrySample`]s.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
    #[serde(alias = "timestamp_ros")]
    timestamp: Option<f64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    depth: Option<f64>,
    roll: Option<f64>,
    pitch: Option<f64>,
    yaw: Option<f64>,
    #[serde(rename = "errorState")]
    error_state: Option<i32>,
    distance_to_ocean_floor: Option<f64>,
    velocity_x: Option<f64>,
    velocity_y: Option<f64>,
    velocity_z: Option<f64>,
    battery_volts: Option<f64>,
    #[serde(rename = "navMode")]
    nav_mode: Option<i32>,
    altimeter: Option<f64>,
}

fn open_maybe_gz(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Loads a telemetry CSV (optionally gzip-compressed), dropping any row
/// that lacks latitude, longitude or depth. An input with zero valid rows
/// is rejected before the core ever runs.
pub fn load_telemetry(path: &Path) -> Result<Vec<TelemetrySample>> {
    let reader = open_maybe_gz(path)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    let mut skipped = 0usize;

    for row in csv_reader.deserialize() {
        let row: RawRow = row.with_context(|| format!("parsing {}", path.display()))?;

        let (latitude, longitude, depth) = match (row.latitude, row.longitude, row.depth) {
            (Some(lat), Some(long), Some(depth)) => (lat, long, depth),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let velocity = match (row.velocity_x, row.velocity_y, row.velocity_z) {
            (Some(x), Some(y), Some(z)) => Some(Vec3 { x, y, z }),
            _ => None,
        };

        samples.push(TelemetrySample {
            timestamp: row.timestamp,
            latitude,
            longitude,
            depth,
            roll: row.roll,
            pitch: row.pitch,
            yaw: row.yaw,
            error_state: row.error_state,
            distance_to_floor: row.distance_to_ocean_floor,
            velocity,
            battery_volts: row.battery_volts,
            nav_mode: row.nav_mode,
            altimeter: row.altimeter,
        });
    }

    if skipped > 0 {
        warn!(
            "skipped {} rows with missing coordinates/depth in {}",
            skipped,
            path.display()
        );
    }
    if samples.is_empty() {
        bail!("no valid data points found in {}", path.display());
    }

    Ok(samples)
}

/// Loads the planned route from a mission JSON document. The document must
/// carry a `waypoints` array and every waypoint must have latitude,
/// longitude and a 1-based `waypoint_number`.
pub fn load_mission(path: &Path) -> Result<Vec<Waypoint>> {
    let reader = open_maybe_gz(path)?;
    let doc: Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", path.display()))?;

    let raw_waypoints = match doc.get("waypoints").and_then(Value::as_array) {
        Some(array) => array,
        None => bail!(
            "invalid mission file {}: missing waypoints array",
            path.display()
        ),
    };

    let mut waypoints = Vec::with_capacity(raw_waypoints.len());
    for (i, raw) in raw_waypoints.iter().enumerate() {
        let has_required = raw.get("latitude").is_some()
            && raw.get("longitude").is_some()
            && raw.get("waypoint_number").is_some();
        if !has_required {
            bail!(
                "invalid waypoint data at index {} in {}: missing required fields",
                i,
                path.display()
            );
        }
        let waypoint: Waypoint = serde_json::from_value(raw.clone())
            .with_context(|| format!("waypoint {} in {}", i, path.display()))?;
        waypoints.push(waypoint);
    }

    Ok(waypoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV_HEADER: &str = "timestamp_ros,latitude,longitude,depth,roll,pitch,yaw,errorState,distance_to_ocean_floor\n";

    fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_telemetry_with_legacy_timestamp_column() {
        let csv = format!(
            "{}1740497617.7,18.350515,-64.69909,0.243,7.87,7.35,116.92,0,4.69\n",
            CSV_HEADER
        );
        let file = write_temp(&csv, ".csv");

        let samples = load_telemetry(file.path()).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].timestamp, Some(1740497617.7));
        assert_eq!(samples[0].depth, 0.243);
        assert_eq!(samples[0].distance_to_floor, Some(4.69));
    }

    #[test]
    fn test_rows_missing_coordinates_are_dropped() {
        let csv = format!(
            "{}100.0,18.35,-64.69,0.5,0,0,0,0,4.0\n101.0,,-64.69,0.5,0,0,0,0,4.0\n102.0,18.35,-64.69,,0,0,0,0,4.0\n",
            CSV_HEADER
        );
        let file = write_temp(&csv, ".csv");

        let samples = load_telemetry(file.path()).unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_all_rows_invalid_is_an_error() {
        let csv = format!("{},,,,,,,,\n", CSV_HEADER);
        let file = write_temp(&csv, ".csv");

        let err = load_telemetry(file.path()).unwrap_err();
        assert!(err.to_string().contains("no valid data points"));
    }

    #[test]
    fn test_velocity_requires_all_three_components() {
        let header = "timestamp,latitude,longitude,depth,velocity_x,velocity_y,velocity_z\n";
        let csv = format!(
            "{}100.0,18.35,-64.69,0.5,1.0,2.0,2.0\n101.0,18.35,-64.69,0.5,1.0,,2.0\n",
            header
        );
        let file = write_temp(&csv, ".csv");

        let samples = load_telemetry(file.path()).unwrap();
        assert_eq!(samples[0].velocity, Some(Vec3 { x: 1.0, y: 2.0, z: 2.0 }));
        assert_eq!(samples[1].velocity, None);
    }

    #[test]
    fn test_gzip_telemetry_loads() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let csv = format!("{}100.0,18.35,-64.69,0.5,0,0,0,0,4.0\n", CSV_HEADER);
        let file = tempfile::Builder::new().suffix(".csv.gz").tempfile().unwrap();
        let mut encoder = GzEncoder::new(file.reopen().unwrap(), Compression::default());
        encoder.write_all(csv.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let samples = load_telemetry(file.path()).unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_mission_waypoints_load_in_order() {
        let json = r#"{
            "waypoints": [
                { "waypoint_number": 1, "latitude": 18.350344, "longitude": -64.699718,
                  "speed": 1.0, "radius": 5.0,
                  "additional_data": { "transect_type": "Surface", "Light Power %": 100.0 } },
                { "waypoint_number": 2, "latitude": 18.3506702, "longitude": -64.6998555,
                  "speed": 1.0, "radius": 5.0,
                  "additional_data": { "transect_type": "Submarine", "Desired Depth": 20.0 } }
            ]
        }"#;
        let file = write_temp(json, ".json");

        let waypoints = load_mission(file.path()).unwrap();
        assert_eq!(waypoints.len(), 2);
        assert_eq!(waypoints[0].number, 1);
        assert_eq!(waypoints[1].number, 2);
        assert_eq!(
            waypoints[0].metadata.get("transect_type").and_then(Value::as_str),
            Some("Surface")
        );
    }

    #[test]
    fn test_mission_without_waypoints_array_is_rejected() {
        let file = write_temp(r#"{ "name": "transect-7" }"#, ".json");
        let err = load_mission(file.path()).unwrap_err();
        assert!(err.to_string().contains("missing waypoints array"));
    }

    #[test]
    fn test_waypoint_missing_required_field_is_rejected() {
        let json = r#"{ "waypoints": [ { "latitude": 18.35, "longitude": -64.69 } ] }"#;
        let file = write_temp(json, ".json");

        let err = load_mission(file.path()).unwrap_err();
        assert!(err.to_string().contains("missing required fields"));
    }
}
