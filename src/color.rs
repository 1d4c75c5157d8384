use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::types::{ValueRange, Vec3};

/// HSL color value. Displays as a CSS `hsl(...)` string so renderers can
/// use it directly as a stroke/fill.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    pub fn new(hue: f64, saturation: f64, lightness: f64) -> Self {
        Hsl {
            hue,
            saturation,
            lightness,
        }
    }
}

impl Display for Hsl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hsl({:.0}, {:.0}%, {:.0}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Depth on a single blue hue: shallow is light, deep is dark.
pub fn depth_color(depth: f64, range: &ValueRange) -> Hsl {
    let normalized = range.normalize(depth);
    Hsl::new(210.0, 100.0, 90.0 - normalized * 70.0)
}

/// Velocity magnitude on a 200°..360° hue sweep.
pub fn velocity_color(velocity: &Vec3, range: &ValueRange) -> Hsl {
    let normalized = range.normalize(velocity.magnitude());
    Hsl::new(200.0 + normalized * 160.0, 100.0, 50.0)
}

/// Battery voltage from red (empty) to green (full).
pub fn battery_color(volts: f64, range: &ValueRange) -> Hsl {
    let normalized = range.normalize(volts);
    Hsl::new(normalized * 120.0, 100.0, 50.0)
}

/// Altimeter on a fixed purple hue, saturation scaled by the reading.
pub fn altimeter_color(altitude: f64, range: &ValueRange) -> Hsl {
    let normalized = range.normalize(altitude);
    Hsl::new(280.0, normalized * 100.0, 50.0)
}

/// Discrete navigation-mode lookup; no normalization involved.
pub fn nav_mode_color(mode: i32) -> Hsl {
    match mode {
        0 => Hsl::new(120.0, 70.0, 40.0), // nominal: green
        1 => Hsl::new(45.0, 100.0, 50.0), // caution: amber
        2 => Hsl::new(0.0, 85.0, 50.0),   // degraded: red
        _ => Hsl::new(0.0, 0.0, 60.0),    // unknown: neutral gray
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_depth_lightness_endpoints() {
        let range = ValueRange { min: 0.0, max: 10.0 };
        assert_relative_eq!(depth_color(0.0, &range).lightness, 90.0);
        assert_relative_eq!(depth_color(10.0, &range).lightness, 20.0);
        assert_relative_eq!(depth_color(0.0, &range).hue, 210.0);
    }

    #[test]
    fn test_degenerate_depth_range_is_defined() {
        let range = ValueRange { min: 5.0, max: 5.0 };
        let color = depth_color(5.0, &range);
        assert!(color.lightness.is_finite());
        assert_relative_eq!(color.lightness, 90.0);
    }

    #[test]
    fn test_velocity_hue_sweep() {
        let range = ValueRange { min: 0.0, max: 2.0 };
        let slow = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
        let fast = Vec3 { x: 2.0, y: 0.0, z: 0.0 };
        assert_relative_eq!(velocity_color(&slow, &range).hue, 200.0);
        assert_relative_eq!(velocity_color(&fast, &range).hue, 360.0);
    }

    #[test]
    fn test_battery_red_to_green() {
        let range = ValueRange { min: 11.0, max: 16.8 };
        assert_relative_eq!(battery_color(11.0, &range).hue, 0.0);
        assert_relative_eq!(battery_color(16.8, &range).hue, 120.0);
    }

    #[test]
    fn test_altimeter_saturation_scaling() {
        let range = ValueRange { min: 0.0, max: 4.0 };
        let color = altimeter_color(2.0, &range);
        assert_relative_eq!(color.hue, 280.0);
        assert_relative_eq!(color.saturation, 50.0);
    }

    #[test]
    fn test_nav_mode_lookup() {
        assert_eq!(nav_mode_color(0).hue, 120.0);
        assert_eq!(nav_mode_color(1).hue, 45.0);
        assert_eq!(nav_mode_color(2).hue, 0.0);
        // Unknown modes fall back to gray
        assert_eq!(nav_mode_color(7).saturation, 0.0);
    }

    #[test]
    fn test_css_display() {
        let color = Hsl::new(210.0, 100.0, 55.0);
        assert_eq!(color.to_string(), "hsl(210, 100%, 55%)");
    }
}
