use serde::{Deserialize, Serialize};

/// Fraction of each axis span added on both sides of the bounding box.
pub const DEFAULT_PADDING_FACTOR: f64 = 0.1;

/// Minimal lat/long rectangle covering a point set, optionally expanded by
/// a padding factor.
///
/// One box is computed per data load over every coordinate-bearing layer
/// (decimated telemetry, waypoints, incident reports) and shared by all of
/// them; recomputing it per layer would misalign the rendered paths.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_long: f64,
    pub max_long: f64,
}

impl BoundingBox {
    /// Union box over `(lat, long)` points; `None` for an empty set.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut bounds: Option<BoundingBox> = None;
        for (lat, long) in points {
            bounds = Some(match bounds {
                None => BoundingBox {
                    min_lat: lat,
                    max_lat: lat,
                    min_long: long,
                    max_long: long,
                },
                Some(b) => BoundingBox {
                    min_lat: b.min_lat.min(lat),
                    max_lat: b.max_lat.max(lat),
                    min_long: b.min_long.min(long),
                    max_long: b.max_long.max(long),
                },
            });
        }
        bounds
    }

    /// Expands each axis by `factor * span` on both sides. A zero-span axis
    /// gets zero padding, so a degenerate box stays a point instead of
    /// turning into NaN.
    pub fn padded(&self, factor: f64) -> BoundingBox {
        let lat_padding = (self.max_lat - self.min_lat) * factor;
        let long_padding = (self.max_long - self.min_long) * factor;
        BoundingBox {
            min_lat: self.min_lat - lat_padding,
            max_lat: self.max_lat + lat_padding,
            min_long: self.min_long - long_padding,
            max_long: self.max_long + long_padding,
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn long_span(&self) -> f64 {
        self.max_long - self.min_long
    }
}

/// Affine lat/long to canvas transform over a shared bounding box.
///
/// Longitude increases rightward. Latitude increases upward in the source
/// data while canvas y grows downward, hence the vertical flip.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CanvasTransform {
    pub bounds: BoundingBox,
    pub width: f64,
    pub height: f64,
}

impl CanvasTransform {
    pub fn new(bounds: BoundingBox, width: f64, height: f64) -> Self {
        CanvasTransform {
            bounds,
            width,
            height,
        }
    }

    /// Maps `(lat, long)` to canvas `(x, y)`. A degenerate axis (zero span)
    /// maps to the canvas midpoint on that axis rather than dividing by
    /// zero.
    pub fn project(&self, lat: f64, long: f64) -> (f64, f64) {
        let long_span = self.bounds.long_span();
        let x = if long_span > 0.0 {
            (long - self.bounds.min_long) / long_span * self.width
        } else {
            self.width / 2.0
        };

        let lat_span = self.bounds.lat_span();
        let y = if lat_span > 0.0 {
            self.height - (lat - self.bounds.min_lat) / lat_span * self.height
        } else {
            self.height / 2.0
        };

        (x, y)
    }
}
