//! Batch analysis of underwater-vehicle mission telemetry.
//!
//! Given a telemetry trace and a planned waypoint route, the pipeline
//! flags threshold anomalies, clusters them into incident reports,
//! decimates the trace for display, and computes the shared geographic
//! bounding box plus lat/long-to-canvas transform that a renderer uses to
//! place every layer. All stages are pure functions over immutable values;
//! file decoding lives in [`loader`] and the offline manifest scanner in
//! [`mission_index`].

pub mod cluster;
pub mod color;
pub mod detector;
pub mod loader;
pub mod mission_index;
pub mod pipeline;
pub mod projection;
pub mod sampler;
pub mod types;

pub use cluster::cluster_flags;
pub use detector::{detect_incidents, DetectorConfig};
pub use pipeline::{analyze, AnalysisConfig, MissionAnalysis};
pub use projection::{BoundingBox, CanvasTransform};
pub use sampler::decimate;
pub use types::{IncidentFlag, IncidentReport, TelemetrySample, ValueRange, Waypoint};
