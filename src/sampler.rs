use crate::types::TelemetrySample;

/// Default cap on the number of points handed to the renderer.
pub const DEFAULT_DISPLAY_CAP: usize = 2000;

/// Stride-based decimation bounding a telemetry sequence to roughly `cap`
/// points for display.
///
/// Keeps indices `0, stride, 2*stride, ...` with `stride = ceil(n / cap)`,
/// preserving input order. For `n <= cap` the output equals the input.
/// Fully deterministic. Incident detection always runs over the full
/// sequence, never the decimated one, so rare events are not skipped here.
pub fn decimate(samples: &[TelemetrySample], cap: usize) -> Vec<TelemetrySample> {
    let stride = stride_for(samples.len(), cap);
    samples.iter().step_by(stride).cloned().collect()
}

/// `ceil(n / cap)`, never less than 1.
pub fn stride_for(n: usize, cap: usize) -> usize {
    if n == 0 || cap == 0 {
        return 1;
    }
    n.div_ceil(cap).max(1)
}
