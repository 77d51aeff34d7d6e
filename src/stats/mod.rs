//! Rate aggregation and latency sample statistics

use crate::error::{AppError, Result};

/// Unit labels for [`humanize`], smallest first
pub const RATE_UNITS: [&str; 4] = ["bps", "Kbps", "Mbps", "Gbps"];

/// Scale step between consecutive rate units
pub const RATE_STEP: f64 = 1024.0;

/// Average of the samples after discarding the single smallest and single
/// largest value.
///
/// With the six latency probes this averages sorted indices 1..=4, so one
/// cold-start outlier and one timeout sentinel never reach the result.
pub fn trimmed_mean(samples: &[f64]) -> Result<f64> {
    if samples.len() < 3 {
        return Err(AppError::statistics(format!(
            "trimmed mean needs at least 3 samples, got {}",
            samples.len()
        )));
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let kept = &sorted[1..sorted.len() - 1];

    Ok(kept.iter().sum::<f64>() / kept.len() as f64)
}

/// Aggregate throughput: `total_bytes * 8 / elapsed_seconds`.
///
/// Byte counts are unsigned, so a negative total cannot be expressed. An
/// elapsed time that is zero, negative or not finite is rejected instead of
/// producing an infinite or NaN rate.
pub fn bits_per_second(total_bytes: u64, elapsed_seconds: f64) -> Result<f64> {
    if !elapsed_seconds.is_finite() || elapsed_seconds <= 0.0 {
        return Err(AppError::statistics(format!(
            "elapsed time must be a positive number of seconds, got {}",
            elapsed_seconds
        )));
    }
    Ok(total_bytes as f64 * 8.0 / elapsed_seconds)
}

/// Scale a bits-per-second figure by 1024 until it fits, e.g. `"1.95 Kbps"`.
///
/// Saturates at `Gbps`: a rate above 1024 Gbps is printed as a large Gbps
/// number rather than running past the last label.
pub fn humanize(bps: f64) -> String {
    let (value, unit) = scale_rate(bps);
    format!("{:.2} {}", value, unit)
}

/// The scaled magnitude and label [`humanize`] prints
pub fn scale_rate(bps: f64) -> (f64, &'static str) {
    let mut value = bps;
    let mut idx = 0;
    while value.abs() > RATE_STEP && idx < RATE_UNITS.len() - 1 {
        value /= RATE_STEP;
        idx += 1;
    }
    (value, RATE_UNITS[idx])
}
