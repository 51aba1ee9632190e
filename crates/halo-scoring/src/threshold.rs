//! Per-step comparison thresholds for the voting strategies.

use halo_core::model::BOS_POSITION;

/// Below this, a BOS-excluded threshold is treated as degenerate rather than
/// divided by.
pub const MIN_THRESHOLD: f64 = 1e-9;

/// Arithmetic mean of the whole aggregated vector.
pub fn local_mean(aggregated: &[f64]) -> Option<f64> {
    if aggregated.is_empty() {
        return None;
    }
    Some(aggregated.iter().sum::<f64>() / aggregated.len() as f64)
}

/// Arithmetic mean over every slot except BOS.
pub fn local_mean_excluding_bos(aggregated: &[f64]) -> Option<f64> {
    aggregated
        .get(BOS_POSITION + 1..)
        .and_then(local_mean)
}

/// Outcome of the analytic BOS-excluded threshold for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BosThreshold {
    /// No non-BOS slot exists; the step changes nothing.
    Inert,
    /// BOS holds (nearly) all attention: no slot can be above threshold.
    Degenerate,
    Value(f64),
}

/// `(1 - a[BOS]) / (n - 1)`: the mean of the non-BOS slots, assuming the
/// vector sums to 1 as softmax output does.
pub fn bos_excluded_threshold(aggregated: &[f64]) -> BosThreshold {
    let n = aggregated.len();
    if n <= BOS_POSITION + 1 {
        return BosThreshold::Inert;
    }
    let remaining = 1.0 - aggregated[BOS_POSITION];
    if !remaining.is_finite() || remaining <= MIN_THRESHOLD {
        return BosThreshold::Degenerate;
    }
    let threshold = remaining / (n - 1) as f64;
    if !threshold.is_finite() || threshold <= 0.0 {
        return BosThreshold::Degenerate;
    }
    BosThreshold::Value(threshold)
}

/// Magnitude vote for one slot: `floor(value / threshold)` above the
/// threshold, otherwise -1.
pub fn magnitude_delta(value: f64, threshold: f64) -> f64 {
    if threshold > 0.0 && value > threshold {
        (value / threshold).floor()
    } else {
        -1.0
    }
}
