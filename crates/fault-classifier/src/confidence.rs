//! Confidence Adjustment Against Recent History

use crate::clamp_confidence;
use data_validator::SensorRange;
use feature_engine::StatisticalFeatures;
use tracing::trace;

/// Fewest historical readings required before history is consulted
pub const MIN_HISTORY: usize = 5;
/// Number of most recent historical values examined
pub const HISTORY_WINDOW: usize = 10;

/// Share of the channel's total range whose square bounds a stable variance
const STABLE_SPREAD_RATIO: f64 = 0.1;
/// Absolute slope per sample above which history counts as trending
const TREND_LIMIT: f64 = 0.1;

const NOISY_FACTOR: f64 = 0.9;
const TRENDING_FACTOR: f64 = 0.95;
const ABNORMAL_FACTOR: f64 = 1.1;

/// Refine a base confidence using the channel's recent history.
///
/// `recent` holds the channel's historical values oldest first (only the last
/// [`HISTORY_WINDOW`] are used) and `history_len` is the total number of
/// historical readings available. With fewer than [`MIN_HISTORY`] readings the
/// base confidence is returned unchanged.
pub fn adjust_confidence(
    base: f64,
    current: f64,
    recent: &[f64],
    history_len: usize,
    range: &SensorRange,
) -> f64 {
    if history_len < MIN_HISTORY || recent.is_empty() {
        return base;
    }

    let window = &recent[recent.len().saturating_sub(HISTORY_WINDOW)..];
    let stats = StatisticalFeatures::compute(window);

    let mut factor = 1.0;

    let stable_spread = (range.max - range.min) * STABLE_SPREAD_RATIO;
    if stats.variance > stable_spread * stable_spread {
        factor *= NOISY_FACTOR;
    }

    if stats.trend.abs() > TREND_LIMIT {
        factor *= TRENDING_FACTOR;
    }

    if !range.normal.contains(current) {
        factor *= ABNORMAL_FACTOR;
    }

    trace!(
        "History adjustment: var={:.3}, trend={:.3}, factor={:.4}",
        stats.variance,
        stats.trend,
        factor
    );

    clamp_confidence(base * factor)
}

/// Round a confidence to two decimals
pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 100.0).round() / 100.0
}
