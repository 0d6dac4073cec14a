//! Statistical Features Computation

use ring_buffer::{Channel, SensorReading};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Statistical features for a window of one channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticalFeatures {
    /// Number of samples
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Population variance
    pub variance: f64,
    /// Standard deviation
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Least-squares slope per sample
    pub trend: f64,
}

impl StatisticalFeatures {
    /// Compute statistical features from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;

        let mean = values.iter().sum::<f64>() / n;

        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let trend = linear_trend(values);

        trace!(
            "Window stats: n={}, mean={:.3}, var={:.3}, trend={:.3}",
            values.len(),
            mean,
            variance,
            trend
        );

        Self {
            count: values.len(),
            mean,
            variance,
            std_dev: variance.sqrt(),
            min,
            max,
            trend,
        }
    }

    /// Compute features for one channel of a reading sequence
    pub fn for_channel<'a, I>(readings: I, channel: Channel) -> Self
    where
        I: IntoIterator<Item = &'a SensorReading>,
    {
        let values = Self::extract(readings, channel);
        Self::compute(&values)
    }

    /// Extract one channel's values from readings, preserving order
    pub fn extract<'a, I>(readings: I, channel: Channel) -> Vec<f64>
    where
        I: IntoIterator<Item = &'a SensorReading>,
    {
        readings.into_iter().map(|r| r.value(channel)).collect()
    }
}

/// Simple linear regression slope with the sample index as x.
///
/// Returns 0.0 for fewer than two samples.
pub fn linear_trend(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let nf = n as f64;
    let sum_x = nf * (nf - 1.0) / 2.0;
    let sum_xx = nf * (nf - 1.0) * (2.0 * nf - 1.0) / 6.0;
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values
        .iter()
        .enumerate()
        .map(|(i, &v)| i as f64 * v)
        .sum();

    let denominator = nf * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }

    (nf * sum_xy - sum_x * sum_y) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mean_computation() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = StatisticalFeatures::compute(&values);
        assert!((stats.mean - 3.0).abs() < 0.001);
        assert_eq!(stats.count, 5);
    }

    #[test]
    fn test_variance_computation() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = StatisticalFeatures::compute(&values);
        assert!((stats.variance - 4.0).abs() < 1e-9);
        assert!((stats.std_dev - 2.0).abs() < 1e-9);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_trend_of_line() {
        let values: Vec<f64> = (0..10).map(|i| 80.0 + 1.5 * i as f64).collect();
        assert!((linear_trend(&values) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_trend_degenerate() {
        assert_eq!(linear_trend(&[]), 0.0);
        assert_eq!(linear_trend(&[42.0]), 0.0);
        assert_eq!(linear_trend(&[3.0, 3.0, 3.0]), 0.0);
    }

    #[test]
    fn test_empty_values() {
        let stats = StatisticalFeatures::compute(&[]);
        assert_eq!(stats, StatisticalFeatures::default());
    }

    #[test]
    fn test_channel_extraction() {
        let readings = vec![
            SensorReading { oil_pressure: 3.0, ..Default::default() },
            SensorReading { oil_pressure: 4.0, ..Default::default() },
        ];
        let stats = StatisticalFeatures::for_channel(&readings, Channel::OilPressure);
        assert!((stats.mean - 3.5).abs() < 1e-9);
        assert!((stats.trend - 1.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn constant_series_is_flat(value in -1000.0f64..1000.0, len in 1usize..20) {
            let stats = StatisticalFeatures::compute(&vec![value; len]);
            prop_assert!(stats.variance.abs() < 1e-6);
            prop_assert!(stats.trend.abs() < 1e-6);
        }
    }
}
