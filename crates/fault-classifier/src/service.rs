//! Fault Detection Service

use crate::confidence::{adjust_confidence, round_confidence, HISTORY_WINDOW};
use crate::ensemble::Ensemble;
use crate::error::ClassifierError;
use crate::model::ModelConfig;
use crate::parameter::{default_parameters, ParameterSpec};
use crate::recommendation::{recommendation, UNCOVERED_RECOMMENDATION};
use crate::statistics::FaultStatistics;
use crate::status::DetectionResult;
use data_validator::SensorRanges;
use feature_engine::StatisticalFeatures;
use ring_buffer::{now_ms, Channel, RingBuffer, SensorReading};
use std::sync::Arc;
use tracing::{debug, info};

/// Classifier facade: ensemble verdicts, history adjustment, and advice.
///
/// The service is an immutable value apart from [`update_model`]. Callers that
/// share one across tasks should hold it behind an `Arc` and swap in the copy
/// returned by [`reconfigured`] instead of mutating it.
///
/// [`update_model`]: FaultDetectionService::update_model
/// [`reconfigured`]: FaultDetectionService::reconfigured
#[derive(Debug, Clone)]
pub struct FaultDetectionService {
    /// Active configuration
    model: ModelConfig,
    /// Rules built from `model`, shared between copies
    ensemble: Arc<Ensemble>,
    /// Parameters in classification order
    parameters: Vec<ParameterSpec>,
    /// Channel ranges for the history adjustment
    ranges: SensorRanges,
}

impl FaultDetectionService {
    /// Create a service with the default parameter table
    pub fn new(model: ModelConfig) -> Result<Self, ClassifierError> {
        Self::with_parameters(model, default_parameters())
    }

    /// Create a service with a custom parameter table
    pub fn with_parameters(
        model: ModelConfig,
        parameters: Vec<ParameterSpec>,
    ) -> Result<Self, ClassifierError> {
        model.validate()?;
        info!(
            "Creating fault detection service: {} rules, {} parameters",
            model.parameters.n_estimators,
            parameters.len()
        );

        Ok(Self {
            ensemble: Arc::new(Ensemble::build(model.parameters.n_estimators)),
            model,
            parameters,
            ranges: SensorRanges::default(),
        })
    }

    /// Copy using different channel ranges
    pub fn with_ranges(self, ranges: SensorRanges) -> Self {
        Self { ranges, ..self }
    }

    /// Current model configuration
    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn ranges(&self) -> &SensorRanges {
        &self.ranges
    }

    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    /// Replace the model and rebuild the ensemble in place
    pub fn update_model(&mut self, model: ModelConfig) -> Result<(), ClassifierError> {
        *self = self.reconfigured(model)?;
        Ok(())
    }

    /// Copy with a new model and a freshly built ensemble
    pub fn reconfigured(&self, model: ModelConfig) -> Result<Self, ClassifierError> {
        model.validate()?;
        info!(
            "Reconfiguring classifier: {} -> {} rules",
            self.model.parameters.n_estimators, model.parameters.n_estimators
        );

        Ok(Self {
            model,
            ensemble: Arc::new(Ensemble::build(model.parameters.n_estimators)),
            parameters: self.parameters.clone(),
            ranges: self.ranges.clone(),
        })
    }

    /// Copy with one parameter enabled or disabled
    pub fn set_parameter_enabled(&self, name: &str, enabled: bool) -> Result<Self, ClassifierError> {
        let channel = self.lookup(name)?.name;
        let parameters = self
            .parameters
            .iter()
            .cloned()
            .map(|spec| {
                if spec.name == channel {
                    spec.enabled(enabled)
                } else {
                    spec
                }
            })
            .collect();

        info!("Parameter {} enabled={}", channel, enabled);
        Ok(Self {
            parameters,
            ..self.clone()
        })
    }

    /// Classify every enabled parameter of `current`, using `history` (oldest
    /// first) for the consistency adjustment
    pub fn analyze(&self, current: &SensorReading, history: &[SensorReading]) -> Vec<DetectionResult> {
        let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];
        let timestamp_ms = now_ms();

        let results: Vec<DetectionResult> = self
            .parameters
            .iter()
            .filter(|spec| spec.enabled)
            .map(|spec| {
                let values = StatisticalFeatures::extract(recent, spec.name);
                self.detect(spec, current, &values, history.len(), timestamp_ms)
            })
            .collect();

        debug!(
            "Analyzed reading with {} historical points: {} results",
            history.len(),
            results.len()
        );
        results
    }

    /// Classify a single parameter by name
    pub fn analyze_parameter(
        &self,
        name: &str,
        current: &SensorReading,
        history: &[SensorReading],
    ) -> Result<DetectionResult, ClassifierError> {
        let spec = self.lookup(name)?;
        if !spec.enabled {
            return Err(ClassifierError::ParameterDisabled(name.to_string()));
        }

        let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];
        let values = StatisticalFeatures::extract(recent, spec.name);
        Ok(self.detect(spec, current, &values, history.len(), now_ms()))
    }

    /// Analyze each reading with all earlier readings as its history.
    ///
    /// Equivalent to calling [`analyze`](Self::analyze) with `readings[..i]` for
    /// every `i`, but keeps only a rolling window of the latest readings.
    pub fn batch_analyze(&self, readings: &[SensorReading]) -> Vec<Vec<DetectionResult>> {
        let mut window = RingBuffer::new(HISTORY_WINDOW);
        let mut batch = Vec::with_capacity(readings.len());

        for (seen, current) in readings.iter().enumerate() {
            let timestamp_ms = now_ms();
            let results = self
                .parameters
                .iter()
                .filter(|spec| spec.enabled)
                .map(|spec| {
                    let values = window.values(spec.name);
                    self.detect(spec, current, &values, seen, timestamp_ms)
                })
                .collect();

            batch.push(results);
            window.push(*current);
        }

        debug!("Batch analyzed {} readings", readings.len());
        batch
    }

    /// Aggregate statistics over a result list
    pub fn fault_statistics(&self, results: &[DetectionResult]) -> FaultStatistics {
        FaultStatistics::from_results(results)
    }

    fn lookup(&self, name: &str) -> Result<&ParameterSpec, ClassifierError> {
        let channel: Channel = name
            .parse()
            .map_err(|_| ClassifierError::UnknownParameter(name.to_string()))?;

        self.parameters
            .iter()
            .find(|spec| spec.name == channel)
            .ok_or_else(|| ClassifierError::UnknownParameter(name.to_string()))
    }

    fn detect(
        &self,
        spec: &ParameterSpec,
        current: &SensorReading,
        recent: &[f64],
        history_len: usize,
        timestamp_ms: u64,
    ) -> DetectionResult {
        let verdict = self.ensemble.classify(spec, current);
        let value = current.value(spec.name);

        let confidence = adjust_confidence(
            verdict.confidence,
            value,
            recent,
            history_len,
            self.ranges.get(spec.name),
        );

        DetectionResult {
            parameter: spec.name.as_str().to_string(),
            confidence: round_confidence(confidence),
            status: verdict.status,
            recommendation: if verdict.is_covered() {
                recommendation(spec.name, verdict.status, value)
            } else {
                UNCOVERED_RECOMMENDATION.to_string()
            },
            timestamp_ms,
        }
    }
}

impl Default for FaultDetectionService {
    fn default() -> Self {
        let model = ModelConfig::default();
        Self {
            ensemble: Arc::new(Ensemble::build(model.parameters.n_estimators)),
            model,
            parameters: default_parameters(),
            ranges: SensorRanges::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::DetectionStatus;
    use crate::{MAX_CONFIDENCE, MIN_CONFIDENCE};
    use data_validator::Band;
    use proptest::prelude::*;

    fn reading(temp: f64, oil: f64, volts: f64, vib: f64) -> SensorReading {
        SensorReading {
            engine_temp: temp,
            oil_pressure: oil,
            battery_voltage: volts,
            engine_vibration: vib,
            rpm: 2000.0,
            timestamp_ms: 0,
        }
    }

    fn critical_reading() -> SensorReading {
        reading(115.0, 0.8, 10.5, 35.0)
    }

    fn normal_reading() -> SensorReading {
        reading(85.0, 2.5, 12.6, 12.0)
    }

    /// Results without their wall-clock stamp
    fn verdicts(results: &[DetectionResult]) -> Vec<(String, DetectionStatus, f64, String)> {
        results
            .iter()
            .map(|r| (r.parameter.clone(), r.status, r.confidence, r.recommendation.clone()))
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    fn any_reading() -> impl Strategy<Value = SensorReading> {
        (0.0f64..150.0, 0.0f64..10.0, 8.0f64..16.0, 0.0f64..100.0, 0.0f64..8000.0).prop_map(
            |(temp, oil, volts, vib, rpm)| SensorReading {
                engine_temp: temp,
                oil_pressure: oil,
                battery_voltage: volts,
                engine_vibration: vib,
                rpm,
                timestamp_ms: 0,
            },
        )
    }

    #[test]
    fn test_all_critical_reading() {
        let service = FaultDetectionService::default();
        let results = service.analyze(&critical_reading(), &[]);

        assert_eq!(results.len(), 4);
        for result in &results {
            assert_eq!(result.status, DetectionStatus::Critical, "{}", result.parameter);
            assert!(result.confidence >= 0.80, "{} {}", result.parameter, result.confidence);
            assert!(result.recommendation.starts_with("DANGER:"));
        }

        let names: Vec<&str> = results.iter().map(|r| r.parameter.as_str()).collect();
        assert_eq!(
            names,
            vec!["engine_temp", "oil_pressure", "battery_voltage", "engine_vibration"]
        );

        assert_close(results[0].confidence, 0.93);
        assert_close(results[1].confidence, 0.96);
        assert_close(results[2].confidence, 0.86);
        assert_close(results[3].confidence, 0.92);
    }

    #[test]
    fn test_mostly_normal_reading() {
        let service = FaultDetectionService::default();
        let results = service.analyze(&normal_reading(), &[]);

        let statuses: Vec<DetectionStatus> = results.iter().map(|r| r.status).collect();
        // 2.5 bar sits in the low-pressure warning band
        assert_eq!(
            statuses,
            vec![
                DetectionStatus::Normal,
                DetectionStatus::Warning,
                DetectionStatus::Normal,
                DetectionStatus::Normal,
            ]
        );
        assert_close(results[0].confidence, 0.91);
        assert_close(results[1].confidence, 0.9);
        assert_close(results[2].confidence, 0.84);
        assert_close(results[3].confidence, 0.89);
        assert!(results[1].recommendation.contains("2.5 bar"));
    }

    #[test]
    fn test_history_adjusts_confidence() {
        let service = FaultDetectionService::default();
        let history: Vec<SensorReading> = [100.0, 102.0, 104.0, 106.0, 108.0]
            .iter()
            .map(|&t| SensorReading {
                engine_temp: t,
                ..critical_reading()
            })
            .collect();

        let result = service
            .analyze_parameter("engine_temp", &critical_reading(), &history)
            .unwrap();

        // 0.931 * 0.95 (trend) * 1.1 (outside normal band)
        assert_eq!(result.status, DetectionStatus::Critical);
        assert_close(result.confidence, 0.97);
    }

    #[test]
    fn test_narrowed_normal_band_boosts_confidence() {
        let current = SensorReading {
            engine_temp: 90.0,
            ..normal_reading()
        };
        let history = vec![current; 5];

        let default = FaultDetectionService::default();
        let result = default.analyze_parameter("engine_temp", &current, &history).unwrap();
        assert_eq!(result.status, DetectionStatus::Warning);
        assert_close(result.confidence, 0.87);

        // 90 °C now sits outside the normal band
        let mut ranges = SensorRanges::default();
        ranges.engine_temp.normal = Band::new(80.0, 85.0);
        let narrowed = FaultDetectionService::default().with_ranges(ranges.clone());
        assert_eq!(narrowed.ranges(), &ranges);

        let result = narrowed.analyze_parameter("engine_temp", &current, &history).unwrap();
        assert_eq!(result.status, DetectionStatus::Warning);
        assert_close(result.confidence, 0.96);

        // Without enough history the band is never consulted
        let result = narrowed.analyze_parameter("engine_temp", &current, &[]).unwrap();
        assert_close(result.confidence, 0.87);
    }

    #[test]
    fn test_uncovered_channels_are_flagged() {
        let service = FaultDetectionService::new(ModelConfig::default().with_estimators(1)).unwrap();
        let results = service.analyze(&critical_reading(), &[]);

        // Only the first rule exists, and it watches engine temperature
        assert_eq!(results[0].parameter, "engine_temp");
        assert_eq!(results[0].status, DetectionStatus::Critical);
        assert!(results[0].recommendation.starts_with("DANGER:"));

        for result in &results[1..] {
            assert_eq!(result.status, DetectionStatus::Normal, "{}", result.parameter);
            assert_eq!(result.recommendation, UNCOVERED_RECOMMENDATION);
        }
        // 0.5 * weight 1.0
        assert_close(results[1].confidence, 0.5);
    }

    #[test]
    fn test_short_history_is_ignored() {
        let service = FaultDetectionService::default();
        let history = vec![normal_reading(); 4];
        assert_eq!(
            verdicts(&service.analyze(&critical_reading(), &history)),
            verdicts(&service.analyze(&critical_reading(), &[]))
        );
    }

    #[test]
    fn test_unknown_parameter() {
        let service = FaultDetectionService::default();
        let err = service
            .analyze_parameter("coolant_level", &normal_reading(), &[])
            .unwrap_err();
        assert_eq!(err, ClassifierError::UnknownParameter("coolant_level".into()));

        // RPM is tracked but never classified
        assert!(matches!(
            service.analyze_parameter("rpm", &normal_reading(), &[]),
            Err(ClassifierError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_disabled_parameter() {
        let service = FaultDetectionService::default()
            .set_parameter_enabled("oil_pressure", false)
            .unwrap();

        let results = service.analyze(&critical_reading(), &[]);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.parameter != "oil_pressure"));

        assert_eq!(
            service.analyze_parameter("oil_pressure", &critical_reading(), &[]),
            Err(ClassifierError::ParameterDisabled("oil_pressure".into()))
        );
    }

    #[test]
    fn test_all_disabled_yields_empty() {
        let mut service = FaultDetectionService::default();
        for channel in Channel::CLASSIFIED {
            service = service.set_parameter_enabled(channel.as_str(), false).unwrap();
        }
        assert!(service.analyze(&critical_reading(), &[]).is_empty());
        assert!(service
            .batch_analyze(&[critical_reading(), normal_reading()])
            .iter()
            .all(|r| r.is_empty()));
    }

    #[test]
    fn test_invalid_model_rejected() {
        assert!(FaultDetectionService::new(ModelConfig::random_forest(0, 10, 0.7)).is_err());

        let mut service = FaultDetectionService::default();
        let err = service
            .update_model(ModelConfig::random_forest(2000, 10, 0.7))
            .unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidModel { field: "nEstimators", .. }));
        assert_eq!(service.ensemble().len(), 100);
    }

    #[test]
    fn test_update_model_rebuilds_ensemble() {
        let mut service = FaultDetectionService::default();
        let config = ModelConfig::random_forest(8, 5, 0.5);
        service.update_model(config).unwrap();

        assert_eq!(service.model(), &config);
        assert_eq!(service.ensemble().len(), 8);
        assert_eq!(service.ensemble(), &Ensemble::build(8));

        // Tie between the two temperature rules resolves to normal
        let result = service
            .analyze_parameter("engine_temp", &reading(87.0, 4.0, 13.0, 10.0), &[])
            .unwrap();
        assert_eq!(result.status, DetectionStatus::Normal);
    }

    #[test]
    fn test_reconfigured_leaves_original_untouched() {
        let service = FaultDetectionService::default();
        let smaller = service.reconfigured(ModelConfig::default().with_estimators(4)).unwrap();
        assert_eq!(service.ensemble().len(), 100);
        assert_eq!(smaller.ensemble().len(), 4);
    }

    #[test]
    fn test_fault_statistics_over_batch() {
        let service = FaultDetectionService::default();
        let batch = service.batch_analyze(&[critical_reading(), normal_reading()]);
        let all: Vec<DetectionResult> = batch.into_iter().flatten().collect();
        let stats = service.fault_statistics(&all);

        assert_eq!(stats.total_results(), 8);
        assert_eq!(stats.critical_faults, 4);
        assert_eq!(stats.warning_faults, 1);
        assert_eq!(stats.normal_readings, 3);
        assert_eq!(stats.faults_by_parameter.len(), 4);
    }

    proptest! {
        #[test]
        fn analysis_is_deterministic(r in any_reading(), n in 1usize..=200) {
            let service = FaultDetectionService::new(ModelConfig::default().with_estimators(n)).unwrap();
            let first = service.analyze(&r, &[]);
            let second = service.analyze(&r, &[]);
            prop_assert_eq!(verdicts(&first), verdicts(&second));
        }

        #[test]
        fn confidence_stays_in_bounds(
            r in any_reading(),
            history in prop::collection::vec(any_reading(), 0..15),
            n in 1usize..=1000,
        ) {
            let service = FaultDetectionService::new(ModelConfig::default().with_estimators(n)).unwrap();
            for result in service.analyze(&r, &history) {
                prop_assert!(result.confidence >= MIN_CONFIDENCE);
                prop_assert!(result.confidence <= MAX_CONFIDENCE);
            }
        }

        #[test]
        fn temperature_severity_is_monotonic(
            a in 0.0f64..150.0,
            b in 0.0f64..150.0,
            n in 1usize..=400,
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let service = FaultDetectionService::new(ModelConfig::default().with_estimators(n)).unwrap();
            let status = |t: f64| {
                let r = SensorReading { engine_temp: t, ..normal_reading() };
                service.analyze_parameter("engine_temp", &r, &[]).unwrap().status
            };
            prop_assert!(status(low) <= status(high));
        }

        #[test]
        fn disabling_leaves_other_parameters_alone(r in any_reading(), idx in 0usize..4) {
            let service = FaultDetectionService::default();
            let name = Channel::CLASSIFIED[idx].as_str();
            let reduced = service.set_parameter_enabled(name, false).unwrap();

            let expected: Vec<_> = verdicts(&service.analyze(&r, &[]))
                .into_iter()
                .filter(|v| v.0 != name)
                .collect();
            prop_assert_eq!(verdicts(&reduced.analyze(&r, &[])), expected);
        }

        #[test]
        fn batch_matches_incremental_analysis(
            readings in prop::collection::vec(any_reading(), 0..25),
            n in 1usize..=120,
        ) {
            let service = FaultDetectionService::new(ModelConfig::default().with_estimators(n)).unwrap();
            let batch = service.batch_analyze(&readings);
            prop_assert_eq!(batch.len(), readings.len());

            for (i, results) in batch.iter().enumerate() {
                let single = service.analyze(&readings[i], &readings[..i]);
                prop_assert_eq!(verdicts(results), verdicts(&single));
            }
        }

        #[test]
        fn statistics_are_additive(
            readings in prop::collection::vec(any_reading(), 0..12),
        ) {
            let service = FaultDetectionService::default();
            let all: Vec<DetectionResult> =
                service.batch_analyze(&readings).into_iter().flatten().collect();
            let stats = service.fault_statistics(&all);

            prop_assert_eq!(
                stats.critical_faults + stats.warning_faults + stats.normal_readings,
                all.len()
            );
            let per_parameter: usize = stats.faults_by_parameter.values().map(|c| c.total()).sum();
            prop_assert_eq!(per_parameter, all.len());
        }
    }
}
