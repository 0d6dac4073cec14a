//! Classifier Model Configuration

use crate::error::ClassifierError;
use serde::{Deserialize, Serialize};

/// Supported model families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelType {
    RandomForest,
}

/// Tunable knobs of the ensemble
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelParameters {
    /// Number of rules in the ensemble (1..=1000)
    pub n_estimators: usize,
    /// Maximum tree depth (1..=50); validated but the fixed rules are two levels deep
    pub max_depth: u32,
    /// Decision threshold (0.0..=1.0); validated but not consumed by the rules
    pub threshold: f64,
}

/// Model configuration value, replaced wholesale on reconfiguration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(rename = "type")]
    pub model_type: ModelType,
    pub parameters: ModelParameters,
}

impl ModelConfig {
    pub const MAX_ESTIMATORS: usize = 1000;
    pub const MAX_DEPTH: u32 = 50;

    /// Random forest configuration with the given knobs
    pub fn random_forest(n_estimators: usize, max_depth: u32, threshold: f64) -> Self {
        Self {
            model_type: ModelType::RandomForest,
            parameters: ModelParameters {
                n_estimators,
                max_depth,
                threshold,
            },
        }
    }

    /// Copy with a different ensemble size
    pub fn with_estimators(self, n_estimators: usize) -> Self {
        Self {
            parameters: ModelParameters {
                n_estimators,
                ..self.parameters
            },
            ..self
        }
    }

    /// Check every knob against its documented bounds
    pub fn validate(&self) -> Result<(), ClassifierError> {
        let p = &self.parameters;

        if !(1..=Self::MAX_ESTIMATORS).contains(&p.n_estimators) {
            return Err(ClassifierError::InvalidModel {
                field: "nEstimators",
                expected: "a number between 1 and 1000",
                actual: p.n_estimators.to_string(),
            });
        }

        if !(1..=Self::MAX_DEPTH).contains(&p.max_depth) {
            return Err(ClassifierError::InvalidModel {
                field: "maxDepth",
                expected: "a number between 1 and 50",
                actual: p.max_depth.to_string(),
            });
        }

        if !(0.0..=1.0).contains(&p.threshold) {
            return Err(ClassifierError::InvalidModel {
                field: "threshold",
                expected: "a number between 0 and 1",
                actual: p.threshold.to_string(),
            });
        }

        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::random_forest(100, 10, 0.7)
    }
}
