//! Rule-Based Fault Classifier
//!
//! Classifies engine sensor readings into normal / warning / critical verdicts
//! by majority vote over a fixed ensemble of threshold rules, then refines the
//! confidence against recent history and attaches remediation advice.
//!
//! The ensemble is not trained from data. Every rule is a hand-authored
//! two-level threshold tree whose breakpoints are perturbed by its index, so a
//! given ensemble size always produces the same classifier.

mod confidence;
mod ensemble;
mod error;
mod model;
mod parameter;
mod recommendation;
mod rules;
mod service;
mod statistics;
mod status;

pub use confidence::{adjust_confidence, round_confidence, MIN_HISTORY, HISTORY_WINDOW};
pub use ensemble::{Ensemble, ParameterVerdict, VoteTally};
pub use error::ClassifierError;
pub use model::{ModelConfig, ModelParameters, ModelType};
pub use parameter::{default_parameters, ParameterSpec};
pub use recommendation::{recommendation, NO_RECOMMENDATION, UNCOVERED_RECOMMENDATION};
pub use rules::{DecisionRule, TreeNode};
pub use service::FaultDetectionService;
pub use statistics::{FaultStatistics, StatusCounts};
pub use status::{DetectionResult, DetectionStatus};

pub use data_validator::SensorRanges;
pub use ring_buffer::{Channel, SensorReading};

/// Lower bound of every reported confidence
pub const MIN_CONFIDENCE: f64 = 0.01;
/// Upper bound of every reported confidence
pub const MAX_CONFIDENCE: f64 = 0.99;

/// Clamp a confidence into `[MIN_CONFIDENCE, MAX_CONFIDENCE]`
pub(crate) fn clamp_confidence(confidence: f64) -> f64 {
    confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
