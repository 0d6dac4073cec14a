//! Ensemble Voting Engine

use crate::clamp_confidence;
use crate::parameter::ParameterSpec;
use crate::rules::DecisionRule;
use crate::status::DetectionStatus;
use ring_buffer::{Channel, SensorReading};
use serde::Serialize;
use tracing::{debug, info};

/// Weight of the vote ratio in the blended confidence
const VOTE_WEIGHT: f64 = 0.6;
/// Weight of the mean rule confidence in the blended confidence
const RULE_CONFIDENCE_WEIGHT: f64 = 0.4;
/// Confidence reported for a channel that no rule covers
const UNCOVERED_CONFIDENCE: f64 = 0.5;

/// Vote counts for one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VoteTally {
    pub normal: usize,
    pub warning: usize,
    pub critical: usize,
    /// Sum of the confidences reported by the voting rules
    pub confidence_sum: f64,
}

impl VoteTally {
    /// Record one rule's vote
    pub fn record(&mut self, status: DetectionStatus, confidence: f64) {
        match status {
            DetectionStatus::Normal => self.normal += 1,
            DetectionStatus::Warning => self.warning += 1,
            DetectionStatus::Critical => self.critical += 1,
        }
        self.confidence_sum += confidence;
    }

    /// Number of votes cast
    pub fn total(&self) -> usize {
        self.normal + self.warning + self.critical
    }

    /// Majority status and its vote count.
    ///
    /// Normal is the starting candidate; warning replaces it only with strictly
    /// more votes, then critical replaces the current leader only with strictly
    /// more votes. Ties therefore resolve toward the less severe status.
    pub fn winner(&self) -> (DetectionStatus, usize) {
        let mut status = DetectionStatus::Normal;
        let mut votes = self.normal;

        if self.warning > votes {
            status = DetectionStatus::Warning;
            votes = self.warning;
        }
        if self.critical > votes {
            status = DetectionStatus::Critical;
            votes = self.critical;
        }

        (status, votes)
    }

    /// Mean confidence of the voting rules
    pub fn average_confidence(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            n => self.confidence_sum / n as f64,
        }
    }
}

/// Ensemble outcome for one parameter before history adjustment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterVerdict {
    pub channel: Channel,
    pub status: DetectionStatus,
    /// Weighted, clamped confidence (not rounded)
    pub confidence: f64,
    pub votes: VoteTally,
}

impl ParameterVerdict {
    /// Whether any rule voted on the channel
    pub fn is_covered(&self) -> bool {
        self.votes.total() > 0
    }
}

/// Fixed set of threshold rules, rebuilt wholesale from the ensemble size
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    rules: Vec<DecisionRule>,
}

impl Ensemble {
    /// Build `n_estimators` rules, indices `0..n_estimators`
    pub fn build(n_estimators: usize) -> Self {
        let rules: Vec<DecisionRule> = (0..n_estimators).map(DecisionRule::build).collect();
        info!("Built rule ensemble with {} rules", rules.len());
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules bound to one channel
    pub fn rules_for(&self, channel: Channel) -> impl Iterator<Item = &DecisionRule> {
        self.rules.iter().filter(move |r| r.channel == channel)
    }

    /// Collect the votes of every rule bound to `channel`
    pub fn tally(&self, channel: Channel, reading: &SensorReading) -> VoteTally {
        let mut tally = VoteTally::default();
        for rule in self.rules_for(channel) {
            let (status, confidence) = rule.predict(reading);
            tally.record(status, confidence);
        }
        tally
    }

    /// Majority verdict for one parameter, scaled by its weight.
    ///
    /// A channel with no rules in the ensemble (fewer than four rules) gets a
    /// placeholder `Normal` at half its weight. That verdict means "not
    /// assessed", not "healthy"; check [`ParameterVerdict::is_covered`].
    pub fn classify(&self, spec: &ParameterSpec, reading: &SensorReading) -> ParameterVerdict {
        let votes = self.tally(spec.name, reading);

        let (status, confidence) = match votes.total() {
            0 => (DetectionStatus::Normal, UNCOVERED_CONFIDENCE * spec.weight),
            total => {
                let (status, winning) = votes.winner();
                let vote_ratio = winning as f64 / total as f64;
                let blended =
                    VOTE_WEIGHT * vote_ratio + RULE_CONFIDENCE_WEIGHT * votes.average_confidence();
                (status, blended * spec.weight)
            }
        };

        debug!(
            "{}: votes n={} w={} c={} -> {} ({:.3})",
            spec.name, votes.normal, votes.warning, votes.critical, status, confidence
        );

        ParameterVerdict {
            channel: spec.name,
            status,
            confidence: clamp_confidence(confidence),
            votes,
        }
    }
}
