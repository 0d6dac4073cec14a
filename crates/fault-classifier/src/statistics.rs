//! Fault Statistics Aggregation

use crate::status::{DetectionResult, DetectionStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-status counts for one parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub critical: usize,
    pub warning: usize,
    pub normal: usize,
}

impl StatusCounts {
    pub fn increment(&mut self, status: DetectionStatus) {
        match status {
            DetectionStatus::Critical => self.critical += 1,
            DetectionStatus::Warning => self.warning += 1,
            DetectionStatus::Normal => self.normal += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.warning + self.normal
    }
}

/// Dashboard summary of a list of detection results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultStatistics {
    /// Warning plus critical results
    pub total_faults: usize,
    pub critical_faults: usize,
    pub warning_faults: usize,
    pub normal_readings: usize,
    /// Mean confidence, 0.0 for no results
    pub average_confidence: f64,
    pub faults_by_parameter: BTreeMap<String, StatusCounts>,
}

impl FaultStatistics {
    /// Aggregate a result list
    pub fn from_results(results: &[DetectionResult]) -> Self {
        let mut stats = Self::default();
        if results.is_empty() {
            return stats;
        }

        let mut total_confidence = 0.0;

        for result in results {
            total_confidence += result.confidence;

            match result.status {
                DetectionStatus::Critical => stats.critical_faults += 1,
                DetectionStatus::Warning => stats.warning_faults += 1,
                DetectionStatus::Normal => stats.normal_readings += 1,
            }

            stats
                .faults_by_parameter
                .entry(result.parameter.clone())
                .or_default()
                .increment(result.status);
        }

        stats.total_faults = stats.critical_faults + stats.warning_faults;
        stats.average_confidence = total_confidence / results.len() as f64;
        stats
    }

    /// Number of results aggregated
    pub fn total_results(&self) -> usize {
        self.total_faults + self.normal_readings
    }
}
