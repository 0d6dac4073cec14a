//! Detection Status and Result Types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-level severity of a verdict, ordered `Normal < Warning < Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStatus {
    Normal,
    Warning,
    Critical,
}

impl DetectionStatus {
    pub const ALL: [DetectionStatus; 3] = [
        DetectionStatus::Normal,
        DetectionStatus::Warning,
        DetectionStatus::Critical,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionStatus::Normal => "normal",
            DetectionStatus::Warning => "warning",
            DetectionStatus::Critical => "critical",
        }
    }

    /// Whether the status counts as a fault
    pub fn is_fault(&self) -> bool {
        !matches!(self, DetectionStatus::Normal)
    }

    /// Parse a lowercase status name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl fmt::Display for DetectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one parameter of one reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    /// Parameter name (e.g. `engine_temp`)
    pub parameter: String,
    /// Confidence in `[0.01, 0.99]`, two decimals
    pub confidence: f64,
    pub status: DetectionStatus,
    /// Remediation advice for the verdict
    pub recommendation: String,
    /// When the verdict was produced (ms since epoch)
    pub timestamp_ms: u64,
}
