//! Reading Validator for Range and Consistency Checking

use crate::error::ValidationError;
use crate::range::{Band, SensorRanges};
use ring_buffer::{Channel, SensorReading};
use serde::Serialize;
use tracing::debug;

/// Severity attached to a validation rule outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Outcome of a single validation rule
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutcome {
    /// Rule identifier
    pub rule: &'static str,
    /// Whether the reading passed the rule
    pub is_valid: bool,
    /// Human readable message
    pub message: String,
    /// Severity if the rule fails
    pub severity: ValidationSeverity,
    /// Channel checked, if the rule targets one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_range: Option<Band>,
}

/// Counts of rule outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub passed: usize,
    pub warnings: usize,
    pub errors: usize,
    pub critical: usize,
}

/// Result of validating one reading
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// False if any error or critical rule failed
    pub is_valid: bool,
    pub results: Vec<RuleOutcome>,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    fn from_outcomes(results: Vec<RuleOutcome>) -> Self {
        let failing = |severity| {
            results
                .iter()
                .filter(|r| !r.is_valid && r.severity == severity)
                .count()
        };

        let summary = ValidationSummary {
            total: results.len(),
            passed: results.iter().filter(|r| r.is_valid).count(),
            warnings: failing(ValidationSeverity::Warning),
            errors: failing(ValidationSeverity::Error),
            critical: failing(ValidationSeverity::Critical),
        };

        Self {
            is_valid: summary.critical == 0 && summary.errors == 0,
            results,
            summary,
        }
    }
}

/// Data validator for engine sensor readings
pub struct Validator {
    ranges: SensorRanges,
}

impl Validator {
    /// Create a new validator with given ranges
    pub fn new(ranges: SensorRanges) -> Self {
        Self { ranges }
    }

    /// Ranges this validator checks against
    pub fn ranges(&self) -> &SensorRanges {
        &self.ranges
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: Band,
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        if !range.contains(value) {
            return Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.min,
                max: range.max,
            });
        }
        Ok(())
    }

    /// Validate one channel against its overall limits
    pub fn validate_channel(&self, channel: Channel, value: f64) -> Result<(), ValidationError> {
        self.validate_range(channel.as_str(), value, self.ranges.get(channel).limits())
    }

    /// Run every rule against a reading
    pub fn validate_reading(&self, reading: &SensorReading) -> ValidationReport {
        let mut results: Vec<RuleOutcome> = Channel::ALL
            .iter()
            .map(|&channel| self.range_rule(channel, reading.value(channel)))
            .collect();
        results.push(consistency_rule(reading));

        for failed in results.iter().filter(|r| !r.is_valid) {
            debug!("Validation rule {} failed: {}", failed.rule, failed.message);
        }

        ValidationReport::from_outcomes(results)
    }

    /// Validate multiple readings
    pub fn validate_batch(&self, readings: &[SensorReading]) -> Vec<ValidationReport> {
        readings.iter().map(|r| self.validate_reading(r)).collect()
    }

    fn range_rule(&self, channel: Channel, value: f64) -> RuleOutcome {
        let range = self.ranges.get(channel);
        let limits = range.limits();
        let is_valid = self.validate_channel(channel, value).is_ok();
        let (rule, label) = describe(channel);

        let severity = match channel {
            Channel::EngineTemp if range.critical.contains(value) => ValidationSeverity::Critical,
            Channel::EngineTemp => ValidationSeverity::Error,
            Channel::OilPressure if value <= range.critical.max => ValidationSeverity::Critical,
            Channel::OilPressure => ValidationSeverity::Error,
            Channel::BatteryVoltage if value <= range.critical.max => ValidationSeverity::Critical,
            Channel::BatteryVoltage => ValidationSeverity::Warning,
            Channel::EngineVibration if value >= range.critical.min => ValidationSeverity::Critical,
            Channel::EngineVibration => ValidationSeverity::Warning,
            Channel::Rpm if value >= range.critical.min => ValidationSeverity::Warning,
            Channel::Rpm => ValidationSeverity::Info,
        };

        let unit = channel.unit();
        let message = if is_valid {
            format!("{label} within valid range")
        } else {
            format!(
                "{label} {value}{unit} outside valid range ({}-{}{unit})",
                limits.min, limits.max
            )
        };

        RuleOutcome {
            rule,
            is_valid,
            message,
            severity,
            parameter: Some(channel),
            value: Some(value),
            expected_range: Some(limits),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(SensorRanges::default())
    }
}

fn describe(channel: Channel) -> (&'static str, &'static str) {
    match channel {
        Channel::EngineTemp => ("engine_temp_range", "Engine temperature"),
        Channel::OilPressure => ("oil_pressure_range", "Oil pressure"),
        Channel::BatteryVoltage => ("battery_voltage_range", "Battery voltage"),
        Channel::EngineVibration => ("engine_vibration_range", "Engine vibration"),
        Channel::Rpm => ("rpm_range", "RPM"),
    }
}

/// Flags combinations of channels that should not occur together
fn consistency_rule(reading: &SensorReading) -> RuleOutcome {
    let mut issues = Vec::new();

    if reading.engine_temp > 100.0 && reading.oil_pressure > 3.0 {
        issues.push("High engine temperature with normal oil pressure - check cooling system");
    }
    if reading.battery_voltage < 12.0 && reading.rpm > 3000.0 {
        issues.push("Low battery voltage at high RPM - check alternator");
    }
    if reading.engine_vibration > 40.0 && reading.rpm < 2000.0 {
        issues.push("High vibration at normal RPM - check engine mounts");
    }

    RuleOutcome {
        rule: "data_consistency",
        is_valid: issues.is_empty(),
        message: if issues.is_empty() {
            "Data consistency check passed".to_string()
        } else {
            issues.join("; ")
        },
        severity: ValidationSeverity::Warning,
        parameter: None,
        value: None,
        expected_range: None,
    }
}
