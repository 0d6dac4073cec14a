//! Data Validation
//!
//! Provides the static sensor ranges, range checking, and consistency rules
//! for engine sensor readings.

mod error;
mod range;
mod validator;

pub use error::ValidationError;
pub use range::{Band, SensorRange, SensorRanges};
pub use validator::{
    RuleOutcome, ValidationReport, ValidationSeverity, ValidationSummary, Validator,
};
