//! Classifier Error Types

use thiserror::Error;

/// Errors raised by the fault classifier
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    /// Parameter name is not one of the classified channels
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// Parameter exists but is disabled in the parameter table
    #[error("Parameter {0} is disabled")]
    ParameterDisabled(String),

    /// Model configuration outside its documented bounds
    #[error("{field} must be {expected}, got {actual}")]
    InvalidModel {
        field: &'static str,
        expected: &'static str,
        actual: String,
    },
}
