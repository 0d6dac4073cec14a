//! Classified Parameter Table

use ring_buffer::Channel;
use serde::{Deserialize, Serialize};

/// Static metadata for one classified channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    /// Channel the parameter reads
    pub name: Channel,
    pub display_name: String,
    pub description: String,
    /// Confidence scale factor in `[0, 1]`, independent per parameter
    pub weight: f64,
    pub enabled: bool,
}

impl ParameterSpec {
    pub fn new(name: Channel, display_name: &str, description: &str, weight: f64) -> Self {
        Self {
            name,
            display_name: display_name.to_string(),
            description: description.to_string(),
            weight,
            enabled: true,
        }
    }

    /// Copy with the enabled flag replaced
    pub fn enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    /// Copy with a different weight
    pub fn with_weight(self, weight: f64) -> Self {
        Self { weight, ..self }
    }
}

/// Default parameter table, in classification order
pub fn default_parameters() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::new(
            Channel::EngineTemp,
            "Engine Temperature",
            "Engine temperature analysis for overheating detection",
            0.95,
        ),
        ParameterSpec::new(
            Channel::OilPressure,
            "Oil Pressure",
            "Oil pressure monitoring for engine lubrication health",
            1.0,
        ),
        ParameterSpec::new(
            Channel::BatteryVoltage,
            "Battery Voltage",
            "Charging and electrical system monitoring",
            0.9,
        ),
        ParameterSpec::new(
            Channel::EngineVibration,
            "Engine Vibration",
            "Imbalance and mechanical damage detection",
            0.95,
        ),
    ]
}
