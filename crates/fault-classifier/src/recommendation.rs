//! Remediation Advice

use crate::status::DetectionStatus;
use ring_buffer::Channel;

/// Fallback text for channels without advice
pub const NO_RECOMMENDATION: &str = "No recommendation available for this parameter.";

/// Text for a parameter no ensemble rule covers; its status is a placeholder
pub const UNCOVERED_RECOMMENDATION: &str = "Not assessed: no rule in the current ensemble covers \
     this parameter, so the reported status is not a health verdict. Use at least 4 estimators.";

/// Advice for a verdict, interpolating the measured value
pub fn recommendation(channel: Channel, status: DetectionStatus, value: f64) -> String {
    use DetectionStatus::{Critical, Normal, Warning};

    match (channel, status) {
        (Channel::EngineTemp, Normal) => {
            "Engine temperature is within normal limits. Continue routine monitoring.".to_string()
        }
        (Channel::EngineTemp, Warning) => format!(
            "Engine temperature {value:.1}°C is slightly high. Check the cooling system, \
             coolant level, and radiator condition."
        ),
        (Channel::EngineTemp, Critical) => format!(
            "DANGER: Engine temperature {value:.1}°C is very high! Shut the engine off \
             immediately and inspect the cooling system, thermostat, and water pump."
        ),

        (Channel::OilPressure, Normal) => {
            "Oil pressure is within normal limits. The lubrication system is working properly."
                .to_string()
        }
        (Channel::OilPressure, Warning) => format!(
            "Oil pressure {value:.1} bar is low. Check the oil level, oil filter condition, \
             and look for leaks."
        ),
        (Channel::OilPressure, Critical) => format!(
            "DANGER: Oil pressure {value:.1} bar is very low! Shut the engine off immediately \
             to prevent bearing and internal component damage."
        ),

        (Channel::BatteryVoltage, Normal) => {
            "Battery voltage is normal. The electrical system is working properly.".to_string()
        }
        (Channel::BatteryVoltage, Warning) => format!(
            "Battery voltage {value:.1}V is outside the charging band. Check the alternator \
             and regulator, battery condition, and cable connections."
        ),
        (Channel::BatteryVoltage, Critical) => format!(
            "DANGER: Battery voltage {value:.1}V is very low! The electrical system is failing, \
             inspect the alternator and battery immediately."
        ),

        (Channel::EngineVibration, Normal) => {
            "Engine vibration is within normal limits. No problems detected.".to_string()
        }
        (Channel::EngineVibration, Warning) => format!(
            "Engine vibration {value:.1}Hz is high. Check the engine mounts, balancing, and \
             rotating components."
        ),
        (Channel::EngineVibration, Critical) => format!(
            "DANGER: Engine vibration {value:.1}Hz is very high! Inspect the engine internals, \
             crankshaft, and mounting system immediately."
        ),

        (Channel::Rpm, _) => NO_RECOMMENDATION.to_string(),
    }
}
