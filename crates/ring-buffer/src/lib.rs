//! Sensor Readings and History Window
//!
//! Provides the engine sensor snapshot consumed by the classifier and a
//! bounded rolling window of recent readings.

mod buffer;

pub use buffer::{RingBuffer, DEFAULT_CAPACITY};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a channel name cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown sensor channel: {0}")]
pub struct UnknownChannel(pub String);

/// Sensor channel carried by a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Engine temperature (°C)
    EngineTemp,
    /// Oil pressure (bar)
    OilPressure,
    /// Battery voltage (V)
    BatteryVoltage,
    /// Engine vibration (Hz)
    EngineVibration,
    /// Engine speed (RPM)
    Rpm,
}

impl Channel {
    /// Channels the fault classifier produces verdicts for, in parameter order
    pub const CLASSIFIED: [Channel; 4] = [
        Channel::EngineTemp,
        Channel::OilPressure,
        Channel::BatteryVoltage,
        Channel::EngineVibration,
    ];

    /// Every channel present in a reading
    pub const ALL: [Channel; 5] = [
        Channel::EngineTemp,
        Channel::OilPressure,
        Channel::BatteryVoltage,
        Channel::EngineVibration,
        Channel::Rpm,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::EngineTemp => "engine_temp",
            Channel::OilPressure => "oil_pressure",
            Channel::BatteryVoltage => "battery_voltage",
            Channel::EngineVibration => "engine_vibration",
            Channel::Rpm => "rpm",
        }
    }

    /// Measurement unit used in human readable messages
    pub fn unit(&self) -> &'static str {
        match self {
            Channel::EngineTemp => "°C",
            Channel::OilPressure => " bar",
            Channel::BatteryVoltage => "V",
            Channel::EngineVibration => "Hz",
            Channel::Rpm => " rpm",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}

/// One snapshot of the engine sensors
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub engine_temp: f64,
    pub oil_pressure: f64,
    pub battery_voltage: f64,
    pub engine_vibration: f64,
    #[serde(alias = "engineRPM")]
    pub rpm: f64,
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl SensorReading {
    /// Value of a single channel
    pub fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::EngineTemp => self.engine_temp,
            Channel::OilPressure => self.oil_pressure,
            Channel::BatteryVoltage => self.battery_voltage,
            Channel::EngineVibration => self.engine_vibration,
            Channel::Rpm => self.rpm,
        }
    }
}

/// Wall-clock time in milliseconds since the Unix epoch, 0 if the clock is
/// before the epoch
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
