//! Static Sensor Ranges

use ring_buffer::Channel;
use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether the value lies inside the band (bounds inclusive)
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Width of the band
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Thresholds for one channel: overall limits plus the three severity bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorRange {
    pub min: f64,
    pub max: f64,
    pub normal: Band,
    pub warning: Band,
    pub critical: Band,
}

impl SensorRange {
    /// Overall valid limits as a band
    pub fn limits(&self) -> Band {
        Band::new(self.min, self.max)
    }
}

/// Ranges for every sensor channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorRanges {
    pub engine_temp: SensorRange,
    pub oil_pressure: SensorRange,
    pub battery_voltage: SensorRange,
    pub engine_vibration: SensorRange,
    pub rpm: SensorRange,
}

impl SensorRanges {
    /// Range configured for a channel
    pub fn get(&self, channel: Channel) -> &SensorRange {
        match channel {
            Channel::EngineTemp => &self.engine_temp,
            Channel::OilPressure => &self.oil_pressure,
            Channel::BatteryVoltage => &self.battery_voltage,
            Channel::EngineVibration => &self.engine_vibration,
            Channel::Rpm => &self.rpm,
        }
    }
}

impl Default for SensorRanges {
    fn default() -> Self {
        Self {
            engine_temp: SensorRange {
                min: 0.0,
                max: 150.0,
                normal: Band::new(80.0, 95.0),
                warning: Band::new(95.0, 110.0),
                critical: Band::new(110.0, 150.0),
            },
            oil_pressure: SensorRange {
                min: 0.0,
                max: 10.0,
                normal: Band::new(3.0, 6.0),
                warning: Band::new(1.5, 3.0),
                critical: Band::new(0.0, 1.5),
            },
            battery_voltage: SensorRange {
                min: 8.0,
                max: 16.0,
                normal: Band::new(12.4, 14.4),
                warning: Band::new(11.8, 12.4),
                critical: Band::new(8.0, 11.8),
            },
            engine_vibration: SensorRange {
                min: 0.0,
                max: 100.0,
                normal: Band::new(0.0, 20.0),
                warning: Band::new(20.0, 50.0),
                critical: Band::new(50.0, 100.0),
            },
            rpm: SensorRange {
                min: 0.0,
                max: 8000.0,
                normal: Band::new(800.0, 3000.0),
                warning: Band::new(3000.0, 5000.0),
                critical: Band::new(5000.0, 8000.0),
            },
        }
    }
}
