//! Sample and record types exchanged with sensors and the persistence API

use core::fmt;

/// One red/infrared intensity pair read from the sensor FIFO
///
/// Values are on the sensor's native 18-bit scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    /// Red LED channel
    pub red: u32,
    /// Infrared LED channel
    pub ir: u32,
}

impl RawSample {
    /// Pair from red and infrared counts
    pub const fn new(red: u32, ir: u32) -> Self {
        Self { red, ir }
    }
}

/// Result of a full measurement cycle, as stored and alerted on
///
/// Serializes to `{"heart_rate": .., "oxygen_saturation": ..}`, the body of
/// `POST /health` and `POST /sms_alert`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthRecord {
    /// Median heart rate in BPM
    pub heart_rate: f64,
    /// Median oxygen saturation in percent
    pub oxygen_saturation: f64,
}

impl HealthRecord {
    /// Record from the two monitor results
    pub fn new(heart_rate: f32, oxygen_saturation: f32) -> Self {
        Self {
            heart_rate: heart_rate as f64,
            oxygen_saturation: oxygen_saturation as f64,
        }
    }
}

/// Two-line summary shown on the display after a cycle
impl fmt::Display for HealthRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HR: {:.2} bpm\nSpO2: {:.2} %",
            self.heart_rate, self.oxygen_saturation
        )
    }
}

/// Ambient conditions, body of `POST /env`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvironmentRecord {
    /// Air temperature in °C
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
}
