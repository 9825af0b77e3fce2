//! Ambient temperature and humidity
//!
//! The station carries an SHT31 next to the optical sensor. Its readings are
//! not part of the vitals; they are reported separately through
//! `POST /env`.
//!
//! A single-shot measurement returns six bytes:
//!
//! ```text
//! [T_msb, T_lsb, T_crc, RH_msb, RH_lsb, RH_crc]
//! ```
//!
//! Each 16-bit word is followed by a CRC-8 (poly 0x31, init 0xFF). A frame
//! with a bad checksum is rejected instead of converted.

use crate::errors::{MeasurementError, MeasurementResult};
use crate::records::EnvironmentRecord;

const CRC8_POLYNOMIAL: u8 = 0x31;
const CRC8_INIT: u8 = 0xFF;

/// Sensirion CRC-8 over `data`
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC8_INIT;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC8_POLYNOMIAL
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Converted ambient measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientReading {
    /// Air temperature (°C)
    pub celsius: f32,
    /// Relative humidity (%)
    pub humidity: f32,
}

impl AmbientReading {
    /// Decode a raw SHT31 frame
    pub fn from_sht31(frame: &[u8; 6]) -> MeasurementResult<Self> {
        if crc8(&frame[0..2]) != frame[2] || crc8(&frame[3..5]) != frame[5] {
            return Err(MeasurementError::SensorReadFailed {
                reason: "SHT31 checksum mismatch",
            });
        }

        let raw_temperature = f32::from(u16::from_be_bytes([frame[0], frame[1]]));
        let raw_humidity = f32::from(u16::from_be_bytes([frame[3], frame[4]]));

        Ok(Self {
            celsius: -45.0 + 175.0 * raw_temperature / 65535.0,
            humidity: 100.0 * raw_humidity / 65535.0,
        })
    }

    /// Temperature in °F
    pub fn fahrenheit(&self) -> f32 {
        self.celsius * 1.8 + 32.0
    }

    /// Record for the persistence API
    pub fn to_record(&self) -> EnvironmentRecord {
        EnvironmentRecord {
            temperature: f64::from(self.celsius),
            humidity: f64::from(self.humidity),
        }
    }
}
