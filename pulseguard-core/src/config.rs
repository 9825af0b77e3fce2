//! Measurement cycle configuration

use crate::constants::time::{
    ALERT_BLINK_COUNT, ALERT_BLINK_PERIOD_MS, LABEL_HOLD_MS, MEASURE_SECONDS, MS_PER_SECOND,
    SPO2_LOOP_INTERVAL_MS,
};

/// Timing of one measurement cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasurementConfig {
    /// Length of each monitor's acquisition (seconds)
    pub measure_seconds: u32,
    /// Sleep between saturation loop iterations (milliseconds)
    pub spo2_loop_ms: u64,
    /// Time the monitor label is shown before acquisition (milliseconds)
    pub label_hold_ms: u64,
    /// LED on/off cycles on alert
    pub blink_count: u32,
    /// LED half period on alert (milliseconds)
    pub blink_period_ms: u64,
}

impl MeasurementConfig {
    /// Set the acquisition length
    pub fn with_measure_seconds(mut self, seconds: u32) -> Self {
        self.measure_seconds = seconds;
        self
    }

    /// Set the saturation loop interval
    pub fn with_spo2_loop_ms(mut self, ms: u64) -> Self {
        self.spo2_loop_ms = ms;
        self
    }

    /// Set the label hold time
    pub fn with_label_hold_ms(mut self, ms: u64) -> Self {
        self.label_hold_ms = ms;
        self
    }

    /// Set the alert blink pattern
    pub fn with_blink(mut self, count: u32, period_ms: u64) -> Self {
        self.blink_count = count;
        self.blink_period_ms = period_ms;
        self
    }

    /// Acquisition length in milliseconds
    pub fn duration_ms(&self) -> u64 {
        u64::from(self.measure_seconds) * MS_PER_SECOND
    }
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            measure_seconds: MEASURE_SECONDS,
            spo2_loop_ms: SPO2_LOOP_INTERVAL_MS,
            label_hold_ms: LABEL_HOLD_MS,
            blink_count: ALERT_BLINK_COUNT,
            blink_period_ms: ALERT_BLINK_PERIOD_MS,
        }
    }
}
