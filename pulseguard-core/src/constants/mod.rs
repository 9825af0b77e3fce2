//! Constants for PulseGuard Core
//!
//! Every numeric value the pipelines depend on is defined here with its
//! unit and origin.
//!
//! ## Organization
//!
//! - **Signal**: window sizes, plausibility bounds, signal-quality floors
//! - **Thresholds**: alerting limits for heart rate and saturation
//! - **Time**: cycle durations, loop intervals, blink timing
//! - **Sensors**: I2C addresses and device identifiers
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Include the unit in the name (`_MS`, `_BPM`, `_PCT`)
//! 3. Reference the datasheet or deployment the value comes from

/// Window sizes and signal-quality limits for the PPG pipelines.
pub mod signal;

/// Alerting thresholds for the measured vitals.
pub mod thresholds;

/// Durations and intervals for measurement cycles.
pub mod time;

/// Sensor addresses and identifiers.
pub mod sensors;

// Re-export commonly used constants for convenience
pub use signal::{
    RAW_WINDOW_SIZE, RATE_WINDOW_SIZE, SPO2_SMOOTHING_WINDOW_SIZE,
    MIN_PLAUSIBLE_BPM, MAX_PLAUSIBLE_BPM, FINGER_PRESENCE_FLOOR,
};

pub use thresholds::{HEART_RATE_MIN_BPM, HEART_RATE_MAX_BPM, SPO2_MIN_PCT};

pub use time::{
    MS_PER_SECOND, MS_PER_MINUTE, MEASURE_SECONDS, SPO2_LOOP_INTERVAL_MS,
};
