//! Alerting Thresholds
//!
//! Limits a completed measurement is classified against. A reading outside
//! any of them escalates to the LED blink and the SMS alert.

/// Heart rate below this is alerted (BPM).
///
/// Deliberately low: the device targets gross failures (no pulse, sensor
/// reading a near-flat line) rather than clinical bradycardia.
///
/// Source: bedside station deployment configuration
pub const HEART_RATE_MIN_BPM: f32 = 20.0;

/// Heart rate above this is alerted (BPM).
///
/// Source: bedside station deployment configuration
pub const HEART_RATE_MAX_BPM: f32 = 180.0;

/// Oxygen saturation below this is alerted (%).
///
/// 94% is the common lower bound for healthy adults at sea level.
///
/// Source: British Thoracic Society oxygen guideline target range
pub const SPO2_MIN_PCT: f32 = 94.0;
