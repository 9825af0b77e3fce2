//! Time-Related Constants
//!
//! Durations and intervals for measurement cycles and the alert blink.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Milliseconds per minute, numerator for interval → BPM conversion.
pub const MS_PER_MINUTE: f32 = 60_000.0;

// ===== MEASUREMENT CYCLE =====

/// Duration of one monitor's measurement cycle (seconds).
///
/// Long enough for ~15 beats at resting rate and ~7 saturation windows.
pub const MEASURE_SECONDS: u32 = 15;

/// Sleep between saturation loop iterations (milliseconds).
///
/// Caps estimator invocations at 2 Hz regardless of how fast raw samples
/// arrive.
pub const SPO2_LOOP_INTERVAL_MS: u64 = 500;

/// Pause before re-polling an empty sensor FIFO (milliseconds).
///
/// A 100 sps sensor fills one slot every 10 ms; the pause keeps a stalled
/// sensor from pinning a core while the loop waits for its deadline.
pub const FIFO_POLL_INTERVAL_MS: u64 = 1;

/// How long the monitor label stays on screen before the countdown (milliseconds).
pub const LABEL_HOLD_MS: u64 = 1000;

// ===== ALERT BLINK =====

/// Number of LED on/off cycles for an alert.
pub const ALERT_BLINK_COUNT: u32 = 6;

/// LED on time and off time for an alert blink (milliseconds).
pub const ALERT_BLINK_PERIOD_MS: u64 = 100;

// ===== TRIGGER =====

/// Rising edges closer than this to the previous one are ignored (milliseconds).
pub const TRIGGER_DEBOUNCE_MS: u64 = 200;
