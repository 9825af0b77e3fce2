//! Signal Windows and Quality Limits
//!
//! Sizes of the sliding windows used by the heart-rate and saturation
//! pipelines, and the limits that decide which values are kept.

// ===== WINDOW SIZES =====

/// Raw red/infrared window length for the saturation estimate (samples).
///
/// At the sensor's effective 25 samples/s (100 sps, 4-sample averaging)
/// this covers 4 seconds, enough for 3-6 pulse cycles at resting rates.
///
/// Source: Maxim RD117 reference design buffer length
pub const RAW_WINDOW_SIZE: usize = 100;

/// Rolling window for instantaneous heart-rate smoothing (beats).
///
/// Source: SparkFun MAX3010x heart-rate example (`RATE_SIZE`)
pub const RATE_WINDOW_SIZE: usize = 2;

/// Rolling window for saturation smoothing (valid estimates).
pub const SPO2_SMOOTHING_WINDOW_SIZE: usize = 4;

// ===== PLAUSIBILITY =====

/// Lower exclusive bound for an accepted instantaneous rate (BPM).
///
/// Anything slower is a missed beat, not bradycardia.
pub const MIN_PLAUSIBLE_BPM: f32 = 20.0;

/// Upper exclusive bound for an accepted instantaneous rate (BPM).
///
/// Anything faster is a doubled detection or motion artefact.
pub const MAX_PLAUSIBLE_BPM: f32 = 255.0;

/// Raw-window mean below which no finger is on the sensor (ADC counts).
///
/// Both the red and the infrared window means must fall below this floor
/// for a reading to be forced to 0. Empirical, 18-bit native scale.
pub const FINGER_PRESENCE_FLOOR: f32 = 50_000.0;

/// Saturation reported when no finger is detected (%).
pub const FINGER_NOT_DETECTED_SPO2: f32 = 0.0;

// ===== BEAT DETECTOR =====

/// Minimum peak-to-peak AC swing accepted as a beat (filtered counts).
pub const BEAT_MIN_SWING: i32 = 20;

/// Maximum peak-to-peak AC swing accepted as a beat (filtered counts).
///
/// Larger swings are motion or a finger being placed.
pub const BEAT_MAX_SWING: i32 = 1000;

/// Samples between progress log lines in the heart-rate loop.
pub const PROGRESS_LOG_INTERVAL: u64 = 100;

// ===== SATURATION ESTIMATOR =====

/// Maximum number of pulse valleys tracked per window.
pub const MAX_VALLEYS: usize = 15;

/// Minimum distance between two valleys (samples).
pub const MIN_VALLEY_DISTANCE: usize = 4;

/// Bounds for the adaptive valley threshold (filtered counts).
pub const VALLEY_THRESHOLD_MIN: i32 = 30;

/// Upper bound for the adaptive valley threshold (filtered counts).
pub const VALLEY_THRESHOLD_MAX: i32 = 60;

/// Maximum number of per-beat AC/DC ratios kept per window.
pub const MAX_RATIOS: usize = 5;

/// Ratio range (×100) covered by the calibration curve.
///
/// Source: Maxim RD117 `uch_spo2_table` bounds
pub const RATIO_MIN: i32 = 3;

/// Upper bound (×100, exclusive) of the calibration curve.
pub const RATIO_MAX: i32 = 184;
