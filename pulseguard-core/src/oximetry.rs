//! Oxygen Saturation Windowing and Estimation
//!
//! ## Overview
//!
//! Saturation is estimated from a full window of raw red/infrared samples,
//! not sample by sample:
//!
//! ```text
//! raw pairs ──► SaturationWindow (100) ──► full? ──► SaturationEstimator
//!                                                        │ valid?
//!                                                        ▼
//!                      finger check ◄── mean of last 4 valid estimates
//! ```
//!
//! ## Windowing Rules
//!
//! - The estimator is invoked only when the raw window holds exactly 100
//!   pairs. A partially filled window is never estimated.
//! - An estimate the routine flags as unreliable is skipped outright; no
//!   sentinel enters the smoothing buffer.
//! - When the mean of both raw windows is under the finger-presence floor
//!   the smoothed reading is replaced by 0 rather than discarded, so "no
//!   finger" shows up in the cycle result.
//!
//! ## Ratio-of-Ratios Estimator
//!
//! [`RatioOfRatiosEstimator`] follows the Maxim RD117 approach:
//!
//! 1. Remove the infrared DC level and invert the trace, so pulse valleys
//!    become peaks
//! 2. Smooth with a 4-point moving average
//! 3. Find valleys above an adaptive threshold, at least 4 samples apart
//! 4. Between consecutive valleys, measure the AC swing of each channel
//!    against a line joining the two valley values, and its DC maximum
//! 5. `R = (AC_red / DC_red) / (AC_ir / DC_ir)`, median over the beats
//! 6. `SpO2 = -45.060·R² + 30.354·R + 94.845`
//!
//! The estimate is invalid with fewer than two valleys or when `R` falls
//! outside the calibrated range.

use heapless::Vec;

use crate::buffer::SlidingBuffer;
use crate::constants::signal::{
    FINGER_NOT_DETECTED_SPO2, FINGER_PRESENCE_FLOOR, MAX_RATIOS, MAX_VALLEYS,
    MIN_VALLEY_DISTANCE, RATIO_MAX, RATIO_MIN, RAW_WINDOW_SIZE, SPO2_SMOOTHING_WINDOW_SIZE,
    VALLEY_THRESHOLD_MAX, VALLEY_THRESHOLD_MIN,
};
use crate::records::RawSample;

/// Output of one estimator run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationEstimate {
    /// Saturation in percent, meaningless when `valid` is false
    pub spo2: f32,
    /// Whether the window was reliable enough to estimate
    pub valid: bool,
}

impl SaturationEstimate {
    /// A reliable estimate
    pub const fn valid(spo2: f32) -> Self {
        Self { spo2, valid: true }
    }

    /// An unreliable window
    pub const fn invalid() -> Self {
        Self {
            spo2: 0.0,
            valid: false,
        }
    }
}

/// Numeric routine turning a raw red/infrared window into a saturation
pub trait SaturationEstimator {
    /// Estimate over equally long, chronologically ordered windows
    fn estimate(&mut self, red: &[u32], ir: &[u32]) -> SaturationEstimate;
}

/// Ratio-of-ratios estimator (Maxim RD117 style)
#[derive(Debug, Clone, Copy, Default)]
pub struct RatioOfRatiosEstimator;

impl RatioOfRatiosEstimator {
    /// New estimator, stateless between windows
    pub const fn new() -> Self {
        Self
    }

    /// Calibration curve, `ratio` scaled by 100
    pub fn spo2_from_ratio(ratio: i32) -> f32 {
        let r = ratio as f32 / 100.0;
        (-45.060 * r * r + 30.354 * r + 94.845).clamp(0.0, 100.0)
    }
}

impl SaturationEstimator for RatioOfRatiosEstimator {
    fn estimate(&mut self, red: &[u32], ir: &[u32]) -> SaturationEstimate {
        let n = ir.len();
        if red.len() != n || n < 2 * MIN_VALLEY_DISTANCE || n > RAW_WINDOW_SIZE {
            return SaturationEstimate::invalid();
        }

        let ir_mean = (ir.iter().map(|&v| i64::from(v)).sum::<i64>() / n as i64) as i32;

        // Inverted AC trace: valleys become peaks
        let mut trace: Vec<i32, RAW_WINDOW_SIZE> = Vec::new();
        for &v in ir {
            let _ = trace.push(ir_mean - v as i32);
        }

        // 4-point moving average
        for k in 0..n.saturating_sub(4) {
            trace[k] = (trace[k] + trace[k + 1] + trace[k + 2] + trace[k + 3]) / 4;
        }

        let threshold = (trace.iter().map(|&v| i64::from(v)).sum::<i64>() / n as i64) as i32;
        let threshold = threshold.clamp(VALLEY_THRESHOLD_MIN, VALLEY_THRESHOLD_MAX);

        let valleys = find_peaks(&trace, threshold);
        if valleys.len() < 2 {
            return SaturationEstimate::invalid();
        }

        let mut ratios: Vec<i32, MAX_RATIOS> = Vec::new();
        for pair in valleys.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            if end - start <= 3 || ratios.is_full() {
                continue;
            }

            let Some(red_ac_dc) = ac_and_dc(red, start, end) else { continue };
            let Some(ir_ac_dc) = ac_and_dc(ir, start, end) else { continue };

            if let Some(ratio) = scaled_ratio(red_ac_dc, ir_ac_dc) {
                let _ = ratios.push(ratio);
            }
        }

        if ratios.is_empty() {
            return SaturationEstimate::invalid();
        }

        ratios.sort_unstable();
        let mid = ratios.len() / 2;
        let ratio = if ratios.len() % 2 == 0 && ratios.len() > 1 {
            (ratios[mid - 1] + ratios[mid]) / 2
        } else {
            ratios[mid]
        };

        if ratio >= RATIO_MIN && ratio < RATIO_MAX {
            SaturationEstimate::valid(Self::spo2_from_ratio(ratio))
        } else {
            SaturationEstimate::invalid()
        }
    }
}

/// AC swing and DC maximum of `signal` between two valley indices
///
/// The AC part is the maximum's height above the straight line joining
/// the two valley values.
/// `(AC_red / DC_red) / (AC_ir / DC_ir)` scaled by 100
///
/// `None` for a zero ratio or one that does not fit an `i32`; a tiny
/// infrared swing under a bright red level must not wrap into range.
fn scaled_ratio(red: (i64, i64), ir: (i64, i64)) -> Option<i32> {
    let numerator = red.0.checked_mul(ir.1)?.checked_mul(100)?;
    let denominator = ir.0.checked_mul(red.1)?;
    if denominator <= 0 || numerator == 0 {
        return None;
    }
    i32::try_from(numerator / denominator).ok()
}

fn ac_and_dc(signal: &[u32], start: usize, end: usize) -> Option<(i64, i64)> {
    let (offset, &max) = signal[start..=end]
        .iter()
        .enumerate()
        .max_by_key(|&(_, v)| *v)?;
    let max_index = start + offset;

    let v_start = i64::from(signal[start]);
    let v_end = i64::from(signal[end]);
    let baseline =
        v_start + (v_end - v_start) * (max_index - start) as i64 / (end - start) as i64;

    let ac = i64::from(max) - baseline;
    (ac > 0).then_some((ac, i64::from(max)))
}

/// Peak indices above `min_height`, at least `MIN_VALLEY_DISTANCE` apart,
/// strongest `MAX_VALLEYS` kept, returned in ascending index order
fn find_peaks(trace: &[i32], min_height: i32) -> Vec<usize, MAX_VALLEYS> {
    let mut candidates: Vec<usize, RAW_WINDOW_SIZE> = Vec::new();

    let n = trace.len();
    let mut i = 1;
    while i + 1 < n {
        if trace[i] > min_height && trace[i] > trace[i - 1] {
            // Walk across flat tops
            let mut width = 1;
            while i + width < n && trace[i] == trace[i + width] {
                width += 1;
            }

            if i + width < n && trace[i] > trace[i + width] {
                let _ = candidates.push(i);
                i += width + 1;
            } else {
                i += width;
            }
        } else {
            i += 1;
        }
    }

    // Strongest first, then drop weaker neighbours that are too close
    candidates.sort_unstable_by(|&a, &b| trace[b].cmp(&trace[a]).then(a.cmp(&b)));

    let mut kept: Vec<usize, MAX_VALLEYS> = Vec::new();
    for &candidate in candidates.iter() {
        if kept.is_full() {
            break;
        }
        let too_close = kept
            .iter()
            .any(|&k| k.abs_diff(candidate) < MIN_VALLEY_DISTANCE);
        if !too_close {
            let _ = kept.push(candidate);
        }
    }

    kept.sort_unstable();
    kept
}

/// Smoothed reading produced from a full window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationReading {
    /// Value entering the accumulation, 0 when no finger was detected
    pub value: f32,
    /// False when both raw-window means were below the presence floor
    pub finger_detected: bool,
}

/// Raw red/infrared windows plus the smoothing buffer of one cycle
#[derive(Clone)]
pub struct SaturationWindow {
    red: SlidingBuffer<u32, RAW_WINDOW_SIZE>,
    ir: SlidingBuffer<u32, RAW_WINDOW_SIZE>,
    smoothing: SlidingBuffer<f32, SPO2_SMOOTHING_WINDOW_SIZE>,
    red_scratch: [u32; RAW_WINDOW_SIZE],
    ir_scratch: [u32; RAW_WINDOW_SIZE],
}

impl SaturationWindow {
    /// Empty windows
    pub const fn new() -> Self {
        Self {
            red: SlidingBuffer::new(),
            ir: SlidingBuffer::new(),
            smoothing: SlidingBuffer::new(),
            red_scratch: [0; RAW_WINDOW_SIZE],
            ir_scratch: [0; RAW_WINDOW_SIZE],
        }
    }

    /// Append a raw pair, evicting the oldest once 100 are held
    pub fn push(&mut self, sample: RawSample) {
        self.red.push(sample.red);
        self.ir.push(sample.ir);
    }

    /// Number of raw pairs held
    pub fn len(&self) -> usize {
        self.ir.len()
    }

    /// True when no raw pair is held
    pub fn is_empty(&self) -> bool {
        self.ir.is_empty()
    }

    /// True when the raw window holds exactly its capacity
    pub fn is_full(&self) -> bool {
        self.ir.is_full()
    }

    /// False when both raw-window means are under the presence floor
    pub fn finger_detected(&self) -> bool {
        let red_mean = self.red.mean().unwrap_or(0.0);
        let ir_mean = self.ir.mean().unwrap_or(0.0);
        !(red_mean < FINGER_PRESENCE_FLOOR && ir_mean < FINGER_PRESENCE_FLOOR)
    }

    /// Run the estimator on a full window and smooth the result
    ///
    /// Returns `None` without invoking `estimator` while the window is
    /// filling, and `None` when the estimate is invalid.
    pub fn reduce<E: SaturationEstimator>(&mut self, estimator: &mut E) -> Option<SaturationReading> {
        if !self.is_full() {
            return None;
        }

        let n = self.red.copy_into(&mut self.red_scratch);
        self.ir.copy_into(&mut self.ir_scratch);

        let estimate = estimator.estimate(&self.red_scratch[..n], &self.ir_scratch[..n]);
        if !estimate.valid {
            return None;
        }

        self.smoothing.push(estimate.spo2);
        let smoothed = self.smoothing.mean().ok()?;

        if self.finger_detected() {
            Some(SaturationReading {
                value: smoothed,
                finger_detected: true,
            })
        } else {
            Some(SaturationReading {
                value: FINGER_NOT_DETECTED_SPO2,
                finger_detected: false,
            })
        }
    }
}

impl Default for SaturationWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    /// Records the window lengths it was invoked with
    struct Recording {
        lengths: std::vec::Vec<usize>,
        result: SaturationEstimate,
    }

    impl SaturationEstimator for Recording {
        fn estimate(&mut self, red: &[u32], ir: &[u32]) -> SaturationEstimate {
            assert_eq!(red.len(), ir.len());
            self.lengths.push(ir.len());
            self.result
        }
    }

    fn recording(result: SaturationEstimate) -> Recording {
        Recording {
            lengths: std::vec::Vec::new(),
            result,
        }
    }

    fn pulse(k: usize, dc: f32, ac: f32) -> u32 {
        let phase = 2.0 * core::f32::consts::PI * k as f32 / 25.0;
        (dc + ac * libm::sinf(phase)) as u32
    }

    #[test]
    fn estimator_only_runs_on_full_window() {
        let mut window = SaturationWindow::new();
        let mut estimator = recording(SaturationEstimate::valid(97.0));

        for k in 0..99 {
            window.push(RawSample::new(100_000, 100_000 + k));
            assert_eq!(window.reduce(&mut estimator), None);
        }
        assert!(estimator.lengths.is_empty());

        window.push(RawSample::new(100_000, 100_000));
        assert!(window.reduce(&mut estimator).is_some());

        // Stays full under eviction
        for _ in 0..50 {
            window.push(RawSample::new(100_000, 100_000));
            window.reduce(&mut estimator);
        }
        assert!(estimator.lengths.iter().all(|&len| len == RAW_WINDOW_SIZE));
        assert_eq!(window.len(), RAW_WINDOW_SIZE);
    }

    #[test]
    fn invalid_estimate_is_skipped() {
        let mut window = SaturationWindow::new();
        for _ in 0..RAW_WINDOW_SIZE {
            window.push(RawSample::new(120_000, 110_000));
        }

        let mut invalid = recording(SaturationEstimate::invalid());
        assert_eq!(window.reduce(&mut invalid), None);

        // Invalid run left nothing in the smoothing buffer
        let mut valid = recording(SaturationEstimate::valid(96.0));
        let reading = window.reduce(&mut valid).unwrap();
        assert_eq!(reading.value, 96.0);
    }

    #[test]
    fn smoothing_averages_last_four() {
        let mut window = SaturationWindow::new();
        for _ in 0..RAW_WINDOW_SIZE {
            window.push(RawSample::new(120_000, 110_000));
        }

        let mut last = None;
        for spo2 in [90.0, 100.0, 96.0, 98.0, 98.0] {
            let mut estimator = recording(SaturationEstimate::valid(spo2));
            last = window.reduce(&mut estimator);
        }

        // Window holds 100, 96, 98, 98
        assert_eq!(last.unwrap().value, 98.0);
    }

    #[test]
    fn finger_absent_forces_zero() {
        let mut window = SaturationWindow::new();
        for _ in 0..RAW_WINDOW_SIZE {
            window.push(RawSample::new(1_200, 900));
        }

        let mut estimator = recording(SaturationEstimate::valid(99.0));
        let reading = window.reduce(&mut estimator).unwrap();

        assert_eq!(reading.value, 0.0);
        assert!(!reading.finger_detected);
    }

    #[test]
    fn one_bright_channel_counts_as_finger() {
        let mut window = SaturationWindow::new();
        for _ in 0..RAW_WINDOW_SIZE {
            window.push(RawSample::new(30_000, 80_000));
        }

        assert!(window.finger_detected());
    }

    #[test]
    fn ratio_of_ratios_on_synthetic_pulse() {
        // R = (400/80000) / (1000/100000) = 0.5 -> ~98.8 %
        let red: std::vec::Vec<u32> = (0..100).map(|k| pulse(k, 80_000.0, 400.0)).collect();
        let ir: std::vec::Vec<u32> = (0..100).map(|k| pulse(k, 100_000.0, 1000.0)).collect();

        let estimate = RatioOfRatiosEstimator::new().estimate(&red, &ir);

        assert!(estimate.valid);
        assert!(
            (97.5..=100.0).contains(&estimate.spo2),
            "spo2 = {}",
            estimate.spo2
        );
    }

    #[test]
    fn flat_window_is_invalid() {
        let flat = [100_000u32; 100];
        assert!(!RatioOfRatiosEstimator::new().estimate(&flat, &flat).valid);

        let zeros = [0u32; 100];
        assert!(!RatioOfRatiosEstimator::new().estimate(&zeros, &zeros).valid);
    }

    #[test]
    fn ratio_scaling() {
        // (400 / 80000) / (1000 / 100000) = 0.5
        assert_eq!(scaled_ratio((400, 80_000), (1_000, 100_000)), Some(50));
        assert_eq!(scaled_ratio((0, 80_000), (1_000, 100_000)), None);
    }

    #[test]
    fn out_of_range_ratio_is_dropped() {
        // 4e17 does not fit an i32
        assert_eq!(scaled_ratio((4_000_000_000, 1), (1, 1_000_000)), None);
        // Overflows the i64 product
        assert_eq!(
            scaled_ratio((4_000_000_000, 4_000_000_000), (1, 4_000_000_000)),
            None
        );
    }

    #[test]
    fn mismatched_windows_are_invalid() {
        let red = [100_000u32; 100];
        let ir = [100_000u32; 90];
        assert!(!RatioOfRatiosEstimator::new().estimate(&red, &ir).valid);
    }

    #[test]
    fn calibration_curve() {
        let spo2 = RatioOfRatiosEstimator::spo2_from_ratio(50);
        assert!((spo2 - 98.757).abs() < 0.01);
        assert!(RatioOfRatiosEstimator::spo2_from_ratio(180) < RatioOfRatiosEstimator::spo2_from_ratio(50));
    }
}
