//! Beat Detection and Rate Smoothing
//!
//! ## Overview
//!
//! The heart-rate pipeline has two stages:
//!
//! ```text
//! IR sample ──► BeatDetector ──► beat? ──► RateSmoother ──► rounded BPM
//!                 (per sample)              (per beat)
//! ```
//!
//! 1. A [`BeatDetector`] looks at one infrared sample at a time and answers
//!    "did a beat happen now". It never revises a past answer.
//! 2. The [`RateSmoother`] turns the time between consecutive beats into an
//!    instantaneous rate, drops implausible rates, and averages the last two
//!    accepted ones.
//!
//! ## Penalty-Based Detector
//!
//! [`PbaBeatDetector`] is the integer detector shipped with the MAX3010x
//! vendor library:
//!
//! - **DC removal**: a first-order IIR (`avg += (x - avg) / 16`, kept in
//!   Q15) tracks the baseline, the residual is the AC component
//! - **Low-pass**: a symmetric 23-tap FIR over a 32-sample ring removes
//!   sensor noise
//! - **Edge logic**: a beat is a rising zero crossing whose preceding
//!   peak-to-peak swing lies in `(20, 1000)` filtered counts
//!
//! The swing window rejects both a flat line (no finger) and the large
//! transients of a finger being placed or moved.

use crate::buffer::SlidingBuffer;
use crate::constants::signal::{
    BEAT_MAX_SWING, BEAT_MIN_SWING, MAX_PLAUSIBLE_BPM, MIN_PLAUSIBLE_BPM, RATE_WINDOW_SIZE,
};
use crate::constants::time::MS_PER_MINUTE;
use crate::time::Timestamp;

/// Stateful edge detector over a live intensity stream
pub trait BeatDetector {
    /// Feed one infrared sample; true if a beat was detected at this sample
    fn check_for_beat(&mut self, ir: u32) -> bool;

    /// Forget all history, as if freshly constructed
    fn reset(&mut self);
}

/// Low-pass FIR coefficients (Q12), taps 0..=11 of a symmetric 23-tap filter
const FIR_COEFFS: [i64; 12] = [172, 321, 579, 927, 1360, 1858, 2390, 2916, 3391, 3768, 4012, 4096];

/// FIR ring length, must be a power of two above the tap count
const FIR_RING: usize = 32;

/// Penalty-based beat detector (MAX3010x vendor algorithm)
#[derive(Debug, Clone)]
pub struct PbaBeatDetector {
    /// DC estimate in Q15
    dc_register: i64,
    fir_ring: [i32; FIR_RING],
    fir_offset: usize,

    ac_current: i32,
    ac_previous: i32,
    /// Running extrema of the current half-wave
    signal_max: i32,
    signal_min: i32,

    positive_edge: bool,
    negative_edge: bool,
}

impl PbaBeatDetector {
    /// Detector with empty history
    pub const fn new() -> Self {
        Self {
            dc_register: 0,
            fir_ring: [0; FIR_RING],
            fir_offset: 0,
            ac_current: 0,
            ac_previous: 0,
            signal_max: 0,
            signal_min: 0,
            positive_edge: false,
            negative_edge: false,
        }
    }

    /// Update the baseline estimate and return it
    fn estimate_dc(&mut self, sample: u32) -> i64 {
        self.dc_register += ((i64::from(sample) << 15) - self.dc_register) >> 4;
        self.dc_register >> 15
    }

    /// Ring element `back` samples before the current write slot
    fn tap(&self, back: usize) -> i64 {
        i64::from(self.fir_ring[(self.fir_offset + FIR_RING - back) & (FIR_RING - 1)])
    }

    fn low_pass(&mut self, input: i32) -> i32 {
        self.fir_ring[self.fir_offset] = input;

        let mut acc = FIR_COEFFS[11] * self.tap(11);
        for (i, coeff) in FIR_COEFFS.iter().take(11).enumerate() {
            acc += coeff * (self.tap(i) + self.tap(22 - i));
        }

        self.fir_offset = (self.fir_offset + 1) % FIR_RING;

        (acc >> 15) as i32
    }
}

impl Default for PbaBeatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl BeatDetector for PbaBeatDetector {
    fn check_for_beat(&mut self, ir: u32) -> bool {
        let mut beat = false;

        self.ac_previous = self.ac_current;
        let dc = self.estimate_dc(ir);
        let ac = (i64::from(ir) - dc).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        self.ac_current = self.low_pass(ac);

        // Rising zero crossing closes a full wave
        if self.ac_previous < 0 && self.ac_current >= 0 {
            let swing = self.signal_max - self.signal_min;

            self.positive_edge = true;
            self.negative_edge = false;
            self.signal_max = 0;

            if swing > BEAT_MIN_SWING && swing < BEAT_MAX_SWING {
                beat = true;
            }
        }

        // Falling zero crossing
        if self.ac_previous > 0 && self.ac_current <= 0 {
            self.positive_edge = false;
            self.negative_edge = true;
            self.signal_min = 0;
        }

        if self.positive_edge && self.ac_current > self.ac_previous {
            self.signal_max = self.ac_current;
        }

        if self.negative_edge && self.ac_current < self.ac_previous {
            self.signal_min = self.ac_current;
        }

        beat
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Instantaneous rate for a beat-to-beat interval, if physiologically plausible
///
/// The rate is rounded to one decimal before the range check. Returns
/// `None` for a zero interval and for rates outside `(20, 255)` BPM.
pub fn instantaneous_rate(interval_ms: u64) -> Option<f32> {
    if interval_ms == 0 {
        return None;
    }

    let bpm = libm::roundf(MS_PER_MINUTE / interval_ms as f32 * 10.0) / 10.0;

    (bpm > MIN_PLAUSIBLE_BPM && bpm < MAX_PLAUSIBLE_BPM).then_some(bpm)
}

/// Converts beat timestamps into smoothed, rounded heart rates
#[derive(Debug, Clone, Default)]
pub struct RateSmoother {
    rates: SlidingBuffer<f32, RATE_WINDOW_SIZE>,
    last_beat: Option<Timestamp>,
    last_rate: Option<f32>,
}

impl RateSmoother {
    /// Smoother with no beat history
    pub const fn new() -> Self {
        Self {
            rates: SlidingBuffer::new(),
            last_beat: None,
            last_rate: None,
        }
    }

    /// Register a beat at `at`; returns the rounded average rate if one was accepted
    ///
    /// The first beat only establishes the reference time. Implausible
    /// rates still move the reference forward but are not averaged.
    pub fn on_beat(&mut self, at: Timestamp) -> Option<f32> {
        let previous = self.last_beat.replace(at)?;
        let rate = instantaneous_rate(at.saturating_sub(previous))?;

        self.last_rate = Some(rate);
        self.rates.push(rate);

        self.average().map(libm::roundf)
    }

    /// Most recent accepted instantaneous rate
    pub fn last_rate(&self) -> Option<f32> {
        self.last_rate
    }

    /// Unrounded mean of the smoothing window
    pub fn average(&self) -> Option<f32> {
        self.rates.mean().ok()
    }

    /// Forget all beats
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    /// Sinusoidal PPG trace: baseline 100000, amplitude 200, given period
    fn ppg(sample: usize, period: usize) -> u32 {
        let phase = 2.0 * core::f32::consts::PI * sample as f32 / period as f32;
        (100_000.0 + 200.0 * libm::sinf(phase)) as u32
    }

    #[test]
    fn rate_from_interval() {
        assert_eq!(instantaneous_rate(800), Some(75.0));
        assert_eq!(instantaneous_rate(1000), Some(60.0));
        assert_eq!(instantaneous_rate(0), None);
    }

    #[test]
    fn implausible_rates_are_rejected() {
        // 3000 ms -> 20 BPM, the bound itself is excluded
        assert_eq!(instantaneous_rate(3000), None);
        assert_eq!(instantaneous_rate(5000), None);
        // 235 ms -> 255.3 BPM
        assert_eq!(instantaneous_rate(235), None);
        assert!(instantaneous_rate(2900).is_some());
        assert!(instantaneous_rate(240).is_some());
    }

    #[test]
    fn first_beat_only_sets_reference() {
        let mut smoother = RateSmoother::new();
        assert_eq!(smoother.on_beat(1_000), None);
        assert_eq!(smoother.on_beat(1_800), Some(75.0));
    }

    #[test]
    fn smoother_averages_last_two_rates() {
        let mut smoother = RateSmoother::new();
        smoother.on_beat(0);
        assert_eq!(smoother.on_beat(1000), Some(60.0));
        // 60 and 75 -> 67.5 -> 68
        assert_eq!(smoother.on_beat(1800), Some(68.0));
        // 75 and 75
        assert_eq!(smoother.on_beat(2600), Some(75.0));
    }

    #[test]
    fn implausible_beat_is_not_averaged() {
        let mut smoother = RateSmoother::new();
        smoother.on_beat(0);
        assert_eq!(smoother.on_beat(800), Some(75.0));

        // Doubled detection 100 ms later -> 600 BPM, dropped
        assert_eq!(smoother.on_beat(900), None);
        assert_eq!(smoother.last_rate(), Some(75.0));

        // Reference moved to 900, so the next interval is 700 ms (85.7 BPM)
        assert_eq!(smoother.on_beat(1600), Some(80.0));
    }

    #[test]
    fn flat_signal_never_beats() {
        let mut detector = PbaBeatDetector::new();
        let beats = (0..1000)
            .filter(|_| detector.check_for_beat(100_000))
            .count();
        assert_eq!(beats, 0);
    }

    #[test]
    fn periodic_signal_beats_once_per_period() {
        let mut detector = PbaBeatDetector::new();

        // 100 samples/s, 80-sample period = 75 BPM, 10 seconds
        let beats: Vec<usize> = (0..1000)
            .filter(|&n| detector.check_for_beat(ppg(n, 80)))
            .collect();

        assert!(
            (9..=13).contains(&beats.len()),
            "expected about 12 beats, got {}",
            beats.len()
        );

        // Once settled, beats are one period apart
        let settled: Vec<usize> = beats.windows(2).skip(2).map(|w| w[1] - w[0]).collect();
        assert!(settled.iter().all(|gap| (78..=82).contains(gap)), "gaps: {:?}", settled);
    }

    #[test]
    fn reset_clears_history() {
        let mut detector = PbaBeatDetector::new();
        for n in 0..300 {
            detector.check_for_beat(ppg(n, 80));
        }
        detector.reset();

        let fresh = PbaBeatDetector::new();
        assert_eq!(detector.dc_register, fresh.dc_register);
        assert_eq!(detector.fir_offset, fresh.fir_offset);
    }
}
