//! Shared fixtures for the integration tests
//!
//! - Synthetic sample sources driving a shared [`MockClock`], and one that
//!   never delivers a sample
//! - Scripted beat detector and saturation estimators
//! - Recording display, persistence and LED whose logs outlive the station

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use pulseguard_core::beat::BeatDetector;
use pulseguard_core::oximetry::{SaturationEstimate, SaturationEstimator};
use pulseguard_core::time::MockClock;
use pulseguard_core::{
    AlertIndicator, Display, HealthRecord, MeasurementError, MeasurementResult, PersistenceApi,
    Placement, RawSample, SampleSource,
};

/// Log shared between a fixture and the test that inspects it
pub type Shared<T> = Arc<Mutex<Vec<T>>>;

pub fn shared<T>() -> Shared<T> {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn snapshot<T: Clone>(log: &Shared<T>) -> Vec<T> {
    log.lock().unwrap().clone()
}

/// Infrared/red sinusoid at 100 sps; each read advances the clock 10 ms
pub struct SyntheticPpg {
    clock: MockClock,
    period_samples: usize,
    sample: usize,
    pub fail_begin: Arc<AtomicBool>,
    pub running: bool,
}

impl SyntheticPpg {
    pub const STEP_MS: u64 = 10;

    pub fn new(clock: MockClock, period_samples: usize) -> Self {
        Self {
            clock,
            period_samples,
            sample: 0,
            fail_begin: Arc::new(AtomicBool::new(false)),
            running: false,
        }
    }

    fn value(&self, baseline: f32) -> u32 {
        let phase = 2.0 * std::f32::consts::PI * self.sample as f32 / self.period_samples as f32;
        (baseline + 200.0 * phase.sin()) as u32
    }
}

impl SampleSource for SyntheticPpg {
    fn begin(&mut self) -> MeasurementResult<()> {
        if self.fail_begin.load(Ordering::SeqCst) {
            return Err(MeasurementError::SensorInitFailed {
                reason: "no device",
            });
        }
        self.running = true;
        Ok(())
    }

    fn end(&mut self) {
        self.running = false;
    }

    fn samples_available(&mut self) -> MeasurementResult<usize> {
        Ok(1)
    }

    fn try_read_pair(&mut self) -> nb::Result<RawSample, MeasurementError> {
        self.clock.advance(Self::STEP_MS);
        self.sample += 1;
        Ok(RawSample::new(self.value(80_000.0), self.value(100_000.0)))
    }
}

/// Sensor whose FIFO never fills; `claimed` is what `samples_available` reports
pub struct StalledSensor {
    pub claimed: usize,
    pub polls: usize,
}

impl StalledSensor {
    pub fn new(claimed: usize) -> Self {
        Self { claimed, polls: 0 }
    }
}

impl SampleSource for StalledSensor {
    fn begin(&mut self) -> MeasurementResult<()> {
        Ok(())
    }

    fn end(&mut self) {}

    fn samples_available(&mut self) -> MeasurementResult<usize> {
        Ok(self.claimed)
    }

    fn try_read_pair(&mut self) -> nb::Result<RawSample, MeasurementError> {
        self.polls += 1;
        Err(nb::Error::WouldBlock)
    }
}

/// Fires on every `every`-th sample
pub struct ScriptedDetector {
    every: usize,
    seen: usize,
}

impl ScriptedDetector {
    pub fn every(every: usize) -> Self {
        Self { every, seen: 0 }
    }
}

impl BeatDetector for ScriptedDetector {
    fn check_for_beat(&mut self, _ir: u32) -> bool {
        self.seen += 1;
        self.seen % self.every == 0
    }

    fn reset(&mut self) {
        self.seen = 0;
    }
}

/// Constant red/infrared levels, `per_poll` samples available each poll
pub struct FlatOximeter {
    sample: RawSample,
    per_poll: usize,
}

impl FlatOximeter {
    pub fn new(red: u32, ir: u32, per_poll: usize) -> Self {
        Self {
            sample: RawSample::new(red, ir),
            per_poll,
        }
    }
}

impl SampleSource for FlatOximeter {
    fn begin(&mut self) -> MeasurementResult<()> {
        Ok(())
    }

    fn end(&mut self) {}

    fn samples_available(&mut self) -> MeasurementResult<usize> {
        Ok(self.per_poll)
    }

    fn try_read_pair(&mut self) -> nb::Result<RawSample, MeasurementError> {
        Ok(self.sample)
    }
}

/// Always returns the same estimate
pub struct FixedEstimator(pub SaturationEstimate);

impl FixedEstimator {
    pub fn valid(spo2: f32) -> Self {
        Self(SaturationEstimate::valid(spo2))
    }

    pub fn invalid() -> Self {
        Self(SaturationEstimate::invalid())
    }
}

impl SaturationEstimator for FixedEstimator {
    fn estimate(&mut self, _red: &[u32], _ir: &[u32]) -> SaturationEstimate {
        self.0
    }
}

/// Valid estimate, records the window length of every call
pub struct CountingEstimator {
    pub lengths: Shared<usize>,
}

impl SaturationEstimator for CountingEstimator {
    fn estimate(&mut self, red: &[u32], ir: &[u32]) -> SaturationEstimate {
        assert_eq!(red.len(), ir.len());
        self.lengths.lock().unwrap().push(ir.len());
        SaturationEstimate::valid(98.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Show(String, Placement, u8),
    Countdown(u32),
    Clear,
}

/// Display recording every call; optionally blocks in its first countdown
pub struct RecordingDisplay {
    pub screens: Shared<Screen>,
    gate: Option<(Sender<()>, Receiver<()>)>,
}

impl RecordingDisplay {
    pub fn new(screens: Shared<Screen>) -> Self {
        Self {
            screens,
            gate: None,
        }
    }

    /// First countdown reports on `started`, then waits for `release`
    pub fn gated(screens: Shared<Screen>, started: Sender<()>, release: Receiver<()>) -> Self {
        Self {
            screens,
            gate: Some((started, release)),
        }
    }
}

impl Display for RecordingDisplay {
    fn show(&mut self, text: &str, placement: Placement, font_size: u8) {
        self.screens
            .lock()
            .unwrap()
            .push(Screen::Show(text.to_string(), placement, font_size));
    }

    fn countdown(&mut self, seconds: u32) {
        self.screens.lock().unwrap().push(Screen::Countdown(seconds));
        if let Some((started, release)) = self.gate.take() {
            started.send(()).unwrap();
            release.recv().unwrap();
        }
    }

    fn clear(&mut self) {
        self.screens.lock().unwrap().push(Screen::Clear);
    }
}

/// Persistence recording stored records and alert requests
pub struct RecordingPersistence {
    pub stored: Shared<HealthRecord>,
    pub alerts: Shared<HealthRecord>,
    pub fail: bool,
}

impl RecordingPersistence {
    pub fn new(stored: Shared<HealthRecord>, alerts: Shared<HealthRecord>) -> Self {
        Self {
            stored,
            alerts,
            fail: false,
        }
    }
}

impl PersistenceApi for RecordingPersistence {
    type Error = &'static str;

    fn store_health(&mut self, record: &HealthRecord) -> Result<(), Self::Error> {
        if self.fail {
            return Err("backend unreachable");
        }
        self.stored.lock().unwrap().push(*record);
        Ok(())
    }

    fn send_sms_alert(&mut self, record: &HealthRecord) -> Result<(), Self::Error> {
        if self.fail {
            return Err("backend unreachable");
        }
        self.alerts.lock().unwrap().push(*record);
        Ok(())
    }
}

/// LED recording every level it is driven to
pub struct RecordingLed {
    pub levels: Shared<bool>,
}

impl AlertIndicator for RecordingLed {
    fn set(&mut self, on: bool) {
        self.levels.lock().unwrap().push(on);
    }
}
