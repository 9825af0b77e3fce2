use crate::beat::{BeatDetector, RateSmoother};
use crate::buffer::median_of;
use crate::constants::signal::PROGRESS_LOG_INTERVAL;
use crate::constants::time::{FIFO_POLL_INTERVAL_MS, MS_PER_SECOND};
use crate::errors::{MeasurementError, MeasurementResult};
use crate::time::TimeSource;
use crate::traits::SampleSource;

use super::{Monitor, MonitorState};

/// Heart-rate monitor: beat detection on the infrared channel
///
/// Every beat after the first yields an instantaneous rate; plausible rates
/// are smoothed over the last two and the rounded mean is accumulated. The
/// cycle result is the median of the accumulation.
pub struct HeartRateMonitor<S, D, C> {
    sensor: S,
    detector: D,
    clock: C,
    state: MonitorState,
    readings: Vec<f32>,
}

impl<S, D, C> HeartRateMonitor<S, D, C>
where
    S: SampleSource,
    D: BeatDetector,
    C: TimeSource,
{
    /// Idle monitor owning its sensor
    pub fn new(sensor: S, detector: D, clock: C) -> Self {
        Self {
            sensor,
            detector,
            clock,
            state: MonitorState::Idle,
            readings: Vec::new(),
        }
    }

    /// Smoothed rates accumulated by the last cycle
    pub fn readings(&self) -> &[f32] {
        &self.readings
    }

    fn acquire(&mut self, duration_ms: u64) -> MeasurementResult<()> {
        let mut smoother = RateSmoother::new();
        let started = self.clock.now();
        let deadline = self.clock.deadline_after(duration_ms);
        let mut samples: u64 = 0;

        while self.clock.now() < deadline {
            let ir = match self.sensor.try_read_pair() {
                Ok(sample) => sample.ir,
                Err(nb::Error::WouldBlock) => {
                    self.clock.sleep_ms(FIFO_POLL_INTERVAL_MS);
                    continue;
                }
                Err(nb::Error::Other(e)) => return Err(e),
            };
            samples += 1;

            if self.detector.check_for_beat(ir) {
                if let Some(rate) = smoother.on_beat(self.clock.now()) {
                    self.readings.push(rate);
                }
            }

            if samples % PROGRESS_LOG_INTERVAL == 0 {
                log_debug!(
                    "IR={}, BPM={:?}, Avg BPM={:?}",
                    ir,
                    smoother.last_rate(),
                    smoother.average()
                );
            }
        }

        let elapsed_ms = self.clock.now().saturating_sub(started);
        if elapsed_ms > 0 {
            let hz = samples as f32 * MS_PER_SECOND as f32 / elapsed_ms as f32;
            log_info!("Heart rate sampling at {:.1} Hz ({} samples)", hz, samples);
        }

        Ok(())
    }
}

impl<S, D, C> Monitor for HeartRateMonitor<S, D, C>
where
    S: SampleSource,
    D: BeatDetector,
    C: TimeSource,
{
    fn name(&self) -> &'static str {
        "Heart Rate"
    }

    fn state(&self) -> MonitorState {
        self.state
    }

    fn start(&mut self) -> MeasurementResult<()> {
        self.sensor.begin().map_err(|e| {
            log_error!("Heart rate sensor start failed: {}", e);
            e
        })?;
        self.detector.reset();
        self.state = MonitorState::Acquiring;
        Ok(())
    }

    fn run(&mut self, duration_ms: u64) -> MeasurementResult<f32> {
        if self.state != MonitorState::Acquiring {
            return Err(MeasurementError::SensorNotStarted);
        }

        self.readings.clear();
        let acquired = self.acquire(duration_ms);
        self.state = MonitorState::Completed;

        if let Err(e) = acquired {
            log_error!("Heart rate cycle aborted: {}", e);
            return Err(e);
        }

        let mut sorted = self.readings.clone();
        median_of(&mut sorted)
    }

    fn stop(&mut self) -> MeasurementResult<()> {
        if self.state == MonitorState::Idle {
            return Err(MeasurementError::SensorNotStarted);
        }

        self.sensor.end();
        self.state = MonitorState::Idle;
        Ok(())
    }
}
