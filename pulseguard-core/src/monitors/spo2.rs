use crate::buffer::median_of;
use crate::config::MeasurementConfig;
use crate::constants::time::SPO2_LOOP_INTERVAL_MS;
use crate::errors::{MeasurementError, MeasurementResult};
use crate::oximetry::{SaturationEstimator, SaturationWindow};
use crate::time::TimeSource;
use crate::traits::SampleSource;

use super::{Monitor, MonitorState};

/// Oxygen-saturation monitor: windowed estimation at a fixed cadence
///
/// Each loop iteration drains the sensor FIFO into a 100-pair window,
/// reduces it when full, then sleeps the loop interval whether or not work
/// was done.
pub struct OxygenSaturationMonitor<S, E, C> {
    sensor: S,
    estimator: E,
    clock: C,
    loop_interval_ms: u64,
    state: MonitorState,
    readings: Vec<f32>,
}

impl<S, E, C> OxygenSaturationMonitor<S, E, C>
where
    S: SampleSource,
    E: SaturationEstimator,
    C: TimeSource,
{
    /// Idle monitor with the default 500 ms loop interval
    pub fn new(sensor: S, estimator: E, clock: C) -> Self {
        Self {
            sensor,
            estimator,
            clock,
            loop_interval_ms: SPO2_LOOP_INTERVAL_MS,
            state: MonitorState::Idle,
            readings: Vec::new(),
        }
    }

    /// Override the sleep between loop iterations
    ///
    /// A [`MeasurementStation`](crate::orchestrator::MeasurementStation)
    /// replaces this with its own `spo2_loop_ms` before each cycle.
    pub fn with_loop_interval(mut self, ms: u64) -> Self {
        self.loop_interval_ms = ms;
        self
    }

    /// Smoothed saturations accumulated by the last cycle
    pub fn readings(&self) -> &[f32] {
        &self.readings
    }

    fn acquire(&mut self, duration_ms: u64) -> MeasurementResult<()> {
        let mut window = SaturationWindow::new();
        let deadline = self.clock.deadline_after(duration_ms);

        while self.clock.now() < deadline {
            let available = self.sensor.samples_available()?;

            let mut drained = 0;
            for _ in 0..available {
                match self.sensor.try_read_pair() {
                    Ok(sample) => window.push(sample),
                    // FIFO emptied early, pick up the rest next pass
                    Err(nb::Error::WouldBlock) => break,
                    Err(nb::Error::Other(e)) => return Err(e),
                }
                drained += 1;
            }

            if drained > 0 {
                if let Some(reading) = window.reduce(&mut self.estimator) {
                    if !reading.finger_detected {
                        log_info!("Finger not detected");
                    }
                    self.readings.push(reading.value);
                }
            }

            self.clock.sleep_ms(self.loop_interval_ms);
        }

        Ok(())
    }
}

impl<S, E, C> Monitor for OxygenSaturationMonitor<S, E, C>
where
    S: SampleSource,
    E: SaturationEstimator,
    C: TimeSource,
{
    fn name(&self) -> &'static str {
        "SpO2"
    }

    fn state(&self) -> MonitorState {
        self.state
    }

    fn apply_config(&mut self, config: &MeasurementConfig) {
        self.loop_interval_ms = config.spo2_loop_ms;
    }

    fn start(&mut self) -> MeasurementResult<()> {
        self.sensor.begin().map_err(|e| {
            log_error!("SpO2 sensor start failed: {}", e);
            e
        })?;
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
            log_error!("SpO2 cycle aborted: {}", e);
            return Err(e);
        }

        log_debug!("SpO2 readings: {:?}", self.readings);

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
