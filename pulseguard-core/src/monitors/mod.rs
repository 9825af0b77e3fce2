//! Physiological monitors
//!
//! Both monitors share one lifecycle and differ only in what they do with
//! the samples:
//!
//! ```text
//!         start()             run(duration)            stop()
//! Idle ─────────────► Acquiring ─────────────► Completed ─────────► Idle
//!   │                                                                ▲
//!   └──── run() / stop() while Idle: SensorNotStarted ───────────────┘
//! ```
//!
//! `run` blocks until the wall-clock deadline and returns the median of the
//! readings accumulated during the cycle. A cycle that accumulated nothing
//! fails with [`MeasurementError::EmptyReadingSet`](crate::MeasurementError).

mod heart_rate;
mod spo2;

pub use heart_rate::HeartRateMonitor;
pub use spo2::OxygenSaturationMonitor;

use crate::config::MeasurementConfig;
use crate::errors::MeasurementResult;

/// Lifecycle state of a monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Sensor released
    Idle,
    /// Sensor acquired, ready to sample
    Acquiring,
    /// Cycle finished, sensor still held until `stop`
    Completed,
}

/// Capability shared by the heart-rate and saturation monitors
pub trait Monitor {
    /// Label shown on the display before the cycle
    fn name(&self) -> &'static str;

    /// Current lifecycle state
    fn state(&self) -> MonitorState;

    /// Take the cycle timing a station runs this monitor with
    ///
    /// Called before every cycle; monitors without tunable timing ignore it.
    fn apply_config(&mut self, _config: &MeasurementConfig) {}

    /// Acquire and configure the sensor
    fn start(&mut self) -> MeasurementResult<()>;

    /// Sample for `duration_ms` and reduce the accumulation to its median
    fn run(&mut self, duration_ms: u64) -> MeasurementResult<f32>;

    /// Release the sensor
    fn stop(&mut self) -> MeasurementResult<()>;
}
