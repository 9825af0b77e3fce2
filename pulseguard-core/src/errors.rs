//! Error Types for Measurement Failures
//!
//! ## Design Philosophy
//!
//! Errors travel from a sampling thread back to the orchestrator and end up
//! in a cycle report, so they follow the same rules as the rest of the core:
//!
//! 1. **Copy Semantics**: every variant is `Copy`, a failed monitor result can
//!    be stored and compared without cloning.
//!
//! 2. **No Heap Allocation**: reasons are `&'static str`. The sensor driver
//!    knows at compile time what went wrong.
//!
//! 3. **Failures Are Explicit**: a cycle that accumulated nothing is an
//!    `EmptyReadingSet` error, never a fabricated `0` or `NaN` that would
//!    reach persistence or alerting.
//!
//! ## Error Categories
//!
//! ### Sensor Lifecycle
//! - `SensorNotStarted`: sampling or stop requested before `start`
//! - `SensorInitFailed`: device absent or configuration rejected
//! - `SensorReadFailed`: bus transfer failed mid-cycle
//!
//! ### Reduction
//! - `EmptyReadingSet`: no valid readings, the median is undefined
//!
//! ### Orchestration
//! - `CycleInProgress`: trigger fired while a cycle is running
//! - `TaskPanicked`: one of the cycle threads died
//!
//! Implausible heart rates and unreliable saturation windows are *not*
//! errors. They are dropped by the filtering policy of each pipeline.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use pulseguard_core::MeasurementError;
//!
//! fn describe(result: Result<f32, MeasurementError>) -> &'static str {
//!     match result {
//!         Ok(_) => "measured",
//!         Err(MeasurementError::EmptyReadingSet) => "no pulse found, retry",
//!         Err(MeasurementError::SensorInitFailed { .. }) => "check sensor wiring",
//!         Err(_) => "measurement failed",
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for measurement operations
pub type MeasurementResult<T> = Result<T, MeasurementError>;

/// Measurement errors - kept small so reports stay `Copy`
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementError {
    /// Sampling or `stop` requested while the monitor is idle
    #[error("Sensor not running, start the sensor first")]
    SensorNotStarted,

    /// Device absent or setup rejected
    #[error("Sensor initialization failed: {reason}")]
    SensorInitFailed {
        /// What the driver could not do
        reason: &'static str,
    },

    /// Bus transfer failed while acquiring samples
    #[error("Sensor read failed: {reason}")]
    SensorReadFailed {
        /// What the driver could not do
        reason: &'static str,
    },

    /// No valid readings were accumulated during the cycle
    #[error("No valid readings accumulated during the measurement cycle")]
    EmptyReadingSet,

    /// A measurement cycle is already running
    #[error("A measurement cycle is already in progress")]
    CycleInProgress,

    /// A cycle thread panicked before producing its result
    #[error("The {task} task panicked")]
    TaskPanicked {
        /// Which task died
        task: &'static str,
    },
}

impl MeasurementError {
    /// True for failures caused by the sensor hardware
    pub const fn is_sensor_fault(&self) -> bool {
        matches!(
            self,
            Self::SensorNotStarted | Self::SensorInitFailed { .. } | Self::SensorReadFailed { .. }
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MeasurementError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::SensorNotStarted =>
                defmt::write!(fmt, "Sensor not started"),
            Self::SensorInitFailed { reason } =>
                defmt::write!(fmt, "Sensor init failed: {}", reason),
            Self::SensorReadFailed { reason } =>
                defmt::write!(fmt, "Sensor read failed: {}", reason),
            Self::EmptyReadingSet =>
                defmt::write!(fmt, "Empty reading set"),
            Self::CycleInProgress =>
                defmt::write!(fmt, "Cycle in progress"),
            Self::TaskPanicked { task } =>
                defmt::write!(fmt, "Task panicked: {}", task),
        }
    }
}
