//! Optical sample source trait
//!
//! ## Overview
//!
//! Both monitors consume the same capability: a PPG sensor with a sample
//! FIFO. The heart-rate loop pulls one infrared value at a time, the
//! saturation loop drains whatever has accumulated since its last pass.
//!
//! ```text
//! begin() ──► samples_available() ──► try_read_pair() ... ──► end()
//!                    │                       │
//!                    └── 0: nothing yet      └── WouldBlock: FIFO empty
//! ```
//!
//! ## Non-blocking Reads
//!
//! `try_read_pair` follows the `nb` convention: `WouldBlock` means "no
//! sample yet", `Other(e)` is a real failure. The provided `read_pair` and
//! `read_ir` spin on it with `nb::block!` and never return if the sensor
//! stops sampling; the monitors poll `try_read_pair` directly so their
//! deadline still bounds the loop.

use crate::errors::{MeasurementError, MeasurementResult};
use crate::records::RawSample;

/// PPG sensor with a red/infrared sample FIFO
pub trait SampleSource {
    /// Power up and configure the device
    ///
    /// Fails with [`MeasurementError::SensorInitFailed`] if the device does
    /// not answer or rejects the configuration.
    fn begin(&mut self) -> MeasurementResult<()>;

    /// Put the device into shutdown
    fn end(&mut self);

    /// Number of samples waiting in the FIFO
    fn samples_available(&mut self) -> MeasurementResult<usize>;

    /// Pop one red/infrared pair without waiting
    fn try_read_pair(&mut self) -> nb::Result<RawSample, MeasurementError>;

    /// Pop one red/infrared pair, waiting for it if the FIFO is empty
    fn read_pair(&mut self) -> MeasurementResult<RawSample> {
        nb::block!(self.try_read_pair())
    }

    /// Infrared channel of the next sample
    fn read_ir(&mut self) -> MeasurementResult<u32> {
        self.read_pair().map(|sample| sample.ir)
    }
}
