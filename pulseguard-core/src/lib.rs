//! Core measurement engine for PulseGuard
//!
//! Turns a photoplethysmographic (PPG) sample stream from a single optical
//! sensor into two clinically meaningful scalars, heart rate and oxygen
//! saturation, and decides whether the pair warrants an alert.
//!
//! Key constraints:
//! - Signal processing (buffers, beat detection, saturation estimate) runs
//!   without heap allocation and compiles for `no_std`
//! - Measurement cycles are bounded by wall-clock deadlines, never by sample
//!   counts
//! - One physical sensor: monitors never run concurrently
//!
//! ```no_run
//! use pulseguard_core::alert::{evaluate, Thresholds};
//!
//! let thresholds = Thresholds::default();
//!
//! // Results of a completed measurement cycle
//! if evaluate(72.0, 91.0, &thresholds) {
//!     // Escalate: blink the LED, request an SMS alert
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod alert;
pub mod ambient;
pub mod beat;
pub mod buffer;
pub mod config;
pub mod constants;
pub mod errors;
pub mod oximetry;
pub mod records;
pub mod time;
pub mod traits;
pub mod trigger;

#[cfg(feature = "drivers")]
pub mod drivers;

#[cfg(feature = "std")]
pub mod monitors;

#[cfg(feature = "std")]
pub mod orchestrator;

// Public API
pub use alert::{AlertDecision, AlertEvaluator, Thresholds};
pub use buffer::SlidingBuffer;
pub use config::MeasurementConfig;
pub use errors::{MeasurementError, MeasurementResult};
pub use records::{EnvironmentRecord, HealthRecord, RawSample};
pub use traits::{AlertIndicator, Display, PersistenceApi, Placement, SampleSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
