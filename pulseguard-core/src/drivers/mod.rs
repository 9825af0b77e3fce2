//! I2C drivers for the station's sensors
//!
//! Written against `embedded-hal` 1.0 blocking traits, so the same code
//! runs on a Raspberry Pi (`linux-embedded-hal`) and on bare-metal HALs.
//!
//! - [`max3010x`] - MAX30101/MAX30102 pulse oximeter, implements
//!   [`SampleSource`](crate::traits::SampleSource)
//! - [`sht31`] - SHT31 temperature/humidity, single-shot reads

pub mod max3010x;
pub mod sht31;

pub use max3010x::{Max3010x, Max3010xConfig};
pub use sht31::read_sht31;
