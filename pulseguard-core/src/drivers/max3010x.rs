//! MAX30101 / MAX30102 pulse oximeter
//!
//! The device samples the red and infrared LEDs into a 32-deep FIFO. Each
//! FIFO entry is 3 bytes per active LED, red first, with the 18-bit ADC
//! value right-aligned.
//!
//! Two register presets match the two monitors:
//!
//! | Preset | FIFO config | SpO2 config | Red | IR | Green |
//! |--------|-------------|-------------|-----|----|-------|
//! | [`Max3010xConfig::heart_rate`] | 0x50 (avg 4, rollover) | 0x2F (4096 nA, 400 sps, 411 µs) | 0x0A | 0x1F | off |
//! | [`Max3010xConfig::oximetry`] | 0x4F (avg 4, rollover, almost-full 15) | 0x27 (4096 nA, 100 sps, 411 µs) | 0x24 | 0x24 | unchanged |

use embedded_hal::i2c::I2c;

use crate::constants::sensors::{
    MAX3010X_FIFO_DEPTH, MAX3010X_I2C_ADDRESS, MAX3010X_PART_ID, MAX3010X_RESET_POLLS,
    MAX3010X_SAMPLE_MASK,
};
use crate::errors::{MeasurementError, MeasurementResult};
use crate::records::RawSample;
use crate::traits::SampleSource;

// Registers
const REG_INTR_ENABLE_1: u8 = 0x02;
const REG_FIFO_WR_PTR: u8 = 0x04;
const REG_OVF_COUNTER: u8 = 0x05;
const REG_FIFO_RD_PTR: u8 = 0x06;
const REG_FIFO_DATA: u8 = 0x07;
const REG_FIFO_CONFIG: u8 = 0x08;
const REG_MODE_CONFIG: u8 = 0x09;
const REG_SPO2_CONFIG: u8 = 0x0A;
const REG_LED1_PA: u8 = 0x0C;
const REG_LED2_PA: u8 = 0x0D;
const REG_LED3_PA: u8 = 0x0E;
const REG_PART_ID: u8 = 0xFF;

// MODE_CONFIG bits
const MODE_RESET: u8 = 0x40;
const MODE_SHUTDOWN: u8 = 0x80;
const MODE_SPO2: u8 = 0x03;

/// Bytes per FIFO entry with red and infrared active
const BYTES_PER_SAMPLE: usize = 6;

/// Register values written by [`Max3010x::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Max3010xConfig {
    /// FIFO_CONFIG: averaging, rollover, almost-full level
    pub fifo: u8,
    /// SPO2_CONFIG: ADC range, sample rate, pulse width
    pub spo2: u8,
    /// Red LED pulse amplitude
    pub red_amplitude: u8,
    /// Infrared LED pulse amplitude
    pub ir_amplitude: u8,
    /// Green LED pulse amplitude (MAX30101 only), `None` leaves it untouched
    pub green_amplitude: Option<u8>,
}

impl Max3010xConfig {
    /// Preset for the heart-rate monitor: bright IR, dim red, green off
    pub const fn heart_rate() -> Self {
        Self {
            fifo: 0x50,
            spo2: 0x2F,
            red_amplitude: 0x0A,
            ir_amplitude: 0x1F,
            green_amplitude: Some(0),
        }
    }

    /// Preset for the saturation monitor: balanced red/IR at 100 sps
    pub const fn oximetry() -> Self {
        Self {
            fifo: 0x4F,
            spo2: 0x27,
            red_amplitude: 0x24,
            ir_amplitude: 0x24,
            green_amplitude: None,
        }
    }
}

/// MAX3010x on an I2C bus
pub struct Max3010x<I> {
    i2c: I,
    address: u8,
    config: Max3010xConfig,
}

impl<I: I2c> Max3010x<I> {
    /// Driver at the default address, not yet configured
    pub fn new(i2c: I, config: Max3010xConfig) -> Self {
        Self {
            i2c,
            address: MAX3010X_I2C_ADDRESS,
            config,
        }
    }

    /// Give the bus back
    pub fn release(self) -> I {
        self.i2c
    }

    /// Register preset in use
    pub fn config(&self) -> &Max3010xConfig {
        &self.config
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), I::Error> {
        self.i2c.write(self.address, &[register, value])
    }

    fn read_register(&mut self, register: u8) -> Result<u8, I::Error> {
        let mut value = [0u8];
        self.i2c.write_read(self.address, &[register], &mut value)?;
        Ok(value[0])
    }

    fn soft_reset(&mut self) -> MeasurementResult<()> {
        self.write_register(REG_MODE_CONFIG, MODE_RESET)
            .map_err(|_| init_failed("reset write failed"))?;

        for _ in 0..MAX3010X_RESET_POLLS {
            let mode = self
                .read_register(REG_MODE_CONFIG)
                .map_err(|_| init_failed("reset poll failed"))?;
            if mode & MODE_RESET == 0 {
                return Ok(());
            }
        }

        Err(init_failed("reset did not complete"))
    }

    fn configure(&mut self) -> Result<(), I::Error> {
        let config = self.config;

        self.write_register(REG_FIFO_CONFIG, config.fifo)?;
        self.write_register(REG_MODE_CONFIG, MODE_SPO2)?;
        self.write_register(REG_SPO2_CONFIG, config.spo2)?;
        self.write_register(REG_LED1_PA, config.red_amplitude)?;
        self.write_register(REG_LED2_PA, config.ir_amplitude)?;
        if let Some(green) = config.green_amplitude {
            self.write_register(REG_LED3_PA, green)?;
        }
        self.write_register(REG_INTR_ENABLE_1, 0x00)?;

        // Empty the FIFO
        self.write_register(REG_FIFO_WR_PTR, 0)?;
        self.write_register(REG_OVF_COUNTER, 0)?;
        self.write_register(REG_FIFO_RD_PTR, 0)
    }
}

fn init_failed(reason: &'static str) -> MeasurementError {
    MeasurementError::SensorInitFailed { reason }
}

fn read_failed(reason: &'static str) -> MeasurementError {
    MeasurementError::SensorReadFailed { reason }
}

fn channel(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]) & MAX3010X_SAMPLE_MASK
}

impl<I: I2c> SampleSource for Max3010x<I> {
    fn begin(&mut self) -> MeasurementResult<()> {
        let part_id = self
            .read_register(REG_PART_ID)
            .map_err(|_| init_failed("MAX3010x not responding"))?;
        if part_id != MAX3010X_PART_ID {
            log_error!("Unexpected MAX3010x part id 0x{:02X}", part_id);
            return Err(init_failed("unexpected part id"));
        }

        self.soft_reset()?;
        self.configure()
            .map_err(|_| init_failed("register configuration failed"))?;

        log_debug!("MAX3010x configured: {:?}", self.config);
        Ok(())
    }

    fn end(&mut self) {
        if self.write_register(REG_MODE_CONFIG, MODE_SHUTDOWN).is_err() {
            log_warn!("MAX3010x shutdown write failed");
        }
    }

    fn samples_available(&mut self) -> MeasurementResult<usize> {
        let write = self
            .read_register(REG_FIFO_WR_PTR)
            .map_err(|_| read_failed("FIFO write pointer"))?;
        let read = self
            .read_register(REG_FIFO_RD_PTR)
            .map_err(|_| read_failed("FIFO read pointer"))?;

        let depth = MAX3010X_FIFO_DEPTH;
        Ok(usize::from((write % depth + depth - read % depth) % depth))
    }

    fn try_read_pair(&mut self) -> nb::Result<RawSample, MeasurementError> {
        if self.samples_available()? == 0 {
            return Err(nb::Error::WouldBlock);
        }

        let mut raw = [0u8; BYTES_PER_SAMPLE];
        self.i2c
            .write_read(self.address, &[REG_FIFO_DATA], &mut raw)
            .map_err(|_| read_failed("FIFO data"))?;

        Ok(RawSample::new(channel(&raw[0..3]), channel(&raw[3..6])))
    }
}
