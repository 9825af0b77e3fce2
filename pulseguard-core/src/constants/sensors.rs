//! Sensor Addresses and Identifiers
//!
//! Bus addresses and identification values for the parts on the board.

/// MAX30101 / MAX30102 7-bit I2C address.
///
/// Source: MAX30102 datasheet, Table 1
pub const MAX3010X_I2C_ADDRESS: u8 = 0x57;

/// Value of the MAX3010x PART_ID register.
pub const MAX3010X_PART_ID: u8 = 0x15;

/// Depth of the MAX3010x sample FIFO (samples).
pub const MAX3010X_FIFO_DEPTH: u8 = 32;

/// Mask for the 18-bit ADC values read from the FIFO.
pub const MAX3010X_SAMPLE_MASK: u32 = 0x3_FFFF;

/// Register polls before a soft reset is considered stuck.
pub const MAX3010X_RESET_POLLS: u32 = 100;

/// SHT31 7-bit I2C address (ADDR pin low).
///
/// Source: SHT3x-DIS datasheet, Table 7
pub const SHT31_I2C_ADDRESS: u8 = 0x44;

/// Single-shot, high repeatability, clock stretching enabled.
pub const SHT31_MEASURE_COMMAND: [u8; 2] = [0x2C, 0x06];

/// Wait between the measure command and the read (milliseconds).
pub const SHT31_MEASURE_DELAY_MS: u32 = 500;
