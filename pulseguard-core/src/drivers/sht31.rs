//! SHT31 single-shot temperature and humidity read

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::ambient::AmbientReading;
use crate::constants::sensors::{SHT31_I2C_ADDRESS, SHT31_MEASURE_COMMAND, SHT31_MEASURE_DELAY_MS};
use crate::errors::{MeasurementError, MeasurementResult};

/// Trigger one high-repeatability measurement and decode it
pub fn read_sht31<I: I2c, D: DelayNs>(i2c: &mut I, delay: &mut D) -> MeasurementResult<AmbientReading> {
    i2c.write(SHT31_I2C_ADDRESS, &SHT31_MEASURE_COMMAND)
        .map_err(|_| MeasurementError::SensorReadFailed {
            reason: "SHT31 measure command",
        })?;

    delay.delay_ms(SHT31_MEASURE_DELAY_MS);

    let mut frame = [0u8; 6];
    i2c.read(SHT31_I2C_ADDRESS, &mut frame)
        .map_err(|_| MeasurementError::SensorReadFailed {
            reason: "SHT31 data read",
        })?;

    let reading = AmbientReading::from_sht31(&frame)?;
    log_debug!(
        "SHT31: {:.1} °C, {:.1} %RH",
        reading.celsius,
        reading.humidity
    );
    Ok(reading)
}
