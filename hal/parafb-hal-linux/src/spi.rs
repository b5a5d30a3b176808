//! Touch ADC SPI link

use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::SpidevDevice;
use parafb_hal::{Mode, SerialConfig};
use tracing::debug;

use crate::error::SpiError;

fn mode_flags(mode: Mode) -> SpiModeFlags {
    match mode {
        Mode::Mode0 => SpiModeFlags::SPI_MODE_0,
        Mode::Mode1 => SpiModeFlags::SPI_MODE_1,
        Mode::Mode2 => SpiModeFlags::SPI_MODE_2,
        Mode::Mode3 => SpiModeFlags::SPI_MODE_3,
    }
}

/// Open and configure the spidev node the touch controller sits on
pub fn open_touch_spi(path: &str, config: &SerialConfig) -> Result<SpidevDevice, SpiError> {
    let mut spi = SpidevDevice::open(path).map_err(|source| SpiError::Open {
        path: path.to_string(),
        source,
    })?;

    let options = SpidevOptions::new()
        .bits_per_word(config.bits_per_word)
        .max_speed_hz(config.speed_hz)
        .mode(mode_flags(config.mode))
        .build();
    spi.configure(&options).map_err(|source| SpiError::Configure {
        path: path.to_string(),
        source,
    })?;

    debug!(
        "SPI {} configured: {} Hz, {:?}, {}-bit",
        path, config.speed_hz, config.mode, config.bits_per_word
    );
    Ok(spi)
}
