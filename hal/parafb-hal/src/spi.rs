//! SPI link settings
//!
//! The touch controller sits on its own SPI chip-select. These types carry
//! the link settings from configuration to whichever host backend opens
//! the device.

/// SPI link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    /// Clock frequency in Hz
    pub speed_hz: u32,
    /// Clock polarity/phase
    pub mode: Mode,
    /// Word size
    pub bits_per_word: u8,
}

impl SerialConfig {
    /// Mode 0, 8-bit words at the given clock
    pub const fn new(speed_hz: u32) -> Self {
        Self {
            speed_hz,
            mode: Mode::Mode0,
            bits_per_word: 8,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new(2_000_000) // XPT2046 is comfortable at 2 MHz
    }
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_mode0_8bit() {
        let cfg = SerialConfig::default();
        assert_eq!(cfg.mode, Mode::Mode0);
        assert_eq!(cfg.bits_per_word, 8);
        assert_eq!(cfg.speed_hz, 2_000_000);
    }
}
