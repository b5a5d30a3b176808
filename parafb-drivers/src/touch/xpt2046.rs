//! XPT2046 Touch ADC Driver
//!
//! Each conversion is one 3-byte full-duplex transfer: the control byte
//! goes out first, and the 12-bit result comes back left-aligned across
//! the next two bytes.

use embedded_hal::spi::SpiDevice;
use parafb_core::traits::{AdcChannel, TouchAdc, ADC_MAX};

/// Control bytes (start bit, channel select, 12-bit, differential, PD=00)
mod cmd {
    pub const READ_X: u8 = 0xD0;
    pub const READ_Y: u8 = 0x90;
    pub const READ_Z1: u8 = 0xB0;
    pub const READ_Z2: u8 = 0xC0;
}

/// Control byte for a channel
pub const fn control_byte(channel: AdcChannel) -> u8 {
    match channel {
        AdcChannel::X => cmd::READ_X,
        AdcChannel::Y => cmd::READ_Y,
        AdcChannel::Z1 => cmd::READ_Z1,
        AdcChannel::Z2 => cmd::READ_Z2,
    }
}

/// Extract the 12-bit result from the two response bytes
pub const fn decode(high: u8, low: u8) -> u16 {
    ((((high as u16) << 8) | low as u16) >> 3) & ADC_MAX
}

/// XPT2046 on an SPI device (mode 0, 8-bit words)
pub struct Xpt2046<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Xpt2046<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Release the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> TouchAdc for Xpt2046<SPI> {
    type Error = SPI::Error;

    fn read(&mut self, channel: AdcChannel) -> Result<u16, Self::Error> {
        let tx = [control_byte(channel), 0x00, 0x00];
        let mut rx = [0u8; 3];
        self.spi.transfer(&mut rx, &tx)?;
        Ok(decode(rx[1], rx[2]))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::convert::Infallible;
    use std::vec::Vec;

    use embedded_hal::spi::{ErrorType, Operation};

    use super::*;

    /// Answers every control byte with a fixed 12-bit value per channel
    struct FakeSpi {
        sent: Vec<u8>,
        x: u16,
        y: u16,
        z1: u16,
        z2: u16,
    }

    impl FakeSpi {
        fn respond(&self, control: u8) -> u16 {
            match control {
                cmd::READ_X => self.x,
                cmd::READ_Y => self.y,
                cmd::READ_Z1 => self.z1,
                cmd::READ_Z2 => self.z2,
                _ => 0,
            }
        }
    }

    impl ErrorType for FakeSpi {
        type Error = Infallible;
    }

    impl SpiDevice for FakeSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            for op in operations {
                if let Operation::Transfer(read, write) = op {
                    self.sent.push(write[0]);
                    let [hi, lo] = (self.respond(write[0]) << 3).to_be_bytes();
                    read[0] = 0;
                    read[1] = hi;
                    read[2] = lo;
                }
            }
            Ok(())
        }
    }

    fn adc(x: u16, y: u16, z1: u16, z2: u16) -> Xpt2046<FakeSpi> {
        Xpt2046::new(FakeSpi {
            sent: Vec::new(),
            x,
            y,
            z1,
            z2,
        })
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode(0xFF, 0xF8), 0x0FFF);
        assert_eq!(decode(0x00, 0x08), 1);
        // Low three bits are padding
        assert_eq!(decode(0x10, 0x07), 0x0200);
    }

    #[test]
    fn test_channel_reads() {
        let mut touch = adc(1234, 3210, 500, 2500);
        assert_eq!(touch.read(AdcChannel::X), Ok(1234));
        assert_eq!(touch.read(AdcChannel::Y), Ok(3210));
        assert_eq!(touch.release().sent, [0xD0, 0x90]);
    }

    #[test]
    fn test_pressure_proxy() {
        let mut touch = adc(0, 0, 500, 2500);
        assert_eq!(touch.pressure(), Ok(2095));

        let mut touch = adc(0, 0, 0, 2500);
        assert_eq!(touch.pressure(), Ok(0));
        // Z2 is not sampled without contact
        assert_eq!(touch.release().sent, [0xB0]);
    }
}
