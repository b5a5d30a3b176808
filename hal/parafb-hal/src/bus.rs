//! Parallel bus abstractions
//!
//! The panel controller listens on an 8080-style write bus: a data bus of
//! 8, 12 or 16 lines, an active-low write strobe (/WR) whose rising edge
//! latches the presented value, and a register-select line (D/C) that marks
//! a value as a command (low) or as a parameter/pixel (high).

use core::fmt;

use embedded_hal::delay::DelayNs;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physical width of the data bus
///
/// Selected once when the bus is constructed. The panel protocol never
/// looks at it; pixel splitting goes through [`BusWidth::encode_pixel`].
/// Configured as a line count: 8, 12 or 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub enum BusWidth {
    /// DB0-DB7, two cycles per pixel (26-pin shields)
    #[default]
    Bits8,
    /// DB0-DB11, two cycles per pixel
    Bits12,
    /// DB0-DB15, one cycle per pixel
    Bits16,
}

impl BusWidth {
    /// Number of data lines
    pub const fn lines(self) -> u8 {
        match self {
            BusWidth::Bits8 => 8,
            BusWidth::Bits12 => 12,
            BusWidth::Bits16 => 16,
        }
    }

    /// Split an RGB565 pixel into bus words
    ///
    /// Buses narrower than 16 lines carry the pixel as two cycles, most
    /// significant byte first.
    #[inline(always)]
    pub const fn encode_pixel(self, pixel: u16) -> PixelCycles {
        match self {
            BusWidth::Bits16 => PixelCycles {
                words: [pixel, 0],
                len: 1,
            },
            BusWidth::Bits8 | BusWidth::Bits12 => PixelCycles {
                words: [pixel >> 8, pixel & 0x00FF],
                len: 2,
            },
        }
    }
}

/// Line count with no matching [`BusWidth`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedWidth(pub u8);

impl fmt::Display for UnsupportedWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported bus width {} (expected 8, 12 or 16)", self.0)
    }
}

impl TryFrom<u8> for BusWidth {
    type Error = UnsupportedWidth;

    fn try_from(lines: u8) -> Result<Self, Self::Error> {
        match lines {
            8 => Ok(BusWidth::Bits8),
            12 => Ok(BusWidth::Bits12),
            16 => Ok(BusWidth::Bits16),
            other => Err(UnsupportedWidth(other)),
        }
    }
}

impl From<BusWidth> for u8 {
    fn from(width: BusWidth) -> Self {
        width.lines()
    }
}

/// Bus words for one pixel, in transmit order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCycles {
    words: [u16; 2],
    len: u8,
}

impl PixelCycles {
    /// Words to put on the bus, first cycle first
    #[inline(always)]
    pub fn as_slice(&self) -> &[u16] {
        &self.words[..self.len as usize]
    }
}

/// 8080-style parallel write bus
///
/// Every method is built from one electrical primitive: present the value,
/// assert /WR, barrier, hold, release /WR. Writes are assumed to always
/// succeed once the bus is open, so nothing here returns an error.
pub trait ParallelBus {
    /// Physical data bus width
    fn width(&self) -> BusWidth;

    /// Pulse the controller's reset line
    ///
    /// Asserts /RST for the configured assert time, releases it, then waits
    /// the configured power-on settle time.
    fn hardware_reset(&mut self, delay: &mut impl DelayNs);

    /// Send a command byte (D/C low for the one cycle, then back high)
    fn write_command(&mut self, cmd: u8);

    /// Send one parameter byte (D/C stays high)
    fn write_data(&mut self, data: u8);

    /// Stream RGB565 pixels (D/C stays high)
    ///
    /// This is the hot path: implementations must not branch per pixel
    /// beyond the lookup-table indexing.
    fn write_pixels(&mut self, pixels: &[u16]);

    /// Send a run of parameter bytes
    fn write_data_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.write_data(byte);
        }
    }
}
