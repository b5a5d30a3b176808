//! Recording bus for host-side tests
//!
//! [`MockBus`] stores every bus operation in order so tests can assert on
//! command sequences and pixel streams without hardware.

extern crate alloc;

use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::bus::{BusWidth, ParallelBus};

/// One recorded bus operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
    /// Hardware reset pulse
    Reset,
    /// Command byte (D/C low)
    Command(u8),
    /// Parameter byte (D/C high)
    Data(u8),
    /// One pixel run
    Pixels(Vec<u16>),
}

/// Parallel bus that records instead of driving pins
#[derive(Debug, Default)]
pub struct MockBus {
    /// Operations in issue order
    pub ops: Vec<BusOp>,
    width: BusWidth,
}

impl MockBus {
    /// Create an empty 8-bit mock bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mock bus with the given width
    pub fn with_width(width: BusWidth) -> Self {
        Self {
            ops: Vec::new(),
            width,
        }
    }

    /// Command bytes only, in order
    pub fn commands(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Command(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Parameter bytes sent right after the n-th occurrence of `cmd`
    pub fn params_of(&self, cmd: u8, nth: usize) -> Vec<u8> {
        let start = self
            .ops
            .iter()
            .enumerate()
            .filter(|(_, op)| **op == BusOp::Command(cmd))
            .nth(nth)
            .map(|(i, _)| i + 1);

        let Some(start) = start else {
            return Vec::new();
        };

        self.ops[start..]
            .iter()
            .map_while(|op| match op {
                BusOp::Data(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    /// All pixel runs, in order
    pub fn pixel_writes(&self) -> Vec<&[u16]> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Pixels(p) => Some(p.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Number of reset pulses issued
    pub fn reset_count(&self) -> usize {
        self.ops.iter().filter(|op| **op == BusOp::Reset).count()
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl ParallelBus for MockBus {
    fn width(&self) -> BusWidth {
        self.width
    }

    fn hardware_reset(&mut self, _delay: &mut impl DelayNs) {
        self.ops.push(BusOp::Reset);
    }

    fn write_command(&mut self, cmd: u8) {
        self.ops.push(BusOp::Command(cmd));
    }

    fn write_data(&mut self, data: u8) {
        self.ops.push(BusOp::Data(data));
    }

    fn write_pixels(&mut self, pixels: &[u16]) {
        self.ops.push(BusOp::Pixels(pixels.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn test_records_in_order() {
        let mut bus = MockBus::new();
        bus.hardware_reset(&mut NoDelay);
        bus.write_command(0x2A);
        bus.write_data_bytes(&[0x00, 0x01]);
        bus.write_pixels(&[0xF800, 0x07E0]);

        assert_eq!(bus.reset_count(), 1);
        assert_eq!(bus.commands(), [0x2A]);
        assert_eq!(bus.params_of(0x2A, 0), [0x00, 0x01]);
        assert_eq!(bus.pixel_writes(), [&[0xF800u16, 0x07E0][..]]);
    }

    #[test]
    fn test_params_of_missing_command() {
        let bus = MockBus::new();
        assert!(bus.params_of(0x36, 0).is_empty());
    }
}
