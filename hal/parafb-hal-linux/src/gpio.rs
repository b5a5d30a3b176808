//! Memory-mapped GPIO bus
//!
//! Bit-bangs the 8080 write bus through the BCM283x GPIO block exposed by
//! `/dev/gpiomem`. All bus lines must sit in bank 0 (GPIO 0-31) so one
//! GPSET0 and one GPCLR0 write present any value.
//!
//! Every value goes out through the same sequence:
//!
//! ```text
//! GPSET0 <- ones    GPCLR0 <- zeros    GPCLR0 <- /WR    dmb    hold    GPSET0 <- /WR
//! ```
//!
//! The controller latches on the rising edge of /WR.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;

use embedded_hal::delay::DelayNs;
use memmap2::{MmapMut, MmapOptions};
use parafb_core::config::BusConfig;
use parafb_hal::{BusWidth, ParallelBus, ResetTiming};
use tracing::{debug, info};

use crate::detect::check_host;
use crate::error::BusError;

const GPIOMEM: &str = "/dev/gpiomem";

/// Size of the GPIO register window
const BLOCK_SIZE: usize = 4096;

/// Register word offsets
mod reg {
    pub const GPFSEL0: usize = 0x00 / 4;
    pub const GPSET0: usize = 0x1C / 4;
    pub const GPCLR0: usize = 0x28 / 4;
}

/// GPFSEL function code for output
const FSEL_OUTPUT: u32 = 0b001;

/// Rough cost of one spin-loop hint (ns) on a 1 GHz+ core
const NS_PER_SPIN: u32 = 2;

/// Highest pin reachable through GPSET0/GPCLR0
const MAX_PIN: u8 = 31;

/// BCM pin numbers for every bus line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    /// /RST
    pub reset: u8,
    /// /CS
    pub chip_select: u8,
    /// D/C (register select)
    pub data_command: u8,
    /// /WR strobe
    pub write: u8,
    /// /RD strobe, held high
    pub read: u8,
    /// DB0 upward; only the first `width.lines()` entries are used
    pub data: [u8; 16],
    /// Physical bus width
    pub width: BusWidth,
}

impl PinMap {
    /// Data pins in bus order
    pub fn data_pins(&self) -> &[u8] {
        &self.data[..self.width.lines() as usize]
    }

    /// Every pin the bus drives
    pub fn all_pins(&self) -> impl Iterator<Item = u8> + '_ {
        [
            self.reset,
            self.chip_select,
            self.data_command,
            self.write,
            self.read,
        ]
        .into_iter()
        .chain(self.data_pins().iter().copied())
    }

    /// Check every pin is in bank 0 and used once
    pub fn validate(&self) -> Result<(), BusError> {
        let mut seen = 0u32;
        for pin in self.all_pins() {
            if pin > MAX_PIN {
                return Err(BusError::InvalidPin {
                    pin,
                    reason: "outside GPIO bank 0",
                });
            }
            if seen & (1 << pin) != 0 {
                return Err(BusError::InvalidPin {
                    pin,
                    reason: "assigned twice",
                });
            }
            seen |= 1 << pin;
        }
        Ok(())
    }
}

impl TryFrom<&BusConfig> for PinMap {
    type Error = BusError;

    /// Data pins must match the width exactly; the result is validated
    fn try_from(config: &BusConfig) -> Result<Self, BusError> {
        let lines = config.width.lines();
        if config.data.len() != lines as usize {
            return Err(BusError::DataLines {
                expected: lines,
                found: config.data.len(),
            });
        }

        let mut data = [0; 16];
        data[..config.data.len()].copy_from_slice(&config.data);
        let pins = Self {
            reset: config.reset,
            chip_select: config.chip_select,
            data_command: config.data_command,
            write: config.write,
            read: config.read,
            data,
            width: config.width,
        };
        pins.validate()?;
        Ok(pins)
    }
}

/// GPSET0/GPCLR0 values that present one value on a group of lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Masks {
    pub set: u32,
    pub clr: u32,
}

/// Build a 256-entry table for up to eight data lines
///
/// Bit `n` of the index drives `pins[n]`. Lines past `pins.len()` are left
/// out of both masks, so an empty slice yields an all-zero table.
pub fn build_lut(pins: &[u8]) -> [Masks; 256] {
    let mut lut = [Masks::default(); 256];
    for (value, entry) in lut.iter_mut().enumerate() {
        for (bit, &pin) in pins.iter().take(8).enumerate() {
            if value & (1 << bit) != 0 {
                entry.set |= 1 << pin;
            } else {
                entry.clr |= 1 << pin;
            }
        }
    }
    lut
}

/// Parallel bus over memory-mapped BCM283x GPIO
pub struct MmioBus {
    map: MmapMut,
    width: BusWidth,
    timing: ResetTiming,
    hold_spins: u32,
    /// Low byte of a bus word (DB0-DB7)
    lut_lo: [Masks; 256],
    /// High byte of a bus word (DB8-DB15); all zero on an 8-bit bus
    lut_hi: [Masks; 256],
    wr: u32,
    dc: u32,
    rd: u32,
    cs: u32,
    rst: u32,
}

impl MmioBus {
    /// Detect the host, map the GPIO block and drive the bus to idle
    pub fn open(pins: PinMap, timing: ResetTiming) -> Result<Self, BusError> {
        pins.validate()?;
        check_host()?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(nix::libc::O_SYNC)
            .open(GPIOMEM)
            .map_err(|source| BusError::DeviceOpen {
                path: GPIOMEM,
                source,
            })?;

        let map = map_registers(&file)?;

        let data = pins.data_pins();
        let (lo, hi) = data.split_at(data.len().min(8));

        let mut bus = Self {
            map,
            width: pins.width,
            timing,
            hold_spins: timing.strobe_hold_ns.div_ceil(NS_PER_SPIN),
            lut_lo: build_lut(lo),
            lut_hi: build_lut(hi),
            wr: 1 << pins.write,
            dc: 1 << pins.data_command,
            rd: 1 << pins.read,
            cs: 1 << pins.chip_select,
            rst: 1 << pins.reset,
        };

        for pin in pins.all_pins() {
            bus.set_output(pin);
        }

        // Idle: strobes and D/C high, out of reset, chip selected
        bus.set(bus.wr | bus.dc | bus.rd | bus.rst);
        bus.clear(bus.cs);
        barrier();

        info!(
            "GPIO bus open: {}-bit, /WR hold {} ns",
            pins.width.lines(),
            timing.strobe_hold_ns
        );
        Ok(bus)
    }

    /// Restore idle and release the register window
    pub fn close(self) {
        drop(self);
    }

    fn set_output(&mut self, pin: u8) {
        let index = reg::GPFSEL0 + pin as usize / 10;
        let shift = (pin as u32 % 10) * 3;
        let mut fsel = self.read_reg(index);
        fsel &= !(0b111 << shift);
        fsel |= FSEL_OUTPUT << shift;
        self.write_reg(index, fsel);
    }

    #[inline(always)]
    fn set(&mut self, mask: u32) {
        self.write_reg(reg::GPSET0, mask);
    }

    #[inline(always)]
    fn clear(&mut self, mask: u32) {
        self.write_reg(reg::GPCLR0, mask);
    }

    #[inline(always)]
    fn write_reg(&mut self, index: usize, value: u32) {
        debug_assert!(index < BLOCK_SIZE / 4);
        // SAFETY: index is a fixed register offset inside the 4 KiB window,
        // which is page aligned and stays mapped for the life of self
        unsafe {
            (self.map.as_mut_ptr() as *mut u32)
                .add(index)
                .write_volatile(value)
        }
    }

    #[inline(always)]
    fn read_reg(&self, index: usize) -> u32 {
        debug_assert!(index < BLOCK_SIZE / 4);
        // SAFETY: as for write_reg
        unsafe { (self.map.as_ptr() as *const u32).add(index).read_volatile() }
    }

    /// The write primitive: present, strobe, barrier, hold, latch
    #[inline(always)]
    fn write_word(&mut self, word: u16) {
        let lo = self.lut_lo[(word & 0xFF) as usize];
        let hi = self.lut_hi[(word >> 8) as usize];

        self.set(lo.set | hi.set);
        self.clear(lo.clr | hi.clr);
        self.clear(self.wr);
        barrier();
        for _ in 0..self.hold_spins {
            core::hint::spin_loop();
        }
        self.set(self.wr);
    }
}

impl ParallelBus for MmioBus {
    fn width(&self) -> BusWidth {
        self.width
    }

    fn hardware_reset(&mut self, delay: &mut impl DelayNs) {
        debug!("Pulsing /RST");
        self.clear(self.rst);
        barrier();
        delay.delay_ms(self.timing.reset_assert_ms);
        self.set(self.rst);
        barrier();
        delay.delay_ms(self.timing.reset_settle_ms);
    }

    fn write_command(&mut self, cmd: u8) {
        self.clear(self.dc);
        barrier();
        self.write_word(cmd as u16);
        self.set(self.dc);
        barrier();
    }

    fn write_data(&mut self, data: u8) {
        self.write_word(data as u16);
    }

    fn write_pixels(&mut self, pixels: &[u16]) {
        let width = self.width;
        for &px in pixels {
            for &word in width.encode_pixel(px).as_slice() {
                self.write_word(word);
            }
        }
    }
}

impl Drop for MmioBus {
    fn drop(&mut self) {
        // Deselect the controller; the mapping is released with self.map
        self.set(self.cs | self.wr | self.dc | self.rd);
        barrier();
        debug!("GPIO bus closed");
    }
}

fn map_registers(file: &File) -> Result<MmapMut, BusError> {
    // SAFETY: /dev/gpiomem exposes exactly the GPIO block; nothing else in
    // this process maps it
    unsafe { MmapOptions::new().len(BLOCK_SIZE).map_mut(file) }.map_err(BusError::Map)
}

/// Full-system data memory barrier
///
/// The GPIO block is device memory on the peripheral bus; `dmb sy` orders
/// the strobe against every other access, not just inner-shareable ones.
#[cfg(any(
    target_arch = "aarch64",
    all(target_arch = "arm", target_feature = "v7")
))]
#[inline(always)]
fn barrier() {
    // SAFETY: dmb has no operands and touches no registers or memory
    unsafe { core::arch::asm!("dmb sy", options(nostack, preserves_flags)) }
}

/// Full memory fence on hosts without `dmb`
#[cfg(not(any(
    target_arch = "aarch64",
    all(target_arch = "arm", target_feature = "v7")
)))]
#[inline(always)]
fn barrier() {
    core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shield() -> PinMap {
        PinMap::try_from(&BusConfig::default()).unwrap()
    }

    #[test]
    fn test_lut_covers_every_line() {
        let pins = shield();
        let lut = build_lut(pins.data_pins());
        let all: u32 = pins.data_pins().iter().map(|&p| 1u32 << p).sum();

        for entry in lut.iter() {
            assert_eq!(entry.set | entry.clr, all);
            assert_eq!(entry.set & entry.clr, 0);
        }
    }

    #[test]
    fn test_lut_bit_order() {
        let lut = build_lut(shield().data_pins());
        // DB0 is GPIO 9, DB7 is GPIO 3
        assert_eq!(lut[0x01].set, 1 << 9);
        assert_eq!(lut[0x80].set, 1 << 3);
        assert_eq!(lut[0x00].set, 0);
        assert_eq!(lut[0xFF].clr, 0);
    }

    #[test]
    fn test_empty_high_table() {
        let lut = build_lut(&[]);
        assert!(lut.iter().all(|m| *m == Masks::default()));
    }

    #[test]
    fn test_shield_pins_valid() {
        assert!(shield().validate().is_ok());
        assert_eq!(shield().all_pins().count(), 13);
    }

    #[test]
    fn test_invalid_pins() {
        let mut pins = shield();
        pins.read = 40;
        assert!(matches!(
            pins.validate(),
            Err(BusError::InvalidPin { pin: 40, .. })
        ));

        let mut pins = shield();
        pins.read = pins.write;
        assert!(matches!(
            pins.validate(),
            Err(BusError::InvalidPin { pin: 23, .. })
        ));
    }

    #[test]
    fn test_default_config_is_shield() {
        let pins = shield();
        assert_eq!(pins.width, BusWidth::Bits8);
        assert_eq!((pins.reset, pins.chip_select, pins.data_command), (25, 8, 24));
        assert_eq!((pins.write, pins.read), (23, 18));
        assert_eq!(pins.data_pins(), &[9, 11, 10, 22, 27, 17, 4, 3]);
    }

    #[test]
    fn test_config_16bit_bus() {
        let mut config = BusConfig::default();
        config.width = BusWidth::Bits16;
        config.data.extend_from_slice(&[2, 5, 6, 7, 12, 13, 14, 15]).unwrap();
        let pins = PinMap::try_from(&config).unwrap();
        assert_eq!(pins.data_pins().len(), 16);
        assert_eq!(pins.data_pins()[8], 2);
        assert_eq!(build_lut(&pins.data_pins()[8..])[0x01].set, 1 << 2);
    }

    #[test]
    fn test_config_data_lines_must_match_width() {
        let mut config = BusConfig::default();
        config.width = BusWidth::Bits12;
        assert!(matches!(
            PinMap::try_from(&config),
            Err(BusError::DataLines {
                expected: 12,
                found: 8
            })
        ));

        let mut config = BusConfig::default();
        config.data[0] = config.write;
        assert!(matches!(
            PinMap::try_from(&config),
            Err(BusError::InvalidPin { pin: 23, .. })
        ));
    }
}
