//! ILI9481 Panel Driver
//!
//! Drives a 320x480 ILI9481 over an 8080-style parallel bus. The controller
//! is set to 16-bit 5-6-5 pixels; every frame is a full-window write.

use embedded_hal::delay::DelayNs;
use parafb_core::config::Rotation;
use parafb_core::state::{PanelEvent, PanelState};
use parafb_hal::{ParallelBus, ResetTiming};

/// ILI9481 commands
pub mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPIN: u8 = 0x10;
    pub const SLPOUT: u8 = 0x11;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const PASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;
    pub const PANELDRV: u8 = 0xC0;
    pub const FRMCTR: u8 = 0xC5;
    pub const GAMMASET: u8 = 0xC8;
    pub const PWRSET: u8 = 0xD0;
    pub const VMCTR: u8 = 0xD1;
    pub const PWRNORM: u8 = 0xD2;
}

/// Pixel format parameter for 16 bits per pixel
const COLMOD_RGB565: u8 = 0x55;

/// Wait after an init step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settle {
    None,
    SoftReset,
    SleepOut,
    DisplayOn,
}

/// One (command, parameters, post-delay) entry
struct InitStep {
    cmd: u8,
    params: &'static [u8],
    settle: Settle,
}

impl InitStep {
    const fn new(cmd: u8, params: &'static [u8], settle: Settle) -> Self {
        Self {
            cmd,
            params,
            settle,
        }
    }
}

/// Power, gamma, timing and pixel-format setup
const INIT_SEQUENCE: &[InitStep] = &[
    InitStep::new(cmd::SWRESET, &[], Settle::SoftReset),
    InitStep::new(cmd::SLPOUT, &[], Settle::SleepOut),
    InitStep::new(cmd::PWRSET, &[0x07, 0x42, 0x18], Settle::None),
    InitStep::new(cmd::VMCTR, &[0x00, 0x07, 0x10], Settle::None),
    InitStep::new(cmd::PWRNORM, &[0x01, 0x02], Settle::None),
    InitStep::new(cmd::PANELDRV, &[0x10, 0x3B, 0x00, 0x02, 0x11], Settle::None),
    InitStep::new(cmd::FRMCTR, &[0x03], Settle::None),
    InitStep::new(
        cmd::GAMMASET,
        &[
            0x00, 0x32, 0x36, 0x45, 0x06, 0x16, 0x37, 0x75, 0x77, 0x54, 0x0C, 0x00,
        ],
        Settle::None,
    ),
    InitStep::new(cmd::COLMOD, &[COLMOD_RGB565], Settle::None),
    InitStep::new(cmd::DISPON, &[], Settle::DisplayOn),
];

/// Memory access control value for a rotation
pub const fn madctl(rotation: Rotation) -> u8 {
    match rotation {
        Rotation::Deg0 => 0x0A,
        Rotation::Deg90 => 0xE8,
        Rotation::Deg180 => 0xCA,
        Rotation::Deg270 => 0x28,
    }
}

/// Panel driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelError {
    /// Panel has not finished initialization, or is powered off
    NotReady,
    /// Zero width or height
    EmptyWindow,
    /// Fewer pixels than width x height
    BufferTooSmall,
}

/// ILI9481 driver
pub struct Ili9481<B> {
    bus: B,
    timing: ResetTiming,
    state: PanelState,
    rotation: Rotation,
}

impl<B: ParallelBus> Ili9481<B> {
    /// Wrap an open bus; nothing is sent until [`Self::initialize`]
    pub fn new(bus: B, timing: ResetTiming) -> Self {
        Self {
            bus,
            timing,
            state: PanelState::Uninitialized,
            rotation: Rotation::default(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Rotation set by the last initialization
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Addressable (width, height) for the current rotation
    pub fn dimensions(&self) -> (u16, u16) {
        self.rotation.panel_dimensions()
    }

    /// Reset the controller and run the init table
    pub fn initialize(&mut self, rotation: Rotation, delay: &mut impl DelayNs) {
        self.state = self.state.transition(PanelEvent::ResetStarted);
        self.bus.hardware_reset(delay);
        self.state = self.state.transition(PanelEvent::ResetComplete);

        for step in INIT_SEQUENCE {
            self.bus.write_command(step.cmd);
            self.bus.write_data_bytes(step.params);
            let ms = self.settle_ms(step.settle);
            if ms > 0 {
                delay.delay_ms(ms);
            }
        }

        self.bus.write_command(cmd::MADCTL);
        self.bus.write_data(madctl(rotation));

        self.rotation = rotation;
        self.state = self.state.transition(PanelEvent::InitComplete);
    }

    /// Write one full frame
    ///
    /// Sets the window to `[0, width) x [0, height)` and streams the first
    /// `width * height` pixels in row-major order.
    pub fn flush_frame(&mut self, width: u16, height: u16, pixels: &[u16]) -> Result<(), PanelError> {
        if !self.state.accepts_frames() {
            return Err(PanelError::NotReady);
        }
        if width == 0 || height == 0 {
            return Err(PanelError::EmptyWindow);
        }
        let count = width as usize * height as usize;
        if pixels.len() < count {
            return Err(PanelError::BufferTooSmall);
        }

        self.set_window(width, height);
        self.bus.write_command(cmd::RAMWR);
        self.bus.write_pixels(&pixels[..count]);
        Ok(())
    }

    /// Display off, then sleep in
    ///
    /// Only meant for shutdown. Calling it again, or before initialization,
    /// sends nothing.
    pub fn power_off(&mut self, delay: &mut impl DelayNs) {
        if !self.state.can_power_off() {
            return;
        }

        self.bus.write_command(cmd::DISPOFF);
        delay.delay_ms(self.timing.display_off_ms);
        self.bus.write_command(cmd::SLPIN);
        delay.delay_ms(self.timing.sleep_in_ms);

        self.state = self.state.transition(PanelEvent::PowerOff);
    }

    /// Borrow the underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Release the underlying bus
    pub fn release(self) -> B {
        self.bus
    }

    fn set_window(&mut self, width: u16, height: u16) {
        let [xh, xl] = (width - 1).to_be_bytes();
        let [yh, yl] = (height - 1).to_be_bytes();

        self.bus.write_command(cmd::CASET);
        self.bus.write_data_bytes(&[0x00, 0x00, xh, xl]);
        self.bus.write_command(cmd::PASET);
        self.bus.write_data_bytes(&[0x00, 0x00, yh, yl]);
    }

    fn settle_ms(&self, settle: Settle) -> u32 {
        match settle {
            Settle::None => 0,
            Settle::SoftReset => self.timing.swreset_ms,
            Settle::SleepOut => self.timing.sleep_out_ms,
            Settle::DisplayOn => self.timing.display_on_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec;
    use std::vec::Vec;

    use parafb_hal::mock::{BusOp, MockBus};

    use super::*;

    /// Delay that records requested milliseconds
    #[derive(Default)]
    struct RecordingDelay {
        ms: Vec<u32>,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.ms.push(ms);
        }
    }

    fn ready_panel(rotation: Rotation) -> Ili9481<MockBus> {
        let mut panel = Ili9481::new(MockBus::new(), ResetTiming::default());
        panel.initialize(rotation, &mut RecordingDelay::default());
        panel
    }

    #[test]
    fn test_init_sequence_order() {
        let panel = ready_panel(Rotation::Deg270);
        let bus = panel.bus();

        assert_eq!(bus.ops[0], BusOp::Reset);
        assert_eq!(
            bus.commands(),
            [
                cmd::SWRESET,
                cmd::SLPOUT,
                cmd::PWRSET,
                cmd::VMCTR,
                cmd::PWRNORM,
                cmd::PANELDRV,
                cmd::FRMCTR,
                cmd::GAMMASET,
                cmd::COLMOD,
                cmd::DISPON,
                cmd::MADCTL,
            ]
        );
        assert_eq!(bus.params_of(cmd::PWRSET, 0), [0x07, 0x42, 0x18]);
        assert_eq!(bus.params_of(cmd::PANELDRV, 0), [0x10, 0x3B, 0x00, 0x02, 0x11]);
        assert_eq!(bus.params_of(cmd::GAMMASET, 0).len(), 12);
        assert_eq!(bus.params_of(cmd::COLMOD, 0), [0x55]);
        assert_eq!(bus.params_of(cmd::MADCTL, 0), [0x28]);
        assert_eq!(panel.state(), PanelState::Ready);
    }

    #[test]
    fn test_init_delays() {
        let mut panel = Ili9481::new(MockBus::new(), ResetTiming::default());
        let mut delay = RecordingDelay::default();
        panel.initialize(Rotation::Deg0, &mut delay);
        // Reset delays belong to the bus; the panel waits after
        // SWRESET, SLPOUT and DISPON
        assert_eq!(delay.ms, [50, 20, 25]);
    }

    #[test]
    fn test_rotation_register_values() {
        for (rotation, value) in [
            (Rotation::Deg0, 0x0A),
            (Rotation::Deg90, 0xE8),
            (Rotation::Deg180, 0xCA),
            (Rotation::Deg270, 0x28),
            (Rotation::from_degrees(123), 0x28),
        ] {
            let panel = ready_panel(rotation);
            assert_eq!(panel.bus().params_of(cmd::MADCTL, 0), [value]);
        }
    }

    #[test]
    fn test_flush_sets_window_then_streams() {
        let mut panel = ready_panel(Rotation::Deg270);
        panel.bus.clear();

        let pixels = vec![0x1234u16; 480 * 320];
        panel.flush_frame(480, 320, &pixels).unwrap();

        let bus = panel.bus();
        assert_eq!(bus.commands(), [cmd::CASET, cmd::PASET, cmd::RAMWR]);
        assert_eq!(bus.params_of(cmd::CASET, 0), [0x00, 0x00, 0x01, 0xDF]);
        assert_eq!(bus.params_of(cmd::PASET, 0), [0x00, 0x00, 0x01, 0x3F]);
        let writes = bus.pixel_writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].len(), 480 * 320);
    }

    #[test]
    fn test_flush_rejected_before_init() {
        let mut panel = Ili9481::new(MockBus::new(), ResetTiming::default());
        assert_eq!(panel.flush_frame(1, 1, &[0]), Err(PanelError::NotReady));
        assert!(panel.bus().ops.is_empty());
    }

    #[test]
    fn test_flush_rejects_short_buffer() {
        let mut panel = ready_panel(Rotation::Deg0);
        assert_eq!(
            panel.flush_frame(320, 480, &[0u16; 10]),
            Err(PanelError::BufferTooSmall)
        );
        assert_eq!(panel.flush_frame(0, 480, &[]), Err(PanelError::EmptyWindow));
    }

    #[test]
    fn test_power_off_once() {
        let mut panel = ready_panel(Rotation::Deg0);
        panel.bus.clear();
        let mut delay = RecordingDelay::default();

        panel.power_off(&mut delay);
        panel.power_off(&mut delay);

        assert_eq!(panel.bus().commands(), [cmd::DISPOFF, cmd::SLPIN]);
        assert_eq!(delay.ms, [20, 120]);
        assert_eq!(panel.state(), PanelState::PoweredOff);
        assert_eq!(panel.flush_frame(1, 1, &[0]), Err(PanelError::NotReady));
    }
}
