//! Configuration type definitions

use heapless::{String, Vec};
use parafb_hal::{BusWidth, ResetTiming};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum device path length
pub const MAX_PATH_LEN: usize = 64;

/// Panel native width at 0 degrees
pub const PANEL_NATIVE_WIDTH: u16 = 320;

/// Panel native height at 0 degrees
pub const PANEL_NATIVE_HEIGHT: u16 = 480;

/// Most data lines a bus can have
pub const MAX_DATA_LINES: usize = 16;

/// Lowest accepted frame rate
pub const MIN_FPS: u8 = 1;

/// Highest accepted frame rate
pub const MAX_FPS: u8 = 60;

/// Panel rotation
///
/// Any angle other than 0, 90, 180 or 270 maps to [`Rotation::Deg270`],
/// the orientation of the common 3.5" shields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "u16", into = "u16"))]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    #[default]
    Deg270,
}

impl Rotation {
    /// Map an angle in degrees, falling back to 270
    pub const fn from_degrees(degrees: u16) -> Self {
        match degrees {
            0 => Rotation::Deg0,
            90 => Rotation::Deg90,
            180 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    /// Angle in degrees
    pub const fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Whether width and height trade places
    pub const fn is_landscape(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Addressable (width, height) of the panel in this orientation
    pub const fn panel_dimensions(self) -> (u16, u16) {
        if self.is_landscape() {
            (PANEL_NATIVE_HEIGHT, PANEL_NATIVE_WIDTH)
        } else {
            (PANEL_NATIVE_WIDTH, PANEL_NATIVE_HEIGHT)
        }
    }
}

impl From<u16> for Rotation {
    fn from(degrees: u16) -> Self {
        Rotation::from_degrees(degrees)
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// What the daemon does once the panel is up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RunMode {
    /// Mirror the source framebuffer until stopped
    #[default]
    Mirror,
    /// Flush a fixed number of synthetic frames and report throughput
    Benchmark,
    /// Cycle solid color fills
    TestPattern,
}

/// Touch controller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TouchConfig {
    /// Start the touch thread
    pub enabled: bool,
    /// spidev node of the touch controller
    pub spi_device: String<MAX_PATH_LEN>,
    /// SPI clock (Hz)
    pub spi_speed_hz: u32,
    /// Delay between poll cycles (ms)
    pub poll_interval_ms: u32,
    /// Sensor X drives panel Y
    pub swap_xy: bool,
    /// Mirror the panel X axis
    pub invert_x: bool,
    /// Mirror the panel Y axis
    pub invert_y: bool,
    /// Raw reading at the near panel edge
    pub raw_min: u16,
    /// Raw reading at the far panel edge
    pub raw_max: u16,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            spi_device: path("/dev/spidev0.1"),
            spi_speed_hz: 2_000_000,
            poll_interval_ms: 10,
            swap_xy: false,
            invert_x: false,
            invert_y: false,
            raw_min: 200,
            raw_max: 3900,
        }
    }
}

/// Parallel bus wiring, as BCM GPIO numbers
///
/// Defaults to the 26-pin 3.5" shield on an 8-bit bus.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BusConfig {
    /// Data line count
    pub width: BusWidth,
    /// /RST
    pub reset: u8,
    /// /CS
    pub chip_select: u8,
    /// D/C
    pub data_command: u8,
    /// /WR
    pub write: u8,
    /// /RD
    pub read: u8,
    /// DB0 upward, one pin per data line
    pub data: Vec<u8, MAX_DATA_LINES>,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            width: BusWidth::Bits8,
            reset: 25,
            chip_select: 8,
            data_command: 24,
            write: 23,
            read: 18,
            data: Vec::from_slice(&[9, 11, 10, 22, 27, 17, 4, 3]).unwrap_or_default(),
        }
    }
}

/// Complete daemon configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MirrorConfig {
    /// Panel orientation
    pub rotation: Rotation,
    /// Target frame rate, clamped to [`MIN_FPS`]..=[`MAX_FPS`]
    #[cfg_attr(feature = "serde", serde(deserialize_with = "clamped_fps"))]
    pub fps: u8,
    /// Source framebuffer node
    pub fb_device: String<MAX_PATH_LEN>,
    /// Touch settings
    pub touch: TouchConfig,
    /// Parallel bus wiring
    pub bus: BusConfig,
    /// Reset and init delays
    pub timing: ResetTiming,
    /// Run mode
    pub mode: RunMode,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            rotation: Rotation::Deg270,
            fps: 30,
            fb_device: path("/dev/fb0"),
            touch: TouchConfig::default(),
            bus: BusConfig::default(),
            timing: ResetTiming::default(),
            mode: RunMode::Mirror,
        }
    }
}

impl MirrorConfig {
    /// Clamp a requested frame rate into range
    pub fn clamp_fps(fps: u32) -> u8 {
        fps.clamp(MIN_FPS as u32, MAX_FPS as u32) as u8
    }

    /// Apply range rules to fields that may have come from outside
    pub fn normalized(mut self) -> Self {
        self.fps = Self::clamp_fps(self.fps as u32);
        self
    }

    /// Panel (width, height) for the configured rotation
    pub fn panel_dimensions(&self) -> (u16, u16) {
        self.rotation.panel_dimensions()
    }
}

#[cfg(feature = "serde")]
fn clamped_fps<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    u32::deserialize(deserializer).map(MirrorConfig::clamp_fps)
}

/// Build a bounded path, truncating anything too long
pub fn path(s: &str) -> String<MAX_PATH_LEN> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_out_of_range_defaults_to_270() {
        assert_eq!(Rotation::from_degrees(45), Rotation::Deg270);
        assert_eq!(Rotation::from_degrees(360), Rotation::Deg270);
        assert_eq!(Rotation::from_degrees(90), Rotation::Deg90);
    }

    #[test]
    fn test_panel_dimensions() {
        assert_eq!(Rotation::Deg0.panel_dimensions(), (320, 480));
        assert_eq!(Rotation::Deg180.panel_dimensions(), (320, 480));
        assert_eq!(Rotation::Deg90.panel_dimensions(), (480, 320));
        assert_eq!(Rotation::Deg270.panel_dimensions(), (480, 320));
    }

    #[test]
    fn test_fps_clamp() {
        assert_eq!(MirrorConfig::clamp_fps(0), 1);
        assert_eq!(MirrorConfig::clamp_fps(30), 30);
        assert_eq!(MirrorConfig::clamp_fps(500), 60);

        let config = MirrorConfig {
            fps: 0,
            ..Default::default()
        };
        assert_eq!(config.normalized().fps, 1);
    }

    #[test]
    fn test_defaults() {
        let config = MirrorConfig::default();
        assert_eq!(config.rotation, Rotation::Deg270);
        assert_eq!(config.fps, 30);
        assert_eq!(config.fb_device.as_str(), "/dev/fb0");
        assert!(!config.touch.enabled);
        assert_eq!(config.touch.spi_device.as_str(), "/dev/spidev0.1");
        assert_eq!(config.touch.spi_speed_hz, 2_000_000);
        assert_eq!(config.mode, RunMode::Mirror);
        assert_eq!(config.bus.width, BusWidth::Bits8);
        assert_eq!(config.bus.data.len(), 8);
    }

    #[test]
    fn test_path_truncates() {
        let long = "/dev/serial/by-path/platform-fe204000.spi-cs-1-very-long-device-name";
        assert!(long.len() > MAX_PATH_LEN);
        assert_eq!(path(long).len(), MAX_PATH_LEN);
        assert_eq!(path("/dev/fb1").as_str(), "/dev/fb1");
    }
}
