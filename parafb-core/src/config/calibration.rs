//! Touch calibration
//!
//! Maps raw 12-bit sensor readings to panel pixels with two affine
//! equations:
//!
//! ```text
//! x = ax * raw_x + bx * raw_y + cx
//! y = ay * raw_x + by * raw_y + cy
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Full scale of the touch ADC
pub const RAW_FULL_SCALE: f32 = 4096.0;

/// Six-coefficient affine calibration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationMatrix {
    pub ax: f32,
    pub bx: f32,
    pub cx: f32,
    pub ay: f32,
    pub by: f32,
    pub cy: f32,
}

impl CalibrationMatrix {
    /// Raw units pass straight through
    pub const fn identity() -> Self {
        Self {
            ax: 1.0,
            bx: 0.0,
            cx: 0.0,
            ay: 0.0,
            by: 1.0,
            cy: 0.0,
        }
    }

    /// Stretch the full ADC range over the panel, no offsets
    pub fn default_for(width: u16, height: u16) -> Self {
        Self {
            ax: width as f32 / RAW_FULL_SCALE,
            bx: 0.0,
            cx: 0.0,
            ay: 0.0,
            by: height as f32 / RAW_FULL_SCALE,
            cy: 0.0,
        }
    }

    /// Build from the usable raw range and axis orientation flags
    ///
    /// `raw_min..raw_max` is stretched over each panel axis. With
    /// `swap_xy` the sensor's Y reading drives panel X and vice versa. An
    /// empty or inverted raw range falls back to [`Self::default_for`].
    pub fn from_axes(
        width: u16,
        height: u16,
        raw_min: u16,
        raw_max: u16,
        swap_xy: bool,
        invert_x: bool,
        invert_y: bool,
    ) -> Self {
        if raw_max <= raw_min {
            return Self::default_for(width, height);
        }

        let range = (raw_max - raw_min) as f32;
        let sx = width as f32 / range;
        let sy = height as f32 / range;

        let (gain_x, off_x) = axis(sx, raw_min, raw_max, invert_x);
        let (gain_y, off_y) = axis(sy, raw_min, raw_max, invert_y);

        if swap_xy {
            Self {
                ax: 0.0,
                bx: gain_x,
                cx: off_x,
                ay: gain_y,
                by: 0.0,
                cy: off_y,
            }
        } else {
            Self {
                ax: gain_x,
                bx: 0.0,
                cx: off_x,
                ay: 0.0,
                by: gain_y,
                cy: off_y,
            }
        }
    }

    /// Apply the affine map
    pub fn apply(&self, raw_x: f32, raw_y: f32) -> (f32, f32) {
        (
            self.ax * raw_x + self.bx * raw_y + self.cx,
            self.ay * raw_x + self.by * raw_y + self.cy,
        )
    }

    /// Apply and clamp into `[0, width) x [0, height)`
    pub fn to_pixel(&self, raw_x: f32, raw_y: f32, width: u16, height: u16) -> (u16, u16) {
        let (x, y) = self.apply(raw_x, raw_y);
        (clamp_axis(x, width), clamp_axis(y, height))
    }
}

impl Default for CalibrationMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

fn axis(scale: f32, raw_min: u16, raw_max: u16, invert: bool) -> (f32, f32) {
    if invert {
        (-scale, raw_max as f32 * scale)
    } else {
        (scale, -(raw_min as f32) * scale)
    }
}

fn clamp_axis(value: f32, limit: u16) -> u16 {
    let max = limit.saturating_sub(1) as f32;
    // NaN fails both comparisons and lands on 0
    if value > 0.0 {
        if value < max {
            value as u16
        } else {
            max as u16
        }
    } else {
        0
    }
}
