//! Pixel formats and frame geometry

/// Errors describing an unusable source frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Bits per pixel is neither 16 nor 32
    UnsupportedDepth(u32),
    /// Zero width or height
    EmptyFrame,
    /// Stride shorter than one row of pixels
    StrideTooShort,
    /// Mapped bytes do not cover every row
    SourceTooSmall,
    /// Output buffer smaller than target width x height
    TargetTooSmall,
}

/// One color channel inside a packed pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Channel {
    /// Bit offset of the least significant bit
    pub offset: u8,
    /// Width in bits
    pub length: u8,
}

impl Channel {
    pub const fn new(offset: u8, length: u8) -> Self {
        Self { offset, length }
    }

    /// Pull this channel's raw bits out of a pixel
    #[inline(always)]
    pub fn extract(self, pixel: u32) -> u32 {
        let shifted = pixel.checked_shr(self.offset as u32).unwrap_or(0);
        let mask = match self.length {
            0 => 0,
            n if n >= 32 => u32::MAX,
            n => (1u32 << n) - 1,
        };
        shifted & mask
    }

    /// Extract and rescale to `bits` by truncation or zero padding
    #[inline(always)]
    pub fn normalize(self, pixel: u32, bits: u8) -> u16 {
        let value = self.extract(pixel);
        let length = self.length.min(32);
        let scaled = if length >= bits {
            value >> (length - bits)
        } else {
            value << (bits - length)
        };
        scaled as u16
    }
}

/// Bit layout of the red, green and blue channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelLayout {
    pub red: Channel,
    pub green: Channel,
    pub blue: Channel,
}

impl PixelLayout {
    /// 16-bit 5-6-5
    pub const RGB565: Self = Self {
        red: Channel::new(11, 5),
        green: Channel::new(5, 6),
        blue: Channel::new(0, 5),
    };

    /// 32-bit with red in bits 16..24 (the usual Linux console layout)
    pub const XRGB8888: Self = Self {
        red: Channel::new(16, 8),
        green: Channel::new(8, 8),
        blue: Channel::new(0, 8),
    };
}

/// Geometry and format of a source frame
///
/// Captured once when the source is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    /// Visible width (pixels)
    pub width: u32,
    /// Visible height (pixels)
    pub height: u32,
    /// Bytes from one row to the next
    pub stride: u32,
    /// Bits per pixel (16 or 32)
    pub bits_per_pixel: u32,
    /// Channel layout
    pub layout: PixelLayout,
}

impl FrameDescriptor {
    /// Bytes per pixel
    pub const fn bytes_per_pixel(&self) -> usize {
        (self.bits_per_pixel / 8) as usize
    }

    /// Smallest byte length that covers every visible pixel
    pub fn required_len(&self) -> usize {
        if self.height == 0 {
            return 0;
        }
        (self.height as usize - 1) * self.stride as usize
            + self.width as usize * self.bytes_per_pixel()
    }

    /// Check the frame can be mirrored
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.bits_per_pixel != 16 && self.bits_per_pixel != 32 {
            return Err(FrameError::UnsupportedDepth(self.bits_per_pixel));
        }
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::EmptyFrame);
        }
        if (self.stride as usize) < self.width as usize * self.bytes_per_pixel() {
            return Err(FrameError::StrideTooShort);
        }
        Ok(())
    }
}

/// Convert one 32-bit source pixel to RGB565
///
/// No rounding or dithering.
#[inline(always)]
pub fn convert_pixel32(pixel: u32, layout: &PixelLayout) -> u16 {
    let r = layout.red.normalize(pixel, 5);
    let g = layout.green.normalize(pixel, 6);
    let b = layout.blue.normalize(pixel, 5);
    (r << 11) | (g << 5) | b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_colors() {
        let layout = PixelLayout::XRGB8888;
        assert_eq!(convert_pixel32(0x00FF_0000, &layout), 0xF800);
        assert_eq!(convert_pixel32(0x0000_FF00, &layout), 0x07E0);
        assert_eq!(convert_pixel32(0x0000_00FF, &layout), 0x001F);
        assert_eq!(convert_pixel32(0x00FF_FFFF, &layout), 0xFFFF);
        assert_eq!(convert_pixel32(0x0000_0000, &layout), 0x0000);
    }

    #[test]
    fn test_half_gray_truncates() {
        let layout = PixelLayout::XRGB8888;
        // 0x80 -> 5 bits: 0x10, 6 bits: 0x20
        assert_eq!(convert_pixel32(0x0080_8080, &layout), 0x8410);
        // Low bits are dropped, not rounded
        assert_eq!(convert_pixel32(0x0087_8383, &layout), 0x8410);
    }

    #[test]
    fn test_alpha_ignored() {
        let layout = PixelLayout::XRGB8888;
        assert_eq!(convert_pixel32(0xFFFF_0000, &layout), 0xF800);
    }

    #[test]
    fn test_bgr_layout() {
        let layout = PixelLayout {
            red: Channel::new(0, 8),
            green: Channel::new(8, 8),
            blue: Channel::new(16, 8),
        };
        assert_eq!(convert_pixel32(0x0000_00FF, &layout), 0xF800);
        assert_eq!(convert_pixel32(0x00FF_0000, &layout), 0x001F);
    }

    #[test]
    fn test_narrow_channel_pads() {
        // 4-bit channels widen with zero low bits
        let layout = PixelLayout {
            red: Channel::new(8, 4),
            green: Channel::new(4, 4),
            blue: Channel::new(0, 4),
        };
        let px = convert_pixel32(0x0FFF, &layout);
        assert_eq!(px >> 11, 0b11110);
        assert_eq!((px >> 5) & 0x3F, 0b111100);
        assert_eq!(px & 0x1F, 0b11110);
    }

    #[test]
    fn test_descriptor_validation() {
        let mut desc = FrameDescriptor {
            width: 640,
            height: 480,
            stride: 640 * 4,
            bits_per_pixel: 32,
            layout: PixelLayout::XRGB8888,
        };
        assert_eq!(desc.validate(), Ok(()));
        assert_eq!(desc.required_len(), 640 * 4 * 480);

        desc.bits_per_pixel = 24;
        assert_eq!(desc.validate(), Err(FrameError::UnsupportedDepth(24)));

        desc.bits_per_pixel = 32;
        desc.stride = 100;
        assert_eq!(desc.validate(), Err(FrameError::StrideTooShort));

        desc.stride = 640 * 4;
        desc.height = 0;
        assert_eq!(desc.validate(), Err(FrameError::EmptyFrame));
    }
}
