//! Linux framebuffer source
//!
//! Opens `/dev/fbN` read-only, captures its geometry once through the
//! `FBIOGET_*SCREENINFO` ioctls and maps the pixel memory.

use std::fs::File;
use std::os::fd::AsRawFd;

use memmap2::{Mmap, MmapOptions};
use nix::libc::c_ulong;
use parafb_core::frame::{Channel, FrameDescriptor, PixelLayout};
use parafb_core::traits::FrameSource;
use tracing::info;

use crate::error::SourceError;

/// `struct fb_bitfield`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FbBitfield {
    pub offset: u32,
    pub length: u32,
    pub msb_right: u32,
}

/// `struct fb_var_screeninfo`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FbVarScreeninfo {
    pub xres: u32,
    pub yres: u32,
    pub xres_virtual: u32,
    pub yres_virtual: u32,
    pub xoffset: u32,
    pub yoffset: u32,
    pub bits_per_pixel: u32,
    pub grayscale: u32,
    pub red: FbBitfield,
    pub green: FbBitfield,
    pub blue: FbBitfield,
    pub transp: FbBitfield,
    pub nonstd: u32,
    pub activate: u32,
    pub height: u32,
    pub width: u32,
    pub accel_flags: u32,
    pub pixclock: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    pub upper_margin: u32,
    pub lower_margin: u32,
    pub hsync_len: u32,
    pub vsync_len: u32,
    pub sync: u32,
    pub vmode: u32,
    pub rotate: u32,
    pub colorspace: u32,
    pub reserved: [u32; 4],
}

/// `struct fb_fix_screeninfo`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FbFixScreeninfo {
    pub id: [u8; 16],
    pub smem_start: c_ulong,
    pub smem_len: u32,
    pub type_: u32,
    pub type_aux: u32,
    pub visual: u32,
    pub xpanstep: u16,
    pub ypanstep: u16,
    pub ywrapstep: u16,
    pub line_length: u32,
    pub mmio_start: c_ulong,
    pub mmio_len: u32,
    pub accel: u32,
    pub capabilities: u16,
    pub reserved: [u16; 2],
}

nix::ioctl_read_bad!(fbioget_vscreeninfo, 0x4600, FbVarScreeninfo);
nix::ioctl_read_bad!(fbioget_fscreeninfo, 0x4602, FbFixScreeninfo);

impl FbBitfield {
    fn channel(&self) -> Channel {
        Channel::new(self.offset.min(31) as u8, self.length.min(32) as u8)
    }
}

/// Frame geometry from the two screeninfo structs
pub fn describe(var: &FbVarScreeninfo, fix: &FbFixScreeninfo) -> FrameDescriptor {
    let layout = if var.bits_per_pixel == 16 {
        PixelLayout::RGB565
    } else {
        PixelLayout {
            red: var.red.channel(),
            green: var.green.channel(),
            blue: var.blue.channel(),
        }
    };

    let stride = if fix.line_length > 0 {
        fix.line_length
    } else {
        var.xres * var.bits_per_pixel / 8
    };

    FrameDescriptor {
        width: var.xres,
        height: var.yres,
        stride,
        bits_per_pixel: var.bits_per_pixel,
        layout,
    }
}

/// Bytes to map: `smem_len`, else the virtual area, else the visible area
pub fn map_len(var: &FbVarScreeninfo, fix: &FbFixScreeninfo) -> usize {
    if fix.smem_len > 0 {
        fix.smem_len as usize
    } else if var.yres_virtual > 0 && fix.line_length > 0 {
        var.yres_virtual as usize * fix.line_length as usize
    } else {
        var.xres as usize * var.yres as usize * var.bits_per_pixel as usize / 8
    }
}

/// A mapped framebuffer device
pub struct FbSource {
    desc: FrameDescriptor,
    map: Mmap,
}

impl FbSource {
    /// Open, query and map a framebuffer device
    pub fn open(path: &str) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_string(),
            source,
        })?;

        let mut var = FbVarScreeninfo::default();
        let mut fix = FbFixScreeninfo::default();
        let query = |source| SourceError::Query {
            path: path.to_string(),
            source,
        };
        // SAFETY: both structs match the kernel layouts and outlive the calls
        unsafe {
            fbioget_vscreeninfo(file.as_raw_fd(), &mut var).map_err(query)?;
            fbioget_fscreeninfo(file.as_raw_fd(), &mut fix).map_err(query)?;
        }

        let desc = describe(&var, &fix);
        desc.validate()?;

        let len = map_len(&var, &fix);
        if len < desc.required_len() {
            return Err(SourceError::Geometry(
                parafb_core::frame::FrameError::SourceTooSmall,
            ));
        }

        // SAFETY: read-only shared mapping of device memory; the contents
        // change under us, which is what mirroring wants
        let map = unsafe { MmapOptions::new().len(len).map(&file) }.map_err(SourceError::Map)?;

        info!(
            "Source {}: {}x{} {} bpp, stride {}, R{}:{} G{}:{} B{}:{}",
            path,
            desc.width,
            desc.height,
            desc.bits_per_pixel,
            desc.stride,
            desc.layout.red.offset,
            desc.layout.red.length,
            desc.layout.green.offset,
            desc.layout.green.length,
            desc.layout.blue.offset,
            desc.layout.blue.length,
        );

        Ok(Self { desc, map })
    }
}

impl FrameSource for FbSource {
    fn descriptor(&self) -> &FrameDescriptor {
        &self.desc
    }

    fn bytes(&self) -> &[u8] {
        &self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var32() -> FbVarScreeninfo {
        FbVarScreeninfo {
            xres: 640,
            yres: 480,
            xres_virtual: 640,
            yres_virtual: 960,
            bits_per_pixel: 32,
            red: FbBitfield {
                offset: 16,
                length: 8,
                msb_right: 0,
            },
            green: FbBitfield {
                offset: 8,
                length: 8,
                msb_right: 0,
            },
            blue: FbBitfield {
                offset: 0,
                length: 8,
                msb_right: 0,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_struct_sizes_match_kernel() {
        assert_eq!(std::mem::size_of::<FbVarScreeninfo>(), 160);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(std::mem::size_of::<FbFixScreeninfo>(), 80);
        #[cfg(target_pointer_width = "32")]
        assert_eq!(std::mem::size_of::<FbFixScreeninfo>(), 68);
    }

    #[test]
    fn test_describe_32bpp() {
        let fix = FbFixScreeninfo {
            line_length: 2560,
            ..Default::default()
        };
        let desc = describe(&var32(), &fix);
        assert_eq!(desc.width, 640);
        assert_eq!(desc.stride, 2560);
        assert_eq!(desc.layout, PixelLayout::XRGB8888);
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_describe_16bpp_uses_565() {
        let var = FbVarScreeninfo {
            xres: 320,
            yres: 240,
            bits_per_pixel: 16,
            ..Default::default()
        };
        let desc = describe(&var, &FbFixScreeninfo::default());
        assert_eq!(desc.layout, PixelLayout::RGB565);
        assert_eq!(desc.stride, 640);
    }

    #[test]
    fn test_map_len_fallbacks() {
        let var = var32();
        let mut fix = FbFixScreeninfo {
            smem_len: 8 << 20,
            line_length: 2560,
            ..Default::default()
        };
        assert_eq!(map_len(&var, &fix), 8 << 20);

        fix.smem_len = 0;
        assert_eq!(map_len(&var, &fix), 960 * 2560);

        fix.line_length = 0;
        assert_eq!(map_len(&var, &fix), 640 * 480 * 4);
    }
}
