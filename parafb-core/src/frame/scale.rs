//! Nearest-neighbor scaling
//!
//! For destination `(dx, dy)` the source pixel is
//! `(dx * sw / tw, dy * sh / th)` with floor division. 16-bit sources are
//! copied as-is; 32-bit sources go through [`convert_pixel32`].

use super::format::{convert_pixel32, FrameDescriptor, FrameError};

/// Source coordinate sampled for one destination coordinate
#[inline(always)]
pub fn source_coord(dest: usize, source_len: usize, target_len: usize) -> usize {
    dest * source_len / target_len
}

/// Scale and convert a whole source frame into `dst`
///
/// `src` is the raw mapped framebuffer, `dst` holds `target_width *
/// target_height` RGB565 pixels in row-major order.
pub fn scale_frame(
    desc: &FrameDescriptor,
    src: &[u8],
    dst: &mut [u16],
    target_width: usize,
    target_height: usize,
) -> Result<(), FrameError> {
    desc.validate()?;
    if target_width == 0 || target_height == 0 {
        return Err(FrameError::EmptyFrame);
    }
    if src.len() < desc.required_len() {
        return Err(FrameError::SourceTooSmall);
    }
    if dst.len() < target_width * target_height {
        return Err(FrameError::TargetTooSmall);
    }

    let sw = desc.width as usize;
    let sh = desc.height as usize;
    let stride = desc.stride as usize;
    let rows = dst[..target_width * target_height].chunks_exact_mut(target_width);

    match desc.bits_per_pixel {
        16 => {
            for (dy, row) in rows.enumerate() {
                let base = source_coord(dy, sh, target_height) * stride;
                for (dx, out) in row.iter_mut().enumerate() {
                    let i = base + source_coord(dx, sw, target_width) * 2;
                    *out = u16::from_ne_bytes([src[i], src[i + 1]]);
                }
            }
        }
        _ => {
            let layout = desc.layout;
            for (dy, row) in rows.enumerate() {
                let base = source_coord(dy, sh, target_height) * stride;
                for (dx, out) in row.iter_mut().enumerate() {
                    let i = base + source_coord(dx, sw, target_width) * 4;
                    let px = u32::from_ne_bytes([src[i], src[i + 1], src[i + 2], src[i + 3]]);
                    *out = convert_pixel32(px, &layout);
                }
            }
        }
    }

    Ok(())
}
