//! Frame pipeline
//!
//! Owns the source and one panel-sized RGB565 buffer. The buffer is sized
//! once when the pipeline is built and reused for every frame.

use parafb_core::frame::{scale_frame, FrameError};
use parafb_core::traits::FrameSource;
use parafb_hal_linux::FbSource;

use crate::error::DaemonError;

pub struct FramePipeline<S> {
    source: S,
    width: u16,
    height: u16,
    buffer: Vec<u16>,
}

impl<S: FrameSource> FramePipeline<S> {
    /// Wrap a source for a `width` x `height` panel
    pub fn new(source: S, width: u16, height: u16) -> Result<Self, FrameError> {
        source.descriptor().validate()?;
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyFrame);
        }
        if source.bytes().len() < source.descriptor().required_len() {
            return Err(FrameError::SourceTooSmall);
        }

        Ok(Self {
            source,
            width,
            height,
            buffer: vec![0; width as usize * height as usize],
        })
    }

    /// Panel (width, height) this pipeline renders for
    pub fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Convert and scale the current source contents
    pub fn render(&mut self) -> Result<&[u16], FrameError> {
        scale_frame(
            self.source.descriptor(),
            self.source.bytes(),
            &mut self.buffer,
            self.width as usize,
            self.height as usize,
        )?;
        Ok(&self.buffer)
    }
}

/// Open a framebuffer device and build a pipeline for it
pub fn open_source(path: &str, width: u16, height: u16) -> Result<FramePipeline<FbSource>, DaemonError> {
    let source = FbSource::open(path)?;
    Ok(FramePipeline::new(source, width, height)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parafb_core::frame::{FrameDescriptor, PixelLayout};

    struct Solid {
        desc: FrameDescriptor,
        bytes: Vec<u8>,
    }

    impl Solid {
        fn rgb565(width: u32, height: u32, pixel: u16) -> Self {
            let bytes = (0..width * height).flat_map(|_| pixel.to_ne_bytes()).collect();
            Self {
                desc: FrameDescriptor {
                    width,
                    height,
                    stride: width * 2,
                    bits_per_pixel: 16,
                    layout: PixelLayout::RGB565,
                },
                bytes,
            }
        }
    }

    impl FrameSource for Solid {
        fn descriptor(&self) -> &FrameDescriptor {
            &self.desc
        }

        fn bytes(&self) -> &[u8] {
            &self.bytes
        }
    }

    #[test]
    fn test_render_reuses_buffer() {
        let mut pipeline = FramePipeline::new(Solid::rgb565(64, 48, 0x07E0), 32, 24).unwrap();
        let first = pipeline.render().unwrap().as_ptr();
        let second = pipeline.render().unwrap();
        assert_eq!(first, second.as_ptr());
        assert_eq!(second.len(), 32 * 24);
        assert!(second.iter().all(|&px| px == 0x07E0));
    }

    #[test]
    fn test_rejects_truncated_source() {
        let mut source = Solid::rgb565(64, 48, 0);
        source.bytes.truncate(100);
        assert_eq!(
            FramePipeline::new(source, 32, 24).err(),
            Some(FrameError::SourceTooSmall)
        );
    }

    #[test]
    fn test_rejects_unsupported_depth() {
        let mut source = Solid::rgb565(8, 8, 0);
        source.desc.bits_per_pixel = 24;
        assert_eq!(
            FramePipeline::new(source, 8, 8).err(),
            Some(FrameError::UnsupportedDepth(24))
        );
    }
}
