//! Source frame handling
//!
//! Describes a mirrored framebuffer and turns its pixels into the panel's
//! RGB565 at the panel's resolution.

pub mod format;
pub mod scale;

pub use format::{convert_pixel32, Channel, FrameDescriptor, FrameError, PixelLayout};
pub use scale::{scale_frame, source_coord};
