//! Frame source trait

use crate::frame::FrameDescriptor;

/// A readable frame in a fixed format
///
/// The bytes may change between calls (a live framebuffer); the
/// descriptor does not.
pub trait FrameSource {
    /// Geometry and layout captured at open
    fn descriptor(&self) -> &FrameDescriptor;

    /// Raw frame bytes, at least `descriptor().required_len()` long
    fn bytes(&self) -> &[u8];
}
