//! Device traits
//!
//! These traits define the interface between the mirror/touch logic and
//! the host-specific implementations (framebuffer device, SPI ADC, uinput).

pub mod input;
pub mod source;
pub mod touch;

pub use input::{EventSink, PointerEvent};
pub use source::FrameSource;
pub use touch::{AdcChannel, TouchAdc, ADC_MAX};
