//! Linux implementation of the parafb hardware layer
//!
//! Provides the host side of every device the mirror touches:
//!
//! - [`gpio::MmioBus`] - 8080 bus bit-banged through `/dev/gpiomem`
//! - [`detect`] - Host SoC detection from `/proc/cpuinfo`
//! - [`framebuffer::FbSource`] - Memory-mapped `/dev/fbN`
//! - [`uinput::UinputDevice`] - Virtual absolute pointer
//! - [`spi::open_touch_spi`] - spidev node for the touch ADC
//!
//! Only the BCM283x GPIO register layout (Pi Zero through Pi 4) is
//! supported. On a Pi 5 the header GPIOs sit behind RP1 and opening the
//! bus fails with [`BusError::UnsupportedHost`].

pub mod detect;
pub mod error;
pub mod framebuffer;
pub mod gpio;
pub mod spi;
pub mod uinput;

pub use error::{BusError, InputError, SourceError, SpiError};
pub use framebuffer::FbSource;
pub use gpio::{MmioBus, PinMap};
pub use linux_embedded_hal::Delay;
pub use uinput::UinputDevice;
