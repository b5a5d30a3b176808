//! parafb Hardware Abstraction Layer
//!
//! This crate defines the bus-level traits the panel protocol is written
//! against. Host-specific crates (BCM283x MMIO, test mocks) implement them,
//! so the same controller code runs over any physical bus width.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  parafb-daemon (orchestrator)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  parafb-drivers (ILI9481, XPT2046, ...) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  parafb-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ parafb-hal-   │       │  mock::       │
//! │    linux      │       │  MockBus      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`bus::ParallelBus`] - 8080-style write-only parallel bus
//! - [`spi::SerialConfig`] - Clock/mode settings for the touch serial link
//! - [`timing::ResetTiming`] - Reset, init and power-off settle delays

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
#[cfg(feature = "mock")]
pub mod mock;
pub mod spi;
pub mod timing;

// Re-export key types at crate root for convenience
pub use bus::{BusWidth, ParallelBus, PixelCycles, UnsupportedWidth};
pub use spi::{Mode, SerialConfig};
pub use timing::ResetTiming;
