//! Device drivers for the panel mirror
//!
//! Each driver is generic over the bus or sink it talks to, so the same
//! code runs against real hardware and against host-side mocks:
//!
//! - [`panel::Ili9481`] - ILI9481 controller over any [`parafb_hal::ParallelBus`]
//! - [`touch::Xpt2046`] - XPT2046 resistive touch ADC over any SPI device
//! - [`input::PointerEmitter`] - Touch reports to absolute pointer events

#![no_std]
#![deny(unsafe_code)]

pub mod input;
pub mod panel;
pub mod touch;
