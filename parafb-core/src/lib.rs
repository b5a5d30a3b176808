//! Board-agnostic core logic for the panel mirror
//!
//! This crate contains all logic that does not touch a real device:
//!
//! - Configuration types and touch calibration
//! - Panel lifecycle state machine
//! - Pixel format conversion and nearest-neighbor scaling
//! - Frame pacing and throughput measurement
//! - Touch sample filtering (debounce, median, jump reset, EWMA)
//! - Traits for frame sources, touch ADCs and pointer event sinks

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod frame;
pub mod pacing;
pub mod state;
pub mod touch;
pub mod traits;
