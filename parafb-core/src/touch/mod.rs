//! Touch sample filtering
//!
//! Turns raw 12-bit resistive readings into stable, calibrated panel
//! coordinates.

pub mod filter;
pub mod median;

pub use filter::{FilterConfig, FilterConfigError, TouchFilter, TouchPhase, TouchReport};
pub use median::median;
