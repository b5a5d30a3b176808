//! Configuration types
//!
//! The daemon resolves file and command-line settings into one immutable
//! [`MirrorConfig`] before anything is opened.

pub mod calibration;
pub mod types;

pub use calibration::*;
pub use types::*;
