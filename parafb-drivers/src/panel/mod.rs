//! Panel controller drivers

pub mod ili9481;

pub use ili9481::{Ili9481, PanelError};
