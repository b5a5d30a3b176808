//! Daemon error type
//!
//! Everything here is fatal for the mirror. Touch failures never reach this
//! type; they end the touch thread and are only logged.

use std::io;

use parafb_core::frame::FrameError;
use parafb_drivers::panel::PanelError;
use parafb_hal_linux::{BusError, InputError, SourceError};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Input(#[from] InputError),

    /// Source frame could not be scaled into the panel buffer
    #[error("frame conversion failed: {0:?}")]
    Frame(FrameError),

    /// Panel refused a frame
    #[error("panel write failed: {0:?}")]
    Panel(PanelError),

    #[error("cannot install signal handlers: {0}")]
    Signal(#[source] io::Error),

    #[error("monotonic clock unavailable: {0}")]
    Clock(#[source] nix::Error),

    #[error("cannot spawn touch thread: {0}")]
    Spawn(#[source] io::Error),
}

impl From<FrameError> for DaemonError {
    fn from(e: FrameError) -> Self {
        DaemonError::Frame(e)
    }
}

impl From<PanelError> for DaemonError {
    fn from(e: PanelError) -> Self {
        DaemonError::Panel(e)
    }
}
