//! Host-side error types

use std::io;

use linux_embedded_hal::SPIError;
use parafb_core::frame::FrameError;
use thiserror::Error;

/// GPIO bus failures (all fatal at startup)
#[derive(Debug, Error)]
pub enum BusError {
    /// The SoC does not expose the BCM283x GPIO block
    #[error("unsupported host ({0}): GPIO is behind RP1, not the BCM283x register block")]
    UnsupportedHost(String),

    /// /proc/cpuinfo could not be read
    #[error("cannot read {path}: {source}")]
    CpuInfo {
        path: &'static str,
        #[source]
        source: io::Error,
    },

    /// Register window device missing or not permitted
    #[error("cannot open {path}: {source}")]
    DeviceOpen {
        path: &'static str,
        #[source]
        source: io::Error,
    },

    /// mmap of the register window failed
    #[error("cannot map GPIO registers: {0}")]
    Map(#[source] io::Error),

    /// Pin map unusable
    #[error("invalid pin {pin}: {reason}")]
    InvalidPin { pin: u8, reason: &'static str },

    /// Data pin count does not match the bus width
    #[error("{expected}-bit bus needs {expected} data pins, got {found}")]
    DataLines { expected: u8, found: usize },
}

/// Source framebuffer failures (all fatal at startup)
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("framebuffer query on {path} failed: {source}")]
    Query {
        path: String,
        #[source]
        source: nix::Error,
    },

    #[error("unsupported framebuffer depth: {0} bpp (need 16 or 32)")]
    UnsupportedDepth(u32),

    #[error("cannot map framebuffer: {0}")]
    Map(#[source] io::Error),

    #[error("unusable framebuffer geometry: {0:?}")]
    Geometry(FrameError),
}

impl From<FrameError> for SourceError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::UnsupportedDepth(bpp) => SourceError::UnsupportedDepth(bpp),
            other => SourceError::Geometry(other),
        }
    }
}

/// Virtual input device failures
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("uinput setup failed: {0}")]
    Setup(#[source] nix::Error),

    #[error("uinput device creation failed: {0}")]
    Create(#[source] nix::Error),

    #[error("uinput write failed: {0}")]
    Write(#[source] io::Error),
}

/// Touch SPI failures (degrade the touch thread only)
#[derive(Debug, Error)]
pub enum SpiError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: SPIError,
    },

    #[error("cannot configure {path}: {source}")]
    Configure {
        path: String,
        #[source]
        source: io::Error,
    },
}
