//! Cross-thread stop token
//!
//! One flag shared by the flush loop, the touch thread and the signal
//! handlers. Handlers only ever set it.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stop has been requested
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Request a stop
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Set this token on SIGTERM and SIGINT
    pub fn register_signals(&self) -> io::Result<()> {
        for signal in [SIGTERM, SIGINT] {
            signal_hook::flag::register(signal, Arc::clone(&self.0))?;
        }
        debug!("Stop token registered for SIGTERM/SIGINT");
        Ok(())
    }
}
