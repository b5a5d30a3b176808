//! parafb - framebuffer mirror daemon
//!
//! Copies a Linux framebuffer onto an ILI9481 panel wired to the GPIO
//! header, and optionally turns its XPT2046 touch layer into a virtual
//! absolute pointer.
//!
//! Threads:
//!
//! - main: flush loop ([`tasks::run_flush_loop`]) paced by absolute
//!   deadlines
//! - touch: poll, filter and report ([`tasks::TouchWorker`]), only when
//!   touch is enabled
//!
//! Both watch one [`stop::StopToken`] that SIGTERM/SIGINT set.
//! [`mirror::run`] owns startup and the ordered shutdown.

pub mod cli;
pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod mirror;
pub mod pipeline;
pub mod stop;
pub mod tasks;

pub use error::DaemonError;
