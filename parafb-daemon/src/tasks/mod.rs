//! Long-running loops
//!
//! The flush loop runs on the main thread; the touch loop gets its own.
//! Both poll the same [`crate::stop::StopToken`] once per cycle.

pub mod flush;
pub mod touch;

pub use flush::run_flush_loop;
pub use touch::{run_touch_loop, TouchWorker};
