//! Panel lifecycle events

/// Events that drive [`super::PanelState`]
///
/// Only the orchestrating thread raises these; the panel is never touched
/// from two threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    /// Reset line asserted
    ResetStarted,
    /// Reset released and settle time elapsed
    ResetComplete,
    /// Init table and addressing mode written
    InitComplete,
    /// Display-off and sleep-in sent
    PowerOff,
}
