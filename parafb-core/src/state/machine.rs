//! Panel state definition
//!
//! Transitions are strictly sequential. Power-off is terminal: the panel is
//! only brought back by a fresh daemon run.

use super::events::PanelEvent;

/// Panel controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    /// Nothing sent since the bus was opened
    #[default]
    Uninitialized,
    /// Hardware reset in progress
    Resetting,
    /// Init table being written
    Initializing,
    /// Accepting frames
    Ready,
    /// Display off and asleep
    PoweredOff,
}

impl PanelState {
    /// Check if frame writes are allowed
    pub fn accepts_frames(&self) -> bool {
        matches!(self, PanelState::Ready)
    }

    /// Check if power-off has anything to do
    pub fn can_power_off(&self) -> bool {
        matches!(
            self,
            PanelState::Resetting | PanelState::Initializing | PanelState::Ready
        )
    }

    /// Process an event and return the next state
    ///
    /// Events that do not apply to the current state leave it unchanged.
    pub fn transition(self, event: PanelEvent) -> Self {
        use PanelEvent::*;
        use PanelState::*;

        match (self, event) {
            (Uninitialized, ResetStarted) => Resetting,
            // Re-initializing a running panel starts over from reset
            (Ready, ResetStarted) => Resetting,

            (Resetting, ResetComplete) => Initializing,
            (Initializing, InitComplete) => Ready,

            (Resetting | Initializing | Ready, PowerOff) => PoweredOff,

            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let state = PanelState::default();
        assert_eq!(state, PanelState::Uninitialized);

        let state = state.transition(PanelEvent::ResetStarted);
        assert_eq!(state, PanelState::Resetting);

        let state = state.transition(PanelEvent::ResetComplete);
        assert_eq!(state, PanelState::Initializing);

        let state = state.transition(PanelEvent::InitComplete);
        assert_eq!(state, PanelState::Ready);
        assert!(state.accepts_frames());

        let state = state.transition(PanelEvent::PowerOff);
        assert_eq!(state, PanelState::PoweredOff);
        assert!(!state.accepts_frames());
    }

    #[test]
    fn test_no_skipping() {
        let state = PanelState::Uninitialized;
        assert_eq!(state.transition(PanelEvent::InitComplete), state);
        assert_eq!(state.transition(PanelEvent::PowerOff), state);

        let state = PanelState::Resetting;
        assert_eq!(state.transition(PanelEvent::InitComplete), state);
    }

    #[test]
    fn test_power_off_is_terminal() {
        let state = PanelState::PoweredOff;
        assert!(!state.can_power_off());
        assert_eq!(state.transition(PanelEvent::ResetStarted), state);
        assert_eq!(state.transition(PanelEvent::InitComplete), state);
    }
}
