//! Panel lifecycle state machine

pub mod events;
pub mod machine;

pub use events::PanelEvent;
pub use machine::PanelState;
