//! Pointer event sink trait

/// One absolute-pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// Absolute X in panel pixels
    X(i32),
    /// Absolute Y in panel pixels
    Y(i32),
    /// Contact pressure (0 = none)
    Pressure(i32),
    /// Contact made or released
    Contact(bool),
    /// End of one atomic update
    Sync,
}

/// Destination for pointer events (a virtual input device)
pub trait EventSink {
    /// Write error
    type Error;

    /// Deliver a batch of events in order
    fn emit(&mut self, events: &[PointerEvent]) -> Result<(), Self::Error>;
}
