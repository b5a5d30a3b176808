//! Absolute pointer emitter
//!
//! Turns per-cycle touch reports into pointer events. Coordinates are sent
//! on every down report so drags track; the contact press and release are
//! sent only on transitions. Every batch ends with a sync marker.

use heapless::Vec;
use parafb_core::touch::TouchReport;
use parafb_core::traits::{EventSink, PointerEvent};

/// Pressure value reported while in contact
pub const PRESSURE_DOWN: i32 = 200;

/// Tracks contact state and feeds an [`EventSink`]
pub struct PointerEmitter<S> {
    sink: S,
    down: bool,
}

impl<S: EventSink> PointerEmitter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, down: false }
    }

    /// Whether a contact is currently reported
    pub fn is_down(&self) -> bool {
        self.down
    }

    /// Report one poll cycle
    ///
    /// Repeated up reports emit nothing.
    pub fn report(&mut self, down: bool, x: u16, y: u16) -> Result<(), S::Error> {
        let mut events: Vec<PointerEvent, 5> = Vec::new();

        if down {
            let _ = events.push(PointerEvent::X(x as i32));
            let _ = events.push(PointerEvent::Y(y as i32));
            let _ = events.push(PointerEvent::Pressure(PRESSURE_DOWN));
            if !self.down {
                let _ = events.push(PointerEvent::Contact(true));
            }
        } else if self.down {
            let _ = events.push(PointerEvent::Pressure(0));
            let _ = events.push(PointerEvent::Contact(false));
        } else {
            return Ok(());
        }
        let _ = events.push(PointerEvent::Sync);

        self.sink.emit(&events)?;
        self.down = down;
        Ok(())
    }

    /// Report a filter result
    pub fn report_touch(&mut self, report: TouchReport) -> Result<(), S::Error> {
        match report {
            TouchReport::Down { x, y } => self.report(true, x, y),
            TouchReport::Up => self.report(false, 0, 0),
        }
    }

    /// Release any held contact
    pub fn release(&mut self) -> Result<(), S::Error> {
        self.report(false, 0, 0)
    }

    /// Borrow the sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Take the sink back
    pub fn into_inner(self) -> S {
        self.sink
    }
}
