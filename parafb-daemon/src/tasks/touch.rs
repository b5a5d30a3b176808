//! Touch thread
//!
//! Polls the XPT2046 through the touch filter and forwards reports to the
//! virtual pointer. Any failure here only ends this thread; the mirror
//! keeps running display-only.

use std::fmt::{Debug, Display};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parafb_core::config::{CalibrationMatrix, TouchConfig};
use parafb_core::touch::{FilterConfig, TouchFilter};
use parafb_core::traits::{EventSink, TouchAdc};
use parafb_drivers::input::PointerEmitter;
use parafb_drivers::touch::Xpt2046;
use parafb_hal::SerialConfig;
use parafb_hal_linux::spi::open_touch_spi;
use tracing::{debug, error, info, warn};

use crate::error::DaemonError;
use crate::stop::StopToken;

/// Handle to a running touch thread
pub struct TouchWorker {
    handle: JoinHandle<()>,
}

impl TouchWorker {
    /// Start the touch thread, reporting into `sink`
    pub fn spawn<S>(
        config: TouchConfig,
        width: u16,
        height: u16,
        sink: S,
        stop: StopToken,
    ) -> Result<Self, DaemonError>
    where
        S: EventSink + Send + 'static,
        S::Error: Display,
    {
        let handle = thread::Builder::new()
            .name("touch".into())
            .spawn(move || touch_thread(config, width, height, sink, stop))
            .map_err(DaemonError::Spawn)?;
        Ok(Self { handle })
    }

    /// Wait for the thread to exit
    pub fn join(self) {
        if self.handle.join().is_err() {
            error!("Touch thread panicked");
        }
    }
}

fn touch_thread<S>(config: TouchConfig, width: u16, height: u16, sink: S, stop: StopToken)
where
    S: EventSink,
    S::Error: Display,
{
    let serial = SerialConfig::new(config.spi_speed_hz);
    let spi = match open_touch_spi(&config.spi_device, &serial) {
        Ok(spi) => spi,
        Err(e) => {
            error!("Touch disabled: {}", e);
            return;
        }
    };
    let mut adc = Xpt2046::new(spi);

    let calibration = CalibrationMatrix::from_axes(
        width,
        height,
        config.raw_min,
        config.raw_max,
        config.swap_xy,
        config.invert_x,
        config.invert_y,
    );
    debug!("Touch calibration: {:?}", calibration);

    let mut filter = match TouchFilter::new(FilterConfig::default(), calibration, width, height) {
        Ok(filter) => filter,
        Err(e) => {
            error!("Touch disabled: bad filter settings {:?}", e);
            return;
        }
    };
    let mut emitter = PointerEmitter::new(sink);
    let interval = Duration::from_millis(config.poll_interval_ms as u64);

    run_touch_loop(&mut adc, &mut filter, &mut emitter, interval, &stop);
}

/// Poll until `stop` is set or the ADC fails, then release any contact
///
/// Returns the number of poll cycles completed.
pub fn run_touch_loop<A, S>(
    adc: &mut A,
    filter: &mut TouchFilter,
    emitter: &mut PointerEmitter<S>,
    interval: Duration,
    stop: &StopToken,
) -> u64
where
    A: TouchAdc,
    A::Error: Debug,
    S: EventSink,
    S::Error: Display,
{
    info!("Touch thread started (polling every {} ms)", interval.as_millis());
    let mut polls = 0u64;

    while !stop.is_stopped() {
        match filter.poll(adc) {
            Ok(report) => {
                if let Err(e) = emitter.report_touch(report) {
                    warn!("Pointer event write failed: {}", e);
                }
            }
            Err(e) => {
                error!("Touch ADC read failed: {:?}, touch disabled", e);
                break;
            }
        }
        polls += 1;
        thread::sleep(interval);
    }

    if let Err(e) = emitter.release() {
        warn!("Final pen-up failed: {}", e);
    }
    info!("Touch thread stopped");
    polls
}

#[cfg(test)]
mod tests {
    use super::*;
    use parafb_core::traits::{AdcChannel, PointerEvent};
    use std::convert::Infallible;

    /// Pressed at a fixed spot; fails after `fail_after` reads if set
    struct PressedAdc {
        reads: u32,
        fail_after: Option<u32>,
    }

    impl TouchAdc for PressedAdc {
        type Error = &'static str;

        fn read(&mut self, channel: AdcChannel) -> Result<u16, &'static str> {
            self.reads += 1;
            if self.fail_after.is_some_and(|n| self.reads > n) {
                return Err("spi gone");
            }
            Ok(match channel {
                AdcChannel::X => 2000,
                AdcChannel::Y => 2000,
                AdcChannel::Z1 => 1000,
                AdcChannel::Z2 => 3000,
            })
        }
    }

    /// Records events; stops the token once a press has been seen
    struct StoppingSink {
        events: Vec<PointerEvent>,
        stop: Option<StopToken>,
    }

    impl EventSink for StoppingSink {
        type Error = Infallible;

        fn emit(&mut self, events: &[PointerEvent]) -> Result<(), Infallible> {
            self.events.extend_from_slice(events);
            if events.contains(&PointerEvent::Contact(true)) {
                if let Some(stop) = &self.stop {
                    stop.stop();
                }
            }
            Ok(())
        }
    }

    fn filter() -> TouchFilter {
        TouchFilter::new(
            FilterConfig::default(),
            CalibrationMatrix::default_for(480, 320),
            480,
            320,
        )
        .unwrap()
    }

    #[test]
    fn test_stop_releases_held_contact() {
        let stop = StopToken::new();
        let mut adc = PressedAdc {
            reads: 0,
            fail_after: None,
        };
        let mut emitter = PointerEmitter::new(StoppingSink {
            events: Vec::new(),
            stop: Some(stop.clone()),
        });

        run_touch_loop(&mut adc, &mut filter(), &mut emitter, Duration::ZERO, &stop);

        let events = &emitter.sink().events;
        let presses = events.iter().filter(|e| **e == PointerEvent::Contact(true)).count();
        assert_eq!(presses, 1);
        assert_eq!(
            events[events.len() - 3..],
            [PointerEvent::Pressure(0), PointerEvent::Contact(false), PointerEvent::Sync]
        );
        assert!(!emitter.is_down());
    }

    #[test]
    fn test_adc_failure_ends_loop_without_stop() {
        let stop = StopToken::new();
        let mut adc = PressedAdc {
            reads: 0,
            fail_after: Some(5),
        };
        let mut emitter = PointerEmitter::new(StoppingSink {
            events: Vec::new(),
            stop: None,
        });

        let polls = run_touch_loop(&mut adc, &mut filter(), &mut emitter, Duration::ZERO, &stop);

        assert!(!stop.is_stopped());
        assert!(polls < 5);
        assert!(emitter.sink().events.is_empty());
    }
}
