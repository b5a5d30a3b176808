//! Daemon lifecycle
//!
//! Startup opens everything that can fail before the panel is touched:
//! GPIO bus, source framebuffer, virtual pointer. Shutdown runs in a fixed
//! order: flush loop exits, touch thread is joined, panel is powered off,
//! then the source, bus and pointer are released.

use std::process::ExitCode;

use embedded_hal::delay::DelayNs;
use parafb_core::config::{MirrorConfig, Rotation, RunMode};
use parafb_core::traits::FrameSource;
use parafb_drivers::panel::ili9481::madctl;
use parafb_drivers::panel::Ili9481;
use parafb_hal::ParallelBus;
use parafb_hal_linux::{Delay, MmioBus, PinMap, UinputDevice};
use tracing::{debug, error, info};

use crate::clock::{Clock, MonotonicClock};
use crate::diagnostics;
use crate::error::DaemonError;
use crate::pipeline::{open_source, FramePipeline};
use crate::stop::StopToken;
use crate::tasks::{run_flush_loop, TouchWorker};

/// Run the daemon to completion
pub fn run(config: MirrorConfig) -> ExitCode {
    match start(&config) {
        Ok(()) => {
            info!("parafb exited");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn start(config: &MirrorConfig) -> Result<(), DaemonError> {
    let (width, height) = config.panel_dimensions();
    let stop = StopToken::new();
    stop.register_signals().map_err(DaemonError::Signal)?;
    let mut clock = MonotonicClock::new().map_err(DaemonError::Clock)?;
    let mut delay = Delay;

    let pins = PinMap::try_from(&config.bus)?;
    let bus = MmioBus::open(pins, config.timing)?;
    let mut panel = Ili9481::new(bus, config.timing);

    match config.mode {
        RunMode::Benchmark => {
            bring_up(&mut panel, config.rotation, &mut delay);
            diagnostics::run_benchmark(&mut panel, &clock, &stop)?;
        }
        RunMode::TestPattern => {
            bring_up(&mut panel, config.rotation, &mut delay);
            diagnostics::run_test_pattern(&mut panel, &mut clock, &stop)?;
        }
        RunMode::Mirror => {
            let mut pipeline = open_source(&config.fb_device, width, height)?;
            let pointer = if config.touch.enabled {
                Some(UinputDevice::create(width, height)?)
            } else {
                None
            };

            bring_up(&mut panel, config.rotation, &mut delay);

            let touch = pointer.and_then(|sink| {
                TouchWorker::spawn(config.touch.clone(), width, height, sink, stop.clone())
                    .map_err(|e| error!("{}, continuing without touch", e))
                    .ok()
            });

            info!("parafb running (PID {})", std::process::id());
            mirror_session(
                &mut panel,
                &mut pipeline,
                config.fps,
                &mut clock,
                &stop,
                touch,
                &mut delay,
            )?;
        }
    }

    panel.release().close();
    Ok(())
}

/// Reset and initialize the panel for `rotation`
pub fn bring_up<B: ParallelBus, D: DelayNs>(
    panel: &mut Ili9481<B>,
    rotation: Rotation,
    delay: &mut D,
) {
    panel.initialize(rotation, delay);
    info!(
        "ILI9481 initialised (rotate={}, MADCTL={:#04x})",
        rotation.degrees(),
        madctl(rotation)
    );
}

/// Mirror until stopped, then shut down in order
///
/// The stop token is set on the way out so the touch thread also ends when
/// the flush loop fails. The panel is powered off even after a failure.
pub fn mirror_session<B, S, C, D>(
    panel: &mut Ili9481<B>,
    pipeline: &mut FramePipeline<S>,
    fps: u8,
    clock: &mut C,
    stop: &StopToken,
    touch: Option<TouchWorker>,
    delay: &mut D,
) -> Result<u64, DaemonError>
where
    B: ParallelBus,
    S: FrameSource,
    C: Clock,
    D: DelayNs,
{
    let result = run_flush_loop(panel, pipeline, fps, clock, stop);
    stop.stop();

    if let Some(worker) = touch {
        debug!("Joining touch thread");
        worker.join();
    }

    info!("Shutting down...");
    panel.power_off(delay);
    result
}
