//! Frame flush loop
//!
//! Sleep to the next absolute deadline, render, flush, advance by one
//! interval. Frame N is fully written before frame N+1 is rendered.

use parafb_core::pacing::{FramePacer, ThroughputMeter};
use parafb_core::traits::FrameSource;
use parafb_drivers::panel::Ili9481;
use parafb_hal::ParallelBus;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::DaemonError;
use crate::pipeline::FramePipeline;
use crate::stop::StopToken;

/// Mirror frames until `stop` is set; returns the number of frames flushed
///
/// A stop seen after a sleep ends the loop without drawing. A stop raised
/// while a frame is being rendered or written takes effect once that frame
/// is on the panel.
pub fn run_flush_loop<B, S, C>(
    panel: &mut Ili9481<B>,
    pipeline: &mut FramePipeline<S>,
    fps: u8,
    clock: &mut C,
    stop: &StopToken,
) -> Result<u64, DaemonError>
where
    B: ParallelBus,
    S: FrameSource,
    C: Clock,
{
    let (width, height) = pipeline.dimensions();
    let mut pacer = FramePacer::new(fps, clock.now_ns());
    let mut meter = ThroughputMeter::new(clock.now_ns());
    let mut frames = 0u64;

    info!(
        "Flush loop started: {}x{} at {} fps ({} us/frame)",
        width,
        height,
        fps,
        pacer.interval_ns() / 1_000
    );

    while !stop.is_stopped() {
        clock.sleep_until(pacer.deadline_ns());
        if stop.is_stopped() {
            break;
        }

        let pixels = pipeline.render()?;
        panel.flush_frame(width, height, pixels)?;
        frames += 1;
        pacer.advance();

        if let Some(report) = meter.record_frame(clock.now_ns()) {
            info!(
                "{} frames in {:.1} s ({:.1} fps)",
                report.frames,
                report.elapsed_ns as f64 / 1e9,
                report.fps()
            );
        }
    }

    debug!("Flush loop saw stop request");
    info!("Flush loop stopped after {} frames", frames);
    Ok(frames)
}
