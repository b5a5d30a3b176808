//! Bring-up modes
//!
//! Both run on an initialized panel instead of the mirror loop and leave
//! the last image on screen.

use parafb_core::pacing::{Throughput, NANOS_PER_SEC};
use parafb_drivers::panel::{Ili9481, PanelError};
use parafb_hal::ParallelBus;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::stop::StopToken;

/// Frames flushed by the benchmark
pub const BENCHMARK_FRAMES: u32 = 100;

/// Solid fills shown by the test pattern, in order
pub const TEST_PATTERN: [(&str, u16); 5] = [
    ("RED", 0xF800),
    ("GREEN", 0x07E0),
    ("BLUE", 0x001F),
    ("WHITE", 0xFFFF),
    ("BLACK", 0x0000),
];

/// How long each fill stays up
pub const TEST_PATTERN_HOLD_NS: u64 = 3 * NANOS_PER_SEC;

/// Stop-token check interval while holding a fill
const STOP_POLL_NS: u64 = 100_000_000;

/// Flush [`BENCHMARK_FRAMES`] full frames back to back and measure the rate
pub fn run_benchmark<B: ParallelBus, C: Clock>(
    panel: &mut Ili9481<B>,
    clock: &C,
    stop: &StopToken,
) -> Result<Throughput, PanelError> {
    let (width, height) = panel.dimensions();
    let pixels: Vec<u16> = (0..width as usize * height as usize)
        .map(|i| (i & 0xFFFF) as u16)
        .collect();

    info!("Benchmark: flushing {}x{} frames...", width, height);
    let start = clock.now_ns();
    let mut frames = 0;
    for _ in 0..BENCHMARK_FRAMES {
        if stop.is_stopped() {
            warn!("Benchmark interrupted");
            break;
        }
        panel.flush_frame(width, height, &pixels)?;
        frames += 1;
    }

    let result = Throughput {
        frames,
        elapsed_ns: clock.now_ns().saturating_sub(start),
    };
    info!(
        "Benchmark result: {} frames in {:.2} s = {:.1} FPS",
        result.frames,
        result.elapsed_ns as f64 / 1e9,
        result.fps()
    );
    Ok(result)
}

/// Show each [`TEST_PATTERN`] fill for [`TEST_PATTERN_HOLD_NS`]
///
/// Returns how many fills were shown before finishing or being stopped.
pub fn run_test_pattern<B: ParallelBus, C: Clock>(
    panel: &mut Ili9481<B>,
    clock: &mut C,
    stop: &StopToken,
) -> Result<usize, PanelError> {
    let (width, height) = panel.dimensions();
    let mut pixels = vec![0u16; width as usize * height as usize];

    info!("Test pattern: solid fills, {} s each", TEST_PATTERN_HOLD_NS / NANOS_PER_SEC);
    let mut shown = 0;
    for (name, colour) in TEST_PATTERN {
        if stop.is_stopped() {
            break;
        }
        pixels.fill(colour);
        panel.flush_frame(width, height, &pixels)?;
        info!("  {} ({:#06x})", name, colour);
        shown += 1;

        let until = clock.now_ns() + TEST_PATTERN_HOLD_NS;
        while !stop.is_stopped() && clock.now_ns() < until {
            let next = (clock.now_ns() + STOP_POLL_NS).min(until);
            clock.sleep_until(next);
        }
    }

    info!("Test pattern complete");
    Ok(shown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use parafb_core::config::Rotation;
    use parafb_hal::mock::MockBus;
    use parafb_hal::ResetTiming;

    struct NoDelay;

    impl embedded_hal::delay::DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn panel(rotation: Rotation) -> Ili9481<MockBus> {
        let mut panel = Ili9481::new(MockBus::new(), ResetTiming::immediate());
        panel.initialize(rotation, &mut NoDelay);
        panel
    }

    #[test]
    fn test_benchmark_flushes_100_frames() {
        let mut panel = panel(Rotation::Deg270);
        let stats = run_benchmark(&mut panel, &FakeClock::new(), &StopToken::new()).unwrap();

        assert_eq!(stats.frames, BENCHMARK_FRAMES);
        let writes = panel.bus().pixel_writes();
        assert_eq!(writes.len(), 100);
        assert_eq!(writes[0].len(), 480 * 320);
        assert_eq!(writes[0][1234], 1234);
        assert_eq!(writes[0][70_000], (70_000 & 0xFFFF) as u16);
    }

    #[test]
    fn test_benchmark_honours_stop() {
        let mut panel = panel(Rotation::Deg0);
        let stop = StopToken::new();
        stop.stop();
        let stats = run_benchmark(&mut panel, &FakeClock::new(), &stop).unwrap();
        assert_eq!(stats.frames, 0);
        assert!(panel.bus().pixel_writes().is_empty());
    }

    #[test]
    fn test_pattern_order_and_hold() {
        let mut panel = panel(Rotation::Deg0);
        let mut clock = FakeClock::new();
        let shown = run_test_pattern(&mut panel, &mut clock, &StopToken::new()).unwrap();

        assert_eq!(shown, 5);
        let firsts: Vec<u16> = panel.bus().pixel_writes().iter().map(|w| w[0]).collect();
        assert_eq!(firsts, [0xF800, 0x07E0, 0x001F, 0xFFFF, 0x0000]);
        assert!(panel.bus().pixel_writes().iter().all(|w| w.iter().all(|&px| px == w[0])));
        assert_eq!(clock.now_ns(), 5 * TEST_PATTERN_HOLD_NS);
    }

    #[test]
    fn test_pattern_before_init_fails() {
        let mut panel = Ili9481::new(MockBus::new(), ResetTiming::immediate());
        let result = run_test_pattern(&mut panel, &mut FakeClock::new(), &StopToken::new());
        assert_eq!(result, Err(PanelError::NotReady));
    }
}
