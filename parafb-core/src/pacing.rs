//! Frame pacing
//!
//! Deadlines are absolute and advance by exactly one interval per frame, so
//! a slow frame shortens the next sleep instead of pushing every later frame
//! back. The configured rate is a ceiling: when a frame takes longer than
//! the interval the following deadlines are already due and frames run
//! back to back.

/// Nanoseconds per second
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// How often throughput is reported
pub const THROUGHPUT_PERIOD_NS: u64 = 10 * NANOS_PER_SEC;

/// Absolute-deadline frame scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePacer {
    interval_ns: u64,
    next_deadline_ns: u64,
}

impl FramePacer {
    /// Start pacing at `fps`, first frame due at `start_ns`
    pub fn new(fps: u8, start_ns: u64) -> Self {
        Self {
            interval_ns: NANOS_PER_SEC / fps.max(1) as u64,
            next_deadline_ns: start_ns,
        }
    }

    /// Time between frames
    pub fn interval_ns(&self) -> u64 {
        self.interval_ns
    }

    /// When the next frame should start
    pub fn deadline_ns(&self) -> u64 {
        self.next_deadline_ns
    }

    /// Move the deadline forward by one interval
    pub fn advance(&mut self) {
        self.next_deadline_ns = self.next_deadline_ns.saturating_add(self.interval_ns);
    }
}

/// Achieved frame rate over one reporting window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    /// Frames flushed in the window
    pub frames: u32,
    /// Window length
    pub elapsed_ns: u64,
}

impl Throughput {
    /// Frames per second
    pub fn fps(&self) -> f32 {
        if self.elapsed_ns == 0 {
            return 0.0;
        }
        self.frames as f32 * NANOS_PER_SEC as f32 / self.elapsed_ns as f32
    }
}

/// Counts frames and yields a [`Throughput`] once per period
#[derive(Debug, Clone, Copy)]
pub struct ThroughputMeter {
    period_ns: u64,
    window_start_ns: u64,
    frames: u32,
}

impl ThroughputMeter {
    /// Start a meter with the default 10 s window
    pub fn new(now_ns: u64) -> Self {
        Self::with_period(now_ns, THROUGHPUT_PERIOD_NS)
    }

    /// Start a meter with a custom window
    pub fn with_period(now_ns: u64, period_ns: u64) -> Self {
        Self {
            period_ns,
            window_start_ns: now_ns,
            frames: 0,
        }
    }

    /// Count one frame; returns a report when the window has elapsed
    pub fn record_frame(&mut self, now_ns: u64) -> Option<Throughput> {
        self.frames += 1;
        let elapsed_ns = now_ns.saturating_sub(self.window_start_ns);
        if elapsed_ns < self.period_ns {
            return None;
        }

        let report = Throughput {
            frames: self.frames,
            elapsed_ns,
        };
        self.window_start_ns = now_ns;
        self.frames = 0;
        Some(report)
    }
}
