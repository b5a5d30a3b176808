//! Time source for the flush loop
//!
//! Deadlines are nanoseconds since the clock was created. The real clock
//! sleeps with `TIMER_ABSTIME` so a late wakeup never shifts later frames.

use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::time::TimeSpec;
use nix::time::{clock_gettime, clock_nanosleep, ClockId, ClockNanosleepFlags};
use tracing::warn;

/// Monotonic time with absolute-deadline sleeps
pub trait Clock {
    /// Nanoseconds since the clock's origin
    fn now_ns(&self) -> u64;

    /// Block until `deadline_ns`; returns at once if it has passed
    fn sleep_until(&mut self, deadline_ns: u64);
}

/// `CLOCK_MONOTONIC`
pub struct MonotonicClock {
    origin: Instant,
    origin_ns: u64,
}

fn timespec_ns(ts: TimeSpec) -> u64 {
    ts.tv_sec() as u64 * 1_000_000_000 + ts.tv_nsec() as u64
}

impl MonotonicClock {
    pub fn new() -> Result<Self, nix::Error> {
        // Instant first: absolute targets then land at or after the
        // matching elapsed() reading
        let origin = Instant::now();
        let origin_ns = timespec_ns(clock_gettime(ClockId::CLOCK_MONOTONIC)?);
        Ok(Self { origin, origin_ns })
    }
}

impl Clock for MonotonicClock {
    fn now_ns(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn sleep_until(&mut self, deadline_ns: u64) {
        let target = TimeSpec::from(Duration::from_nanos(self.origin_ns + deadline_ns));
        loop {
            match clock_nanosleep(
                ClockId::CLOCK_MONOTONIC,
                ClockNanosleepFlags::TIMER_ABSTIME,
                &target,
            ) {
                Ok(_) => return,
                Err(Errno::EINTR) => continue,
                Err(e) => {
                    warn!("clock_nanosleep failed ({}), using a relative sleep", e);
                    let now = self.now_ns();
                    if deadline_ns > now {
                        std::thread::sleep(Duration::from_nanos(deadline_ns - now));
                    }
                    return;
                }
            }
        }
    }
}

/// Manually driven clock for host tests
///
/// Sleeping jumps straight to the deadline, so frames cost no time.
#[derive(Debug, Default, Clone)]
pub struct FakeClock {
    now_ns: u64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&mut self, ns: u64) {
        self.now_ns += ns;
    }
}

impl Clock for FakeClock {
    fn now_ns(&self) -> u64 {
        self.now_ns
    }

    fn sleep_until(&mut self, deadline_ns: u64) {
        self.now_ns = self.now_ns.max(deadline_ns);
    }
}
