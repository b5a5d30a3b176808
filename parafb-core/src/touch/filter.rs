//! Touch filter state machine
//!
//! Each call to [`TouchFilter::poll`] runs one cycle:
//!
//! ```text
//! Idle ──pressure──▶ Debouncing ──N polls──▶ Settling ──▶ Sampling ──▶ Reporting
//!   ▲                    │                                    │            │
//!   └────── lift ────────┴──────────── lift ──────────────────┴── lift ────┘
//! ```
//!
//! While the pen stays down the next cycle goes straight from Reporting to
//! Sampling. Any poll that finds pressure under the threshold resets all
//! filter state.

use heapless::Vec;

use super::median::median;
use crate::config::CalibrationMatrix;
use crate::traits::{AdcChannel, TouchAdc, ADC_MAX};

/// Most samples one cycle can take
pub const MAX_SAMPLES: usize = 15;

/// Filter tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    /// Pressure proxy at or above this counts as contact
    pub pressure_threshold: u16,
    /// Consecutive contact polls before the first sample
    pub debounce_polls: u8,
    /// Reads thrown away after the contact transition
    pub settle_reads: u8,
    /// Position reads per cycle (odd, at most [`MAX_SAMPLES`])
    pub samples: u8,
    /// Raw-unit distance treated as a new contact point
    pub jump_threshold: u16,
    /// EWMA weight on the newest sample right after lock-on
    pub fast_alpha: f32,
    /// Steady-state EWMA weight on the newest sample
    pub slow_alpha: f32,
    /// Samples smoothed with `fast_alpha` before switching to `slow_alpha`
    pub fast_samples: u8,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            pressure_threshold: 50,
            debounce_polls: 3,
            settle_reads: 2,
            samples: 7,
            jump_threshold: 400,
            fast_alpha: 0.6,
            slow_alpha: 0.3,
            fast_samples: 3,
        }
    }
}

/// Filter configuration problems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterConfigError {
    /// Sample count must be odd
    EvenSampleCount,
    /// Sample count exceeds [`MAX_SAMPLES`]
    TooManySamples,
    /// Debounce needs at least one poll
    ZeroDebounce,
    /// Smoothing weights must lie in (0, 1]
    AlphaOutOfRange,
}

impl FilterConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), FilterConfigError> {
        if self.samples % 2 == 0 {
            return Err(FilterConfigError::EvenSampleCount);
        }
        if self.samples as usize > MAX_SAMPLES {
            return Err(FilterConfigError::TooManySamples);
        }
        if self.debounce_polls == 0 {
            return Err(FilterConfigError::ZeroDebounce);
        }
        let in_range = |a: f32| a > 0.0 && a <= 1.0;
        if !in_range(self.fast_alpha) || !in_range(self.slow_alpha) {
            return Err(FilterConfigError::AlphaOutOfRange);
        }
        Ok(())
    }
}

/// Where the filter is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    /// No contact
    Idle,
    /// Contact seen on this many consecutive polls
    Debouncing(u8),
    /// Discarding reads after the contact transition
    Settling,
    /// Taking position reads
    Sampling,
    /// Locked on; positions are being reported
    Reporting,
}

/// Result of one poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchReport {
    /// No contact (or contact not yet debounced)
    Up,
    /// Contact at a panel pixel
    Down { x: u16, y: u16 },
}

impl TouchReport {
    pub fn is_down(&self) -> bool {
        matches!(self, TouchReport::Down { .. })
    }
}

/// Debounce + median + jump reset + two-regime EWMA + calibration
#[derive(Debug, Clone)]
pub struct TouchFilter {
    config: FilterConfig,
    calibration: CalibrationMatrix,
    width: u16,
    height: u16,
    phase: TouchPhase,
    last_raw: Option<(u16, u16)>,
    smoothed: (f32, f32),
    smoothed_count: u8,
    last_report: Option<(u16, u16)>,
}

impl TouchFilter {
    /// Create a filter reporting into a `width` x `height` panel
    pub fn new(
        config: FilterConfig,
        calibration: CalibrationMatrix,
        width: u16,
        height: u16,
    ) -> Result<Self, FilterConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            calibration,
            width,
            height,
            phase: TouchPhase::Idle,
            last_raw: None,
            smoothed: (0.0, 0.0),
            smoothed_count: 0,
            last_report: None,
        })
    }

    /// Current phase
    pub fn phase(&self) -> TouchPhase {
        self.phase
    }

    /// Forget the current contact
    pub fn reset(&mut self) {
        self.phase = TouchPhase::Idle;
        self.last_raw = None;
        self.smoothed = (0.0, 0.0);
        self.smoothed_count = 0;
        self.last_report = None;
    }

    /// Run one poll cycle against the ADC
    ///
    /// An ADC error abandons the cycle and is returned as-is. The caller may
    /// poll again; an interrupted contact starts over from debounce.
    pub fn poll<A: TouchAdc>(&mut self, adc: &mut A) -> Result<TouchReport, A::Error> {
        let threshold = self.config.pressure_threshold;

        if adc.pressure()? < threshold {
            self.reset();
            return Ok(TouchReport::Up);
        }

        let fresh_contact = self.phase != TouchPhase::Reporting;
        if fresh_contact {
            let polls = match self.phase {
                TouchPhase::Debouncing(n) => n.saturating_add(1),
                _ => 1,
            };
            if polls < self.config.debounce_polls {
                self.phase = TouchPhase::Debouncing(polls);
                return Ok(TouchReport::Up);
            }

            self.phase = TouchPhase::Settling;
            for _ in 0..self.config.settle_reads {
                adc.read(AdcChannel::X)?;
                adc.read(AdcChannel::Y)?;
            }
        }

        self.phase = TouchPhase::Sampling;
        let burst = self.sample(adc)?;

        // Never report a position, fresh or held, once the pen has lifted
        if adc.pressure()? < threshold {
            self.reset();
            return Ok(TouchReport::Up);
        }

        let Some((raw_x, raw_y)) = burst else {
            return Ok(self.hold());
        };

        let (fx, fy) = self.smooth(raw_x, raw_y);
        let (x, y) = self.calibration.to_pixel(fx, fy, self.width, self.height);

        self.phase = TouchPhase::Reporting;
        self.last_report = Some((x, y));
        Ok(TouchReport::Down { x, y })
    }

    /// Median raw position of one burst, ignoring rail readings
    fn sample<A: TouchAdc>(&mut self, adc: &mut A) -> Result<Option<(u16, u16)>, A::Error> {
        let mut xs: Vec<u16, MAX_SAMPLES> = Vec::new();
        let mut ys: Vec<u16, MAX_SAMPLES> = Vec::new();

        for _ in 0..self.config.samples {
            let x = adc.read(AdcChannel::X)?;
            let y = adc.read(AdcChannel::Y)?;
            if is_rail(x) || is_rail(y) {
                continue;
            }
            // Capacity equals MAX_SAMPLES, which validate() enforces
            let _ = xs.push(x);
            let _ = ys.push(y);
        }

        let quorum = self.config.samples as usize / 2 + 1;
        if xs.len() < quorum {
            return Ok(None);
        }

        Ok(median(&xs).zip(median(&ys)))
    }

    /// Outcome when a burst had too few usable reads
    fn hold(&mut self) -> TouchReport {
        match self.last_report {
            Some((x, y)) => {
                self.phase = TouchPhase::Reporting;
                TouchReport::Down { x, y }
            }
            None => {
                // Retry from settling on the next contact poll
                self.phase = TouchPhase::Debouncing(self.config.debounce_polls.saturating_sub(1));
                TouchReport::Up
            }
        }
    }

    fn smooth(&mut self, raw_x: u16, raw_y: u16) -> (f32, f32) {
        let jumped = match self.last_raw {
            Some((lx, ly)) => {
                let dx = raw_x as i32 - lx as i32;
                let dy = raw_y as i32 - ly as i32;
                let limit = self.config.jump_threshold as i32;
                dx * dx + dy * dy > limit * limit
            }
            None => true,
        };
        self.last_raw = Some((raw_x, raw_y));

        let (rx, ry) = (raw_x as f32, raw_y as f32);
        if jumped {
            self.smoothed = (rx, ry);
            self.smoothed_count = 0;
            return self.smoothed;
        }

        let alpha = if self.smoothed_count < self.config.fast_samples {
            self.config.fast_alpha
        } else {
            self.config.slow_alpha
        };
        self.smoothed_count = self.smoothed_count.saturating_add(1);

        let (sx, sy) = self.smoothed;
        self.smoothed = (sx + alpha * (rx - sx), sy + alpha * (ry - sy));
        self.smoothed
    }
}

fn is_rail(value: u16) -> bool {
    value == 0 || value >= ADC_MAX
}
