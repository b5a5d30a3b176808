//! Controller timing margins
//!
//! These delays come from vendor reference code, not from a datasheet, so
//! they are carried as configuration with the vendor values as defaults.
//! Shortening them is only safe after validation on real hardware.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reset, initialization and power-off delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResetTiming {
    /// /RST held low (ms)
    pub reset_assert_ms: u32,
    /// Wait after /RST release before the first command (ms)
    pub reset_settle_ms: u32,
    /// Wait after software reset (ms)
    pub swreset_ms: u32,
    /// Wait after sleep-out (ms)
    pub sleep_out_ms: u32,
    /// Wait after display-on (ms)
    pub display_on_ms: u32,
    /// Wait after display-off during power-down (ms)
    pub display_off_ms: u32,
    /// Wait after sleep-in during power-down (ms)
    pub sleep_in_ms: u32,
    /// Minimum /WR low time (ns)
    pub strobe_hold_ns: u32,
}

impl ResetTiming {
    /// Vendor reference delays
    pub const VENDOR: Self = Self {
        reset_assert_ms: 20,
        reset_settle_ms: 120,
        swreset_ms: 50,
        sleep_out_ms: 20,
        display_on_ms: 25,
        display_off_ms: 20,
        sleep_in_ms: 120,
        strobe_hold_ns: 15,
    };

    /// All delays zero, for host-side tests
    pub const fn immediate() -> Self {
        Self {
            reset_assert_ms: 0,
            reset_settle_ms: 0,
            swreset_ms: 0,
            sleep_out_ms: 0,
            display_on_ms: 0,
            display_off_ms: 0,
            sleep_in_ms: 0,
            strobe_hold_ns: 0,
        }
    }
}

impl Default for ResetTiming {
    fn default() -> Self {
        Self::VENDOR
    }
}
