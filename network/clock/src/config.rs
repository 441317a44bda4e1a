// Licensed under the Apache-2.0 license

//! UTC steering parameters.

use crate::time::UtcDuration;

/// Largest speed trim, in microseconds added or removed per counter wrap.
/// With a 65536 us wrap period this bounds the rate correction to about
/// 7630 ppm.
pub const MAX_UTC_SPEED_CORRECTION: i32 = 500;

/// Corrections larger than this are applied as a direct jump; smaller ones are
/// absorbed by the speed trim alone.
pub const UTC_JUMP_THRESHOLD_USEC: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// Bound on the per-wrap speed trim. Must be non-negative and smaller
    /// than the counter period.
    pub max_speed_correction: i32,
    /// Magnitude above which an adjustment jumps the UTC time base.
    pub jump_threshold: UtcDuration,
}

impl ClockConfig {
    pub const DEFAULT: ClockConfig = ClockConfig {
        max_speed_correction: MAX_UTC_SPEED_CORRECTION,
        jump_threshold: UtcDuration::from_usec(UTC_JUMP_THRESHOLD_USEC),
    };

    pub const fn with_max_speed_correction(self, max_speed_correction: i32) -> Self {
        Self {
            max_speed_correction,
            ..self
        }
    }

    pub const fn with_jump_threshold(self, jump_threshold: UtcDuration) -> Self {
        Self {
            jump_threshold,
            ..self
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
