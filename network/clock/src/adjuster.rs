// Licensed under the Apache-2.0 license

//! UTC synchronization.
//!
//! The UTC time base is steered in two ways:
//!
//! - Every adjustment nudges the per-wrap speed trim by one microsecond
//!   towards the reference, bounded by `max_speed_correction`. The step never
//!   depends on the size of the error.
//! - Adjustments larger than the jump threshold, and the very first
//!   adjustment, additionally jump the UTC accumulator by the full amount.
//!
//! Small steady-state errors are thus corrected by rate alone, without visible
//! jumps. The monotonic time base is never touched.

use crate::accumulator::Accumulator;
use crate::config::ClockConfig;
use crate::time::UtcDuration;
use log::{debug, info, trace};
use portable_atomic::{AtomicBool, AtomicI32, Ordering};

/// UTC fields read by the overflow interrupt.
///
/// Only the [`Adjuster`] writes `synchronized` and `speed_correction`, and it
/// writes them while serialized by the clock's adjustment lock. The overflow
/// handler only reads them.
#[derive(Debug, Default)]
pub struct UtcState {
    pub(crate) accumulator: Accumulator,
    synchronized: AtomicBool,
    speed_correction: AtomicI32,
}

impl UtcState {
    pub const fn new() -> Self {
        Self {
            accumulator: Accumulator::new(),
            synchronized: AtomicBool::new(false),
            speed_correction: AtomicI32::new(0),
        }
    }

    /// Set once by the first accepted adjustment and never cleared.
    pub fn is_synchronized(&self) -> bool {
        self.synchronized.load(Ordering::Acquire)
    }

    /// Current trim in microseconds per counter wrap.
    pub fn speed_correction(&self) -> i32 {
        self.speed_correction.load(Ordering::Relaxed)
    }
}

/// Foreground half of the UTC state, guarded by the clock's adjustment lock.
#[derive(Debug)]
pub struct Adjuster {
    config: ClockConfig,
    jump_count: u32,
}

impl Adjuster {
    pub const fn new(config: ClockConfig) -> Self {
        Self {
            config,
            jump_count: 0,
        }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Jumps applied since the first synchronization.
    pub fn jump_count(&self) -> u32 {
        self.jump_count
    }

    /// Feed one correction from the time-sync protocol.
    ///
    /// `adjustment` is how far the reference is ahead of the local UTC clock.
    /// Every input is accepted; out-of-range values are clamped.
    pub fn adjust(&mut self, utc: &UtcState, adjustment: UtcDuration) {
        let synchronized = utc.is_synchronized();
        if adjustment.is_zero() && synchronized {
            return;
        }

        self.trim_speed(utc, adjustment);

        if synchronized && adjustment.abs_usec() <= self.config.jump_threshold.abs_usec() {
            return;
        }

        critical_section::with(|cs| {
            utc.accumulator.offset(cs, adjustment.as_usec());
            if !synchronized {
                // Trim gathered before lock-in is meaningless.
                utc.speed_correction.store(0, Ordering::Relaxed);
                utc.synchronized.store(true, Ordering::Release);
            }
        });

        if synchronized {
            self.jump_count = self.jump_count.wrapping_add(1);
            debug!(
                "[network-clock] UTC jump by {} (jump #{})",
                adjustment, self.jump_count
            );
        } else {
            info!("[network-clock] UTC synchronized, initial jump {}", adjustment);
        }
    }

    fn trim_speed(&self, utc: &UtcState, adjustment: UtcDuration) {
        let max = self.config.max_speed_correction;
        let current = utc.speed_correction();
        let next = if adjustment.is_positive() {
            current.saturating_add(1).min(max)
        } else {
            current.saturating_sub(1).max(-max)
        };
        if next != current {
            utc.speed_correction.store(next, Ordering::Relaxed);
            trace!("[network-clock] UTC speed correction {} -> {}", current, next);
        }
    }
}

/// Convert a per-wrap trim into parts per million, truncating toward zero.
pub const fn speed_correction_ppm(speed_correction: i32, period_us: u32) -> i32 {
    (speed_correction as i64 * 1_000_000 / period_us as i64) as i32
}
