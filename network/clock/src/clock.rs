// Licensed under the Apache-2.0 license

//! Clock facade over one hardware overflow counter.
//!
//! Two separate mutation paths touch the clock state:
//!
//! - The overflow interrupt ([`Clock::handle_overflow`]) only advances the
//!   accumulators, inside a short interrupt-masking critical section. It never
//!   takes the adjustment lock and never blocks.
//! - UTC adjustments ([`Clock::adjust_utc`]) are serialized by a blocking
//!   lock, and re-enter the critical section for the one field they share
//!   with the interrupt, the UTC accumulator.
//!
//! Reads combine an accumulator with the live counter inside the critical
//! section and never take the adjustment lock, so they are safe from any
//! context.

use crate::accumulator::Accumulator;
use crate::adjuster::{speed_correction_ppm, Adjuster, UtcState};
use crate::config::ClockConfig;
use crate::sampler;
use crate::time::{MonotonicTime, UtcDuration, UtcTime};
use critical_section::CriticalSection;
use log::info;
use network_hil::OverflowCounter;
use portable_atomic::{AtomicBool, Ordering};
use spin::Mutex;

#[cfg(any(debug_assertions, feature = "strict-asserts"))]
use core::cell::Cell;

pub struct Clock<C: OverflowCounter> {
    counter: C,
    initialized: AtomicBool,
    monotonic: Accumulator,
    utc: UtcState,
    adjuster: Mutex<Adjuster>,
    // Last value returned by `monotonic()`, for the regression self-check.
    #[cfg(any(debug_assertions, feature = "strict-asserts"))]
    last_monotonic: critical_section::Mutex<Cell<u64>>,
}

impl<C: OverflowCounter> Clock<C> {
    /// Create a stopped clock. `const` so a platform can keep it in a `static`.
    pub const fn new(counter: C, config: ClockConfig) -> Self {
        clock_assert!(
            config.max_speed_correction >= 0
                && (config.max_speed_correction as u32) < C::PERIOD_US,
            "speed correction bound must be below the counter period"
        );
        Self {
            counter,
            initialized: AtomicBool::new(false),
            monotonic: Accumulator::new(),
            utc: UtcState::new(),
            adjuster: Mutex::new(Adjuster::new(config)),
            #[cfg(any(debug_assertions, feature = "strict-asserts"))]
            last_monotonic: critical_section::Mutex::new(Cell::new(0)),
        }
    }

    /// Start the hardware counter. Calling this again is a no-op.
    ///
    /// Not callable from interrupt context.
    pub fn init(&self) {
        let started = critical_section::with(|_| {
            if self.initialized.load(Ordering::Acquire) {
                return false;
            }
            self.counter.start();
            self.initialized.store(true, Ordering::Release);
            true
        });
        if started {
            info!(
                "[network-clock] Started, {}us per counter overflow",
                C::PERIOD_US
            );
        }
    }

    /// Return the clock, initializing it on first use.
    pub fn instance(&self) -> &Self {
        self.init();
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Overflow interrupt entry point. Must run exactly once per counter wrap.
    pub fn handle_overflow(&self) {
        clock_assert!(self.is_initialized(), "overflow before clock init");

        critical_section::with(|cs| {
            self.counter.clear_overflow();

            let period = u64::from(C::PERIOD_US);
            self.monotonic.advance(cs, period);
            if self.utc.is_synchronized() {
                let step = period.wrapping_add_signed(i64::from(self.utc.speed_correction()));
                self.utc.accumulator.advance(cs, step);
            }
        });
    }

    /// Microseconds since `init()`. Callable from any context.
    pub fn monotonic(&self) -> MonotonicTime {
        clock_assert!(self.is_initialized(), "clock used before init");

        let usec = critical_section::with(|cs| {
            let usec = sampler::sample(&self.counter, &self.monotonic, cs);
            self.check_monotonic(cs, usec);
            usec
        });
        MonotonicTime::from_usec(usec)
    }

    #[cfg(any(debug_assertions, feature = "strict-asserts"))]
    fn check_monotonic(&self, cs: CriticalSection<'_>, usec: u64) {
        let prev = self.last_monotonic.borrow(cs).replace(usec);
        clock_assert!(prev <= usec, "monotonic time went backwards");
    }

    #[cfg(not(any(debug_assertions, feature = "strict-asserts")))]
    fn check_monotonic(&self, _cs: CriticalSection<'_>, _usec: u64) {}

    /// Current UTC time, or [`UtcTime::EPOCH`] before the first adjustment.
    pub fn utc(&self) -> UtcTime {
        self.sample_utc()
    }

    /// Same as [`Clock::utc`], for interrupt handlers that need a timestamp
    /// (e.g. on frame reception).
    ///
    /// Takes only the interrupt-masking critical section, never the
    /// adjustment lock.
    pub fn utc_from_interrupt(&self) -> UtcTime {
        self.sample_utc()
    }

    fn sample_utc(&self) -> UtcTime {
        clock_assert!(self.is_initialized(), "clock used before init");

        if !self.utc.is_synchronized() {
            return UtcTime::EPOCH;
        }
        let usec =
            critical_section::with(|cs| sampler::sample(&self.counter, &self.utc.accumulator, cs));
        UtcTime::from_usec(usec)
    }

    /// Steer UTC towards the reference. Blocks while another adjustment is in
    /// progress; never call from interrupt context.
    pub fn adjust_utc(&self, adjustment: UtcDuration) {
        clock_assert!(self.is_initialized(), "clock used before init");
        self.adjuster.lock().adjust(&self.utc, adjustment);
    }

    pub fn is_utc_synchronized(&self) -> bool {
        self.utc.is_synchronized()
    }

    /// Current speed trim in microseconds per counter wrap.
    pub fn utc_speed_correction(&self) -> i32 {
        let _adjuster = self.adjuster.lock();
        self.utc.speed_correction()
    }

    /// Current speed trim in parts per million.
    pub fn utc_speed_correction_ppm(&self) -> i32 {
        speed_correction_ppm(self.utc_speed_correction(), C::PERIOD_US)
    }

    /// Number of UTC jumps applied since the first synchronization.
    pub fn utc_adjustment_jump_count(&self) -> u32 {
        self.adjuster.lock().jump_count()
    }

    pub fn config(&self) -> ClockConfig {
        *self.adjuster.lock().config()
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use network_hil::fake::{FakeCounter, FAKE_PERIOD_US};

    const PERIOD: u64 = FAKE_PERIOD_US as u64;

    fn started_clock() -> Clock<FakeCounter> {
        let clock = Clock::new(FakeCounter::new(), ClockConfig::DEFAULT);
        clock.init();
        clock
    }

    /// Let the hardware wrap and the interrupt run.
    fn wrap(clock: &Clock<FakeCounter>) {
        let counter = clock.counter();
        counter.advance(counter.ticks_until_wrap());
        clock.handle_overflow();
    }

    #[test]
    fn test_init_is_idempotent() {
        let clock = Clock::new(FakeCounter::new(), ClockConfig::DEFAULT);
        assert!(!clock.is_initialized());

        clock.init();
        clock.counter().advance(100);
        clock.init();
        clock.instance();

        assert!(clock.is_initialized());
        assert_eq!(clock.counter().start_count(), 1);
        assert_eq!(clock.monotonic().as_usec(), 100);
    }

    #[test]
    fn test_one_wrap_advances_by_one_period() {
        let clock = started_clock();
        clock.counter().set_counter(FAKE_PERIOD_US - 1);
        assert_eq!(clock.monotonic().as_usec(), PERIOD - 1);

        clock.counter().advance(1);
        // Pending but not handled.
        assert_eq!(clock.monotonic().as_usec(), PERIOD);
        clock.handle_overflow();
        assert_eq!(clock.monotonic().as_usec(), PERIOD);
        assert!(!clock.counter().overflow_pending());

        clock.counter().advance(FAKE_PERIOD_US);
        clock.handle_overflow();
        assert_eq!(clock.monotonic().as_usec(), 2 * PERIOD);
    }

    #[test]
    fn test_utc_is_epoch_until_synchronized() {
        let clock = started_clock();
        wrap(&clock);
        clock.counter().advance(77);

        assert!(clock.utc().is_epoch());
        assert!(clock.utc_from_interrupt().is_epoch());
        assert!(!clock.is_utc_synchronized());
    }

    #[test]
    fn test_utc_runs_with_speed_correction() {
        let clock = started_clock();
        clock.adjust_utc(UtcDuration::from_usec(1_000_000));
        for _ in 0..3 {
            clock.adjust_utc(UtcDuration::from_usec(-100));
        }
        assert_eq!(clock.utc_speed_correction(), -3);

        wrap(&clock);
        wrap(&clock);
        assert_eq!(clock.utc().as_usec(), 1_000_000 + 2 * (PERIOD - 3));
        assert_eq!(clock.monotonic().as_usec(), 2 * PERIOD);
    }

    #[test]
    fn test_utc_from_interrupt_matches_utc() {
        let clock = started_clock();
        clock.adjust_utc(UtcDuration::from_usec(42_000_000));
        clock.counter().advance(321);

        assert_eq!(clock.utc(), clock.utc_from_interrupt());
        assert_eq!(clock.utc().as_usec(), 42_000_321);
    }

    #[test]
    fn test_ppm_accessor() {
        let clock = started_clock();
        clock.adjust_utc(UtcDuration::from_usec(1));
        for _ in 0..500 {
            clock.adjust_utc(UtcDuration::from_usec(1));
        }
        assert_eq!(clock.utc_speed_correction(), 500);
        assert_eq!(clock.utc_speed_correction_ppm(), 7629);
    }

    #[test]
    fn test_custom_config_bounds_adjustments() {
        let config = ClockConfig::DEFAULT
            .with_max_speed_correction(3)
            .with_jump_threshold(UtcDuration::from_msec(10));
        let clock = Clock::new(FakeCounter::new(), config);
        clock.init();
        assert_eq!(clock.config(), config);

        clock.adjust_utc(UtcDuration::from_usec(1_000_000));
        for _ in 0..10 {
            clock.adjust_utc(UtcDuration::from_usec(-5_000));
        }
        assert_eq!(clock.utc_speed_correction(), -3);
        assert_eq!(clock.utc_adjustment_jump_count(), 0);
        assert_eq!(clock.utc().as_usec(), 1_000_000);

        clock.adjust_utc(UtcDuration::from_usec(10_001));
        assert_eq!(clock.utc_adjustment_jump_count(), 1);
        assert_eq!(clock.utc().as_usec(), 1_010_001);
    }

    #[test]
    fn test_jump_threshold_edges() {
        let clock = started_clock();
        clock.adjust_utc(UtcDuration::from_usec(5_000_000));

        clock.adjust_utc(UtcDuration::from_usec(1_000));
        clock.adjust_utc(UtcDuration::from_usec(-1_000));
        assert_eq!(clock.utc_adjustment_jump_count(), 0);
        assert_eq!(clock.utc().as_usec(), 5_000_000);

        clock.adjust_utc(UtcDuration::from_usec(-1_001));
        assert_eq!(clock.utc_adjustment_jump_count(), 1);
        assert_eq!(clock.utc().as_usec(), 4_998_999);

        clock.adjust_utc(UtcDuration::from_usec(i64::MIN));
        assert_eq!(clock.utc_adjustment_jump_count(), 2);
        assert_eq!(clock.utc().as_usec(), 1);
    }

    #[test]
    #[should_panic(expected = "monotonic time went backwards")]
    #[cfg(any(debug_assertions, feature = "strict-asserts"))]
    fn test_monotonic_regression_is_caught() {
        let clock = started_clock();
        clock.counter().set_counter(500);
        assert_eq!(clock.monotonic().as_usec(), 500);

        // Counter reset behind the clock's back.
        clock.counter().set_counter(10);
        clock.monotonic();
    }

    #[test]
    #[should_panic(expected = "clock used before init")]
    #[cfg(any(debug_assertions, feature = "strict-asserts"))]
    fn test_use_before_init_is_caught() {
        let clock = Clock::new(FakeCounter::new(), ClockConfig::DEFAULT);
        clock.monotonic();
    }
}
