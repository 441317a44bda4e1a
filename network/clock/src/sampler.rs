// Licensed under the Apache-2.0 license

//! Combines an accumulator with the live hardware counter.

use crate::accumulator::Accumulator;
use critical_section::CriticalSection;
use network_hil::OverflowCounter;

/// Sample `accumulator + counter` in microseconds.
///
/// Callable from any context. The critical section keeps the overflow handler
/// from running between the two reads, but the hardware keeps counting: if
/// the counter wrapped before or during the read, the overflow flag is
/// latched and the handler has not yet added its period. In that case the
/// counter is read again (it is now known to be past the wrap) and one period
/// is added to the returned value. The stored accumulator is never touched.
pub fn sample<C: OverflowCounter>(
    counter: &C,
    accumulator: &Accumulator,
    cs: CriticalSection<'_>,
) -> u64 {
    let mut time = accumulator.load(cs);
    let mut count = counter.counter();

    if counter.overflow_pending() {
        count = counter.counter();
        time += u64::from(C::PERIOD_US);
    }

    clock_assert!(count < C::PERIOD_US, "counter reading out of range");
    time + u64::from(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use network_hil::fake::{FakeCounter, FAKE_PERIOD_US};

    const PERIOD: u64 = FAKE_PERIOD_US as u64;

    fn sample_now(counter: &FakeCounter, acc: &Accumulator) -> u64 {
        critical_section::with(|cs| sample(counter, acc, cs))
    }

    #[test]
    fn test_sample_adds_counter() {
        let counter = FakeCounter::new();
        let acc = Accumulator::new();
        critical_section::with(|cs| acc.advance(cs, 3 * PERIOD));
        counter.set_counter(1234);
        assert_eq!(sample_now(&counter, &acc), 3 * PERIOD + 1234);
    }

    #[test]
    fn test_pending_wrap_is_compensated() {
        let counter = FakeCounter::new();
        let acc = Accumulator::new();
        counter.set_counter(FAKE_PERIOD_US - 10);
        assert_eq!(sample_now(&counter, &acc), PERIOD - 10);

        // Wrapped, handler not run yet.
        counter.advance(20);
        assert_eq!(sample_now(&counter, &acc), PERIOD + 10);
        // The stored value is untouched by the read path.
        assert_eq!(critical_section::with(|cs| acc.load(cs)), 0);

        // Handler catches up; same instant reads the same.
        counter.clear_overflow();
        critical_section::with(|cs| acc.advance(cs, PERIOD));
        assert_eq!(sample_now(&counter, &acc), PERIOD + 10);
    }

    #[test]
    fn test_wrap_between_counter_read_and_flag_check() {
        let counter = FakeCounter::new();
        let acc = Accumulator::new();
        counter.set_counter(FAKE_PERIOD_US - 2);
        counter.advance_after_next_read(5);

        // The first read returns the pre-wrap count; the flag forces a re-read.
        assert_eq!(sample_now(&counter, &acc), PERIOD + 3);
    }

    #[test]
    fn test_wrap_right_before_counter_read() {
        let counter = FakeCounter::new();
        let acc = Accumulator::new();
        counter.set_counter(FAKE_PERIOD_US - 1);
        let before = sample_now(&counter, &acc);

        counter.advance_before_next_read(2);
        let after = sample_now(&counter, &acc);
        assert_eq!(after, PERIOD + 1);
        assert!(after > before);
    }
}
