/*++

Licensed under the Apache-2.0 license.

File Name:

    fake.rs

Abstract:

    Simulated peripherals for exercising HIL consumers on the host.

--*/

use crate::counter::OverflowCounter;
use portable_atomic::{AtomicU32, AtomicU64, Ordering};

/// Wrap period of the simulated counter, matching a 16-bit timer at 1 MHz.
pub const FAKE_PERIOD_US: u32 = 0x1_0000;

const COUNT_MASK: u64 = 0xFFFF_FFFF;
/// Overflow flag latched by a wrap, cleared by `clear_overflow()`.
const PENDING: u64 = 1 << 32;
/// Set when the counter wrapped again before the previous wrap was acknowledged.
const LOST: u64 = 1 << 33;

/// A simulated 16-bit free-running counter.
///
/// The counter value and the overflow flag live in a single atomic word so that
/// a reader never observes a wrapped counter without the flag, which is the
/// guarantee real timer hardware gives.
///
/// Time only moves when the test calls [`FakeCounter::advance`]. To reproduce
/// the race where a wrap lands in the middle of a sample, a test can arm a wrap
/// that fires just before or just after the next `counter()` read.
#[derive(Debug, Default)]
pub struct FakeCounter {
    state: AtomicU64,
    starts: AtomicU32,
    before_next_read: AtomicU32,
    after_next_read: AtomicU32,
}

impl FakeCounter {
    pub const fn new() -> Self {
        Self {
            state: AtomicU64::new(0),
            starts: AtomicU32::new(0),
            before_next_read: AtomicU32::new(0),
            after_next_read: AtomicU32::new(0),
        }
    }

    /// Advance the counter by `ticks` microseconds, latching the overflow flag
    /// on every wrap.
    pub fn advance(&self, ticks: u32) {
        // The closure never returns None, so the update cannot fail.
        let _ = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |state| {
                Some(step(state, ticks))
            });
    }

    /// Move the counter to `value` without producing a wrap.
    pub fn set_counter(&self, value: u32) {
        let value = u64::from(value % FAKE_PERIOD_US);
        let _ = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |state| {
                Some((state & !COUNT_MASK) | value)
            });
    }

    /// Advance by `ticks` right before the next `counter()` read.
    pub fn advance_before_next_read(&self, ticks: u32) {
        self.before_next_read.store(ticks, Ordering::SeqCst);
    }

    /// Advance by `ticks` right after the next `counter()` read has latched its
    /// value, so the caller sees a stale count followed by a pending overflow.
    pub fn advance_after_next_read(&self, ticks: u32) {
        self.after_next_read.store(ticks, Ordering::SeqCst);
    }

    /// Number of times `start()` was called.
    pub fn start_count(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    /// Whether a wrap was ever overwritten by a second wrap before the handler
    /// acknowledged it.
    pub fn lost_overflow(&self) -> bool {
        self.state.load(Ordering::SeqCst) & LOST != 0
    }

    /// Ticks remaining until the next wrap.
    pub fn ticks_until_wrap(&self) -> u32 {
        FAKE_PERIOD_US - (self.state.load(Ordering::SeqCst) & COUNT_MASK) as u32
    }
}

fn step(state: u64, ticks: u32) -> u64 {
    let period = u64::from(FAKE_PERIOD_US);
    let count = (state & COUNT_MASK) + u64::from(ticks);
    let wraps = count / period;
    let mut flags = state & (PENDING | LOST);
    if wraps > 0 {
        if flags & PENDING != 0 || wraps > 1 {
            flags |= LOST;
        }
        flags |= PENDING;
    }
    flags | (count % period)
}

impl OverflowCounter for FakeCounter {
    const PERIOD_US: u32 = FAKE_PERIOD_US;

    fn start(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.state.store(0, Ordering::SeqCst);
    }

    fn counter(&self) -> u32 {
        let before = self.before_next_read.swap(0, Ordering::SeqCst);
        if before != 0 {
            self.advance(before);
        }
        let value = (self.state.load(Ordering::SeqCst) & COUNT_MASK) as u32;
        let after = self.after_next_read.swap(0, Ordering::SeqCst);
        if after != 0 {
            self.advance(after);
        }
        value
    }

    fn overflow_pending(&self) -> bool {
        self.state.load(Ordering::SeqCst) & PENDING != 0
    }

    fn clear_overflow(&self) {
        self.state.fetch_and(!PENDING, Ordering::SeqCst);
    }
}
