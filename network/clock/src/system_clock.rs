// Licensed under the Apache-2.0 license

//! Clock interface consumed by the network stack.

use crate::clock::Clock;
use crate::time::{MonotonicTime, UtcDuration, UtcTime};
use network_hil::OverflowCounter;

/// Time source for the protocol stack.
///
/// The stack timestamps with `monotonic()` for timeouts and with `utc()` for
/// messages that carry wall-clock time, and feeds the offsets it measures
/// against the network time master back through `adjust_utc()`.
pub trait SystemClock {
    fn monotonic(&self) -> MonotonicTime;

    /// Wall-clock time, or [`UtcTime::EPOCH`] while unsynchronized.
    fn utc(&self) -> UtcTime;

    /// `adjustment` is how far the reference is ahead of the local UTC clock.
    fn adjust_utc(&self, adjustment: UtcDuration);
}

impl<C: OverflowCounter> SystemClock for Clock<C> {
    fn monotonic(&self) -> MonotonicTime {
        Clock::monotonic(self)
    }

    fn utc(&self) -> UtcTime {
        Clock::utc(self)
    }

    fn adjust_utc(&self, adjustment: UtcDuration) {
        Clock::adjust_utc(self, adjustment)
    }
}
