// Licensed under the Apache-2.0 license

//! 64-bit microsecond accumulators shared with the overflow interrupt.
//!
//! Every access takes a [`CriticalSection`] token, so a value can only be
//! combined with a counter reading while the overflow interrupt is masked.
//! The backing [`AtomicU64`] keeps the type `Sync` and keeps 64-bit loads
//! whole on 32-bit cores. Nothing here may block: the overflow handler and
//! the interrupt-safe UTC read both go through this type.

use critical_section::CriticalSection;
use portable_atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Accumulator(AtomicU64);

impl Accumulator {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn load(&self, _cs: CriticalSection<'_>) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Add whole elapsed time. Only the overflow handler calls this.
    pub fn advance(&self, _cs: CriticalSection<'_>, usec: u64) {
        self.0.fetch_add(usec, Ordering::Relaxed);
    }

    /// Apply a signed jump. A negative jump larger than the current value
    /// leaves the accumulator at 1 rather than at zero or wrapped around.
    pub fn offset(&self, cs: CriticalSection<'_>, usec: i64) {
        let current = self.load(cs);
        let next = if usec < 0 && usec.unsigned_abs() > current {
            1
        } else {
            current.wrapping_add_signed(usec)
        };
        self.0.store(next, Ordering::Relaxed);
    }
}
