// Licensed under the Apache-2.0 license

//! Microsecond time types handed out by the clock.

use core::fmt;
use core::ops::Neg;

/// Microseconds since the clock was initialized. Never goes backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonotonicTime(u64);

impl MonotonicTime {
    pub const fn from_usec(usec: u64) -> Self {
        Self(usec)
    }

    pub const fn as_usec(&self) -> u64 {
        self.0
    }

    /// Microseconds elapsed since `earlier`, or zero if `earlier` is later.
    pub const fn saturating_duration_since(&self, earlier: MonotonicTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for MonotonicTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// Wall-clock time in microseconds since the UTC epoch.
///
/// Reads as [`UtcTime::EPOCH`] until the clock has been synchronized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcTime(u64);

impl UtcTime {
    pub const EPOCH: UtcTime = UtcTime(0);

    pub const fn from_usec(usec: u64) -> Self {
        Self(usec)
    }

    pub const fn as_usec(&self) -> u64 {
        self.0
    }

    pub const fn is_epoch(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for UtcTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}s", self.0 / 1_000_000, self.0 % 1_000_000)
    }
}

/// Signed UTC correction in microseconds.
///
/// Positive values mean the reference is ahead of the local clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDuration(i64);

impl UtcDuration {
    pub const ZERO: UtcDuration = UtcDuration(0);

    pub const fn from_usec(usec: i64) -> Self {
        Self(usec)
    }

    pub const fn from_msec(msec: i64) -> Self {
        Self(msec.saturating_mul(1_000))
    }

    pub const fn as_usec(&self) -> i64 {
        self.0
    }

    /// Magnitude in microseconds. Defined for `i64::MIN` as well.
    pub const fn abs_usec(&self) -> u64 {
        self.0.unsigned_abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl Neg for UtcDuration {
    type Output = UtcDuration;

    fn neg(self) -> Self::Output {
        UtcDuration(self.0.saturating_neg())
    }
}

impl fmt::Display for UtcDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}
