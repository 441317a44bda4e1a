/*++

Licensed under the Apache-2.0 license.

File Name:

    counter.rs

Abstract:

    Hardware Interface Layer trait for free-running overflow counters.
--*/

// Hardware Interface Layer trait for a free-running wrapping counter
//
// The counter ticks once per microsecond and wraps back to zero every
// `PERIOD_US` ticks. Each wrap latches an overflow flag and raises an
// interrupt; the flag stays set until `clear_overflow()` is called from the
// interrupt handler.
//
// All methods must be callable from interrupt context. Implementations must
// not block.
pub trait OverflowCounter {
    // Number of ticks (microseconds) between two consecutive wraps.
    const PERIOD_US: u32;

    // Power up the peripheral and start counting from zero with the
    // overflow interrupt enabled.
    fn start(&self);

    // Read the current counter value
    //
    // # Returns
    // The raw counter value, in `[0, PERIOD_US)`.
    fn counter(&self) -> u32;

    // Check whether a wrap has occurred that the overflow handler has not
    // acknowledged yet.
    //
    // # Returns
    // `true` while the overflow flag is latched.
    fn overflow_pending(&self) -> bool;

    // Acknowledge the latched overflow flag. Called once per wrap from the
    // overflow interrupt handler.
    fn clear_overflow(&self);
}
