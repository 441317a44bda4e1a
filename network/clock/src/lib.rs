/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Overflow-safe monotonic and UTC clock for the Network Coprocessor.

    A 16-bit free-running hardware counter is extended to 64-bit microsecond
    time by counting wraps in the overflow interrupt. On top of the monotonic
    time base, a UTC time base is steered towards an external reference by a
    bounded speed trim and occasional direct jumps.

--*/

//! Platform wiring:
//!
//! ```ignore
//! use network_clock::{Clock, ClockConfig};
//! use network_drivers::{prescaler_for, OverflowTimer};
//!
//! const PSC: u16 = match prescaler_for(TIMER_INPUT_CLOCK_HZ) {
//!     Ok(psc) => psc,
//!     Err(_) => panic!("timer clock must be divisible to 1 MHz"),
//! };
//!
//! static CLOCK: Clock<OverflowTimer> =
//!     Clock::new(unsafe { OverflowTimer::new(TIMER_BASE, PSC) }, ClockConfig::DEFAULT);
//!
//! // Timer update interrupt.
//! fn timer_isr() {
//!     CLOCK.handle_overflow();
//! }
//!
//! fn main() {
//!     let clock = CLOCK.instance();
//!     let now = clock.monotonic();
//! }
//! ```

#![cfg_attr(target_arch = "riscv32", no_std)]

#[macro_use]
mod assert;

pub mod accumulator;
pub mod adjuster;
pub mod clock;
pub mod config;
pub mod sampler;
pub mod system_clock;
pub mod time;

pub use clock::Clock;
pub use config::ClockConfig;
pub use system_clock::SystemClock;
pub use time::{MonotonicTime, UtcDuration, UtcTime};
