/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Hardware Interface Layer (HIL) for Network Coprocessor peripherals.
--*/

#![cfg_attr(target_arch = "riscv32", no_std)]

pub mod counter;

#[cfg(feature = "fake")]
pub mod fake;

pub use counter::OverflowCounter;
