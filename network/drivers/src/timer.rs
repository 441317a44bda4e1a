/*++

Licensed under the Apache-2.0 license.

File Name:

    timer.rs

Abstract:

    Overflow timer driver for the Network Coprocessor.

    Implements the OverflowCounter HIL trait on a 16-bit up-counting
    basic timer. The timer is prescaled to 1 MHz and auto-reloads at
    0xFFFF, so it wraps every 65536 us and raises its update interrupt
    on each wrap. Enabling the timer's bus clock and routing its interrupt
    are left to the platform.

--*/

use core::fmt;
use network_hil::counter::OverflowCounter;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_bitfields![u32,
    CR1 [
        CEN OFFSET(0) NUMBITS(1) [],
        URS OFFSET(2) NUMBITS(1) [],
    ],
    DIER [
        UIE OFFSET(0) NUMBITS(1) [],
    ],
    SR [
        UIF OFFSET(0) NUMBITS(1) [],
    ],
    EGR [
        UG OFFSET(0) NUMBITS(1) [],
    ],
    CNT [
        CNT OFFSET(0) NUMBITS(16) [],
    ],
];

register_structs! {
    pub TimerRegisters {
        (0x00 => cr1: ReadWrite<u32, CR1::Register>),
        (0x04 => _reserved0),
        (0x0C => dier: ReadWrite<u32, DIER::Register>),
        (0x10 => sr: ReadWrite<u32, SR::Register>),
        (0x14 => egr: WriteOnly<u32, EGR::Register>),
        (0x18 => _reserved1),
        (0x24 => cnt: ReadWrite<u32, CNT::Register>),
        (0x28 => psc: ReadWrite<u32>),
        (0x2C => arr: ReadWrite<u32>),
        (0x30 => @END),
    }
}

/// Counter tick rate: one tick per microsecond.
const TICK_HZ: u32 = 1_000_000;

/// Auto-reload value for a full 16-bit count.
const AUTO_RELOAD: u32 = 0xFFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerConfigError {
    /// The timer input clock is not a whole number of megahertz, so no
    /// integer prescaler yields a 1 us tick.
    NotMicrosecondDivisible,
    /// The required division does not fit the 16-bit prescaler.
    PrescalerOutOfRange,
}

impl fmt::Display for TimerConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerConfigError::NotMicrosecondDivisible => {
                write!(f, "timer input clock must be divisible to 1 MHz")
            }
            TimerConfigError::PrescalerOutOfRange => {
                write!(f, "timer input clock out of prescaler range")
            }
        }
    }
}

/// Compute the prescaler register value for a 1 MHz tick.
///
/// `const` so platforms can reject a bad clock tree at build time:
///
/// ```ignore
/// const PSC: u16 = match prescaler_for(TIMER_INPUT_CLOCK_HZ) {
///     Ok(psc) => psc,
///     Err(_) => panic!("timer clock must be divisible to 1 MHz"),
/// };
/// ```
pub const fn prescaler_for(input_clock_hz: u32) -> Result<u16, TimerConfigError> {
    if input_clock_hz % TICK_HZ != 0 {
        return Err(TimerConfigError::NotMicrosecondDivisible);
    }
    let divider = input_clock_hz / TICK_HZ;
    if divider == 0 || divider > 0x1_0000 {
        return Err(TimerConfigError::PrescalerOutOfRange);
    }
    Ok((divider - 1) as u16)
}

/// Overflow timer driver for the Network Coprocessor.
///
/// Only the clock's overflow interrupt handler and the clock's sampling path
/// may touch the timer once it is started.
pub struct OverflowTimer {
    base: usize,
    prescaler: u16,
}

impl OverflowTimer {
    /// Create a driver for the timer block at `base`.
    ///
    /// # Safety
    /// `base` must be the address of a timer register block that lives for the
    /// rest of the program and that no other driver uses.
    pub const unsafe fn new(base: usize, prescaler: u16) -> Self {
        Self { base, prescaler }
    }

    fn registers(&self) -> &TimerRegisters {
        // Safe by the contract of `new`.
        unsafe { &*(self.base as *const TimerRegisters) }
    }
}

impl OverflowCounter for OverflowTimer {
    const PERIOD_US: u32 = AUTO_RELOAD + 1;

    fn start(&self) {
        let regs = self.registers();
        regs.psc.set(u32::from(self.prescaler));
        regs.arr.set(AUTO_RELOAD);
        // Load PSC/ARR through a forced update without latching UIF.
        regs.cr1.write(CR1::URS::SET);
        regs.sr.set(0);
        regs.egr.write(EGR::UG::SET);
        regs.dier.write(DIER::UIE::SET);
        regs.cr1.write(CR1::CEN::SET);
    }

    fn counter(&self) -> u32 {
        self.registers().cnt.read(CNT::CNT)
    }

    fn overflow_pending(&self) -> bool {
        self.registers().sr.is_set(SR::UIF)
    }

    fn clear_overflow(&self) {
        // SR flags are write-zero-to-clear; leave every flag but UIF alone.
        self.registers().sr.set(!SR::UIF::SET.value);
    }
}
