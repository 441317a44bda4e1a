// Licensed under the Apache-2.0 license

//! Internal consistency checks.
//!
//! `clock_assert!` panics when debug assertions or the `strict-asserts`
//! feature are enabled. Otherwise the condition is type-checked and then
//! discarded, so it must not have side effects. Never use it to validate
//! caller input.

macro_rules! clock_assert {
    ($($arg:tt)*) => {
        if cfg!(any(debug_assertions, feature = "strict-asserts")) {
            assert!($($arg)*);
        }
    };
}
