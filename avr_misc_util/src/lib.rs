#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! Integer-only helpers for configuring AVR8 peripherals at run time: timer prescaler
//! and compare values, UART baud rate registers and rounding to a multiple.
//!
//! All calculations are pure. The CPU clock comes from the `F_CPU` environment
//! variable at build time, see [`config::F_CPU`].

pub mod compat;
pub mod config;
pub mod error;
pub mod round;
pub mod timer;
pub mod uart;

pub use error::CalcError;
pub use round::{round_near_mul_wovf, round_near_mul_wsat};
pub use timer::{calc_prescaler, TimerId, TimerSetting};
pub use uart::{calc_ubrr, UartSetting};
