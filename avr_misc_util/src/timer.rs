//! Prescaler (CS bits) and compare value calculation for AVR8 timers in CTC mode.

use core::ops::Range;

use log::{debug, trace};

#[cfg(feature = "defmt")]
use defmt::Format;

use crate::config::F_CPU;
use crate::error::CalcError;

/// Clock divisors selectable through the CS bits, ordered by timer family.
///  - `0..5`: Timer0 and the 16-bit timers
///  - `5..12`: Timer2, which also has the /32 and /128 options
pub const PRESCALERS: [u16; 12] = [1, 8, 64, 256, 1024, 1, 8, 32, 64, 128, 256, 1024];

const GENERAL_PRESCALERS: Range<usize> = 0..5;
const EXTENDED_PRESCALERS: Range<usize> = 5..12;

/// Timers available on AVR8 microcontrollers
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TimerId {
    Timer0 = 0,
    Timer1,
    Timer2,
    Timer3,
    Timer4,
    Timer5,
}

impl TimerId {
    pub const ALL: [TimerId; 6] = [
        TimerId::Timer0,
        TimerId::Timer1,
        TimerId::Timer2,
        TimerId::Timer3,
        TimerId::Timer4,
        TimerId::Timer5,
    ];

    /// Largest value the compare register (OCRnA) can hold.
    pub const fn counter_max(self) -> u16 {
        match self {
            TimerId::Timer0 | TimerId::Timer2 => u8::MAX as u16,
            TimerId::Timer1 | TimerId::Timer3 | TimerId::Timer4 | TimerId::Timer5 => u16::MAX,
        }
    }

    fn prescaler_range(self) -> Range<usize> {
        match self {
            TimerId::Timer2 => EXTENDED_PRESCALERS,
            _ => GENERAL_PRESCALERS,
        }
    }

    /// Divisors this timer can select, in CS bits order.
    pub fn prescalers(self) -> &'static [u16] {
        &PRESCALERS[self.prescaler_range()]
    }
}

impl TryFrom<u8> for TimerId {
    type Error = CalcError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TimerId::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(CalcError::InvalidArgument)
    }
}

/// Result of a successful prescaler search.
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimerSetting {
    pub timer: TimerId,
    /// Zero-based position of the selected divisor in [`TimerId::prescalers`]
    pub prescaler_index: u8,
    /// Value for the OCRnA register
    pub ticks: u16,
}

impl TimerSetting {
    pub fn prescaler(&self) -> u16 {
        self.timer.prescalers()[usize::from(self.prescaler_index)]
    }

    /// Value for the CSn2:0 bits. 0 stops the timer, so the first divisor is 1.
    pub fn cs_bits(&self) -> u8 {
        self.prescaler_index + 1
    }

    /// Frequency the timer actually runs at with this setting, in Hz.
    pub fn effective_frequency(&self, f_cpu: u32) -> u32 {
        f_cpu / (u32::from(self.prescaler()) * (u32::from(self.ticks) + 1))
    }
}

/// Calculate prescaler and compare value for `freq` Hz on `timer`, using [`F_CPU`].
///
/// Timer2 has more prescalers available than Timer0, so use it if an 8-bit timer is
/// needed and accuracy is important. The result is not checked for frequency error.
pub fn calc_prescaler(freq: u32, timer: TimerId) -> Result<TimerSetting, CalcError> {
    calc_prescaler_at(F_CPU, freq, timer)
}

/// Same as [`calc_prescaler`], for a CPU running at `f_cpu` Hz.
///
/// Divisors are tried from smallest to largest, so the first one that keeps the
/// compare value in range wins.
pub fn calc_prescaler_at(f_cpu: u32, freq: u32, timer: TimerId) -> Result<TimerSetting, CalcError> {
    if freq == 0 {
        return Err(CalcError::InvalidArgument);
    }

    let ratio = f_cpu / freq;
    let counter_max = u32::from(timer.counter_max());

    for (index, &prescaler) in timer.prescalers().iter().enumerate() {
        // Larger divisors only make the quotient smaller
        let Some(ticks) = (ratio / u32::from(prescaler)).checked_sub(1) else {
            break;
        };

        if ticks <= counter_max {
            let setting = TimerSetting {
                timer,
                prescaler_index: index as u8,
                ticks: ticks as u16,
            };
            debug!("{:?} @ {} Hz: prescaler /{}, {} ticks", timer, freq, prescaler, ticks);
            return Ok(setting);
        }

        trace!(
            "{:?} @ {} Hz: /{} needs {} ticks, max {}",
            timer, freq, prescaler, ticks, counter_max
        );
    }

    debug!("{:?} can not run at {} Hz with a {} Hz clock", timer, freq, f_cpu);
    Err(CalcError::UnachievableFrequency { freq })
}
