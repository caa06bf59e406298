//! Flat interface with sentinel return values, for callers that port code from the
//! avr-libc style API. Every error is reported as `-1`.

use crate::timer::{self, TimerId};
use crate::uart;

pub use crate::round::{round_near_mul_wovf, round_near_mul_wsat};

/// Calculate prescaler and compare value for `freq` Hz on timer `timer_id` (0 to 5).
///
/// Returns the zero-based index of the prescaler in the timer's set and writes the
/// OCRnA value to `timer_ticks`, or returns -1 and leaves `timer_ticks` untouched.
/// The index is one less than the CSn2:0 field value, see
/// [`TimerSetting::cs_bits`](crate::timer::TimerSetting::cs_bits) before writing TCCRnB.
pub fn calc_presc_cs_bits(freq: u32, timer_id: u8, timer_ticks: &mut u16) -> i8 {
    match TimerId::try_from(timer_id).and_then(|timer| timer::calc_prescaler(freq, timer)) {
        Ok(setting) => {
            *timer_ticks = setting.ticks;
            setting.prescaler_index as i8
        }
        Err(_) => -1,
    }
}

/// Calculate the UBRRn value for `baudrate`, or -1 (zero baud rate, result larger than
/// 12 bits, baud rate error too big).
pub fn calc_uart_ubrr(baudrate: u32, is_double_speed: bool) -> i16 {
    uart::calc_ubrr(baudrate, is_double_speed)
        .map(|setting| setting.ubrr as i16)
        .unwrap_or(-1)
}
