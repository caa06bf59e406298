//! UBRRn calculation for the AVR8 USART in asynchronous mode.

use log::{debug, trace};

#[cfg(feature = "defmt")]
use defmt::Format;

use crate::config::{F_CPU, UART_MAX_ERR_RATE_X10, UBRR_MAX};
use crate::error::CalcError;

#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UartSetting {
    /// Value for the UBRRn register, at most 12 bits wide
    pub ubrr: u16,
    /// U2Xn bit in UCSRnA
    pub double_speed: bool,
    /// Baud rate the USART will run at with `ubrr`
    pub actual_baud: u32,
}

impl UartSetting {
    pub fn error_hz(&self, baud: u32) -> u32 {
        self.actual_baud.abs_diff(baud)
    }

    /// Baud rate error relative to `baud`, in 1/1000.
    pub fn error_permille(&self, baud: u32) -> u32 {
        if baud == 0 {
            return 0;
        }
        let permille = u64::from(self.error_hz(baud)) * 1000 / u64::from(baud);
        u32::try_from(permille).unwrap_or(u32::MAX)
    }
}

/// Clock divider in front of the baud rate generator: 16, or 8 with U2Xn set.
pub const fn prescaler_factor(double_speed: bool) -> u32 {
    if double_speed {
        8
    } else {
        16
    }
}

fn baud_for(f_cpu: u32, factor: u32, ubrr: u32) -> u32 {
    f_cpu / (factor * (ubrr + 1))
}

/// Calculate UBRRn for `baud` using [`F_CPU`].
///
/// With the `uart-error-check` feature (default) the result is rejected when the
/// baud rate error is larger than [`UART_MAX_ERR_RATE_X10`].
pub fn calc_ubrr(baud: u32, double_speed: bool) -> Result<UartSetting, CalcError> {
    calc_ubrr_at(F_CPU, baud, double_speed)
}

/// Same as [`calc_ubrr`], for a CPU running at `f_cpu` Hz.
pub fn calc_ubrr_at(f_cpu: u32, baud: u32, double_speed: bool) -> Result<UartSetting, CalcError> {
    let setting = calc_ubrr_unchecked_at(f_cpu, baud, double_speed)?;

    #[cfg(feature = "uart-error-check")]
    check_error_margin(baud, &setting)?;

    Ok(setting)
}

/// Calculate the UBRRn value closest to `baud`, whatever the error.
pub fn calc_ubrr_unchecked_at(
    f_cpu: u32,
    baud: u32,
    double_speed: bool,
) -> Result<UartSetting, CalcError> {
    if baud == 0 {
        return Err(CalcError::InvalidArgument);
    }

    let factor = prescaler_factor(double_speed);
    let ubrr = baud
        .checked_mul(factor)
        .map(|divider| f_cpu / divider)
        .and_then(|quotient| quotient.checked_sub(1))
        .filter(|&ubrr| ubrr <= UBRR_MAX)
        .ok_or(CalcError::DivisorOutOfRange { baud })?;

    let actual = baud_for(f_cpu, factor, ubrr);
    let (ubrr, actual_baud) = if actual == baud {
        (ubrr, actual)
    } else {
        // Truncation may have left the neighbouring register value closer to the target
        let neighbour = if actual > baud {
            Some(ubrr + 1).filter(|&next| next <= UBRR_MAX)
        } else {
            ubrr.checked_sub(1)
        };

        match neighbour {
            Some(neighbour) => {
                let neighbour_baud = baud_for(f_cpu, factor, neighbour);
                closer(baud, (ubrr, actual), (neighbour, neighbour_baud))
            }
            None => (ubrr, actual),
        }
    };

    trace!("{} baud (U2X={}): UBRR {} gives {} baud", baud, double_speed, ubrr, actual_baud);

    Ok(UartSetting {
        ubrr: ubrr as u16,
        double_speed,
        actual_baud,
    })
}

/// Pick the (ubrr, baud) candidate with the smaller error, preferring `first` on a tie.
fn closer(baud: u32, first: (u32, u32), second: (u32, u32)) -> (u32, u32) {
    if second.1.abs_diff(baud) < first.1.abs_diff(baud) {
        second
    } else {
        first
    }
}

/// Check that `setting` is within [`UART_MAX_ERR_RATE_X10`] / 10 percent of `baud`.
pub fn check_error_margin(baud: u32, setting: &UartSetting) -> Result<(), CalcError> {
    let margin_hz = (u64::from(baud) * u64::from(UART_MAX_ERR_RATE_X10) / 1000) as u32;
    let error_hz = setting.error_hz(baud);

    if error_hz > margin_hz {
        debug!(
            "{} baud: UBRR {} is off by {} Hz, allowed {} Hz",
            baud, setting.ubrr, error_hz, margin_hz
        );
        return Err(CalcError::ErrorMarginExceeded { error_hz, margin_hz });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOCK: u32 = 16_000_000;

    #[test]
    fn keeps_truncated_value_when_closest() {
        let setting = calc_ubrr_unchecked_at(CLOCK, 9600, false).unwrap();
        assert_eq!(setting.ubrr, 103);
        assert_eq!(setting.actual_baud, 9615);
        assert_eq!(setting.error_hz(9600), 15);
        assert_eq!(setting.error_permille(9600), 1);
    }

    #[test]
    fn moves_to_neighbour_when_closer() {
        // UBRR 7 gives 125000 baud, UBRR 8 gives 111111
        let setting = calc_ubrr_unchecked_at(CLOCK, 115_200, false).unwrap();
        assert_eq!(setting.ubrr, 8);
        assert_eq!(setting.actual_baud, 111_111);
    }

    #[test]
    fn exact_match() {
        let setting = calc_ubrr_unchecked_at(CLOCK, 250_000, false).unwrap();
        assert_eq!((setting.ubrr, setting.actual_baud), (3, 250_000));

        let setting = calc_ubrr_unchecked_at(CLOCK, 1_000_000, false).unwrap();
        assert_eq!((setting.ubrr, setting.actual_baud), (0, 1_000_000));
    }

    #[test]
    fn double_speed_halves_the_factor() {
        let setting = calc_ubrr_unchecked_at(CLOCK, 115_200, true).unwrap();
        assert!(setting.double_speed);
        assert_eq!(setting.ubrr, 16);
        assert_eq!(setting.actual_baud, 117_647);
    }

    #[test]
    fn out_of_range_divisors() {
        assert_eq!(
            calc_ubrr_unchecked_at(CLOCK, 100, false),
            Err(CalcError::DivisorOutOfRange { baud: 100 })
        );
        assert_eq!(
            calc_ubrr_unchecked_at(CLOCK, 2_000_000, false),
            Err(CalcError::DivisorOutOfRange { baud: 2_000_000 })
        );
        assert_eq!(
            calc_ubrr_unchecked_at(CLOCK, u32::MAX, true),
            Err(CalcError::DivisorOutOfRange { baud: u32::MAX })
        );
    }

    #[test]
    fn zero_baud_is_invalid() {
        assert_eq!(calc_ubrr_at(CLOCK, 0, false), Err(CalcError::InvalidArgument));
        assert_eq!(calc_ubrr_at(CLOCK, 0, true), Err(CalcError::InvalidArgument));
    }

    #[test]
    fn tie_prefers_first_candidate() {
        assert_eq!(closer(100, (4, 90), (5, 110)), (4, 90));
        assert_eq!(closer(100, (4, 90), (5, 109)), (5, 109));
    }

    #[test]
    fn error_margin() {
        let within = UartSetting {
            ubrr: 16,
            double_speed: true,
            actual_baud: 117_647,
        };
        assert_eq!(check_error_margin(115_200, &within), Ok(()));

        let outside = UartSetting {
            ubrr: 8,
            double_speed: false,
            actual_baud: 111_111,
        };
        assert_eq!(
            check_error_margin(115_200, &outside),
            Err(CalcError::ErrorMarginExceeded { error_hz: 4089, margin_hz: 2880 })
        );
    }

    #[test]
    fn error_equal_to_margin_passes() {
        // 2.5% of 1000 baud is exactly 25 Hz
        let at_margin = UartSetting {
            ubrr: 0,
            double_speed: false,
            actual_baud: 1025,
        };
        assert_eq!(check_error_margin(1000, &at_margin), Ok(()));

        let past_margin = UartSetting {
            actual_baud: 1026,
            ..at_margin
        };
        assert_eq!(
            check_error_margin(1000, &past_margin),
            Err(CalcError::ErrorMarginExceeded { error_hz: 26, margin_hz: 25 })
        );
    }

    #[test]
    fn neighbour_above_register_width_is_skipped() {
        // UBRR 4095 gives 5001 baud, the neighbour 4096 does not fit into 12 bits
        let setting = calc_ubrr_unchecked_at(327_755_000, 5000, false).unwrap();
        assert_eq!(setting.ubrr, 4095);
        assert_eq!(setting.actual_baud, 5001);
    }

    #[test]
    fn largest_register_value() {
        let setting = calc_ubrr_unchecked_at(65_536_000, 1000, false).unwrap();
        assert_eq!((setting.ubrr, setting.actual_baud), (4095, 1000));

        assert_eq!(
            calc_ubrr_unchecked_at(65_552_000, 1000, false),
            Err(CalcError::DivisorOutOfRange { baud: 1000 })
        );
    }

    #[test]
    fn permille_saturates() {
        let setting = UartSetting {
            ubrr: 0,
            double_speed: false,
            actual_baud: u32::MAX,
        };
        assert_eq!(setting.error_permille(1), u32::MAX);
        assert_eq!(setting.error_permille(0), 0);
    }

    #[cfg(feature = "uart-error-check")]
    #[test]
    fn checked_calculation_rejects_large_error() {
        assert_eq!(
            calc_ubrr_at(CLOCK, 115_200, false),
            Err(CalcError::ErrorMarginExceeded { error_hz: 4089, margin_hz: 2880 })
        );
        assert_eq!(calc_ubrr_at(CLOCK, 115_200, true).map(|s| s.ubrr), Ok(16));
    }
}
