use thiserror::Error;

/// Reasons a peripheral calculation can fail.
///
/// The [`compat`](crate::compat) functions collapse all of these into a `-1` return value.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CalcError {
    /// Zero frequency or baud rate, or an unknown timer id
    #[error("invalid argument")]
    InvalidArgument,
    /// No prescaler keeps the compare value inside the timer's counter range
    #[error("frequency {freq} Hz is not achievable with the selected timer")]
    UnachievableFrequency { freq: u32 },
    /// Computed UBRR value does not fit into 12 bits
    #[error("UBRR value for {baud} baud is out of range")]
    DivisorOutOfRange { baud: u32 },
    #[error("baud rate error of {error_hz} Hz exceeds the allowed {margin_hz} Hz")]
    ErrorMarginExceeded { error_hz: u32, margin_hz: u32 },
}
