/// Build configuration.
///
/// The CPU clock is taken from the `F_CPU` environment variable at compile time,
/// in Hz, e.g. `F_CPU=16000000 cargo build`. Underscores are allowed as digit
/// separators. Compilation will fail if the variable is missing, or is not a nonzero
/// decimal number that fits into a u32. Inside this workspace `.cargo/config.toml`
/// sets it to 16 MHz.
pub const F_CPU: u32 = parse_hz(env!("F_CPU"));

/// Max. allowed UART baud rate error in percent, multiplied by 10 (25 = 2.5%).
pub const UART_MAX_ERR_RATE_X10: u32 = 25;

/// UBRRn is a 12-bit register.
pub const UBRR_MAX: u32 = 0x0FFF;

/// Statically parse a decimal frequency string into a u32.
const fn parse_hz(string: &'static str) -> u32 {
    let mut bytes = string.as_bytes();
    assert!(!bytes.is_empty(), "Environment variable F_CPU is empty");
    let mut res: u32 = 0;
    while let [byte, rest @ ..] = bytes {
        bytes = rest;
        let digit = match byte {
            b'0'..=b'9' => (*byte - b'0') as u32,
            b'_' => continue,
            _ => panic!("Environment variable F_CPU is not a valid decimal number"),
        };
        res = match res.checked_mul(10) {
            Some(res) => res,
            None => panic!("Environment variable F_CPU does not fit into a u32"),
        };
        res = match res.checked_add(digit) {
            Some(res) => res,
            None => panic!("Environment variable F_CPU does not fit into a u32"),
        };
    }
    assert!(res != 0, "Environment variable F_CPU must not be zero");
    res
}
