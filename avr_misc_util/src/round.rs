//! Rounding of 8-bit values to the nearest multiple of another value.
//!
//! Both functions round half up, e.g. 15 becomes 20 for a multiple of 10. They only
//! differ when the nearest multiple does not fit into a u8.

/// Round `x` to the nearest multiple of `y`, wrapping on overflow.
///
/// On overflow the sum is truncated to 8 bits and rounded down to a multiple of `y`
/// again, so the result is still a multiple of `y` (usually 0). `y == 0` returns 0.
pub fn round_near_mul_wovf(x: u8, y: u8) -> u8 {
    if y == 0 {
        return 0;
    }

    let y = u16::from(y);
    let mut temp = u16::from(x) + y / 2;
    temp -= temp % y;

    if temp > u16::from(u8::MAX) {
        // Overflow, keep the low byte
        temp = (temp as u8).into();
        temp = (temp / y) * y;
    }

    temp as u8
}

/// Round `x` to the nearest multiple of `y`, saturating on overflow.
///
/// On overflow the result is the largest multiple of `y` not above `x`, so 255 becomes
/// 250 for a multiple of 10. `y == 0` returns 0.
pub fn round_near_mul_wsat(x: u8, y: u8) -> u8 {
    if y == 0 {
        return 0;
    }

    let mut temp = u16::from(x) + u16::from(y / 2);
    temp -= temp % u16::from(y);

    if temp > u16::from(u8::MAX) {
        return (x / y) * y;
    }

    temp as u8
}
