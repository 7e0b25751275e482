//! Decimal conversion with C `atoi` leniency, used by option parsing.

/// Result of a decimal conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStatus {
    Success,
    /// No digits were found; the value is 0.
    NoDigits,
    /// Value clamped to `i32::MAX`.
    Overflow,
    /// Value clamped to `i32::MIN`.
    Underflow,
}

/// Parses an optionally signed decimal prefix of `s`.
///
/// Skips leading ASCII whitespace, accepts one `+`/`-`, then consumes digits
/// until the first non-digit. Returns `(value, consumed_bytes, status)`.
/// Out-of-range values clamp to the `i32` bounds.
pub fn parse_decimal_prefix(s: &[u8]) -> (i32, usize, ConversionStatus) {
    let mut i = 0;
    while i < s.len() && s[i].is_ascii_whitespace() {
        i += 1;
    }

    let negative = match s.get(i) {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let digits_start = i;
    let mut acc: i64 = 0;
    let mut overflow = false;
    while let Some(&c) = s.get(i) {
        if !c.is_ascii_digit() {
            break;
        }
        if !overflow {
            acc = acc * 10 + i64::from(c - b'0');
            if acc > i64::from(i32::MAX) + 1 {
                overflow = true;
            }
        }
        i += 1;
    }

    if i == digits_start {
        return (0, 0, ConversionStatus::NoDigits);
    }

    let signed = if negative { -acc } else { acc };
    if overflow || signed > i64::from(i32::MAX) {
        if negative {
            return (i32::MIN, i, ConversionStatus::Underflow);
        }
        return (i32::MAX, i, ConversionStatus::Overflow);
    }
    if signed < i64::from(i32::MIN) {
        return (i32::MIN, i, ConversionStatus::Underflow);
    }
    (signed as i32, i, ConversionStatus::Success)
}

/// C `atoi`: the decimal prefix of `s`, or 0 when there is none.
pub fn atoi(s: &[u8]) -> i32 {
    parse_decimal_prefix(s).0
}
