//! Invariant number formatting and parsing.
//!
//! Every numeric payload in a GhJSON document goes through these helpers so
//! the text form never depends on locale:
//! - `.` is the only decimal separator
//! - no digit grouping
//! - no exponent form on output (exponents are still accepted on input)

use crate::limits::MAX_NUMBER_LEN;

/// Formats a float using the shortest representation that parses back to the
/// same value.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Formats a float with exactly `decimals` fractional digits.
pub fn format_fixed(value: f64, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, value)
}

/// Parses an invariant-culture number token.
///
/// Surrounding whitespace is ignored. Returns `None` for empty or oversized
/// tokens and for anything `f64::from_str` rejects.
pub fn parse_number(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() || token.len() > MAX_NUMBER_LEN {
        return None;
    }
    // `f64::from_str` accepts "inf" and "nan" spellings but never a comma
    if token.contains(',') {
        return None;
    }
    token.parse::<f64>().ok()
}

/// Returns the number of digits after the decimal point in a number token.
pub fn decimal_places(token: &str) -> u32 {
    let token = token.trim();
    match token.find('.') {
        None => 0,
        Some(pos) => token[pos + 1..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .count() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_shortest() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(5.5), "5.5");
        assert_eq!(format_number(-0.25), "-0.25");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1e21), "1000000000000000000000");
    }

    #[test]
    fn test_format_roundtrip() {
        let values = [0.0, -0.0, 1.0 / 3.0, f64::MAX, f64::MIN_POSITIVE, -123456.789, 1e-300];
        for v in values {
            let parsed = parse_number(&format_number(v)).unwrap();
            assert_eq!(v.to_bits(), parsed.to_bits(), "value {v}");
        }
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(5.5, 1), "5.5");
        assert_eq!(format_fixed(5.0, 2), "5.00");
        assert_eq!(format_fixed(7.25, 0), "7");
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("1,5"), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places("5"), 0);
        assert_eq!(decimal_places("5.5"), 1);
        assert_eq!(decimal_places("-0.125"), 3);
        assert_eq!(decimal_places("10.00"), 2);
    }
}
