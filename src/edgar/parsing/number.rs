use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ExtractError, Result};

static FOOTNOTE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\s*\w{1,3}\s*\]").expect("footnote pattern is valid"));

/// Parenthesised notes without digits, such as `(a)` or `(*)`.
static PAREN_NOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^()0-9]*\)").expect("note pattern is valid"));

/// Converts a statement cell such as `$ (1,234.5)` into a signed integer in
/// whole units, multiplied by `scale`.
///
/// Thousands separators, currency symbols and footnote markers are dropped.
/// A parenthesis opened before the first digit, or a leading minus, makes
/// the value negative. Fractional digits
/// are scaled first and then rounded half away from zero, so `1.5` in
/// millions keeps its precision.
pub fn normalize(raw: &str, scale: i64) -> Result<i64> {
    let invalid = || ExtractError::InvalidNumber(raw.to_string());

    let text = FOOTNOTE_MARKER.replace_all(raw, "");
    let text = PAREN_NOTE.replace_all(&text, "");
    let first_digit = text.find(|c: char| c.is_ascii_digit() || c == '.');
    let opens_before_digits = match (text.find('('), first_digit) {
        (Some(paren), Some(digit)) => paren < digit,
        _ => false,
    };
    let negative = opens_before_digits || text.trim_start().starts_with(['-', '\u{2212}']);

    let mut whole = String::new();
    let mut fraction = String::new();
    let mut seen_point = false;
    for c in text.chars() {
        match c {
            '0'..='9' if seen_point => fraction.push(c),
            '0'..='9' => whole.push(c),
            '.' if !seen_point => seen_point = true,
            // a second point means this is not a single number
            '.' => return Err(invalid()),
            _ => {}
        }
    }
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }

    let whole: i128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let scale = i128::from(scale);
    let mut magnitude = whole.checked_mul(scale).ok_or_else(invalid)?;

    if !fraction.is_empty() {
        // digits beyond 18 cannot change the rounded result at any sane scale
        fraction.truncate(18);
        let digits = u32::try_from(fraction.len()).map_err(|_| invalid())?;
        let denominator = 10_i128.pow(digits);
        let numerator: i128 = fraction.parse().map_err(|_| invalid())?;
        let scaled = numerator.checked_mul(scale).ok_or_else(invalid)?;
        let mut extra = scaled / denominator;
        if (scaled % denominator) * 2 >= denominator {
            extra += 1;
        }
        magnitude = magnitude.checked_add(extra).ok_or_else(invalid)?;
    }

    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_separators_and_parentheses() {
        assert_eq!(normalize("(1,234)", 1).unwrap(), -1234);
        assert_eq!(normalize("1,234", 1000).unwrap(), 1_234_000);
        assert_eq!(normalize("$ 1,000", 1000).unwrap(), 1_000_000);
        assert_eq!(normalize("$(250)", 1).unwrap(), -250);
        assert_eq!(normalize("(42", 1).unwrap(), -42);
        assert_eq!(normalize("-17", 10).unwrap(), -170);
        assert_eq!(normalize("\u{2212}5", 1).unwrap(), -5);
    }

    #[test]
    fn test_normalize_rejects_cells_without_digits() {
        for raw in ["", "   ", "$", "—", "-", "( )", "N/A"] {
            for scale in [1, 1000, 1_000_000] {
                assert!(
                    matches!(normalize(raw, scale), Err(ExtractError::InvalidNumber(_))),
                    "'{}' should not parse",
                    raw
                );
            }
        }
    }

    #[test]
    fn test_normalize_decimals() {
        assert_eq!(normalize("1.5", 1_000_000).unwrap(), 1_500_000);
        assert_eq!(normalize("12.49", 1).unwrap(), 12);
        assert_eq!(normalize("12.5", 1).unwrap(), 13);
        assert_eq!(normalize("(12.5)", 1).unwrap(), -13);
        assert_eq!(normalize(".25", 1000).unwrap(), 250);
        assert_eq!(normalize("0.0004", 1000).unwrap(), 0);
        assert!(normalize("1.2.3", 1).is_err());
    }

    #[test]
    fn test_normalize_strips_footnote_markers() {
        assert_eq!(normalize("1,234 [1]", 1).unwrap(), 1234);
        assert_eq!(normalize("$ 98 [a]", 1000).unwrap(), 98_000);
    }

    #[test]
    fn test_normalize_trailing_parenthesised_note_keeps_sign() {
        assert_eq!(normalize("1,234 (a)", 1).unwrap(), 1234);
        assert_eq!(normalize("$ 56 (*)", 1000).unwrap(), 56_000);
        assert_eq!(normalize("(b) 78", 1).unwrap(), 78);
        assert_eq!(normalize("(1,234) (a)", 1).unwrap(), -1234);
        assert_eq!(normalize("$ (9)", 1).unwrap(), -9);
    }

    #[test]
    fn test_normalize_overflow_is_invalid() {
        assert!(normalize("9,223,372,036,854,775,807", 1).is_ok());
        assert!(normalize("9,223,372,036,854,775,807", 1000).is_err());
        assert!(normalize("99999999999999999999999999999999999999999", 1).is_err());
    }
}
