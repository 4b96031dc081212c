//! Money amounts are stored as integer cents.

use crate::error::SprintdeskError;

/// Parse `"1000"`, `"1000.5"` or `"1000.50"` into cents.
pub fn parse_amount(input: &str) -> Result<i64, SprintdeskError> {
    let s = input.trim();
    let invalid = || SprintdeskError::validation(format!("Invalid amount: '{input}'"));

    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };
    if whole.is_empty() || frac.len() > 2 {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => frac.parse().map_err(|_| invalid())?,
    };
    let cents = whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(invalid)?;
    Ok(if negative { -cents } else { cents })
}

/// Render cents as `1000.00`.
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1000").unwrap(), 100_000);
        assert_eq!(parse_amount("12.5").unwrap(), 1_250);
        assert_eq!(parse_amount(" 0.07 ").unwrap(), 7);
        assert_eq!(parse_amount("-3.10").unwrap(), -310);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("1.234").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount(".50").is_err());
        assert!(parse_amount("1,000").is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(60_000), "600.00");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(-1_250), "-12.50");
    }
}
