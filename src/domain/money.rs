use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// For IDR, 1 rupiah = 100 cents, so Rp 1.500,50 = 150050 cents.
pub type Cents = i64;

pub const CURRENCY_PREFIX: &str = "Rp";

/// Format cents as a rupiah string with `.` grouping and `,` decimals.
/// Whole amounts drop the decimals entirely.
/// Example: 1500000 -> "Rp 15.000", 150050 -> "Rp 1.500,50"
pub fn format_rupiah(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    let units = group_thousands(abs_cents / 100);
    let remainder = abs_cents % 100;

    if remainder == 0 {
        format!("{}{} {}", sign, CURRENCY_PREFIX, units)
    } else {
        format!("{}{} {},{:02}", sign, CURRENCY_PREFIX, units, remainder)
    }
}

/// Format cents as a plain decimal with a `.` separator and no grouping.
/// Example: 150050 -> "1500.50", -1 -> "-0.01"
pub fn format_decimal(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    grouped
}

/// Parse a user-typed amount written with `.` as the thousands separator and
/// `,` as the decimal separator. Every `.` is stripped and `,` becomes the
/// decimal point before the numeric parse. Digits past the second decimal are
/// truncated.
/// Example: "1.500,50" -> 150050, "15000" -> 1500000, "2,5" -> 250
pub fn parse_amount(input: &str) -> Result<Cents, ParseAmountError> {
    let normalized = input.trim().replace('.', "").replace(',', ".");
    let (negative, unsigned) = match normalized.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, normalized.strip_prefix('+').unwrap_or(&normalized)),
    };

    let (units_str, decimal_str) = match unsigned.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (unsigned, ""),
    };

    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    if !is_digits(units_str) || !is_digits(decimal_str) {
        return Err(ParseAmountError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| ParseAmountError::Overflow)?
    };

    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        // "5" after the comma means 50 cents
        1 => decimal_str.parse::<i64>().map_err(|_| ParseAmountError::InvalidFormat)? * 10,
        _ => decimal_str[..2]
            .parse()
            .map_err(|_| ParseAmountError::InvalidFormat)?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseAmountError::Overflow)?;

    Ok(if negative { -cents } else { cents })
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Convert cents to the currency-unit number written to the store file.
pub fn cents_to_units(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// Convert a currency-unit number read from the store file back into cents.
/// Returns `None` for NaN, infinities and values outside the `Cents` range.
pub fn units_to_cents(units: f64) -> Option<Cents> {
    let cents = (units * 100.0).round();
    if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(cents as Cents)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    InvalidFormat,
    Overflow,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "amount is empty"),
            ParseAmountError::InvalidFormat => write!(f, "invalid money format"),
            ParseAmountError::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseAmountError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah_whole_amounts() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(99_900), "Rp 999");
        assert_eq!(format_rupiah(100_000), "Rp 1.000");
        assert_eq!(format_rupiah(1_500_000), "Rp 15.000");
        assert_eq!(format_rupiah(123_456_700), "Rp 1.234.567");
    }

    #[test]
    fn test_format_rupiah_fractional_amounts() {
        assert_eq!(format_rupiah(150_050), "Rp 1.500,50");
        assert_eq!(format_rupiah(1), "Rp 0,01");
        assert_eq!(format_rupiah(123_456_789), "Rp 1.234.567,89");
        assert_eq!(format_rupiah(-150_050), "-Rp 1.500,50");
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(150_050), "1500.50");
        assert_eq!(format_decimal(1_500_000), "15000.00");
        assert_eq!(format_decimal(-1), "-0.01");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("15000"), Ok(1_500_000));
        assert_eq!(parse_amount("15.000"), Ok(1_500_000));
        assert_eq!(parse_amount("1.500,50"), Ok(150_050));
        assert_eq!(parse_amount("2,5"), Ok(250));
        assert_eq!(parse_amount(",75"), Ok(75));
        assert_eq!(parse_amount("  5000 "), Ok(500_000));
        assert_eq!(parse_amount("1,999"), Ok(199)); // Truncates
        assert_eq!(parse_amount("0"), Ok(0));
        assert_eq!(parse_amount("-5000"), Ok(-500_000));
        assert_eq!(parse_amount("+10"), Ok(1_000));
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert_eq!(parse_amount(""), Err(ParseAmountError::Empty));
        assert_eq!(parse_amount(" . "), Err(ParseAmountError::Empty));
        assert_eq!(parse_amount("abc"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("1,2,3"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("12 000"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("--5"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(
            parse_amount("99999999999999999999"),
            Err(ParseAmountError::Overflow)
        );
    }

    #[test]
    fn test_units_conversion() {
        assert_eq!(cents_to_units(150_050), 1500.5);
        assert_eq!(units_to_cents(1500.5), Some(150_050));
        assert_eq!(units_to_cents(0.1 + 0.2), Some(30));
        assert_eq!(units_to_cents(f64::NAN), None);
        assert_eq!(units_to_cents(f64::INFINITY), None);
    }
}
