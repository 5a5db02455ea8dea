//! Display helpers for value widgets

use rust_decimal::Decimal;

/// Render a decimal USD string as whole dollars, e.g. `"2500.75"` → `"$2,500.00"`.
///
/// The fractional part is truncated, not rounded. Leading whitespace and a
/// sign are accepted and parsing stops at the first non-digit, so `"12abc"`
/// renders as `"$12.00"`. Returns `None` when no digits lead the input.
pub fn format_usd(value: &str) -> Option<String> {
    let trimmed = value.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..digits_end];
    if digits.is_empty() {
        return None;
    }

    let digits = digits.trim_start_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative && digits != "0" { "-" } else { "" };
    Some(format!("{sign}${grouped}.00"))
}

/// [`format_usd`] for a statistic already held as a [`Decimal`]
pub fn format_usd_amount(value: Decimal) -> String {
    format_usd(&value.trunc().to_string()).unwrap_or_else(|| "$0.00".to_string())
}
