//! Decimal amount conversion
//!
//! Converts a human-written decimal string into integer base units for a
//! mint with a known decimal precision. Conversion is exact string
//! arithmetic: no floats, and fractional digits beyond the mint's precision
//! are rounded to nearest (half away from zero), never silently truncated.

/// Convert a decimal string to base units: `round(amount * 10^decimals)`
///
/// Accepts thousands separators (commas), an optional fractional part and
/// surrounding whitespace. Rejects empty, negative, malformed, or
/// overflowing amounts.
///
/// # Arguments
/// * `amount` - decimal string as written in the input, e.g. "1,250.5"
/// * `decimals` - the mint's recorded decimal precision
pub fn to_base_units(amount: &str, decimals: u8) -> Result<u64, String> {
    let cleaned: String = amount.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err("empty amount".to_string());
    }
    if cleaned.starts_with('-') {
        return Err("amount must not be negative".to_string());
    }

    let (int_part, frac_part) = match cleaned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (cleaned.as_str(), ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err("no digits in amount".to_string());
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err("amount contains non-digit characters".to_string());
    }

    let decimals = decimals as usize;
    let whole: u128 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse()
            .map_err(|_| "integer part too large".to_string())?
    };

    // Scale the fraction to exactly `decimals` digits, remembering the first
    // dropped digit for rounding.
    let (kept, dropped) = if frac_part.len() <= decimals {
        (frac_part.to_string() + &"0".repeat(decimals - frac_part.len()), None)
    } else {
        (
            frac_part[..decimals].to_string(),
            frac_part[decimals..].chars().next(),
        )
    };
    let frac: u128 = if kept.is_empty() {
        0
    } else {
        kept.parse().map_err(|_| "fractional part too large".to_string())?
    };

    let scale = 10u128
        .checked_pow(decimals as u32)
        .ok_or_else(|| "decimal precision too large".to_string())?;
    let mut base = whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| "amount overflows".to_string())?;

    // Round to nearest, half away from zero, on the first dropped digit
    if dropped.is_some_and(|d| d >= '5') {
        base = base
            .checked_add(1)
            .ok_or_else(|| "amount overflows".to_string())?;
    }

    u64::try_from(base).map_err(|_| "amount exceeds the 64-bit base-unit range".to_string())
}
