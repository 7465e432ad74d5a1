//! Size parsing and formatting helpers.
//!
//! Thresholds are entered by humans ("2000", "1.5MB", "4KiB"), so they are
//! parsed here into exact byte counts. Display helpers render the binary
//! units the backup reports use.

use humansize::{BINARY, format_size};

use crate::error::{PlannerError, Result};
use crate::fitter::BYTES_PER_TIB;

/// Bytes in one MiB (2^20).
pub const BYTES_PER_MIB: u64 = 1 << 20;

/// Recognised suffixes, longest first so `GiB` wins over `B`.
const UNITS: &[(&str, u64)] = &[
    ("TIB", 1 << 40),
    ("GIB", 1 << 30),
    ("MIB", 1 << 20),
    ("KIB", 1 << 10),
    ("TB", 1_000_000_000_000),
    ("GB", 1_000_000_000),
    ("MB", 1_000_000),
    ("KB", 1_000),
    ("B", 1),
];

/// Number of fractional digits kept when parsing decimal sizes.
const FRACTION_DIGITS: u32 = 9;

/// Parse a human-readable size string into bytes.
///
/// Accepts plain byte counts (`"2000"`), decimal units (`KB`, `MB`, `GB`,
/// `TB`), binary units (`KiB`, `MiB`, `GiB`, `TiB`) and decimal values such
/// as `"1.5GB"`. Units are case-insensitive and may be separated from the
/// number by whitespace. Fractions below one byte are truncated.
///
/// # Errors
///
/// Returns [`PlannerError::InvalidInput`] if the string is empty, malformed,
/// negative, has more than nine fractional digits, or overflows `u64`.
pub fn parse_size(input: &str) -> Result<u64> {
    let upper = input.trim().to_uppercase();
    let (number, multiplier) = split_unit(&upper);
    let number = number.trim_end();

    if number.is_empty() {
        return Err(invalid(input, "missing number"));
    }

    match number.split_once('.') {
        Some((whole, fraction)) => parse_decimal(input, whole, fraction, multiplier),
        None => {
            parse_digits(input, number)?
                .checked_mul(multiplier)
                .ok_or_else(|| invalid(input, "value too large"))
        }
    }
}

fn split_unit(upper: &str) -> (&str, u64) {
    UNITS
        .iter()
        .find_map(|(suffix, multiplier)| {
            upper
                .strip_suffix(suffix)
                .map(|number| (number, *multiplier))
        })
        .unwrap_or((upper, 1))
}

fn parse_decimal(input: &str, whole: &str, fraction: &str, multiplier: u64) -> Result<u64> {
    if fraction.len() > FRACTION_DIGITS as usize || (whole.is_empty() && fraction.is_empty()) {
        return Err(invalid(input, "malformed decimal"));
    }

    let whole = if whole.is_empty() {
        0
    } else {
        parse_digits(input, whole)?
    };

    let fraction_value = if fraction.is_empty() {
        0
    } else {
        parse_digits(input, fraction)?
    };

    // Scale the fraction to nanos so every accepted length uses one divisor.
    let padding = FRACTION_DIGITS - u32::try_from(fraction.len()).unwrap_or(FRACTION_DIGITS);
    let nanos = u128::from(fraction_value) * 10u128.pow(padding);
    let fraction_bytes = nanos * u128::from(multiplier) / 10u128.pow(FRACTION_DIGITS);

    let total = u128::from(whole) * u128::from(multiplier) + fraction_bytes;
    u64::try_from(total).map_err(|_| invalid(input, "value too large"))
}

/// Parse a run of ASCII digits; signs and anything else are rejected.
fn parse_digits(input: &str, digits: &str) -> Result<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(input, "not a number"));
    }
    digits.parse().map_err(|_| invalid(input, "value too large"))
}

fn invalid(input: &str, reason: &str) -> PlannerError {
    PlannerError::invalid_input(format!("invalid size '{input}': {reason}"))
}

/// Format bytes as mebibytes with two decimals, e.g. `"1.50 MB"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_mib(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MIB as f64)
}

/// Format bytes as tebibytes with two decimals, e.g. `"0.90 TB"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_tib(bytes: u64) -> String {
    format!("{:.2} TB", bytes as f64 / BYTES_PER_TIB as f64)
}

/// Format bytes with the most fitting binary unit, e.g. `"1.5 GiB"`.
#[must_use]
pub fn format_human(bytes: u64) -> String {
    format_size(bytes, BINARY)
}
