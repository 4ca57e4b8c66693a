//! Latency token decoding.
//!
//! Access logs carry request latency either as an integer number of
//! microseconds (`%D`) or as fractional seconds (`1.123456789`). Both are
//! converted into an integer at a caller-chosen power-of-ten precision, so
//! `precision = 3` yields milliseconds and `precision = 6` microseconds.

use thiserror::Error;

pub const SECOND_EXPONENT: u32 = 0;
pub const MILLISECOND_EXPONENT: u32 = 3;
pub const MICROSECOND_EXPONENT: u32 = 6;
pub const NANOSECOND_EXPONENT: u32 = 9;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LatencyError {
    #[error("latency token is empty")]
    Empty,

    #[error("invalid latency token '{token}'")]
    Invalid { token: String },

    #[error("latency token '{token}' overflows")]
    Overflow { token: String },
}

impl LatencyError {
    fn invalid(token: &str) -> Self {
        Self::Invalid {
            token: token.to_string(),
        }
    }

    fn overflow(token: &str) -> Self {
        Self::Overflow {
            token: token.to_string(),
        }
    }
}

/// Decode a raw latency token into an integer with `precision` decimal
/// digits per second.
///
/// Integer tokens are microseconds: `"4135"` at millisecond precision is `4`,
/// `"99999"` is `100`. Fractional tokens are seconds: `"0.54478"` at
/// millisecond precision is `545`. Rounding is half up in both cases.
pub fn decode(token: &str, precision: u32) -> Result<u64, LatencyError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(LatencyError::Empty);
    }

    match token.split_once('.') {
        None => decode_micros(token, precision),
        Some((whole, fraction)) => decode_seconds(token, whole, fraction, precision),
    }
}

fn decode_micros(token: &str, precision: u32) -> Result<u64, LatencyError> {
    let value = parse_digits(token).ok_or_else(|| LatencyError::invalid(token))?;

    if precision >= MICROSECOND_EXPONENT {
        // Finer than the source resolution: scale up exactly.
        let factor = pow10(precision - MICROSECOND_EXPONENT, token)?;
        return value
            .checked_mul(factor)
            .ok_or_else(|| LatencyError::overflow(token));
    }

    let divisor = pow10(MICROSECOND_EXPONENT - precision, token)?;
    Ok(value / divisor + u64::from(value % divisor >= divisor.div_ceil(2)))
}

fn decode_seconds(
    token: &str,
    whole: &str,
    fraction: &str,
    precision: u32,
) -> Result<u64, LatencyError> {
    if whole.is_empty() && fraction.is_empty() {
        return Err(LatencyError::invalid(token));
    }

    let whole = if whole.is_empty() {
        0
    } else {
        parse_digits(whole).ok_or_else(|| LatencyError::invalid(token))?
    };
    if !fraction.is_empty() && !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LatencyError::invalid(token));
    }

    let precision_digits = precision as usize;
    let kept: String = fraction
        .chars()
        .chain(std::iter::repeat('0'))
        .take(precision_digits)
        .collect();
    let round_up = fraction
        .as_bytes()
        .get(precision_digits)
        .is_some_and(|b| *b >= b'5');

    let scale = pow10(precision, token)?;
    let kept = if kept.is_empty() {
        0
    } else {
        parse_digits(&kept).ok_or_else(|| LatencyError::invalid(token))?
    };

    whole
        .checked_mul(scale)
        .and_then(|v| v.checked_add(kept))
        .and_then(|v| v.checked_add(u64::from(round_up)))
        .ok_or_else(|| LatencyError::overflow(token))
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn pow10(exponent: u32, token: &str) -> Result<u64, LatencyError> {
    10u64
        .checked_pow(exponent)
        .ok_or_else(|| LatencyError::overflow(token))
}
