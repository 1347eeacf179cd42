//! Exact decimal <-> atomic unit conversion.
//!
//! Amounts never pass through floating point. A decimal string either maps
//! to exactly one atomic value or is rejected.

use crate::constants::{ATOMIC_UNITS_PER_COIN, COIN_DECIMALS, MAX_MONEY};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount must be a non-empty string")]
    Empty,

    #[error("invalid amount: {0}")]
    Invalid(String),

    #[error("too many decimal places (max {max})")]
    TooPrecise { max: u32 },

    #[error("amount exceeds the representable maximum of {max} atomic units")]
    Overflow { max: u64 },
}

/// Parse a decimal coin amount (e.g. `"1.5"`, `"0.00000001"`) into atomic units.
pub fn parse_amount(s: &str) -> Result<u64, AmountError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }
    if s.starts_with('-') || s.starts_with('+') {
        return Err(AmountError::Invalid(s.to_string()));
    }

    let (whole_str, frac_str) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole_str.is_empty() && frac_str.is_empty() {
        return Err(AmountError::Invalid(s.to_string()));
    }
    if !whole_str.chars().all(|c| c.is_ascii_digit())
        || !frac_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(AmountError::Invalid(s.to_string()));
    }

    let frac_trimmed = frac_str.trim_end_matches('0');
    if frac_trimmed.len() > COIN_DECIMALS as usize {
        return Err(AmountError::TooPrecise { max: COIN_DECIMALS });
    }

    let overflow = AmountError::Overflow { max: MAX_MONEY };
    let whole: u64 = if whole_str.is_empty() {
        0
    } else {
        whole_str.parse().map_err(|_| overflow.clone())?
    };
    let frac: u64 = if frac_trimmed.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac_trimmed, width = COIN_DECIMALS as usize)
            .parse()
            .map_err(|_| AmountError::Invalid(s.to_string()))?
    };

    let atomic = whole
        .checked_mul(ATOMIC_UNITS_PER_COIN)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| overflow.clone())?;
    if atomic > MAX_MONEY {
        return Err(overflow);
    }
    Ok(atomic)
}

/// Format atomic units as a decimal coin string with full precision.
pub fn format_amount(atomic: u64) -> String {
    let whole = atomic / ATOMIC_UNITS_PER_COIN;
    let frac = atomic % ATOMIC_UNITS_PER_COIN;
    format!("{}.{:0width$}", whole, frac, width = COIN_DECIMALS as usize)
}
