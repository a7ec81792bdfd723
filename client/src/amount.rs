//! Lossless conversion between raw on-chain integers and decimal values.
//!
//! A currency network stores every amount as an integer in its smallest unit
//! ("raw"). Users think in decimals ("value"). The two meet at every
//! boundary of this crate, and the conversion is exact in both directions:
//! arbitrary-precision integers and string arithmetic on the decimal point,
//! never a float.
//!
//! ```
//! use creditnet_client::amount::{to_amount, to_raw};
//!
//! let raw = to_raw("1.23", 2).unwrap();
//! assert_eq!(raw.to_string(), "123");
//! assert_eq!(to_amount(&raw, 2).value(), "1.23");
//! ```

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::Serialize;

use crate::error::PrepareError;

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// A monetary amount in both representations.
///
/// Invariant: `value == raw / 10^decimals` exactly. `value` is rendered in
/// canonical fixed-point form: no exponent, no trailing fractional zeros, no
/// trailing decimal point, and at most `decimals` fractional digits.
///
/// Instances are only produced by [`to_amount`] (or helpers built on it), so
/// the invariant cannot be broken from outside this module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
    #[serde(with = "crate::serde_helpers::biguint_string")]
    raw: BigUint,
    value: String,
    decimals: u32,
}

impl Amount {
    /// Zero in the given precision.
    pub fn zero(decimals: u32) -> Self {
        to_amount(&BigUint::zero(), decimals)
    }

    /// Parses a decimal value into an amount of the given precision.
    ///
    /// The resulting `value` is the canonical rendering, so `"1.50"` comes
    /// back as `"1.5"`.
    pub fn from_value(value: &str, decimals: u32) -> Result<Self, PrepareError> {
        let raw = to_raw(value, decimals)?;
        Ok(to_amount(&raw, decimals))
    }

    /// The integer amount in the smallest unit.
    pub fn raw(&self) -> &BigUint {
        &self.raw
    }

    /// The decimal rendering of the amount.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Number of fractional digits between `raw` and `value`.
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Returns `true` if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// The raw amount as an unpadded `0x`-prefixed hex string.
    pub fn raw_hex(&self) -> String {
        format!("0x{}", self.raw.to_str_radix(16))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Computes `value * 10^decimals` exactly.
///
/// Accepts plain non-negative decimal strings such as `"12"`, `"0.5"`,
/// `".5"` or `"3."`. Fractional digits beyond `decimals` are accepted only if
/// they are all zero, since dropping them changes nothing. Anything else
/// would silently lose money and fails with
/// [`PrepareError::InvalidAmountPrecision`].
pub fn to_raw(value: &str, decimals: u32) -> Result<BigUint, PrepareError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PrepareError::InvalidAmount("amount is empty".into()));
    }
    if trimmed.starts_with('-') {
        return Err(PrepareError::InvalidAmount(format!("{trimmed} is negative")));
    }

    let (int_part, frac_part) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
    {
        return Err(PrepareError::InvalidAmount(format!(
            "{trimmed} is not a decimal number"
        )));
    }

    let width = decimals as usize;
    let (kept, dropped) = if frac_part.len() > width {
        frac_part.split_at(width)
    } else {
        (frac_part, "")
    };
    if dropped.bytes().any(|b| b != b'0') {
        return Err(PrepareError::InvalidAmountPrecision {
            value: trimmed.to_string(),
            decimals,
        });
    }

    let mut digits = String::with_capacity(int_part.len() + width);
    digits.push_str(int_part);
    digits.push_str(kept);
    digits.extend(std::iter::repeat('0').take(width - kept.len()));
    if digits.is_empty() {
        return Ok(BigUint::zero());
    }

    BigUint::from_str(&digits).map_err(|e| PrepareError::InvalidAmount(format!("{trimmed}: {e}")))
}

/// Renders a raw integer as an [`Amount`] with `decimals` fractional digits.
///
/// Never fails: every non-negative integer has an exact decimal rendering.
pub fn to_amount(raw: &BigUint, decimals: u32) -> Amount {
    Amount {
        raw: raw.clone(),
        value: format_value(raw, decimals),
        decimals,
    }
}

fn format_value(raw: &BigUint, decimals: u32) -> String {
    let digits = raw.to_str_radix(10);
    let width = decimals as usize;
    if width == 0 {
        return digits;
    }

    // Left-pad so there is at least one integer digit.
    let padded = if digits.len() <= width {
        let mut s = "0".repeat(width + 1 - digits.len());
        s.push_str(&digits);
        s
    } else {
        digits
    };

    let (int_part, frac_part) = padded.split_at(padded.len() - width);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
