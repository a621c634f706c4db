//! Fixed-point amount model shared by quotes and submissions.
//!
//! Stable amounts and oracle prices are integers scaled by 1e7, GBT
//! quantities are integers in milli-grams. All arithmetic is exact
//! integer arithmetic on [`BigInt`]; nothing here touches floats.

use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::constants::{BPS_DENOMINATOR, STABLE_DECIMALS, STABLE_SCALE, TOKEN_DECIMALS, TOKEN_SCALE};
use crate::types::MintClientError;

/// Stable-asset amount or price, value = integer / 10^7.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScaledAmount(BigInt);

/// GBT quantity in milli-grams, value = integer / 10^3.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenQuantity(BigInt);

/// Fee rate in basis points, always within `[0, 9999]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16")]
pub struct FeeRateBps(u16);

impl ScaledAmount {
    pub fn from_raw(raw: impl Into<BigInt>) -> Self {
        Self(raw.into())
    }

    /// 1.0 stable unit (10,000,000 raw).
    pub fn one() -> Self {
        Self(BigInt::from(STABLE_SCALE))
    }

    pub fn raw(&self) -> &BigInt {
        &self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    /// Parse a decimal string such as `"12.5"` or `"12,5"`.
    ///
    /// Digits beyond the seventh decimal are rounded half-up.
    pub fn parse(input: &str) -> Result<Self, MintClientError> {
        parse_fixed(input, STABLE_DECIMALS)
            .map(Self)
            .ok_or_else(|| {
                MintClientError::InvalidAmount(format!("not a decimal amount: {input:?}"))
            })
    }

    /// Checked conversion to the contracts' `i128` argument type.
    pub fn to_i128(&self) -> Result<i128, MintClientError> {
        to_contract_int(&self.0)
    }

    /// Dollar rendering truncated to cents, e.g. `$1,234.56`.
    pub fn to_usd_string(&self) -> String {
        let scale = BigInt::from(STABLE_SCALE);
        let abs = self.0.abs();
        let dollars = &abs / &scale;
        let cents = (&abs % &scale) / BigInt::from(STABLE_SCALE / 100);
        let sign = if self.0.is_negative() { "-" } else { "" };
        format!(
            "{sign}${}.{:0>2}",
            group_thousands(&dollars.to_string()),
            cents.to_string()
        )
    }
}

impl TokenQuantity {
    pub fn from_milli(milli: impl Into<BigInt>) -> Self {
        Self(milli.into())
    }

    /// Whole grams, e.g. `grams(1)` is 1000 milli-grams.
    pub fn grams(grams: i64) -> Self {
        Self(BigInt::from(grams) * TOKEN_SCALE)
    }

    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    pub fn raw(&self) -> &BigInt {
        &self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    /// Parse a gram count such as `"1.250"`; digits beyond the third
    /// decimal are rounded half-up.
    pub fn parse(input: &str) -> Result<Self, MintClientError> {
        parse_fixed(input, TOKEN_DECIMALS)
            .map(Self)
            .ok_or_else(|| {
                MintClientError::InvalidQuantity(format!("not a gram quantity: {input:?}"))
            })
    }

    pub fn to_i128(&self) -> Result<i128, MintClientError> {
        to_contract_int(&self.0)
    }
}

impl FeeRateBps {
    /// Largest representable rate; 10000 would leave no net input.
    pub const MAX: u16 = (BPS_DENOMINATOR - 1) as u16;

    pub fn new(bps: u16) -> Self {
        Self(bps.min(Self::MAX))
    }

    /// Clamp an estimated (possibly out of range) rate into `[0, 9999]`.
    pub fn from_estimate(estimate: &BigInt) -> Self {
        if estimate.is_negative() {
            return Self(0);
        }
        let clamped = estimate.to_u16().map_or(Self::MAX, |bps| bps.min(Self::MAX));
        Self(clamped)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// `10000 - bps`, the share of the gross that survives the fee.
    pub fn complement(self) -> u16 {
        BPS_DENOMINATOR as u16 - self.0
    }
}

impl TryFrom<u16> for FeeRateBps {
    type Error = MintClientError;

    /// Strict counterpart of [`FeeRateBps::new`] for decoded rates.
    fn try_from(bps: u16) -> Result<Self, Self::Error> {
        if bps > Self::MAX {
            return Err(MintClientError::InvalidAmount(format!(
                "fee rate {bps} bps is outside [0, {}]",
                Self::MAX
            )));
        }
        Ok(Self(bps))
    }
}

impl fmt::Display for ScaledAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fixed(&self.0, STABLE_DECIMALS))
    }
}

impl fmt::Display for TokenQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fixed(&self.0, TOKEN_DECIMALS))
    }
}

impl fmt::Display for FeeRateBps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bps", self.0)
    }
}

/// `ceil(numerator / denominator)` for a positive denominator.
pub fn ceil_div(numerator: &BigInt, denominator: &BigInt) -> BigInt {
    debug_assert!(denominator.is_positive());
    // Truncating division already rounds negative quotients up.
    let quotient = numerator / denominator;
    if (numerator % denominator).is_positive() {
        quotient + 1
    } else {
        quotient
    }
}

/// `round(numerator / denominator)` with ties away from zero, for a
/// positive denominator.
pub fn round_div(numerator: &BigInt, denominator: &BigInt) -> BigInt {
    debug_assert!(denominator.is_positive());
    let two = BigInt::from(2);
    let doubled = numerator.abs() * &two + denominator;
    let magnitude = doubled / (denominator * &two);
    if numerator.is_negative() {
        -magnitude
    } else {
        magnitude
    }
}

fn to_contract_int(value: &BigInt) -> Result<i128, MintClientError> {
    value
        .to_i128()
        .ok_or_else(|| MintClientError::AmountOutOfRange(value.to_string()))
}

fn parse_fixed(input: &str, decimals: u32) -> Option<BigInt> {
    let text = input.trim().replace(',', ".");
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    let (whole, frac) = body.split_once('.').unwrap_or((body, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) {
        return None;
    }

    let width = decimals as usize;
    let (kept, dropped) = if frac.len() > width {
        frac.split_at(width)
    } else {
        (frac, "")
    };
    let mut value: BigInt = format!("{whole}{kept:0<width$}").parse().ok()?;
    if dropped.chars().next().is_some_and(|c| c >= '5') {
        value += 1;
    }
    Some(if negative { -value } else { value })
}

fn format_fixed(value: &BigInt, decimals: u32) -> String {
    let width = decimals as usize;
    let digits = format!("{:0>pad$}", value.abs().to_string(), pad = width + 1);
    let (whole, frac) = digits.split_at(digits.len() - width);
    let sign = if value.is_negative() { "-" } else { "" };
    format!("{sign}{whole}.{frac}")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
