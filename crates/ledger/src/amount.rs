//! Numeric backends for the dual-unit ledger
//!
//! Two arithmetic policies are supported, one per deployment:
//! - `rust_decimal::Decimal`: exact decimal arithmetic, rounding toward zero
//!   only when a balance is reported
//! - `u128`: fixed-point smallest units with floor division at every step,
//!   widened through `num-bigint` where a product would overflow
//!
//! A ledger is generic over its amount type, so a single instance can never
//! mix the two.

use crate::errors::{LedgerError, LedgerResult};
use rft_types::{
    bps_of_u128, cmp_ratio_u128, mul_div_u128, BPS_DENOMINATOR, MAX_FIXED_POINT_SUPPLY,
    REFLECTED_SCALE,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Arithmetic policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericBackend {
    /// Arbitrary-precision decimal, truncated on output
    #[default]
    Decimal,
    /// Integer smallest units, floor division everywhere
    #[serde(rename = "fixed", alias = "fixed_point")]
    FixedPoint,
}

impl fmt::Display for NumericBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericBackend::Decimal => f.write_str("decimal"),
            NumericBackend::FixedPoint => f.write_str("fixed"),
        }
    }
}

/// Amount type usable for both true and reflected units.
///
/// Method names avoid the inherent `checked_*` methods of the implementing
/// types so that calls always resolve to this trait.
pub trait LedgerAmount:
    Copy
    + fmt::Debug
    + fmt::Display
    + PartialEq
    + PartialOrd
    + Default
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    const BACKEND: NumericBackend;

    fn zero() -> Self {
        Self::default()
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    fn is_positive(&self) -> bool {
        *self > Self::zero()
    }

    /// `self + rhs`, failing instead of wrapping.
    fn plus(self, rhs: Self) -> LedgerResult<Self>;

    /// `self - rhs`, failing when the result would be negative.
    fn minus(self, rhs: Self) -> LedgerResult<Self>;

    /// `self * numer / denom`. A zero denominator means the rate is
    /// undefined and yields `ExhaustedSupply`.
    fn mul_div(self, numer: Self, denom: Self) -> LedgerResult<Self>;

    /// Portion of `self` given in basis points.
    fn portion_bps(self, bps: u32) -> LedgerResult<Self>;

    /// Reflected total issued alongside a genesis true supply of `self`.
    fn genesis_reflected(self) -> LedgerResult<Self>;

    /// Round toward zero at `scale` decimal places (no-op for integers).
    fn truncate_to(self, scale: u32) -> Self;

    /// Exact ordering of `an / ad` against `bn / bd`.
    fn cmp_ratio(an: Self, ad: Self, bn: Self, bd: Self) -> Ordering;

    /// Parse a human-entered amount.
    fn parse_amount(input: &str) -> LedgerResult<Self>;

    /// Smallest unit distinguishable in a reported balance.
    fn smallest_unit(scale: u32) -> Self;
}

// -----------------------------------------------------------------------------
// Decimal backend
// -----------------------------------------------------------------------------

impl LedgerAmount for Decimal {
    const BACKEND: NumericBackend = NumericBackend::Decimal;

    fn plus(self, rhs: Self) -> LedgerResult<Self> {
        self.checked_add(rhs)
            .ok_or(LedgerError::ArithmeticOverflow("adding decimal amounts"))
    }

    fn minus(self, rhs: Self) -> LedgerResult<Self> {
        match self.checked_sub(rhs) {
            Some(diff) if diff >= Decimal::ZERO => Ok(diff),
            _ => Err(LedgerError::ArithmeticOverflow("subtracting decimal amounts")),
        }
    }

    fn mul_div(self, numer: Self, denom: Self) -> LedgerResult<Self> {
        if denom.is_zero() {
            return Err(LedgerError::ExhaustedSupply);
        }
        // Multiply first to keep precision; divide first only when the
        // product would not fit.
        self.checked_mul(numer)
            .and_then(|product| product.checked_div(denom))
            .or_else(|| numer.checked_div(denom).and_then(|q| self.checked_mul(q)))
            .ok_or(LedgerError::ArithmeticOverflow("scaling a decimal amount"))
    }

    fn portion_bps(self, bps: u32) -> LedgerResult<Self> {
        self.mul_div(Decimal::from(bps), Decimal::from(BPS_DENOMINATOR))
    }

    fn genesis_reflected(self) -> LedgerResult<Self> {
        Ok(self)
    }

    fn truncate_to(self, scale: u32) -> Self {
        self.round_dp_with_strategy(scale, RoundingStrategy::ToZero)
    }

    fn cmp_ratio(an: Self, ad: Self, bn: Self, bd: Self) -> Ordering {
        match (an.checked_mul(bd), bn.checked_mul(ad)) {
            (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
            _ => {
                let lhs = an.checked_div(ad).unwrap_or(Decimal::MAX);
                let rhs = bn.checked_div(bd).unwrap_or(Decimal::MAX);
                lhs.cmp(&rhs)
            }
        }
    }

    fn parse_amount(input: &str) -> LedgerResult<Self> {
        Decimal::from_str(input.trim()).map_err(|_| LedgerError::InvalidAmount {
            amount: input.to_string(),
            reason: "not a decimal number",
        })
    }

    fn smallest_unit(scale: u32) -> Self {
        Decimal::new(1, scale.min(28))
    }
}

// -----------------------------------------------------------------------------
// Fixed-point backend
// -----------------------------------------------------------------------------

impl LedgerAmount for u128 {
    const BACKEND: NumericBackend = NumericBackend::FixedPoint;

    fn plus(self, rhs: Self) -> LedgerResult<Self> {
        self.checked_add(rhs)
            .ok_or(LedgerError::ArithmeticOverflow("adding fixed-point amounts"))
    }

    fn minus(self, rhs: Self) -> LedgerResult<Self> {
        self.checked_sub(rhs)
            .ok_or(LedgerError::ArithmeticOverflow("subtracting fixed-point amounts"))
    }

    fn mul_div(self, numer: Self, denom: Self) -> LedgerResult<Self> {
        if denom == 0 {
            return Err(LedgerError::ExhaustedSupply);
        }
        mul_div_u128(self, numer, denom)
            .ok_or(LedgerError::ArithmeticOverflow("scaling a fixed-point amount"))
    }

    fn portion_bps(self, bps: u32) -> LedgerResult<Self> {
        bps_of_u128(self, bps).ok_or(LedgerError::ArithmeticOverflow("fee portion"))
    }

    fn genesis_reflected(self) -> LedgerResult<Self> {
        self.checked_mul(REFLECTED_SCALE).ok_or_else(|| {
            LedgerError::InvalidParameter(format!(
                "initial supply {self} exceeds the fixed-point maximum {MAX_FIXED_POINT_SUPPLY}"
            ))
        })
    }

    fn truncate_to(self, _scale: u32) -> Self {
        self
    }

    fn cmp_ratio(an: Self, ad: Self, bn: Self, bd: Self) -> Ordering {
        cmp_ratio_u128(an, ad, bn, bd)
    }

    fn parse_amount(input: &str) -> LedgerResult<Self> {
        input
            .trim()
            .replace('_', "")
            .parse::<u128>()
            .map_err(|_| LedgerError::InvalidAmount {
                amount: input.to_string(),
                reason: "not a whole number of smallest units",
            })
    }

    fn smallest_unit(_scale: u32) -> Self {
        1
    }
}
