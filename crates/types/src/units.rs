//! RFT unit and fee constants
//!
//! ## Units
//! - True units are what holders see; reflected units are internal
//! - Fee rates are basis points (1 bps = 0.01%), never floats
//! - Fixed-point deployments scale the genesis reflected total by
//!   [`REFLECTED_SCALE`] so that floor division keeps enough precision

use num_bigint::BigUint;
use num_traits::ToPrimitive;

// =============================================================================
// FEE RATES
// =============================================================================

/// Basis points in one whole (100%).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Default burn share of every fee-bearing transfer (2%).
pub const DEFAULT_BURN_BPS: u32 = 200;

/// Default reflection share of every fee-bearing transfer (3%).
pub const DEFAULT_REFLECTION_BPS: u32 = 300;

// =============================================================================
// SUPPLY
// =============================================================================

/// Default genesis supply in true units.
pub const DEFAULT_INITIAL_SUPPLY: u128 = 100_000_000;

/// Reflected units per true unit at genesis for fixed-point deployments.
///
/// The reflected total lives in a `u128`, so the largest fixed-point genesis
/// supply is `u128::MAX / REFLECTED_SCALE`, about 3.4 * 10^20 smallest units.
/// With 18 decimals that is roughly 340 whole tokens; pick a coarser smallest
/// unit (or the decimal backend) for larger supplies.
pub const REFLECTED_SCALE: u128 = 1_000_000_000_000_000_000;

/// Largest genesis supply a fixed-point deployment accepts.
pub const MAX_FIXED_POINT_SUPPLY: u128 = u128::MAX / REFLECTED_SCALE;

/// Decimal places kept by decimal deployments when reporting balances.
pub const DEFAULT_OUTPUT_SCALE: u32 = 8;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// `n * mul / div` with floor rounding.
///
/// Uses a `u128` fast path and widens to `BigUint` when the product
/// overflows. Returns `None` if `div` is zero or the quotient does not fit.
pub fn mul_div_u128(n: u128, mul: u128, div: u128) -> Option<u128> {
    if div == 0 {
        return None;
    }
    if let Some(product) = n.checked_mul(mul) {
        return Some(product / div);
    }
    let wide = BigUint::from(n) * BigUint::from(mul) / BigUint::from(div);
    wide.to_u128()
}

/// Compare `an / ad` with `bn / bd` exactly by cross-multiplication.
pub fn cmp_ratio_u128(an: u128, ad: u128, bn: u128, bd: u128) -> std::cmp::Ordering {
    let lhs = BigUint::from(an) * BigUint::from(bd);
    let rhs = BigUint::from(bn) * BigUint::from(ad);
    lhs.cmp(&rhs)
}

/// Portion of `amount` described by `bps`, floored.
#[inline]
pub fn bps_of_u128(amount: u128, bps: u32) -> Option<u128> {
    mul_div_u128(amount, bps as u128, BPS_DENOMINATOR as u128)
}
