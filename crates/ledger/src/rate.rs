//! Exchange rate between true and reflected units.
//!
//! The rate is kept as the pair `(reflected_total, true_total)` and every
//! conversion multiplies before it divides, so no rounded quotient is ever
//! stored. A `Rate` is derived from supply at the start of an operation and
//! must not be kept past it.

use crate::amount::LedgerAmount;
use crate::errors::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rate<N> {
    reflected_total: N,
    true_total: N,
}

impl<N: LedgerAmount> Rate<N> {
    /// Fails with `ExhaustedSupply` when no true supply is left.
    pub fn new(reflected_total: N, true_total: N) -> LedgerResult<Self> {
        if !true_total.is_positive() {
            return Err(LedgerError::ExhaustedSupply);
        }
        Ok(Self {
            reflected_total,
            true_total,
        })
    }

    pub fn reflected_total(&self) -> N {
        self.reflected_total
    }

    pub fn true_total(&self) -> N {
        self.true_total
    }

    /// `true_amount * R / T`
    pub fn to_reflected(&self, true_amount: N) -> LedgerResult<N> {
        true_amount.mul_div(self.reflected_total, self.true_total)
    }

    /// `reflected_amount * T / R`
    pub fn to_true(&self, reflected_amount: N) -> LedgerResult<N> {
        reflected_amount.mul_div(self.true_total, self.reflected_total)
    }

    /// Exact comparison of two rates.
    pub fn compare(&self, other: &Self) -> Ordering {
        N::cmp_ratio(
            self.reflected_total,
            self.true_total,
            other.reflected_total,
            other.true_total,
        )
    }
}

impl<N: LedgerAmount> PartialEq for Rate<N> {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl<N: LedgerAmount> PartialOrd for Rate<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl<N: LedgerAmount> fmt::Display for Rate<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.reflected_total, self.true_total)
    }
}
