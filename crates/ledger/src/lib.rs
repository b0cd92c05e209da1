//! RFT Reflecting Ledger
//!
//! Token accounting in which every fee-bearing transfer burns a share of its
//! value and reflects another share to all included holders, without any
//! holder claiming anything.
//!
//! Two units of account are kept: reflected units for included addresses and
//! true units for excluded ones, tied together by the rate `R / T`. Burns
//! shrink both totals; reflection shrinks only `R`.
//!
//! The arithmetic backend is chosen by the amount type: [`DecimalLedger`]
//! (exact decimals) or [`FixedPointLedger`] (`u128` with floor division).

pub mod amount;
pub mod audit;
pub mod context;
pub mod errors;
pub mod interface;
pub mod ledger;
pub mod params;
pub mod rate;
pub mod receipt;
pub mod shared;
pub mod state;

pub use amount::*;
pub use audit::*;
pub use context::*;
pub use errors::*;
pub use interface::*;
pub use ledger::*;
pub use params::*;
pub use rate::*;
pub use receipt::*;
pub use shared::*;
pub use state::{LedgerState, SupplyState};

pub use rust_decimal::Decimal;
