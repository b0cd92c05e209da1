//! RFT shared types
//!
//! Primitives used by every layer of the reflecting ledger: holder
//! addresses, the burn sink, basis-point fee arithmetic and the metadata
//! keys required by the token standard.

pub mod address;
pub mod metadata;
pub mod units;

pub use address::*;
pub use metadata::*;
pub use units::*;
