use rft_types::{Address, AddressError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by ledger operations.
///
/// Every variant is raised before any write is staged, so a failed call
/// leaves the ledger untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount { amount: String, reason: &'static str },

    #[error("insufficient balance for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: Address,
        needed: String,
        available: String,
    },

    #[error("insufficient allowance: {spender} may move {approved} for {owner}, requested {requested}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        approved: String,
        requested: String,
    },

    #[error("{caller} is not allowed to {action}")]
    Unauthorized { caller: Address, action: &'static str },

    #[error("total supply exhausted: rate is undefined")]
    ExhaustedSupply,

    #[error("address {0} is already excluded from rewards")]
    AlreadyExcluded(Address),

    #[error("address {0} is not excluded from rewards")]
    NotExcluded(Address),

    #[error("burn sink {0} is permanently excluded")]
    BurnSinkLocked(Address),

    #[error("fee exemption is disabled for this deployment")]
    FeeExemptionDisabled,

    #[error("arithmetic overflow while {0}")]
    ArithmeticOverflow(&'static str),

    #[error("invalid ledger parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },
}

/// Machine-readable error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidAmount,
    InsufficientBalance,
    InsufficientAllowance,
    Unauthorized,
    ExhaustedSupply,
    AlreadyExcluded,
    NotExcluded,
    BurnSinkLocked,
    FeeExemptionDisabled,
    ArithmeticOverflow,
    InvalidParameter,
    InvalidAddress,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidAmount => "InvalidAmountError",
            ErrorKind::InsufficientBalance => "InsufficientBalanceError",
            ErrorKind::InsufficientAllowance => "InsufficientAllowanceError",
            ErrorKind::Unauthorized => "UnauthorizedError",
            ErrorKind::ExhaustedSupply => "ExhaustedSupplyError",
            ErrorKind::AlreadyExcluded => "AlreadyExcludedError",
            ErrorKind::NotExcluded => "NotExcludedError",
            ErrorKind::BurnSinkLocked => "BurnSinkLockedError",
            ErrorKind::FeeExemptionDisabled => "FeeExemptionDisabledError",
            ErrorKind::ArithmeticOverflow => "ArithmeticOverflowError",
            ErrorKind::InvalidParameter => "InvalidParameterError",
            ErrorKind::InvalidAddress => "InvalidAddressError",
        }
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            LedgerError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            LedgerError::InsufficientAllowance { .. } => ErrorKind::InsufficientAllowance,
            LedgerError::Unauthorized { .. } => ErrorKind::Unauthorized,
            LedgerError::ExhaustedSupply => ErrorKind::ExhaustedSupply,
            LedgerError::AlreadyExcluded(_) => ErrorKind::AlreadyExcluded,
            LedgerError::NotExcluded(_) => ErrorKind::NotExcluded,
            LedgerError::BurnSinkLocked(_) => ErrorKind::BurnSinkLocked,
            LedgerError::FeeExemptionDisabled => ErrorKind::FeeExemptionDisabled,
            LedgerError::ArithmeticOverflow(_) => ErrorKind::ArithmeticOverflow,
            LedgerError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            LedgerError::InvalidAddress { .. } => ErrorKind::InvalidAddress,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_carry_taxonomy_names() {
        let err = LedgerError::ExhaustedSupply;
        assert_eq!(err.kind().as_str(), "ExhaustedSupplyError");

        let err = LedgerError::Unauthorized {
            caller: Address::new("mallory"),
            action: "exclude addresses",
        };
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.to_string(), "mallory is not allowed to exclude addresses");
    }
}
