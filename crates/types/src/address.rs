use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur when parsing a holder address string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address must not be empty")]
    Empty,
    #[error("address must be at most {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
    #[error("address must not contain whitespace or control characters")]
    InvalidCharacter,
}

/// Longest accepted address string (contract names and hex keys fit easily).
pub const MAX_ADDRESS_LENGTH: usize = 256;

/// Length of a hex-encoded 32-byte public key.
pub const PUBLIC_KEY_HEX_LENGTH: usize = 64;

/// Address of the burn sink: 64 zero characters.
pub const BURN_ADDRESS: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Check a candidate address string without allocating.
pub fn validate_address(address: &str) -> Result<(), AddressError> {
    if address.is_empty() {
        return Err(AddressError::Empty);
    }
    if address.len() > MAX_ADDRESS_LENGTH {
        return Err(AddressError::TooLong {
            max: MAX_ADDRESS_LENGTH,
            actual: address.len(),
        });
    }
    if address.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(AddressError::InvalidCharacter);
    }
    Ok(())
}

/// Holder identifier.
///
/// Can be either:
/// - Ed25519 public key (32 bytes, hex-encoded)
/// - Contract name (e.g. `con_staking`), used for the ledger's own address
///   and for peripheral contracts holding deposits
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Create an address without validation. Host-supplied identities are
    /// already authenticated, so this is the common path.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse and validate an address coming from untrusted input.
    pub fn parse(id: &str) -> Result<Self, AddressError> {
        validate_address(id)?;
        Ok(Self(id.to_string()))
    }

    /// The burn sink address.
    pub fn burn_sink() -> Self {
        Self(BURN_ADDRESS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_burn_sink(&self) -> bool {
        self.0 == BURN_ADDRESS
    }

    /// Check if this is a public key (64 hex characters)
    pub fn is_public_key(&self) -> bool {
        self.0.len() == PUBLIC_KEY_HEX_LENGTH && self.0.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Check if this is a contract name rather than a key
    pub fn is_contract(&self) -> bool {
        !self.is_public_key()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Address::new(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_address(&value)?;
        Ok(Address(value))
    }
}
