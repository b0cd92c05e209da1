use rft_types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Acknowledgement of a completed transfer. Amounts are true units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt<N> {
    pub from: Address,
    pub to: Address,
    /// Set for delegated transfers
    pub spender: Option<Address>,
    pub amount: N,
    /// Value credited to the receiver before reflection
    pub credited: N,
    pub burned: N,
    pub reflected: N,
    pub fees_applied: bool,
}

impl<N: fmt::Display> fmt::Display for TransferReceipt<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.spender {
            Some(_) => write!(f, "Sent {} to {} from {}", self.amount, self.to, self.from),
            None => write!(f, "Transferred {}", self.amount),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalReceipt<N> {
    pub owner: Address,
    pub spender: Address,
    pub amount: N,
}

impl<N: fmt::Display> fmt::Display for ApprovalReceipt<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Approved {} for {}", self.amount, self.spender)
    }
}
