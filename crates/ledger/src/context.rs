use rft_types::Address;
use serde::{Deserialize, Serialize};

/// Ambient data the host supplies with every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Authenticated caller
    pub caller: Address,
    /// Address of the contract being invoked
    pub this: Address,
    /// Logical clock; not read by the ledger, carried for peripherals
    pub now: u64,
}

impl CallContext {
    pub fn new(caller: impl Into<Address>, this: impl Into<Address>) -> Self {
        Self {
            caller: caller.into(),
            this: this.into(),
            now: 0,
        }
    }

    /// Same invocation target and clock, different caller.
    pub fn with_caller(&self, caller: impl Into<Address>) -> Self {
        Self {
            caller: caller.into(),
            this: self.this.clone(),
            now: self.now,
        }
    }
}
