//! Token capability handed to peripheral contracts
//!
//! Collaborators (staking pools, escrow, swaps) never look a token up by
//! name. The host resolves the token before the call and injects it as
//! `&mut impl TokenLedger`, and the collaborator uses only the public
//! surface any holder could call.

use crate::amount::LedgerAmount;
use crate::context::CallContext;
use crate::errors::LedgerResult;
use crate::ledger::ReflectingLedger;
use crate::receipt::{ApprovalReceipt, TransferReceipt};
use rft_types::{Address, REQUIRED_METADATA_KEYS};

pub trait TokenLedger {
    type Amount: LedgerAmount;

    fn transfer(
        &mut self,
        ctx: &CallContext,
        amount: Self::Amount,
        to: &Address,
    ) -> LedgerResult<TransferReceipt<Self::Amount>>;

    fn transfer_from(
        &mut self,
        ctx: &CallContext,
        amount: Self::Amount,
        to: &Address,
        main_account: &Address,
    ) -> LedgerResult<TransferReceipt<Self::Amount>>;

    fn approve(
        &mut self,
        ctx: &CallContext,
        amount: Self::Amount,
        to: &Address,
    ) -> LedgerResult<ApprovalReceipt<Self::Amount>>;

    fn balance_of(&self, address: &Address) -> Self::Amount;

    fn allowance(&self, owner: &Address, spender: &Address) -> Self::Amount;

    fn metadata(&self, key: &str) -> Option<&str>;
}

impl<N: LedgerAmount> TokenLedger for ReflectingLedger<N> {
    type Amount = N;

    fn transfer(&mut self, ctx: &CallContext, amount: N, to: &Address) -> LedgerResult<TransferReceipt<N>> {
        ReflectingLedger::transfer(self, ctx, amount, to)
    }

    fn transfer_from(
        &mut self,
        ctx: &CallContext,
        amount: N,
        to: &Address,
        main_account: &Address,
    ) -> LedgerResult<TransferReceipt<N>> {
        ReflectingLedger::transfer_from(self, ctx, amount, to, main_account)
    }

    fn approve(&mut self, ctx: &CallContext, amount: N, to: &Address) -> LedgerResult<ApprovalReceipt<N>> {
        ReflectingLedger::approve(self, ctx, amount, to)
    }

    fn balance_of(&self, address: &Address) -> N {
        ReflectingLedger::balance_of(self, address)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> N {
        ReflectingLedger::allowance(self, owner, spender)
    }

    fn metadata(&self, key: &str) -> Option<&str> {
        ReflectingLedger::metadata(self, key)
    }
}

/// Whether `token` publishes every metadata field the token standard
/// requires.
pub fn conforms_to_token_standard<T: TokenLedger + ?Sized>(token: &T) -> bool {
    REQUIRED_METADATA_KEYS
        .iter()
        .all(|key| token.metadata(key).is_some())
}
