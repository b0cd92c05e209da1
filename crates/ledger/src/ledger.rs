//! The reflecting ledger
//!
//! Included addresses hold reflected units whose true value is
//! `balance * T / R`; excluded addresses hold true units directly. A
//! fee-bearing transfer burns part of the amount and removes the burn plus
//! the reflection share from `R`, so the rate `R / T` falls and every
//! included holder's true value rises without any balance being touched.

use crate::amount::LedgerAmount;
use crate::context::CallContext;
use crate::errors::{LedgerError, LedgerResult};
use crate::params::{FeeSplit, GenesisConfig, GenesisPolicy, LedgerParams};
use crate::rate::Rate;
use crate::receipt::{ApprovalReceipt, TransferReceipt};
use crate::state::{LedgerState, StagedWrites, SupplyState};
use rft_types::{
    Address, OPERATOR, TOKEN_LOGO_URL, TOKEN_NAME, TOKEN_SYMBOL, TOKEN_WEBSITE,
};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

/// Ledger with exact decimal arithmetic.
pub type DecimalLedger = ReflectingLedger<Decimal>;

/// Ledger with fixed-point integer arithmetic.
pub type FixedPointLedger = ReflectingLedger<u128>;

#[derive(Debug, Clone)]
pub struct ReflectingLedger<N: LedgerAmount> {
    params: LedgerParams,
    state: LedgerState<N>,
}

impl<N: LedgerAmount> ReflectingLedger<N> {
    /// Establish supply and hand the whole of it to the creator.
    pub fn genesis(params: LedgerParams, config: GenesisConfig<N>) -> LedgerResult<Self> {
        params.validate()?;

        let GenesisConfig {
            creator,
            contract,
            initial_supply,
            token,
        } = config;

        if !initial_supply.is_positive() {
            return Err(LedgerError::InvalidAmount {
                amount: initial_supply.to_string(),
                reason: "initial supply must be positive",
            });
        }
        if creator == contract {
            return Err(LedgerError::InvalidParameter(
                "creator and contract address must differ".into(),
            ));
        }
        if creator.is_burn_sink() || contract.is_burn_sink() {
            return Err(LedgerError::InvalidParameter(
                "the burn sink cannot be the creator or the contract".into(),
            ));
        }

        let reflected_total = initial_supply.genesis_reflected()?;
        let mut state = LedgerState::new(SupplyState::new(reflected_total, initial_supply));

        match params.genesis_policy {
            GenesisPolicy::CreatorIncluded => {
                state.reflected_balances.insert(creator.clone(), reflected_total);
            }
            GenesisPolicy::CreatorExcluded => {
                state.true_balances.insert(creator.clone(), initial_supply);
                state.excluded.insert(creator.clone());
            }
        }

        let sink = Address::burn_sink();
        state.excluded.insert(contract.clone());
        state.excluded.insert(sink.clone());
        state.true_balances.insert(sink.clone(), N::zero());
        if params.fee_exemption {
            state.fee_exempt.insert(contract.clone());
            state.fee_exempt.insert(sink);
        }

        state.metadata.insert(TOKEN_NAME.into(), token.name);
        state.metadata.insert(TOKEN_SYMBOL.into(), token.symbol);
        state.metadata.insert(TOKEN_LOGO_URL.into(), token.logo_url);
        state.metadata.insert(TOKEN_WEBSITE.into(), token.website);
        state.metadata.insert(OPERATOR.into(), creator.to_string());

        info!(
            backend = %N::BACKEND,
            creator = %creator,
            contract = %contract,
            supply = %initial_supply,
            policy = ?params.genesis_policy,
            "ledger genesis"
        );

        Ok(Self { params, state })
    }

    /// Rebuild a ledger from a stored snapshot.
    pub fn from_state(params: LedgerParams, state: LedgerState<N>) -> LedgerResult<Self> {
        params.validate()?;
        if !state.is_excluded(&Address::burn_sink()) {
            return Err(LedgerError::InvalidParameter(
                "snapshot does not exclude the burn sink".into(),
            ));
        }
        Ok(Self { params, state })
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    pub fn state(&self) -> &LedgerState<N> {
        &self.state
    }

    pub fn into_state(self) -> LedgerState<N> {
        self.state
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Current `R / T`. Never cache the result across operations.
    pub fn rate(&self) -> LedgerResult<Rate<N>> {
        Rate::new(
            self.state.supply.reflected_total,
            self.state.supply.true_total,
        )
    }

    /// `T`, the circulating true supply.
    pub fn total_supply(&self) -> N {
        self.state.supply.true_total
    }

    /// `R`, the reflected supply.
    pub fn reflected_supply(&self) -> N {
        self.state.supply.reflected_total
    }

    /// True-unit balance. Reads zero rather than failing when the rate is
    /// undefined.
    pub fn balance_of(&self, address: &Address) -> N {
        let raw = if self.state.is_excluded(address) {
            self.state.true_balance(address)
        } else {
            self.rate()
                .and_then(|rate| rate.to_true(self.state.reflected_balance(address)))
                .unwrap_or_default()
        };
        raw.truncate_to(self.params.output_scale)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> N {
        self.state.allowance(owner, spender)
    }

    pub fn is_excluded(&self, address: &Address) -> bool {
        self.state.is_excluded(address)
    }

    pub fn is_fee_exempt(&self, address: &Address) -> bool {
        self.params.fee_exemption && self.state.is_fee_exempt(address)
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.state.metadata.get(key).map(String::as_str)
    }

    pub fn operator(&self) -> Option<Address> {
        self.metadata(OPERATOR).map(Address::new)
    }

    // -------------------------------------------------------------------------
    // Transfers
    // -------------------------------------------------------------------------

    /// Move `amount` true units from the caller to `to`.
    pub fn transfer(
        &mut self,
        ctx: &CallContext,
        amount: N,
        to: &Address,
    ) -> LedgerResult<TransferReceipt<N>> {
        let mut staged = StagedWrites::new(&self.state);
        let split = self
            .stage_transfer(&mut staged, &ctx.caller, to, amount)
            .inspect_err(|err| warn!(from = %ctx.caller, to = %to, %amount, error = %err, "transfer rejected"))?;
        let changes = staged.finish();
        self.state.apply(changes);

        debug!(
            from = %ctx.caller,
            to = %to,
            amount = %amount,
            burned = %split.burn,
            reflected = %split.reflection,
            "transfer applied"
        );

        Ok(TransferReceipt {
            from: ctx.caller.clone(),
            to: to.clone(),
            spender: None,
            amount,
            credited: split.credit,
            burned: split.burn,
            reflected: split.reflection,
            fees_applied: split.charged,
        })
    }

    /// Move `amount` from `main_account` to `to`, spending the caller's
    /// allowance.
    pub fn transfer_from(
        &mut self,
        ctx: &CallContext,
        amount: N,
        to: &Address,
        main_account: &Address,
    ) -> LedgerResult<TransferReceipt<N>> {
        ensure_positive(amount)?;

        let mut staged = StagedWrites::new(&self.state);
        let approved = staged.allowance(main_account, &ctx.caller);
        if approved < amount {
            warn!(owner = %main_account, spender = %ctx.caller, %approved, %amount, "allowance exceeded");
            return Err(LedgerError::InsufficientAllowance {
                owner: main_account.clone(),
                spender: ctx.caller.clone(),
                approved: approved.to_string(),
                requested: amount.to_string(),
            });
        }

        let split = self
            .stage_transfer(&mut staged, main_account, to, amount)
            .inspect_err(|err| warn!(from = %main_account, to = %to, %amount, error = %err, "delegated transfer rejected"))?;
        staged.set_allowance(main_account, &ctx.caller, approved.minus(amount)?);
        let changes = staged.finish();
        self.state.apply(changes);

        debug!(
            from = %main_account,
            to = %to,
            spender = %ctx.caller,
            amount = %amount,
            burned = %split.burn,
            reflected = %split.reflection,
            "delegated transfer applied"
        );

        Ok(TransferReceipt {
            from: main_account.clone(),
            to: to.clone(),
            spender: Some(ctx.caller.clone()),
            amount,
            credited: split.credit,
            burned: split.burn,
            reflected: split.reflection,
            fees_applied: split.charged,
        })
    }

    /// Set (not add to) the allowance of `to` over the caller's funds.
    pub fn approve(
        &mut self,
        ctx: &CallContext,
        amount: N,
        to: &Address,
    ) -> LedgerResult<ApprovalReceipt<N>> {
        if amount < N::zero() {
            return Err(LedgerError::InvalidAmount {
                amount: amount.to_string(),
                reason: "allowance must not be negative",
            });
        }

        let mut staged = StagedWrites::new(&self.state);
        staged.set_allowance(&ctx.caller, to, amount);
        let changes = staged.finish();
        self.state.apply(changes);

        debug!(owner = %ctx.caller, spender = %to, amount = %amount, "allowance set");

        Ok(ApprovalReceipt {
            owner: ctx.caller.clone(),
            spender: to.clone(),
            amount,
        })
    }

    /// Stage the debit, credit, burn and supply shrink of one transfer.
    ///
    /// The rate is read once from supply as it stood before the transfer and
    /// used for every conversion in it.
    fn stage_transfer(
        &self,
        staged: &mut StagedWrites<'_, N>,
        from: &Address,
        to: &Address,
        amount: N,
    ) -> LedgerResult<FeeSplit<N>> {
        ensure_positive(amount)?;

        let from_excluded = staged.is_excluded(from);
        let to_excluded = staged.is_excluded(to);
        let skip_fees = self.params.fee_exemption
            && (staged.is_fee_exempt(from) || staged.is_fee_exempt(to));

        let supply = staged.supply();
        let rate = Rate::new(supply.reflected_total, supply.true_total);

        if from_excluded {
            let held = staged.true_balance(from);
            if held < amount {
                return Err(insufficient(from, amount, held));
            }
            staged.set_true(from, held.minus(amount)?);
        } else {
            let rate = rate.clone()?;
            let reflected_amount = rate.to_reflected(amount)?;
            let held = staged.reflected_balance(from);
            if held < reflected_amount {
                let available = rate
                    .to_true(held)
                    .unwrap_or_default()
                    .truncate_to(self.params.output_scale);
                return Err(insufficient(from, amount, available));
            }
            staged.set_reflected(from, held.minus(reflected_amount)?);
        }

        let split = if skip_fees {
            FeeSplit::exempt(amount)
        } else {
            self.params.fees.split(amount)?
        };

        if to_excluded {
            let credited = staged.true_balance(to).plus(split.credit)?;
            staged.set_true(to, credited);
        } else {
            let reflected_credit = rate.clone()?.to_reflected(split.credit)?;
            let credited = staged.reflected_balance(to).plus(reflected_credit)?;
            staged.set_reflected(to, credited);
        }

        if split.charged {
            let rate = rate?;
            let sink = Address::burn_sink();
            let sink_balance = staged.true_balance(&sink).plus(split.burn)?;
            staged.set_true(&sink, sink_balance);

            let removed = rate.to_reflected(split.burn.plus(split.reflection)?)?;
            let mut next = supply;
            next.true_total = next
                .true_total
                .minus(split.burn)
                .map_err(|_| LedgerError::ExhaustedSupply)?;
            next.reflected_total = next
                .reflected_total
                .minus(removed)
                .map_err(|_| LedgerError::ExhaustedSupply)?;
            next.total_burned = next.total_burned.plus(split.burn)?;
            next.total_reflected = next.total_reflected.plus(split.reflection)?;
            staged.set_supply(next);
        }

        Ok(split)
    }

    // -------------------------------------------------------------------------
    // Administration
    // -------------------------------------------------------------------------

    /// Move `address` to true-unit accounting at its current value.
    pub fn exclude_from_rewards(&mut self, ctx: &CallContext, address: &Address) -> LedgerResult<()> {
        self.ensure_operator(ctx, "exclude addresses from rewards")?;
        if self.state.is_excluded(address) {
            return Err(LedgerError::AlreadyExcluded(address.clone()));
        }

        let value = self
            .rate()?
            .to_true(self.state.reflected_balance(address))?
            .truncate_to(self.params.output_scale);
        let mut staged = StagedWrites::new(&self.state);
        staged.set_reflected(address, N::zero());
        staged.set_true(address, value);
        staged.set_excluded(address, true);
        let changes = staged.finish();
        self.state.apply(changes);

        info!(address = %address, value = %value, "address excluded from rewards");
        Ok(())
    }

    /// Move `address` back to reflected accounting at the current rate.
    pub fn include_in_rewards(&mut self, ctx: &CallContext, address: &Address) -> LedgerResult<()> {
        self.ensure_operator(ctx, "include addresses in rewards")?;
        if address.is_burn_sink() {
            return Err(LedgerError::BurnSinkLocked(address.clone()));
        }
        if !self.state.is_excluded(address) {
            return Err(LedgerError::NotExcluded(address.clone()));
        }

        let rate = self.rate()?;
        let value = self.state.true_balance(address);
        let reflected = self
            .state
            .reflected_balance(address)
            .plus(rate.to_reflected(value)?)?;

        let mut staged = StagedWrites::new(&self.state);
        staged.set_true(address, N::zero());
        staged.set_reflected(address, reflected);
        staged.set_excluded(address, false);
        let changes = staged.finish();
        self.state.apply(changes);

        info!(address = %address, value = %value, "address included in rewards");
        Ok(())
    }

    pub fn set_fee_exempt(
        &mut self,
        ctx: &CallContext,
        address: &Address,
        exempt: bool,
    ) -> LedgerResult<()> {
        self.ensure_operator(ctx, "change fee exemption")?;
        if !self.params.fee_exemption {
            return Err(LedgerError::FeeExemptionDisabled);
        }

        let mut staged = StagedWrites::new(&self.state);
        staged.set_fee_exempt(address, exempt);
        let changes = staged.finish();
        self.state.apply(changes);

        info!(address = %address, exempt, "fee exemption changed");
        Ok(())
    }

    /// Overwrite one metadata key. Writing `operator` hands over operator
    /// rights.
    pub fn change_metadata(&mut self, ctx: &CallContext, key: &str, value: &str) -> LedgerResult<()> {
        self.ensure_operator(ctx, "change metadata")?;

        let mut staged = StagedWrites::new(&self.state);
        staged.set_metadata(key, value);
        let changes = staged.finish();
        self.state.apply(changes);

        info!(key, value, "metadata changed");
        Ok(())
    }

    fn ensure_operator(&self, ctx: &CallContext, action: &'static str) -> LedgerResult<()> {
        match self.operator() {
            Some(operator) if operator == ctx.caller => Ok(()),
            _ => {
                warn!(caller = %ctx.caller, action, "operator check failed");
                Err(LedgerError::Unauthorized {
                    caller: ctx.caller.clone(),
                    action,
                })
            }
        }
    }
}

fn ensure_positive<N: LedgerAmount>(amount: N) -> LedgerResult<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount {
            amount: amount.to_string(),
            reason: "amount must be positive",
        })
    }
}

fn insufficient<N: LedgerAmount>(account: &Address, needed: N, available: N) -> LedgerError {
    LedgerError::InsufficientBalance {
        account: account.clone(),
        needed: needed.to_string(),
        available: available.to_string(),
    }
}
