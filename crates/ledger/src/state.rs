//! Ledger state tables and the staged-write overlay
//!
//! Logical layout handed to the host storage layer:
//! - reflected balances of included addresses
//! - true balances of excluded addresses
//! - allowances, owner → spender → true amount
//! - a singleton supply record plus metadata and membership flags
//!
//! Operations never write these tables directly. They stage writes in
//! [`StagedWrites`], which reads through to the committed state, and commit
//! the resulting [`Changes`] only once every check has passed.

use crate::amount::LedgerAmount;
use rft_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Singleton supply record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyState<N> {
    /// `R`, total reflected units
    pub reflected_total: N,
    /// `T`, total true units
    pub true_total: N,
    /// Cumulative burn, true units
    pub total_burned: N,
    /// Cumulative reflection fees, true units
    pub total_reflected: N,
}

impl<N: LedgerAmount> SupplyState<N> {
    pub fn new(reflected_total: N, true_total: N) -> Self {
        Self {
            reflected_total,
            true_total,
            total_burned: N::zero(),
            total_reflected: N::zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState<N> {
    pub supply: SupplyState<N>,
    pub reflected_balances: BTreeMap<Address, N>,
    pub true_balances: BTreeMap<Address, N>,
    pub allowances: BTreeMap<Address, BTreeMap<Address, N>>,
    pub excluded: BTreeSet<Address>,
    pub fee_exempt: BTreeSet<Address>,
    pub metadata: BTreeMap<String, String>,
}

impl<N: LedgerAmount> LedgerState<N> {
    pub fn new(supply: SupplyState<N>) -> Self {
        Self {
            supply,
            reflected_balances: BTreeMap::new(),
            true_balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            excluded: BTreeSet::new(),
            fee_exempt: BTreeSet::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn reflected_balance(&self, address: &Address) -> N {
        self.reflected_balances.get(address).copied().unwrap_or_default()
    }

    pub fn true_balance(&self, address: &Address) -> N {
        self.true_balances.get(address).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> N {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn is_excluded(&self, address: &Address) -> bool {
        self.excluded.contains(address)
    }

    pub fn is_fee_exempt(&self, address: &Address) -> bool {
        self.fee_exempt.contains(address)
    }

    /// Every address with a balance entry or a membership flag.
    pub fn known_addresses(&self) -> BTreeSet<Address> {
        self.reflected_balances
            .keys()
            .chain(self.true_balances.keys())
            .chain(self.excluded.iter())
            .cloned()
            .collect()
    }

    pub(crate) fn apply(&mut self, changes: Changes<N>) {
        for (address, value) in changes.reflected {
            self.reflected_balances.insert(address, value);
        }
        for (address, value) in changes.true_ {
            self.true_balances.insert(address, value);
        }
        for ((owner, spender), value) in changes.allowances {
            self.allowances.entry(owner).or_default().insert(spender, value);
        }
        for (address, flag) in changes.excluded {
            if flag {
                self.excluded.insert(address);
            } else {
                self.excluded.remove(&address);
            }
        }
        for (address, flag) in changes.fee_exempt {
            if flag {
                self.fee_exempt.insert(address);
            } else {
                self.fee_exempt.remove(&address);
            }
        }
        for (key, value) in changes.metadata {
            self.metadata.insert(key, value);
        }
        if let Some(supply) = changes.supply {
            self.supply = supply;
        }
    }
}

/// Owned set of writes produced by one operation.
#[derive(Debug)]
pub(crate) struct Changes<N> {
    reflected: BTreeMap<Address, N>,
    true_: BTreeMap<Address, N>,
    allowances: BTreeMap<(Address, Address), N>,
    excluded: BTreeMap<Address, bool>,
    fee_exempt: BTreeMap<Address, bool>,
    metadata: BTreeMap<String, String>,
    supply: Option<SupplyState<N>>,
}

/// Read-through overlay over committed state.
pub(crate) struct StagedWrites<'a, N> {
    base: &'a LedgerState<N>,
    changes: Changes<N>,
}

impl<'a, N: LedgerAmount> StagedWrites<'a, N> {
    pub fn new(base: &'a LedgerState<N>) -> Self {
        Self {
            base,
            changes: Changes {
                reflected: BTreeMap::new(),
                true_: BTreeMap::new(),
                allowances: BTreeMap::new(),
                excluded: BTreeMap::new(),
                fee_exempt: BTreeMap::new(),
                metadata: BTreeMap::new(),
                supply: None,
            },
        }
    }

    pub fn reflected_balance(&self, address: &Address) -> N {
        match self.changes.reflected.get(address) {
            Some(value) => *value,
            None => self.base.reflected_balance(address),
        }
    }

    pub fn set_reflected(&mut self, address: &Address, value: N) {
        self.changes.reflected.insert(address.clone(), value);
    }

    pub fn true_balance(&self, address: &Address) -> N {
        match self.changes.true_.get(address) {
            Some(value) => *value,
            None => self.base.true_balance(address),
        }
    }

    pub fn set_true(&mut self, address: &Address, value: N) {
        self.changes.true_.insert(address.clone(), value);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> N {
        match self.changes.allowances.get(&(owner.clone(), spender.clone())) {
            Some(value) => *value,
            None => self.base.allowance(owner, spender),
        }
    }

    pub fn set_allowance(&mut self, owner: &Address, spender: &Address, value: N) {
        self.changes
            .allowances
            .insert((owner.clone(), spender.clone()), value);
    }

    pub fn is_excluded(&self, address: &Address) -> bool {
        match self.changes.excluded.get(address) {
            Some(flag) => *flag,
            None => self.base.is_excluded(address),
        }
    }

    pub fn set_excluded(&mut self, address: &Address, flag: bool) {
        self.changes.excluded.insert(address.clone(), flag);
    }

    pub fn is_fee_exempt(&self, address: &Address) -> bool {
        match self.changes.fee_exempt.get(address) {
            Some(flag) => *flag,
            None => self.base.is_fee_exempt(address),
        }
    }

    pub fn set_fee_exempt(&mut self, address: &Address, flag: bool) {
        self.changes.fee_exempt.insert(address.clone(), flag);
    }

    pub fn set_metadata(&mut self, key: &str, value: &str) {
        self.changes
            .metadata
            .insert(key.to_string(), value.to_string());
    }

    pub fn supply(&self) -> SupplyState<N> {
        match &self.changes.supply {
            Some(supply) => supply.clone(),
            None => self.base.supply.clone(),
        }
    }

    pub fn set_supply(&mut self, supply: SupplyState<N>) {
        self.changes.supply = Some(supply);
    }

    pub fn finish(self) -> Changes<N> {
        self.changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    #[test]
    fn staged_reads_see_own_writes() {
        let mut state = LedgerState::new(SupplyState::new(100u128, 100));
        state.reflected_balances.insert(addr("alice"), 100);

        let mut staged = StagedWrites::new(&state);
        staged.set_reflected(&addr("alice"), 40);
        assert_eq!(staged.reflected_balance(&addr("alice")), 40);
        // Aliased debit then credit on the same key compounds.
        let current = staged.reflected_balance(&addr("alice"));
        staged.set_reflected(&addr("alice"), current + 5);
        assert_eq!(staged.reflected_balance(&addr("alice")), 45);
        assert_eq!(state.reflected_balance(&addr("alice")), 100);
    }

    #[test]
    fn dropped_overlay_leaves_state_untouched() {
        let state = LedgerState::new(SupplyState::new(100u128, 100));
        let before = state.clone();
        {
            let mut staged = StagedWrites::new(&state);
            staged.set_true(&addr("bob"), 7);
            staged.set_excluded(&addr("bob"), true);
        }
        assert_eq!(state, before);
    }

    #[test]
    fn commit_applies_everything() {
        let mut state = LedgerState::new(SupplyState::new(100u128, 100));
        state.excluded.insert(addr("carol"));

        let mut staged = StagedWrites::new(&state);
        staged.set_allowance(&addr("alice"), &addr("bob"), 9);
        staged.set_excluded(&addr("carol"), false);
        staged.set_fee_exempt(&addr("dave"), true);
        staged.set_metadata("token_name", "X");
        let mut supply = staged.supply();
        supply.true_total = 90;
        staged.set_supply(supply);
        let changes = staged.finish();

        state.apply(changes);
        assert_eq!(state.allowance(&addr("alice"), &addr("bob")), 9);
        assert!(!state.is_excluded(&addr("carol")));
        assert!(state.is_fee_exempt(&addr("dave")));
        assert_eq!(state.metadata.get("token_name").map(String::as_str), Some("X"));
        assert_eq!(state.supply.true_total, 90);
    }

    #[test]
    fn snapshot_serialises_to_json() {
        let mut state = LedgerState::new(SupplyState::new(100u128, 100));
        state.allowances.entry(addr("alice")).or_default().insert(addr("bob"), 5);
        let json = serde_json::to_string(&state).unwrap();
        let back: LedgerState<u128> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
