//! Peripheral contracts driving the ledger through `TokenLedger`

use rft_ledger::*;
use rft_types::{Address, REQUIRED_METADATA_KEYS, TOKEN_LOGO_URL};
use std::collections::BTreeMap;

const TOKEN: &str = "con_reflection";
const ESCROW: &str = "con_escrow";

/// Minimal escrow that only knows the token capability it is handed.
struct Escrow {
    address: Address,
    deposits: BTreeMap<Address, u128>,
}

impl Escrow {
    fn new() -> Self {
        Self {
            address: Address::new(ESCROW),
            deposits: BTreeMap::new(),
        }
    }

    fn ctx(&self) -> CallContext {
        CallContext::new(self.address.clone(), self.address.clone())
    }

    /// Pull `amount` from `depositor`, recording what actually arrived.
    fn deposit<T>(&mut self, token: &mut T, depositor: &Address, amount: u128) -> LedgerResult<u128>
    where
        T: TokenLedger<Amount = u128>,
    {
        let before = token.balance_of(&self.address);
        token.transfer_from(&self.ctx(), amount, &self.address, depositor)?;
        let received = token.balance_of(&self.address) - before;
        *self.deposits.entry(depositor.clone()).or_default() += received;
        Ok(received)
    }

    fn withdraw<T>(&mut self, token: &mut T, depositor: &Address) -> LedgerResult<u128>
    where
        T: TokenLedger<Amount = u128>,
    {
        let owed = self.deposits.remove(depositor).unwrap_or_default();
        token.transfer(&self.ctx(), owed, depositor)?;
        Ok(owed)
    }
}

fn token(fee_exempt_escrow: bool) -> FixedPointLedger {
    let config = GenesisConfig::new(Address::new("alice"), Address::new(TOKEN), 1_000_000u128);
    let mut ledger = ReflectingLedger::genesis(LedgerParams::default(), config).unwrap();
    let op = CallContext::new("alice", TOKEN);
    ledger.exclude_from_rewards(&op, &Address::new(ESCROW)).unwrap();
    if fee_exempt_escrow {
        ledger.set_fee_exempt(&op, &Address::new(ESCROW), true).unwrap();
    }
    ledger
}

#[test]
fn test_escrow_pulls_deposit_with_allowance() {
    let mut ledger = token(true);
    let mut escrow = Escrow::new();
    let alice = Address::new("alice");

    ledger
        .approve(&CallContext::new("alice", TOKEN), 10_000, &escrow.address)
        .unwrap();
    let received = escrow.deposit(&mut ledger, &alice, 10_000).unwrap();

    assert_eq!(received, 10_000);
    assert_eq!(ledger.allowance(&alice, &escrow.address), 0);
    assert_eq!(ledger.balance_of(&alice), 990_000);

    let returned = escrow.withdraw(&mut ledger, &alice).unwrap();
    assert_eq!(returned, 10_000);
    assert_eq!(ledger.balance_of(&alice), 1_000_000);
}

#[test]
fn test_escrow_sees_fees_on_non_exempt_pull() {
    let mut ledger = token(false);
    let mut escrow = Escrow::new();
    let alice = Address::new("alice");

    ledger
        .approve(&CallContext::new("alice", TOKEN), 10_000, &escrow.address)
        .unwrap();
    let received = escrow.deposit(&mut ledger, &alice, 10_000).unwrap();

    // 2% burned, 3% reflected on the way in.
    assert_eq!(received, 9_500);
    assert_eq!(ledger.total_supply(), 999_800);
}

#[test]
fn test_escrow_without_allowance_fails_cleanly() {
    let mut ledger = token(true);
    let mut escrow = Escrow::new();
    let before = ledger.state().clone();

    let err = escrow
        .deposit(&mut ledger, &Address::new("alice"), 1)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientAllowance);
    assert!(escrow.deposits.is_empty());
    assert_eq!(ledger.state(), &before);
}

#[test]
fn test_trait_object_metadata_lookup() {
    let ledger = token(true);
    let as_trait: &dyn TokenLedger<Amount = u128> = &ledger;

    assert_eq!(as_trait.metadata("token_symbol"), Some("RFT"));
    assert!(conforms_to_token_standard(as_trait));
    for key in REQUIRED_METADATA_KEYS {
        assert!(as_trait.metadata(key).is_some(), "missing {key}");
    }
}

#[test]
fn test_missing_metadata_breaks_conformance() {
    let mut state = token(true).into_state();
    state.metadata.remove(TOKEN_LOGO_URL);
    let ledger = ReflectingLedger::from_state(LedgerParams::default(), state).unwrap();
    assert!(!conforms_to_token_standard(&ledger));
}

#[test]
fn test_shared_ledger_hands_out_capability() {
    let shared = SharedLedger::new(token(true));
    let mut escrow = Escrow::new();
    let alice = Address::new("alice");

    shared
        .execute(|l| l.approve(&CallContext::new("alice", TOKEN), 500, &Address::new(ESCROW)))
        .unwrap();
    let received = shared.execute(|l| escrow.deposit(l, &alice, 500)).unwrap();

    assert_eq!(received, 500);
    assert_eq!(shared.read(|l| l.balance_of(&Address::new(ESCROW))), 500);
}
