#![no_main]
use libfuzzer_sys::fuzz_target;
use rft_ledger::{CallContext, FixedPointLedger, GenesisConfig, LedgerParams, ReflectingLedger};
use rft_types::Address;

// Random operation sequences against the fixed-point ledger. Every rejected
// operation must leave state untouched and supply must never grow.

const CONTRACT: &str = "con_reflection";
const PARTIES: [&str; 6] = ["creator", "p1", "p2", "p3", CONTRACT, rft_types::BURN_ADDRESS];

fn party(byte: u8) -> Address {
    Address::new(PARTIES[byte as usize % PARTIES.len()])
}

fn amount(bytes: &[u8]) -> u128 {
    let mut buf = [0u8; 8];
    let n = bytes.len().min(8);
    buf[..n].copy_from_slice(&bytes[..n]);
    // Mostly small values, occasionally enormous ones.
    let raw = u64::from_le_bytes(buf) as u128;
    if raw % 17 == 0 {
        raw << 64
    } else {
        raw % 2_000_000_000
    }
}

fuzz_target!(|data: &[u8]| {
    let config = GenesisConfig::new(Address::new("creator"), Address::new(CONTRACT), 1_000_000_000u128);
    let mut ledger: FixedPointLedger = match ReflectingLedger::genesis(LedgerParams::default(), config) {
        Ok(ledger) => ledger,
        Err(_) => return,
    };
    let operator = CallContext::new("creator", CONTRACT);

    for chunk in data.chunks(11) {
        if chunk.len() < 3 {
            break;
        }
        let (op, a, b, rest) = (chunk[0], party(chunk[1]), party(chunk[2]), &chunk[3..]);
        let caller = CallContext::new(a.clone(), CONTRACT);
        let value = amount(rest);

        let supply_before = ledger.total_supply();
        let rate_before = ledger.rate().ok();
        let state_before = ledger.state().clone();

        let rejected = match op % 7 {
            0 | 1 => ledger.transfer(&caller, value, &b).is_err(),
            2 => ledger.approve(&caller, value, &b).is_err(),
            3 => ledger.transfer_from(&caller.with_caller(b.clone()), value, &party(op), &a).is_err(),
            4 => ledger.exclude_from_rewards(&operator, &a).is_err(),
            5 => ledger.include_in_rewards(&operator, &a).is_err(),
            _ => ledger.set_fee_exempt(&operator, &a, op & 0x80 != 0).is_err(),
        };

        if rejected {
            assert_eq!(ledger.state(), &state_before);
        }
        assert!(ledger.total_supply() <= supply_before);
        if let (Some(before), Ok(after)) = (rate_before, ledger.rate()) {
            assert!(after <= before, "rate rose from {before} to {after}");
        }
        let _ = ledger.balance_of(&a);
        let _ = ledger.audit();
    }
});
