use crate::amount::LedgerAmount;
use crate::ledger::ReflectingLedger;
use crate::state::LedgerState;
use parking_lot::Mutex;
use std::sync::Arc;

/// Serialized access to one ledger from many threads.
///
/// Each `execute` holds the lock for exactly one operation, which is the
/// single-writer guarantee the host gives every invocation.
#[derive(Debug)]
pub struct SharedLedger<N: LedgerAmount> {
    inner: Arc<Mutex<ReflectingLedger<N>>>,
}

impl<N: LedgerAmount> Clone for SharedLedger<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N: LedgerAmount> SharedLedger<N> {
    pub fn new(ledger: ReflectingLedger<N>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn execute<R>(&self, operation: impl FnOnce(&mut ReflectingLedger<N>) -> R) -> R {
        let mut guard = self.inner.lock();
        operation(&mut guard)
    }

    pub fn read<R>(&self, query: impl FnOnce(&ReflectingLedger<N>) -> R) -> R {
        let guard = self.inner.lock();
        query(&guard)
    }

    pub fn snapshot(&self) -> LedgerState<N> {
        self.read(|ledger| ledger.state().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CallContext, GenesisConfig, LedgerParams};
    use rft_types::Address;
    use std::thread;

    #[test]
    fn concurrent_transfers_are_serialized() {
        let config = GenesisConfig::new(Address::new("creator"), Address::new("con_reflection"), 10_000_000u128);
        let mut ledger = ReflectingLedger::genesis(LedgerParams::default(), config).unwrap();
        let funder = CallContext::new("creator", "con_reflection");
        for i in 0..4 {
            ledger
                .transfer(&funder, 1_000_000, &Address::new(format!("holder{i}")))
                .unwrap();
        }
        let shared = SharedLedger::new(ledger);
        let supply_before = shared.read(|l| l.total_supply());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let ctx = CallContext::new(format!("holder{i}").as_str(), "con_reflection");
                    for _ in 0..25 {
                        shared
                            .execute(|l| l.transfer(&ctx, 1_000, &Address::new("sink_holder")))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // 100 transfers of 1_000 burn 20 each.
        assert_eq!(shared.read(|l| l.total_supply()), supply_before - 100 * 20);
        assert_eq!(shared.snapshot().supply.total_burned, 4 * 20_000 + 100 * 20);
        assert!(shared.read(|l| l.audit().is_healthy));
    }
}
