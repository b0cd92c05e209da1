//! Ledger integrity audit
//!
//! Walks every table and checks the invariants that tie the two accounting
//! regimes to the supply record. Read-only; never fails.

use crate::amount::LedgerAmount;
use crate::ledger::ReflectingLedger;
use rft_types::Address;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Result of a ledger audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerAudit<N> {
    pub is_healthy: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub true_total: N,
    pub reflected_total: N,
    /// Sum of stored reflected balances of included addresses
    pub included_reflected: N,
    /// Sum of reported balances of included addresses
    pub included_true: N,
    /// Sum of true balances of excluded addresses, burn sink left out
    pub excluded_true: N,
    pub burn_sink_balance: N,
    pub holders: usize,
}

impl<N: LedgerAmount> ReflectingLedger<N> {
    /// Perform comprehensive audit of balances against supply
    pub fn audit(&self) -> LedgerAudit<N> {
        let state = self.state();
        let sink = Address::burn_sink();
        let mut issues = Vec::new();
        let mut warnings = Vec::new();

        if !state.is_excluded(&sink) {
            issues.push("burn sink is not excluded".to_string());
        }

        let mut included_reflected = N::zero();
        let mut included_true = N::zero();
        let mut excluded_true = N::zero();
        let mut holders = 0usize;

        for address in state.known_addresses() {
            let reflected = state.reflected_balance(&address);
            let stored_true = state.true_balance(&address);

            if state.is_excluded(&address) {
                if !reflected.is_zero() {
                    issues.push(format!(
                        "excluded address {address} still holds {reflected} reflected units"
                    ));
                }
                if address != sink {
                    excluded_true = accumulate(excluded_true, stored_true, &mut issues);
                }
            } else {
                if !stored_true.is_zero() {
                    issues.push(format!(
                        "included address {address} still holds {stored_true} true units"
                    ));
                }
                included_reflected = accumulate(included_reflected, reflected, &mut issues);
                included_true = accumulate(included_true, self.balance_of(&address), &mut issues);
            }

            if self.balance_of(&address).is_positive() {
                holders += 1;
            }
        }

        if included_reflected > state.supply.reflected_total {
            issues.push(format!(
                "included reflected balances {} exceed reflected supply {}",
                included_reflected, state.supply.reflected_total
            ));
        }

        if state.supply.true_total.is_zero() {
            warnings.push("true supply exhausted; rate is undefined".into());
        }

        let burn_sink_balance = state.true_balance(&sink);
        if burn_sink_balance != state.supply.total_burned {
            warnings.push(format!(
                "burn sink holds {} but {} was burned by fees",
                burn_sink_balance, state.supply.total_burned
            ));
        }

        let is_healthy = issues.is_empty();
        if is_healthy {
            info!(holders, warnings = warnings.len(), "ledger audit passed");
        } else {
            warn!(issues = issues.len(), "ledger audit found issues");
        }

        LedgerAudit {
            is_healthy,
            issues,
            warnings,
            true_total: state.supply.true_total,
            reflected_total: state.supply.reflected_total,
            included_reflected,
            included_true,
            excluded_true,
            burn_sink_balance,
            holders,
        }
    }
}

fn accumulate<N: LedgerAmount>(total: N, value: N, issues: &mut Vec<String>) -> N {
    match total.plus(value) {
        Ok(sum) => sum,
        Err(_) => {
            issues.push(format!("overflow summing balances at {total} + {value}"));
            total
        }
    }
}
