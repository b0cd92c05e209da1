//! Operation scripts replayed against a fresh ledger
//!
//! A script is a JSON array of objects tagged by `op`. Every operation runs
//! to completion or is rejected on its own; a rejection is reported and the
//! replay moves on.

use crate::config::AppConfig;
use anyhow::{Context, Result};
use rft_ledger::{
    CallContext, Decimal, LedgerAmount, LedgerAudit, LedgerError, LedgerParams, LedgerResult, LedgerState,
    NumericBackend, ReflectingLedger, TransferReceipt,
};
use rft_types::Address;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Amount as written in a script: JSON string or whole number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptAmount {
    Text(String),
    Whole(u64),
}

impl fmt::Display for ScriptAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptAmount::Text(text) => f.write_str(text),
            ScriptAmount::Whole(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptOp {
    Transfer {
        caller: String,
        amount: ScriptAmount,
        to: String,
    },
    TransferFrom {
        caller: String,
        amount: ScriptAmount,
        to: String,
        main_account: String,
    },
    Approve {
        caller: String,
        amount: ScriptAmount,
        to: String,
    },
    Exclude {
        caller: String,
        address: String,
    },
    Include {
        caller: String,
        address: String,
    },
    SetFeeExempt {
        caller: String,
        address: String,
        exempt: bool,
    },
    ChangeMetadata {
        caller: String,
        key: String,
        value: String,
    },
    BalanceOf {
        address: String,
    },
}

impl ScriptOp {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptOp::Transfer { .. } => "transfer",
            ScriptOp::TransferFrom { .. } => "transfer_from",
            ScriptOp::Approve { .. } => "approve",
            ScriptOp::Exclude { .. } => "exclude",
            ScriptOp::Include { .. } => "include",
            ScriptOp::SetFeeExempt { .. } => "set_fee_exempt",
            ScriptOp::ChangeMetadata { .. } => "change_metadata",
            ScriptOp::BalanceOf { .. } => "balance_of",
        }
    }
}

/// Snapshot written by `simulate --snapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile<N> {
    pub backend: NumericBackend,
    pub params: LedgerParams,
    pub state: LedgerState<N>,
}

pub fn load_script(path: &Path) -> Result<Vec<ScriptOp>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse script {}", path.display()))
}

pub fn genesis_ledger<N: LedgerAmount>(config: &AppConfig) -> Result<ReflectingLedger<N>> {
    let genesis = config.genesis_config::<N>()?;
    ReflectingLedger::genesis(config.ledger_params(), genesis).context("genesis failed")
}

/// Apply one operation, returning its JSON outcome line.
pub fn apply_op<N: LedgerAmount>(
    ledger: &mut ReflectingLedger<N>,
    contract: &Address,
    index: usize,
    op: &ScriptOp,
) -> Value {
    match run_op(ledger, contract, op) {
        Ok(result) => json!({ "index": index, "op": op.name(), "ok": true, "result": result }),
        Err(err) => json!({
            "index": index,
            "op": op.name(),
            "ok": false,
            "kind": err.kind().as_str(),
            "reason": err.to_string(),
        }),
    }
}

fn run_op<N: LedgerAmount>(
    ledger: &mut ReflectingLedger<N>,
    contract: &Address,
    op: &ScriptOp,
) -> LedgerResult<Value> {
    let ctx = |caller: &str| -> LedgerResult<CallContext> {
        Ok(CallContext::new(parse_address(caller)?, contract.clone()))
    };

    let result = match op {
        ScriptOp::Transfer { caller, amount, to } => {
            let receipt = ledger.transfer(&ctx(caller)?, parse(amount)?, &parse_address(to)?)?;
            transfer_json(&receipt)
        }
        ScriptOp::TransferFrom {
            caller,
            amount,
            to,
            main_account,
        } => {
            let receipt = ledger.transfer_from(
                &ctx(caller)?,
                parse(amount)?,
                &parse_address(to)?,
                &parse_address(main_account)?,
            )?;
            transfer_json(&receipt)
        }
        ScriptOp::Approve { caller, amount, to } => {
            let receipt = ledger.approve(&ctx(caller)?, parse(amount)?, &parse_address(to)?)?;
            json!({
                "message": receipt.to_string(),
                "owner": receipt.owner,
                "spender": receipt.spender,
                "amount": receipt.amount.to_string(),
            })
        }
        ScriptOp::Exclude { caller, address } => {
            ledger.exclude_from_rewards(&ctx(caller)?, &parse_address(address)?)?;
            json!({ "address": address, "excluded": true })
        }
        ScriptOp::Include { caller, address } => {
            ledger.include_in_rewards(&ctx(caller)?, &parse_address(address)?)?;
            json!({ "address": address, "excluded": false })
        }
        ScriptOp::SetFeeExempt {
            caller,
            address,
            exempt,
        } => {
            ledger.set_fee_exempt(&ctx(caller)?, &parse_address(address)?, *exempt)?;
            json!({ "address": address, "fee_exempt": exempt })
        }
        ScriptOp::ChangeMetadata { caller, key, value } => {
            ledger.change_metadata(&ctx(caller)?, key, value)?;
            json!({ "key": key, "value": value })
        }
        ScriptOp::BalanceOf { address } => {
            let balance = ledger.balance_of(&parse_address(address)?);
            json!({ "address": address, "balance": balance.to_string() })
        }
    };
    Ok(result)
}

// Amounts go out as strings: `serde_json::Value` cannot hold a u128 past u64.
fn transfer_json<N: LedgerAmount>(receipt: &TransferReceipt<N>) -> Value {
    json!({
        "message": receipt.to_string(),
        "from": receipt.from,
        "to": receipt.to,
        "spender": receipt.spender,
        "amount": receipt.amount.to_string(),
        "credited": receipt.credited.to_string(),
        "burned": receipt.burned.to_string(),
        "reflected": receipt.reflected.to_string(),
        "fees_applied": receipt.fees_applied,
    })
}

fn audit_json<N: LedgerAmount>(audit: &LedgerAudit<N>) -> Value {
    json!({
        "is_healthy": audit.is_healthy,
        "issues": audit.issues,
        "warnings": audit.warnings,
        "included_reflected": audit.included_reflected.to_string(),
        "included_true": audit.included_true.to_string(),
        "excluded_true": audit.excluded_true.to_string(),
        "burn_sink_balance": audit.burn_sink_balance.to_string(),
        "holders": audit.holders,
    })
}

fn parse<N: LedgerAmount>(amount: &ScriptAmount) -> LedgerResult<N> {
    N::parse_amount(&amount.to_string())
}

// Script addresses end up as state keys, so they get the same checks a
// snapshot reload applies.
fn parse_address(raw: &str) -> LedgerResult<Address> {
    Address::parse(raw).map_err(|source| LedgerError::InvalidAddress {
        address: raw.to_string(),
        source,
    })
}

/// Final state report: supply, rate, balances and audit.
pub fn summary<N: LedgerAmount>(ledger: &ReflectingLedger<N>) -> Value {
    let balances: BTreeMap<String, String> = ledger
        .state()
        .known_addresses()
        .into_iter()
        .map(|address| {
            let balance = ledger.balance_of(&address).to_string();
            (address.to_string(), balance)
        })
        .collect();

    json!({
        "backend": N::BACKEND,
        "total_supply": ledger.total_supply().to_string(),
        "reflected_supply": ledger.reflected_supply().to_string(),
        "rate": ledger.rate().ok().map(|rate| rate.to_string()),
        "total_burned": ledger.state().supply.total_burned.to_string(),
        "total_reflected": ledger.state().supply.total_reflected.to_string(),
        "balances": balances,
        "audit": audit_json(&ledger.audit()),
    })
}

pub fn run_genesis(config: &AppConfig, out: &mut impl Write) -> Result<()> {
    let summary = match config.backend {
        NumericBackend::Decimal => summary(&genesis_ledger::<Decimal>(config)?),
        NumericBackend::FixedPoint => summary(&genesis_ledger::<u128>(config)?),
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    Ok(())
}

pub fn run_simulation(
    config: &AppConfig,
    script: &Path,
    snapshot: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let ops = load_script(script)?;
    match config.backend {
        NumericBackend::Decimal => simulate::<Decimal>(config, &ops, snapshot, out),
        NumericBackend::FixedPoint => simulate::<u128>(config, &ops, snapshot, out),
    }
}

fn simulate<N: LedgerAmount>(
    config: &AppConfig,
    ops: &[ScriptOp],
    snapshot: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let mut ledger = genesis_ledger::<N>(config)?;
    let contract = Address::parse(&config.contract_address)
        .with_context(|| format!("invalid contract address {:?}", config.contract_address))?;

    let mut rejected = 0usize;
    for (index, op) in ops.iter().enumerate() {
        let line = apply_op(&mut ledger, &contract, index, op);
        if line["ok"] == Value::Bool(false) {
            rejected += 1;
        }
        writeln!(out, "{}", serde_json::to_string(&line)?)?;
    }

    writeln!(out, "{}", serde_json::to_string(&json!({ "summary": summary(&ledger) }))?)?;
    info!(operations = ops.len(), rejected, backend = %N::BACKEND, "script replayed");

    if let Some(path) = snapshot {
        let file = SnapshotFile {
            backend: N::BACKEND,
            params: ledger.params().clone(),
            state: ledger.into_state(),
        };
        let encoded = serde_json::to_string_pretty(&file)?;
        fs::write(path, encoded)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        info!(path = %path.display(), "snapshot written");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixed_config() -> AppConfig {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rft.toml");
        fs::write(&path, "backend = \"fixed\"\ninitial_supply = \"1000000\"\n").unwrap();
        AppConfig::load(Some(&path)).unwrap()
    }

    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("ops.json");
        fs::write(&path, body).unwrap();
        path
    }

    const SCRIPT: &str = r#"[
        { "op": "transfer", "caller": "creator", "amount": 1000, "to": "dave" },
        { "op": "transfer", "caller": "dave", "amount": "5000", "to": "erin" },
        { "op": "approve", "caller": "dave", "amount": 100, "to": "erin" },
        { "op": "transfer_from", "caller": "erin", "amount": 100, "to": "frank", "main_account": "dave" },
        { "op": "exclude", "caller": "creator", "address": "frank" },
        { "op": "include", "caller": "dave", "address": "frank" },
        { "op": "balance_of", "address": "frank" }
    ]"#;

    #[test]
    fn script_parses_tagged_ops() {
        let ops: Vec<ScriptOp> = serde_json::from_str(SCRIPT).unwrap();
        assert_eq!(ops.len(), 7);
        assert_eq!(
            ops[0],
            ScriptOp::Transfer {
                caller: "creator".into(),
                amount: ScriptAmount::Whole(1000),
                to: "dave".into(),
            }
        );
        assert_eq!(ops[3].name(), "transfer_from");
    }

    #[test]
    fn replay_reports_each_outcome_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), SCRIPT);
        let snapshot = dir.path().join("snapshot.json");

        let mut out = Vec::new();
        run_simulation(&fixed_config(), &script, Some(&snapshot), &mut out).unwrap();

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 8);

        assert_eq!(lines[0]["ok"], true);
        assert_eq!(lines[0]["result"]["message"], "Transferred 1000");
        assert_eq!(lines[1]["ok"], false);
        assert_eq!(lines[1]["kind"], "InsufficientBalanceError");
        assert_eq!(lines[3]["result"]["message"], "Sent 100 to frank from dave");
        assert_eq!(lines[5]["kind"], "UnauthorizedError");
        assert_eq!(lines[6]["result"]["balance"], "95");

        let summary = &lines[7]["summary"];
        assert_eq!(summary["backend"], "fixed");
        assert_eq!(summary["audit"]["is_healthy"], true);

        let stored: SnapshotFile<u128> =
            serde_json::from_str(&fs::read_to_string(&snapshot).unwrap()).unwrap();
        assert_eq!(stored.backend, NumericBackend::FixedPoint);
        let restored = ReflectingLedger::from_state(stored.params, stored.state).unwrap();
        assert_eq!(restored.balance_of(&Address::new("frank")), 95);
        assert!(restored.is_excluded(&Address::new("frank")));
    }

    #[test]
    fn unparseable_amount_is_rejected_not_fatal() {
        let mut ledger = genesis_ledger::<u128>(&fixed_config()).unwrap();
        let op = ScriptOp::Transfer {
            caller: "creator".into(),
            amount: ScriptAmount::Text("1.5".into()),
            to: "dave".into(),
        };
        let line = apply_op(&mut ledger, &Address::new("con_reflection"), 0, &op);
        assert_eq!(line["kind"], "InvalidAmountError");
        assert_eq!(ledger.total_supply(), 1_000_000);
    }

    #[test]
    fn invalid_addresses_are_rejected_and_snapshot_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let long = "x".repeat(300);
        let body = format!(
            r#"[
                {{ "op": "transfer", "caller": "creator", "amount": 1000, "to": "" }},
                {{ "op": "transfer", "caller": "creator", "amount": 1000, "to": "bad name" }},
                {{ "op": "approve", "caller": "{long}", "amount": 1, "to": "dave" }},
                {{ "op": "balance_of", "address": "" }},
                {{ "op": "transfer", "caller": "creator", "amount": 1000, "to": "dave" }}
            ]"#
        );
        let script = write_script(dir.path(), &body);
        let snapshot = dir.path().join("snapshot.json");

        let mut out = Vec::new();
        run_simulation(&fixed_config(), &script, Some(&snapshot), &mut out).unwrap();
        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        for line in &lines[..4] {
            assert_eq!(line["ok"], false);
            assert_eq!(line["kind"], "InvalidAddressError");
        }
        assert_eq!(lines[4]["ok"], true);
        assert_eq!(lines[5]["summary"]["total_supply"], "999980");

        let stored: SnapshotFile<u128> =
            serde_json::from_str(&fs::read_to_string(&snapshot).unwrap()).unwrap();
        let restored = ReflectingLedger::from_state(stored.params, stored.state).unwrap();
        assert_eq!(restored.balance_of(&Address::new("dave")), 950);
    }

    #[test]
    fn genesis_summary_is_pretty_json() {
        let mut out = Vec::new();
        run_genesis(&fixed_config(), &mut out).unwrap();
        let summary: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(summary["total_supply"], "1000000");
        assert_eq!(summary["balances"]["creator"], "1000000");
    }

    #[test]
    fn missing_script_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_simulation(&fixed_config(), &dir.path().join("none.json"), None, &mut Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("failed to read script"));
    }
}
