// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Result, bail};
use serde_json::json;

use crate::models::{LedgerState, Transaction};
use crate::utils::{arg_str, fmt_money};

pub fn handle(state: &LedgerState, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt = arg_str(sub, "format")?.to_lowercase();
            let out = arg_str(sub, "out")?;
            let n = export_transactions(state, &fmt, Path::new(out))?;
            println!("Exported {} transactions to {}", n, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

fn ordered(state: &LedgerState) -> Vec<&Transaction> {
    let mut rows: Vec<&Transaction> = state.transactions.iter().collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    rows
}

fn account_name(state: &LedgerState, t: &Transaction) -> String {
    t.account_id
        .and_then(|id| state.account(id))
        .map(|a| a.name.clone())
        .unwrap_or_default()
}

/// Writes every transaction, oldest first, as `csv` or `json`. Unknown
/// formats are rejected before `out` is touched.
pub fn export_transactions(state: &LedgerState, fmt: &str, out: &Path) -> Result<usize> {
    let rows = ordered(state);
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "date",
                "type",
                "amount",
                "account",
                "category",
                "description",
                "household",
                "paid",
            ])?;
            for t in &rows {
                wtr.write_record([
                    t.id.to_string(),
                    t.date.date().to_string(),
                    format!("{:?}", t.kind).to_lowercase(),
                    fmt_money(&t.amount),
                    account_name(state, t),
                    t.category.clone().unwrap_or_default(),
                    t.description.clone().unwrap_or_default(),
                    t.is_home_expense.to_string(),
                    t.is_paid().to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id,
                        "date": t.date.date().to_string(),
                        "type": t.kind,
                        "amount": fmt_money(&t.amount),
                        "account": account_name(state, t),
                        "category": t.category,
                        "description": t.description,
                        "household": t.is_home_expense,
                        "paid": t.is_paid(),
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(rows.len())
}
