// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::KvStore;
use crate::models::{AmountMode, InstallmentRequest};
use crate::store::Store;
use crate::utils::{arg_str, fmt_money, opt_str, parse_amount, parse_date, pretty_table};
use anyhow::{Context, Result};
use chrono::NaiveDate;

pub fn handle<S: KvStore>(
    store: &mut Store<S>,
    m: &clap::ArgMatches,
    today: NaiveDate,
) -> Result<()> {
    if let Some(("add", sub)) = m.subcommand() {
        let start = match opt_str(sub, "start") {
            Some(raw) => parse_date(raw)?,
            None => today,
        };
        let req = InstallmentRequest {
            category: arg_str(sub, "category")?.to_string(),
            description: opt_str(sub, "description").map(str::to_string),
            amount: parse_amount(arg_str(sub, "amount")?)?,
            mode: if sub.get_flag("per-installment") {
                AmountMode::PerInstallment
            } else {
                AmountMode::Total
            },
            count: *sub.get_one::<u32>("count").context("Missing --count")?,
            start,
            first_paid: sub.get_flag("paid"),
        };
        let created = store.add_installments(&req)?;
        let rows = created
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.date.date().to_string(),
                    t.category.clone().unwrap_or_default(),
                    fmt_money(&t.amount),
                    if t.is_paid() { "paid" } else { "pending" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Category", "Amount", "Status"], rows)
        );
    }
    Ok(())
}
