// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::KvStore;
use crate::metrics::range_filter;
use crate::models::{CategoryList, LedgerState, NewTransaction, TransactionPatch, TxKind};
use crate::store::Store;
use crate::utils::{
    arg_id, arg_str, day_bounds, fmt_money, id_for_account, maybe_print_json, month_end,
    month_start, opt_str, parse_amount, parse_date, parse_month, pretty_table,
};
use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

pub fn handle<S: KvStore>(
    store: &mut Store<S>,
    m: &clap::ArgMatches,
    today: NaiveDate,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub, today)?,
        Some(("list", sub)) => list(store.state(), sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => {
            let id = arg_id(sub)?;
            if store.delete_transaction(id)? {
                println!("Removed transaction {}", id);
            } else {
                println!("No transaction with id {}", id);
            }
        }
        Some(("pay", sub)) => {
            let id = arg_id(sub)?;
            let paid = !sub.get_flag("undo");
            if store.set_paid(id, paid)? {
                println!(
                    "Transaction {} marked {}",
                    id,
                    if paid { "paid" } else { "pending" }
                );
            } else {
                println!("No transaction with id {}", id);
            }
        }
        _ => {}
    }
    Ok(())
}

fn add<S: KvStore>(store: &mut Store<S>, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let kind = if arg_str(sub, "type")? == "income" {
        TxKind::Income
    } else {
        TxKind::Expense
    };
    let amount = parse_amount(arg_str(sub, "amount")?)?;
    let date = match opt_str(sub, "date") {
        Some(raw) => parse_date(raw)?,
        None => today,
    };
    let home = sub.get_flag("home");
    let category = opt_str(sub, "category");

    let mut new = NewTransaction::on_date(amount, kind, date);
    if home {
        new.is_home_expense = true;
        new.is_paid = Some(sub.get_flag("paid"));
    }
    if let Some(name) = opt_str(sub, "account") {
        new = new.account(id_for_account(store.state(), name)?);
    }
    if let Some(cat) = category {
        new = new.category(cat);
    }
    if let Some(desc) = opt_str(sub, "description") {
        new = new.description(desc);
    }

    let tx = store.create_transaction(new)?;
    if let Some(cat) = category {
        let list = if home {
            CategoryList::Household
        } else {
            CategoryList::Business
        };
        store.add_category(list, cat)?;
    }
    println!(
        "Recorded {:?} {} on {} (id {})",
        tx.kind,
        fmt_money(&tx.amount),
        tx.date.date(),
        tx.id
    );
    Ok(())
}

fn edit<S: KvStore>(store: &mut Store<S>, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg_id(sub)?;
    let account_id = match opt_str(sub, "account") {
        Some(name) => Some(id_for_account(store.state(), name)?),
        None => None,
    };
    let date = match opt_str(sub, "date") {
        Some(raw) => Some(parse_date(raw)?.and_time(NaiveTime::MIN)),
        None => None,
    };
    let patch = TransactionPatch {
        amount: opt_str(sub, "amount").map(parse_amount).transpose()?,
        date,
        account_id,
        category: opt_str(sub, "category").map(str::to_string),
        description: opt_str(sub, "description").map(str::to_string),
        ..Default::default()
    };
    if store.update_transaction(id, &patch)? {
        println!("Updated transaction {}", id);
    } else {
        println!("No transaction with id {}", id);
    }
    Ok(())
}

fn list(state: &LedgerState, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(state, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.amount.clone(),
                    r.account.clone(),
                    r.category.clone(),
                    r.description.clone(),
                    r.status.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "ID",
                    "Date",
                    "Type",
                    "Amount",
                    "Account",
                    "Category",
                    "Description",
                    "Status"
                ],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub kind: String,
    pub amount: String,
    pub account: String,
    pub category: String,
    pub description: String,
    pub status: String,
}

/// Newest first. `--month` wins over `--from`/`--to`.
pub fn query_rows(state: &LedgerState, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let window = match (opt_str(sub, "month"), opt_str(sub, "from"), opt_str(sub, "to")) {
        (Some(month), _, _) => {
            let m = parse_month(month)?;
            Some((month_start(m), month_end(m)))
        }
        (None, Some(from), Some(to)) => Some((parse_date(from)?, parse_date(to)?)),
        (None, Some(from), None) => Some((parse_date(from)?, NaiveDate::MAX)),
        (None, None, Some(to)) => Some((NaiveDate::MIN, parse_date(to)?)),
        (None, None, None) => None,
    };
    let mut selected = match window {
        Some((start, end)) => {
            let (lo, hi) = day_bounds(start, end);
            range_filter(&state.transactions, lo, hi)
        }
        None => state.transactions.iter().collect(),
    };
    if sub.get_flag("home") {
        selected.retain(|t| t.is_home_expense);
    }
    selected.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        selected.truncate(*limit);
    }

    let data = selected
        .into_iter()
        .map(|t| {
            let account = t
                .account_id
                .and_then(|id| state.account(id))
                .map(|a| a.name.clone())
                .unwrap_or_default();
            let status = if t.is_open_reminder() {
                "reminder"
            } else if t.is_home_expense && t.is_paid() {
                "paid"
            } else if t.is_home_expense {
                "pending"
            } else {
                ""
            };
            TransactionRow {
                id: t.id,
                date: t.date.date().to_string(),
                kind: format!("{:?}", t.kind).to_lowercase(),
                amount: fmt_money(&t.amount),
                account,
                category: t.category.clone().unwrap_or_default(),
                description: t.description.clone().unwrap_or_default(),
                status: status.to_string(),
            }
        })
        .collect();
    Ok(data)
}
