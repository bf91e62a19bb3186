// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::KvStore;
use crate::metrics::{AccountOverview, account_overview};
use crate::models::{AccountKind, AccountPatch, NewAccount};
use crate::store::Store;
use crate::utils::{
    arg_id, arg_str, fmt_money, maybe_print_json, opt_str, parse_amount, pretty_table,
};
use anyhow::Result;
use chrono::NaiveDate;

pub fn handle<S: KvStore>(
    store: &mut Store<S>,
    m: &clap::ArgMatches,
    today: NaiveDate,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg_str(sub, "name")?;
            let kind = parse_kind(arg_str(sub, "type")?);
            let mut new = NewAccount::new(name, kind);
            if let Some(raw) = opt_str(sub, "initial") {
                new = new.initial_balance(parse_amount(raw)?);
            }
            if let Some(cnpj) = opt_str(sub, "cnpj") {
                new = new.cnpj(cnpj);
            }
            new.description = opt_str(sub, "description").map(str::to_string);
            let account = store.create_account(new)?;
            println!("Added account '{}' (id {})", account.name, account.id);
        }
        Some(("list", sub)) => list(store, sub, today)?,
        Some(("edit", sub)) => {
            let id = arg_id(sub)?;
            let patch = AccountPatch {
                name: opt_str(sub, "name").map(str::to_string),
                kind: opt_str(sub, "type").map(parse_kind),
                initial_balance: opt_str(sub, "initial").map(parse_amount).transpose()?,
                cnpj: opt_str(sub, "cnpj").map(str::to_string),
                description: opt_str(sub, "description").map(str::to_string),
            };
            if store.update_account(id, &patch)? {
                println!("Updated account {}", id);
            } else {
                println!("No account with id {}", id);
            }
        }
        Some(("rm", sub)) => {
            let id = arg_id(sub)?;
            if store.delete_account(id)? {
                println!("Removed account {}", id);
            } else {
                println!("No account with id {}", id);
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_kind(raw: &str) -> AccountKind {
    if raw.eq_ignore_ascii_case("mei") {
        AccountKind::Mei
    } else {
        AccountKind::Cash
    }
}

fn list<S: KvStore>(store: &Store<S>, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data: Vec<AccountOverview> = account_overview(store.state(), today);
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|a| {
                let limit = a
                    .annual
                    .map(|s| format!("{:.1}% ({:?})", s.percent, s.status))
                    .unwrap_or_default();
                vec![
                    a.id.to_string(),
                    a.name.clone(),
                    format!("{:?}", a.kind).to_lowercase(),
                    fmt_money(&a.balance),
                    limit,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Name", "Type", "Balance", "Annual limit"], rows)
        );
    }
    Ok(())
}
