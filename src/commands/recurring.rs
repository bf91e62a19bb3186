// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::KvStore;
use crate::models::{CategoryList, NewRule, RuleKind};
use crate::store::Store;
use crate::utils::{
    arg_id, arg_str, fmt_money, maybe_print_json, opt_str, parse_amount, parse_month,
    pretty_table,
};
use anyhow::{Context, Result};

pub fn handle<S: KvStore>(store: &mut Store<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let kind = if sub.get_flag("reminder") {
                RuleKind::Reminder
            } else {
                RuleKind::Fixed
            };
            let amount = match kind {
                RuleKind::Fixed => parse_amount(arg_str(sub, "amount")?)?,
                RuleKind::Reminder => rust_decimal::Decimal::ZERO,
            };
            let day = *sub.get_one::<u32>("day").context("Missing --day")?;
            let category = arg_str(sub, "category")?;
            let rule = store.create_rule(NewRule {
                title: arg_str(sub, "title")?.to_string(),
                category: category.to_string(),
                amount,
                day,
                kind,
            })?;
            store.add_category(CategoryList::Household, category)?;
            println!(
                "Added {:?} bill '{}' on day {} (id {})",
                rule.kind, rule.title, rule.day, rule.id
            );
        }
        Some(("list", sub)) => {
            let rules = store.rules();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rules)? {
                let rows = rules
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.title.clone(),
                            r.category.clone(),
                            fmt_money(&r.amount),
                            r.day.to_string(),
                            format!("{:?}", r.kind).to_lowercase(),
                            if r.active { "yes" } else { "no" }.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Title", "Category", "Amount", "Day", "Type", "Active"],
                        rows
                    )
                );
            }
        }
        Some(("rm", sub)) => {
            let id = arg_id(sub)?;
            if store.delete_rule(id)? {
                println!("Deactivated rule {}; existing bills were kept", id);
            } else {
                println!("No rule with id {}", id);
            }
        }
        Some(("sync", sub)) => {
            let month = match opt_str(sub, "month") {
                Some(raw) => parse_month(raw)?,
                None => store.state().ui.selected_month,
            };
            let created = store.set_selected_month(month)?;
            println!(
                "{} bill(s) created for {}",
                created.len(),
                month.format("%Y-%m")
            );
        }
        Some(("resolve", sub)) => {
            let id = arg_id(sub)?;
            let amount = parse_amount(arg_str(sub, "amount")?)?;
            if store.resolve_reminder(id, amount)? {
                println!("Reminder {} set to {}", id, fmt_money(&amount));
            } else {
                println!("No transaction with id {}", id);
            }
        }
        _ => {}
    }
    Ok(())
}
