// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::KvStore;
use crate::metrics::{
    LimitStatus, annual_limit_status, category_aggregate, household_summary,
    monthly_limit_status, period_totals, window_transactions,
};
use crate::models::{AccountKind, ReportFilter, ReportWindow};
use crate::store::Store;
use crate::utils::{
    fmt_money, id_for_account, maybe_print_json, opt_str, parse_date, parse_month, pretty_table,
};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::Serialize;

pub fn handle<S: KvStore>(
    store: &mut Store<S>,
    m: &clap::ArgMatches,
    today: NaiveDate,
) -> Result<()> {
    match m.subcommand() {
        Some(("limits", sub)) => limits(store, sub, today)?,
        Some(("categories", sub)) => categories(store, sub)?,
        Some(("summary", sub)) => summary(store, sub)?,
        Some(("household", sub)) => household(store, sub)?,
        Some(("window", sub)) => window(store, sub, today)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct LimitRow {
    account: String,
    annual: LimitStatus,
    monthly: LimitStatus,
}

fn limits<S: KvStore>(store: &Store<S>, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let state = store.state();
    let ids: Vec<i64> = match opt_str(sub, "account") {
        Some(name) => vec![id_for_account(state, name)?],
        None => state
            .accounts
            .iter()
            .filter(|a| a.kind == AccountKind::Mei)
            .map(|a| a.id)
            .collect(),
    };
    let mut data = Vec::new();
    for id in ids {
        let (Some(annual), Some(monthly)) = (
            annual_limit_status(state, id, today),
            monthly_limit_status(state, id, today),
        ) else {
            return Err(anyhow!("Account {} is not an MEI account", id));
        };
        let account = state.account(id).map(|a| a.name.clone()).unwrap_or_default();
        data.push(LimitRow {
            account,
            annual,
            monthly,
        });
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let mut rows = Vec::new();
        for r in &data {
            for (period, s) in [("year", &r.annual), ("month", &r.monthly)] {
                rows.push(vec![
                    r.account.clone(),
                    period.to_string(),
                    fmt_money(&s.total),
                    fmt_money(&s.safe_limit),
                    fmt_money(&s.max_limit),
                    format!("{:.1}%", s.percent),
                    format!("{:?}", s.status).to_lowercase(),
                ]);
            }
        }
        println!(
            "{}",
            pretty_table(
                &["Account", "Period", "Income", "Limit", "Max", "Used", "Status"],
                rows
            )
        );
    }
    Ok(())
}

/// Expense breakdown over `--from`/`--to`, or the saved report window.
fn categories<S: KvStore>(store: &Store<S>, sub: &clap::ArgMatches) -> Result<()> {
    let state = store.state();
    let mut window = state.ui.report;
    if let Some(from) = opt_str(sub, "from") {
        window.start_date = parse_date(from)?;
    }
    if let Some(to) = opt_str(sub, "to") {
        window.end_date = parse_date(to)?;
    }
    let home = sub.get_flag("home");
    let expenses = window_transactions(state, &window)
        .into_iter()
        .filter(|t| t.is_expense() && t.is_home_expense == home);
    let data = category_aggregate(expenses);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    fmt_money(&c.total),
                    format!("{:.1}%", c.percent),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Spent", "Share"], rows));
    }
    Ok(())
}

fn summary<S: KvStore>(store: &Store<S>, sub: &clap::ArgMatches) -> Result<()> {
    let state = store.state();
    let window = state.ui.report;
    let business = window_transactions(state, &window)
        .into_iter()
        .filter(|t| !t.is_home_expense);
    let totals = period_totals(business);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        println!(
            "{}",
            pretty_table(
                &["From", "To", "Income", "Expense", "Net"],
                vec![vec![
                    window.start_date.to_string(),
                    window.end_date.to_string(),
                    fmt_money(&totals.income),
                    fmt_money(&totals.expense),
                    fmt_money(&totals.net),
                ]],
            )
        );
    }
    Ok(())
}

fn household<S: KvStore>(store: &mut Store<S>, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(raw) = opt_str(sub, "month") {
        store.set_selected_month(parse_month(raw)?)?;
    }
    let month = store.state().ui.selected_month;
    let data = household_summary(store.state(), month);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        println!(
            "{}",
            pretty_table(
                &["Month", "Total", "Paid", "Pending", "Open reminders"],
                vec![vec![
                    month.format("%Y-%m").to_string(),
                    fmt_money(&data.total),
                    fmt_money(&data.paid),
                    fmt_money(&data.pending),
                    data.open_reminders.to_string(),
                ]],
            )
        );
    }
    Ok(())
}

fn window<S: KvStore>(
    store: &mut Store<S>,
    sub: &clap::ArgMatches,
    today: NaiveDate,
) -> Result<()> {
    let filter = match opt_str(sub, "filter") {
        Some("weekly") => ReportFilter::Weekly,
        Some("yearly") => ReportFilter::Yearly,
        Some("custom") => ReportFilter::Custom,
        _ => ReportFilter::Monthly,
    };
    let w: ReportWindow = match (filter, opt_str(sub, "from"), opt_str(sub, "to")) {
        (ReportFilter::Custom, Some(from), Some(to)) => {
            store.set_custom_window(parse_date(from)?, parse_date(to)?)?
        }
        _ => store.set_report_filter(filter, today)?,
    };
    println!(
        "Report window: {:?} {} .. {}",
        w.filter, w.start_date, w.end_date
    );
    Ok(())
}
