// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::models::{LedgerState, ReportFilter};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))
}

/// Parses a non-negative monetary amount. Accepts `,` as decimal separator.
pub fn parse_amount(s: &str) -> crate::error::Result<Decimal> {
    let raw = s.trim();
    // "1.234,56" and "1,234.56" both mean the same amount.
    let normalized = match (raw.rfind(','), raw.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => raw.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => raw.replace(',', ""),
        (Some(_), None) => raw.replace(',', "."),
        _ => raw.to_string(),
    };
    let amount = normalized
        .parse::<Decimal>()
        .map_err(|_| LedgerError::validation(format!("Invalid amount '{}'", s)))?;
    if amount < Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "Amount '{}' must not be negative",
            s
        )));
    }
    Ok(amount)
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn month_start(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

pub fn month_end(d: NaiveDate) -> NaiveDate {
    month_start(d)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(d)
}

/// First day of the month `n` months after `d`'s month.
pub fn add_months(d: NaiveDate, n: u32) -> NaiveDate {
    month_start(d)
        .checked_add_months(Months::new(n))
        .unwrap_or(NaiveDate::MAX)
}

/// `day` within `month`'s month, rolled back to the last day when the month
/// is shorter. Never spills into the following month.
pub fn clamp_day(month: NaiveDate, day: u32) -> NaiveDate {
    let last = month_end(month);
    last.with_day(day.clamp(1, last.day())).unwrap_or(last)
}

pub fn same_day(a: &impl Datelike, b: &impl Datelike) -> bool {
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

pub fn same_month(a: &impl Datelike, b: &impl Datelike) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Inclusive bounds covering whole calendar days: start at 00:00:00.000,
/// end at 23:59:59.999.
pub fn day_bounds(start: NaiveDate, end: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let end_of_day =
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    (start.and_time(NaiveTime::MIN), end.and_time(end_of_day))
}

/// Calendar-day containment, both ends inclusive, whatever the time of day.
pub fn in_range(at: &NaiveDateTime, start: NaiveDate, end: NaiveDate) -> bool {
    let day = at.date();
    start <= day && day <= end
}

/// Sunday through Saturday of the week containing `today`.
pub fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    (start, start + Duration::days(6))
}

/// Window for a preset filter. `Custom` has no preset and yields `None`.
pub fn filter_bounds(filter: ReportFilter, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    match filter {
        ReportFilter::Weekly => Some(week_bounds(today)),
        ReportFilter::Monthly => Some((month_start(today), month_end(today))),
        ReportFilter::Yearly => {
            let start = today - Duration::days(i64::from(today.ordinal0()));
            Some((start, month_end(add_months(start, 11))))
        }
        ReportFilter::Custom => None,
    }
}

pub fn id_for_account(state: &LedgerState, name: &str) -> Result<i64> {
    state
        .account_by_name(name)
        .map(|a| a.id)
        .with_context(|| format!("Account '{}' not found", name.trim()))
}

/// Required clap string argument, trimmed.
pub fn arg_str<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .with_context(|| format!("Missing --{}", name))
}

/// Optional clap string argument, trimmed; blank counts as absent.
pub fn opt_str<'a>(m: &'a clap::ArgMatches, name: &str) -> Option<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

pub fn arg_id(m: &clap::ArgMatches) -> Result<i64> {
    m.get_one::<i64>("id").copied().context("Missing --id")
}
