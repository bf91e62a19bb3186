// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only projections over a `LedgerState`. Nothing here mutates.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{AccountKind, LedgerState, ReportWindow, Transaction};
use crate::utils::{in_range, same_month};

/// Yearly MEI revenue ceiling.
pub const ANNUAL_SAFE_LIMIT: Decimal = Decimal::from_parts(81_000, 0, 0, false, 0);
/// Ceiling plus the 20% tolerance band.
pub const ANNUAL_MAX_LIMIT: Decimal = Decimal::from_parts(97_200, 0, 0, false, 0);
pub const MONTHLY_SAFE_LIMIT: Decimal = Decimal::from_parts(6_750, 0, 0, false, 0);
pub const MONTHLY_MAX_LIMIT: Decimal = Decimal::from_parts(8_100, 0, 0, false, 0);

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitLevel {
    Safe,
    Warning,
    Critical,
}

impl LimitLevel {
    pub fn classify(total: Decimal, safe_limit: Decimal, max_limit: Decimal) -> Self {
        if total > max_limit {
            LimitLevel::Critical
        } else if total > safe_limit {
            LimitLevel::Warning
        } else {
            LimitLevel::Safe
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitStatus {
    pub total: Decimal,
    pub safe_limit: Decimal,
    pub max_limit: Decimal,
    /// `total` as a percentage of `safe_limit`.
    pub percent: Decimal,
    pub status: LimitLevel,
}

impl LimitStatus {
    pub fn new(total: Decimal, safe_limit: Decimal, max_limit: Decimal) -> Self {
        let percent = if safe_limit.is_zero() {
            Decimal::ZERO
        } else {
            total / safe_limit * Decimal::ONE_HUNDRED
        };
        Self {
            total,
            safe_limit,
            max_limit,
            percent,
            status: LimitLevel::classify(total, safe_limit, max_limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub total: Decimal,
    pub percent: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeriodTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdSummary {
    pub total: Decimal,
    pub paid: Decimal,
    pub pending: Decimal,
    pub open_reminders: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOverview {
    pub id: i64,
    pub name: String,
    pub kind: AccountKind,
    pub balance: Decimal,
    pub annual: Option<LimitStatus>,
    pub monthly: Option<LimitStatus>,
}

fn business_rows(state: &LedgerState, account_id: i64) -> impl Iterator<Item = &Transaction> {
    state
        .transactions
        .iter()
        .filter(move |t| !t.is_home_expense && t.account_id == Some(account_id))
}

/// Opening balance plus business income minus business expenses booked to
/// the account. Unknown accounts have a zero balance.
pub fn account_balance(state: &LedgerState, account_id: i64) -> Decimal {
    let Some(account) = state.account(account_id) else {
        return Decimal::ZERO;
    };
    business_rows(state, account_id).fold(account.initial_balance, |acc, t| {
        if t.is_income() {
            acc + t.amount
        } else {
            acc - t.amount
        }
    })
}

fn income_for(
    state: &LedgerState,
    account_id: i64,
    keep: impl Fn(&Transaction) -> bool,
) -> Decimal {
    state
        .transactions
        .iter()
        .filter(|t| t.account_id == Some(account_id) && t.is_income() && keep(*t))
        .map(|t| t.amount)
        .sum()
}

fn mei_account(state: &LedgerState, account_id: i64) -> Option<Decimal> {
    state
        .account(account_id)
        .filter(|a| a.kind == AccountKind::Mei)
        .map(|a| a.initial_balance)
}

/// Opening balance plus this calendar year's income, against the yearly
/// ceiling. `None` for anything but an MEI account.
pub fn annual_limit_status(
    state: &LedgerState,
    account_id: i64,
    today: NaiveDate,
) -> Option<LimitStatus> {
    let opening = mei_account(state, account_id)?;
    let income = income_for(state, account_id, |t| t.date.year() == today.year());
    Some(LimitStatus::new(
        opening + income,
        ANNUAL_SAFE_LIMIT,
        ANNUAL_MAX_LIMIT,
    ))
}

/// This calendar month's income against one twelfth of the yearly ceiling.
pub fn monthly_limit_status(
    state: &LedgerState,
    account_id: i64,
    today: NaiveDate,
) -> Option<LimitStatus> {
    mei_account(state, account_id)?;
    let income = income_for(state, account_id, |t| same_month(&t.date, &today));
    Some(LimitStatus::new(
        income,
        MONTHLY_SAFE_LIMIT,
        MONTHLY_MAX_LIMIT,
    ))
}

/// Groups by category, largest total first. Equal totals keep the order in
/// which their category first appeared.
pub fn category_aggregate<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<CategoryTotal> {
    let mut groups: Vec<(String, Decimal)> = Vec::new();
    for t in transactions {
        let name = t
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED);
        match groups.iter_mut().find(|(n, _)| n == name) {
            Some((_, total)) => *total += t.amount,
            None => groups.push((name.to_string(), t.amount)),
        }
    }
    let grand: Decimal = groups.iter().map(|(_, total)| *total).sum();
    // sort_by is stable, which keeps first-seen order on ties
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
        .into_iter()
        .map(|(name, total)| {
            let percent = if grand.is_zero() {
                Decimal::ZERO
            } else {
                total / grand * Decimal::ONE_HUNDRED
            };
            CategoryTotal {
                name,
                total,
                percent,
            }
        })
        .collect()
}

/// Rows dated between the calendar days of `start` and `end`, both
/// inclusive. Time of day on the bounds is ignored.
pub fn range_filter(
    transactions: &[Transaction],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|t| in_range(&t.date, start.date(), end.date()))
        .collect()
}

pub fn window_transactions<'a>(
    state: &'a LedgerState,
    window: &ReportWindow,
) -> Vec<&'a Transaction> {
    state
        .transactions
        .iter()
        .filter(|t| in_range(&t.date, window.start_date, window.end_date))
        .collect()
}

pub fn period_totals<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> PeriodTotals {
    let mut totals = PeriodTotals::default();
    for t in transactions {
        if t.is_income() {
            totals.income += t.amount;
        } else {
            totals.expense += t.amount;
        }
    }
    totals.net = totals.income - totals.expense;
    totals
}

/// Household or business rows for `month`'s calendar month, oldest first.
pub fn transactions_in_month(
    state: &LedgerState,
    month: NaiveDate,
    household: bool,
) -> Vec<&Transaction> {
    let mut rows: Vec<&Transaction> = state
        .transactions
        .iter()
        .filter(|t| t.is_home_expense == household && same_month(&t.date, &month))
        .collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    rows
}

pub fn household_summary(state: &LedgerState, month: NaiveDate) -> HouseholdSummary {
    let mut summary = HouseholdSummary::default();
    for t in transactions_in_month(state, month, true) {
        if !t.is_expense() {
            continue;
        }
        summary.total += t.amount;
        if t.is_paid() {
            summary.paid += t.amount;
        } else {
            summary.pending += t.amount;
        }
        if t.is_open_reminder() {
            summary.open_reminders += 1;
        }
    }
    summary
}

pub fn account_overview(state: &LedgerState, today: NaiveDate) -> Vec<AccountOverview> {
    state
        .accounts
        .iter()
        .map(|a| AccountOverview {
            id: a.id,
            name: a.name.clone(),
            kind: a.kind,
            balance: account_balance(state, a.id),
            annual: annual_limit_status(state, a.id, today),
            monthly: monthly_limit_status(state, a.id, today),
        })
        .collect()
}
