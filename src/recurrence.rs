// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Turns recurring bill rules and installment purchases into dated
//! household transactions.
//!
//! Planning is pure: these functions read the ledger and return the rows
//! that should be inserted. `Store` owns the insert-and-persist step.

use chrono::{Datelike, NaiveDate, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{LedgerError, Result};
use crate::models::{
    AmountMode, InstallmentRequest, LedgerState, NewTransaction, RecurringRule, RuleKind,
    Transaction, TxKind,
};
use crate::utils::{add_months, clamp_day, same_month};

/// Installments never land after the 28th so every month has the day.
pub const MAX_INSTALLMENT_DAY: u32 = 28;

/// True when `rule_id` already produced a row dated in `month`'s month.
pub fn is_materialized(transactions: &[Transaction], rule_id: i64, month: NaiveDate) -> bool {
    transactions
        .iter()
        .any(|t| t.recurring_id == Some(rule_id) && same_month(&t.date, &month))
}

/// The row `rule` produces for `month`.
pub fn materialize(rule: &RecurringRule, month: NaiveDate) -> NewTransaction {
    let day = clamp_day(month, rule.day);
    let (amount, reminder) = match rule.kind {
        RuleKind::Fixed => (rule.amount, false),
        RuleKind::Reminder => (Decimal::ZERO, true),
    };
    NewTransaction {
        kind: TxKind::Expense,
        amount,
        description: Some(rule.title.clone()),
        category: Some(rule.category.clone()),
        date: day.and_time(NaiveTime::MIN),
        account_id: None,
        is_home_expense: true,
        is_paid: Some(false),
        recurring_id: Some(rule.id),
        installment_id: None,
        is_reminder: Some(reminder),
    }
}

/// Rows missing for `month`: one per active rule that has none there yet.
/// Empty when the month is already fully materialized.
pub fn plan_month(state: &LedgerState, month: NaiveDate) -> Vec<NewTransaction> {
    state
        .recurring
        .iter()
        .filter(|rule| rule.active)
        .filter(|rule| !is_materialized(&state.transactions, rule.id, month))
        .map(|rule| materialize(rule, month))
        .collect()
}

/// One row per consecutive month starting at `req.start`, all tagged with
/// `group`. In `Total` mode shares are truncated to cents and the last
/// installment takes the remainder, so the rows sum to the total exactly.
pub fn expand_installments(req: &InstallmentRequest, group: i64) -> Result<Vec<NewTransaction>> {
    if req.count == 0 {
        return Err(LedgerError::validation(
            "Installment count must be at least 1",
        ));
    }
    if req.amount < Decimal::ZERO {
        return Err(LedgerError::validation("Installment amount must not be negative"));
    }
    let category = req.category.trim();
    if category.is_empty() {
        return Err(LedgerError::validation("Installments need a category"));
    }

    let count = req.count;
    let share = match req.mode {
        AmountMode::Total => (req.amount / Decimal::from(count))
            .round_dp_with_strategy(2, RoundingStrategy::ToZero),
        AmountMode::PerInstallment => req.amount,
    };
    let day = req.start.day().min(MAX_INSTALLMENT_DAY);

    let rows = (0..count)
        .map(|k| {
            let amount = match req.mode {
                AmountMode::Total if k + 1 == count => {
                    req.amount - share * Decimal::from(count - 1)
                }
                _ => share,
            };
            let date = clamp_day(add_months(req.start, k), day);
            NewTransaction {
                kind: TxKind::Expense,
                amount,
                description: req.description.clone(),
                category: Some(format!("{} ({}/{})", category, k + 1, count)),
                date: date.and_time(NaiveTime::MIN),
                account_id: None,
                is_home_expense: true,
                is_paid: Some(k == 0 && req.first_paid),
                recurring_id: None,
                installment_id: Some(group),
                is_reminder: None,
            }
        })
        .collect();
    Ok(rows)
}
