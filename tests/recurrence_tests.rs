// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};
use meiledger::Store;
use meiledger::db::MemoryKv;
use meiledger::models::{
    AmountMode, InstallmentRequest, LedgerState, RecurringRule, RuleKind, TxKind,
};
use meiledger::recurrence::{expand_installments, materialize, plan_month};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn rule(id: i64, day: u32, amount: Decimal, kind: RuleKind) -> RecurringRule {
    RecurringRule {
        id,
        title: format!("Bill {}", id),
        category: "Rent".into(),
        amount,
        day,
        kind,
        active: true,
    }
}

fn installments(
    amount: Decimal,
    mode: AmountMode,
    count: u32,
    start: NaiveDate,
) -> InstallmentRequest {
    InstallmentRequest {
        category: "Fridge".into(),
        description: Some("Kitchen".into()),
        amount,
        mode,
        count,
        start,
        first_paid: false,
    }
}

#[test]
fn fixed_rule_in_march() {
    let row = materialize(&rule(1, 10, dec!(150), RuleKind::Fixed), day(2025, 3, 1));
    assert_eq!(row.date.date(), day(2025, 3, 10));
    assert_eq!(row.amount, dec!(150));
    assert_eq!(row.kind, TxKind::Expense);
    assert!(row.is_home_expense);
    assert_eq!(row.is_paid, Some(false));
    assert_eq!(row.recurring_id, Some(1));
    assert_eq!(row.is_reminder, Some(false));
    assert_eq!(row.description.as_deref(), Some("Bill 1"));
}

#[test]
fn day_30_clamps_to_end_of_february() {
    let row = materialize(&rule(1, 30, dec!(10), RuleKind::Fixed), day(2025, 2, 14));
    assert_eq!(row.date.date(), day(2025, 2, 28));
    let leap = materialize(&rule(1, 31, dec!(10), RuleKind::Fixed), day(2024, 2, 1));
    assert_eq!(leap.date.date(), day(2024, 2, 29));
}

#[test]
fn reminder_rows_are_zero_placeholders() {
    let row = materialize(&rule(4, 5, dec!(99), RuleKind::Reminder), day(2025, 6, 1));
    assert!(row.amount.is_zero());
    assert_eq!(row.is_reminder, Some(true));
    assert_eq!(row.is_paid, Some(false));
}

#[test]
fn plan_skips_inactive_and_already_materialized() {
    let mut state = LedgerState::with_defaults(day(2025, 3, 1));
    let mut off = rule(2, 3, dec!(20), RuleKind::Fixed);
    off.active = false;
    state.recurring = vec![rule(1, 10, dec!(150), RuleKind::Fixed), off];
    let planned = plan_month(&state, day(2025, 3, 1));
    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].recurring_id, Some(1));
}

#[test]
fn ensure_twice_creates_one_row_per_month() {
    let mut store = Store::open(MemoryKv::new(), day(2025, 1, 1)).unwrap();
    store
        .create_rule(meiledger::models::NewRule {
            title: "Condo".into(),
            category: "Rent".into(),
            amount: dec!(300),
            day: 30,
            kind: RuleKind::Fixed,
        })
        .unwrap();
    for _ in 0..2 {
        store.ensure_recurring_for_month(day(2025, 2, 1)).unwrap();
    }
    let feb: Vec<_> = store
        .state()
        .transactions
        .iter()
        .filter(|t| t.date.month() == 2)
        .collect();
    assert_eq!(feb.len(), 1);
    assert_eq!(feb[0].date.date(), day(2025, 2, 28));
    // January came from creating the rule
    assert_eq!(store.state().transactions.len(), 2);
}

#[test]
fn manual_edit_of_materialized_row_survives_resync() {
    let mut store = Store::open(MemoryKv::new(), day(2025, 5, 1)).unwrap();
    store
        .create_rule(meiledger::models::NewRule {
            title: "Water".into(),
            category: "Water".into(),
            amount: dec!(40),
            day: 8,
            kind: RuleKind::Fixed,
        })
        .unwrap();
    let id = store.state().transactions[0].id;
    store.set_paid(id, true).unwrap();
    store.ensure_recurring_for_month(day(2025, 5, 1)).unwrap();
    assert_eq!(store.state().transactions.len(), 1);
    assert!(store.state().transactions[0].is_paid());
}

#[test]
fn total_mode_splits_evenly() {
    let rows = expand_installments(
        &installments(dec!(1200), AmountMode::Total, 3, day(2025, 1, 15)),
        7,
    )
    .unwrap();
    assert_eq!(rows.len(), 3);
    let dates: Vec<_> = rows.iter().map(|r| r.date.date()).collect();
    assert_eq!(dates, vec![day(2025, 1, 15), day(2025, 2, 15), day(2025, 3, 15)]);
    assert!(rows.iter().all(|r| r.amount == dec!(400)));
    assert!(rows.iter().all(|r| r.installment_id == Some(7)));
    assert!(rows.iter().all(|r| r.is_home_expense && r.kind == TxKind::Expense));
    let cats: Vec<_> = rows.iter().map(|r| r.category.clone().unwrap()).collect();
    assert_eq!(cats, vec!["Fridge (1/3)", "Fridge (2/3)", "Fridge (3/3)"]);
}

#[test]
fn total_mode_remainder_goes_to_last_installment() {
    let rows = expand_installments(
        &installments(dec!(100), AmountMode::Total, 3, day(2025, 1, 1)),
        1,
    )
    .unwrap();
    let amounts: Vec<_> = rows.iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
    let sum: Decimal = amounts.iter().sum();
    assert_eq!(sum, dec!(100));
}

#[test]
fn per_installment_mode_repeats_amount() {
    let rows = expand_installments(
        &installments(dec!(89.90), AmountMode::PerInstallment, 4, day(2025, 11, 5)),
        1,
    )
    .unwrap();
    assert!(rows.iter().all(|r| r.amount == dec!(89.90)));
    assert_eq!(rows[3].date.date(), day(2026, 2, 5));
}

#[test]
fn installment_day_is_capped_at_28() {
    let rows = expand_installments(
        &installments(dec!(60), AmountMode::Total, 2, day(2025, 1, 31)),
        1,
    )
    .unwrap();
    assert_eq!(rows[0].date.date(), day(2025, 1, 28));
    assert_eq!(rows[1].date.date(), day(2025, 2, 28));
}

#[test]
fn only_first_installment_can_start_paid() {
    let mut req = installments(dec!(300), AmountMode::Total, 3, day(2025, 4, 2));
    req.first_paid = true;
    let rows = expand_installments(&req, 1).unwrap();
    let paid: Vec<_> = rows.iter().map(|r| r.is_paid).collect();
    assert_eq!(paid, vec![Some(true), Some(false), Some(false)]);
}

#[test]
fn zero_count_is_rejected() {
    let req = installments(dec!(300), AmountMode::Total, 0, day(2025, 4, 2));
    assert!(expand_installments(&req, 1).is_err());
}

#[test]
fn store_groups_each_purchase_separately() {
    let mut store = Store::open(MemoryKv::new(), day(2025, 1, 1)).unwrap();
    let first = store
        .add_installments(&installments(dec!(1200), AmountMode::Total, 3, day(2025, 1, 10)))
        .unwrap();
    let second = store
        .add_installments(&installments(dec!(50), AmountMode::PerInstallment, 2, day(2025, 1, 10)))
        .unwrap();
    assert_eq!(first[0].installment_id, Some(1));
    assert_eq!(second[0].installment_id, Some(2));
    let ids: Vec<_> = store.state().transactions.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}
