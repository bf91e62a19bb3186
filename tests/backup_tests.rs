// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use meiledger::backup::{self, SNAPSHOT_VERSION};
use meiledger::db::{KvStore, MemoryKv};
use meiledger::models::{
    AccountKind, CategoryList, DEFAULT_BUSINESS_CATEGORIES, NewAccount, NewRule, NewTransaction,
    RuleKind, TxKind,
};
use meiledger::{LedgerError, Store};
use rust_decimal_macros::dec;
use serde_json::{Value, json};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn populated() -> Store<MemoryKv> {
    let mut s = Store::open(MemoryKv::new(), day(2025, 8, 10)).unwrap();
    let acc = s
        .create_account(NewAccount::new("Atelier", AccountKind::Mei).cnpj("12.345.678/0001-90"))
        .unwrap();
    s.create_transaction(
        NewTransaction::on_date(dec!(1234.56), TxKind::Income, day(2025, 8, 2))
            .account(acc.id)
            .category("Services"),
    )
    .unwrap();
    s.create_rule(NewRule {
        title: "Rent".into(),
        category: "Rent".into(),
        amount: dec!(1100),
        day: 5,
        kind: RuleKind::Fixed,
    })
    .unwrap();
    s.add_category(CategoryList::Household, "Pets").unwrap();
    s
}

#[test]
fn export_contains_every_collection() {
    let s = populated();
    let v: Value = serde_json::from_str(&backup::export(s.state()).unwrap()).unwrap();
    assert_eq!(v["version"], json!(SNAPSHOT_VERSION));
    assert_eq!(v["transactions"].as_array().unwrap().len(), 2);
    assert_eq!(v["accounts"].as_array().unwrap().len(), 2);
    assert_eq!(v["recurringBills"][0]["type"], json!("fixed"));
    assert_eq!(v["selectedMonth"], json!("2025-08-01"));
    assert_eq!(v["filter"], json!("monthly"));
    assert!(
        v["homeCategories"]
            .as_array()
            .unwrap()
            .contains(&json!("Pets"))
    );
}

#[test]
fn export_import_export_is_stable() {
    let s = populated();
    let blob = backup::export(s.state()).unwrap();

    let mut other = Store::open(MemoryKv::new(), day(2020, 1, 1)).unwrap();
    backup::import(&mut other, &blob).unwrap();
    assert_eq!(other.state(), s.state());
    assert_eq!(backup::export(other.state()).unwrap(), blob);
}

#[test]
fn blob_without_accounts_changes_nothing() {
    let mut s = populated();
    let before = backup::export(s.state()).unwrap();
    let kv_before = s.kv().clone();

    let err = backup::import(&mut s, r#"{"transactions": []}"#).unwrap_err();
    assert!(matches!(err, LedgerError::ImportFormat(_)));
    assert_eq!(backup::export(s.state()).unwrap(), before);
    assert_eq!(s.kv(), &kv_before);
}

#[test]
fn garbage_and_wrong_shapes_are_rejected() {
    let mut s = populated();
    let before = backup::export(s.state()).unwrap();
    for blob in [
        "",
        "not json",
        "[]",
        r#"{"accounts": []}"#,
        r#"{"transactions": {}, "accounts": []}"#,
        r#"{"transactions": [{"id": 1}], "accounts": []}"#,
    ] {
        assert!(backup::import(&mut s, blob).is_err(), "accepted {:?}", blob);
    }
    assert_eq!(backup::export(s.state()).unwrap(), before);
}

#[test]
fn minimal_blob_gets_defaults_and_keeps_ui() {
    let mut s = populated();
    let ui_before = s.state().ui;
    backup::import(&mut s, r#"{"transactions": [], "accounts": []}"#).unwrap();
    let state = s.state();
    assert!(state.transactions.is_empty());
    assert!(state.accounts.is_empty());
    assert!(state.recurring.is_empty());
    assert_eq!(state.custom_categories.len(), DEFAULT_BUSINESS_CATEGORIES.len());
    assert_eq!(state.ui, ui_before);
}

#[test]
fn import_materializes_selected_month() {
    let blob = json!({
        "transactions": [],
        "accounts": [{"id": 1, "name": "Cash", "type": "cash", "initialBalance": "0"}],
        "recurringBills": [{
            "id": 3, "title": "Internet", "category": "Internet",
            "amount": "99.90", "day": 31, "type": "fixed", "active": true
        }],
        "selectedMonth": "2025-02-01"
    })
    .to_string();
    let mut s = Store::open(MemoryKv::new(), day(2025, 2, 14)).unwrap();
    backup::import(&mut s, &blob).unwrap();
    let rows = &s.state().transactions;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].recurring_id, Some(3));
    assert_eq!(rows[0].date.date(), day(2025, 2, 28));
    assert_eq!(rows[0].amount, dec!(99.90));
}

#[test]
fn import_writes_through_to_kv() {
    let blob = backup::export(populated().state()).unwrap();
    let mut s = Store::open(MemoryKv::new(), day(2025, 8, 10)).unwrap();
    backup::import(&mut s, &blob).unwrap();
    let accounts = s.kv().get(meiledger::db::KEY_ACCOUNTS).unwrap().unwrap();
    assert!(accounts.contains("Atelier"));
}

fn blob_with(transactions: Value, accounts: Value, rules: Value) -> String {
    json!({
        "transactions": transactions,
        "accounts": accounts,
        "recurringBills": rules,
    })
    .to_string()
}

fn row(id: i64, amount: &str) -> Value {
    json!({
        "id": id,
        "createdAt": "2025-08-01T09:00:00Z",
        "type": "expense",
        "amount": amount,
        "date": "2025-08-03T00:00:00",
        "isHomeExpense": true
    })
}

#[test]
fn blobs_breaking_ledger_rules_are_rejected() {
    let cash = json!([{"id": 1, "name": "Cash", "type": "cash", "initialBalance": "0"}]);
    let mut reminder = row(2, "80");
    reminder["isReminder"] = json!(true);
    let rule = |id: i64, day: u32| {
        json!({
            "id": id, "title": "Water", "category": "Water",
            "amount": "50", "day": day, "type": "fixed", "active": true
        })
    };
    let accounts_twice = json!([
        {"id": 1, "name": "Cash", "type": "cash", "initialBalance": "0"},
        {"id": 1, "name": "Shop", "type": "mei", "initialBalance": "0"}
    ]);

    let mut s = populated();
    let before = backup::export(s.state()).unwrap();
    let kv_before = s.kv().clone();
    for blob in [
        blob_with(json!([row(1, "-5")]), cash.clone(), json!([])),
        blob_with(json!([reminder]), cash.clone(), json!([])),
        blob_with(json!([row(4, "1"), row(4, "2")]), cash.clone(), json!([])),
        blob_with(json!([]), accounts_twice, json!([])),
        blob_with(json!([]), cash.clone(), json!([rule(1, 32)])),
        blob_with(json!([]), cash.clone(), json!([rule(1, 0)])),
        blob_with(json!([]), cash.clone(), json!([rule(1, 5), rule(1, 6)])),
    ] {
        let err = backup::import(&mut s, &blob).unwrap_err();
        assert!(matches!(err, LedgerError::ImportFormat(_)), "{:?} for {}", err, blob);
    }
    assert_eq!(backup::export(s.state()).unwrap(), before);
    assert_eq!(s.kv(), &kv_before);

    // the same shapes with sane values go through
    let ok = blob_with(json!([row(1, "5"), row(2, "0")]), cash, json!([rule(1, 31)]));
    backup::import(&mut s, &ok).unwrap();
}

#[test]
fn imported_ids_keep_counting_past_the_snapshot() {
    let s = populated();
    let v: Value = serde_json::from_str(&backup::export(s.state()).unwrap()).unwrap();
    assert_eq!(v["nextIds"]["account"], json!(3));

    // a blob without counters still never hands out an existing id
    let blob = blob_with(
        json!([row(7, "3")]),
        json!([{"id": 4, "name": "Cash", "type": "cash", "initialBalance": "0"}]),
        json!([]),
    );
    let mut other = Store::open(MemoryKv::new(), day(2025, 8, 10)).unwrap();
    backup::import(&mut other, &blob).unwrap();
    let acc = other
        .create_account(NewAccount::new("Loja", AccountKind::Mei))
        .unwrap();
    assert_eq!(acc.id, 5);
    let tx = other
        .create_transaction(
            NewTransaction::on_date(dec!(1), TxKind::Income, day(2025, 8, 4)).account(acc.id),
        )
        .unwrap();
    assert_eq!(tx.id, 8);
}
