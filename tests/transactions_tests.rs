// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use meiledger::db::MemoryKv;
use meiledger::models::CategoryList;
use meiledger::{Store, cli, commands};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    day(2025, 1, 20)
}

fn run(store: &mut Store<MemoryKv>, args: &[&str]) {
    let mut argv = vec!["meiledger"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", sub)) => commands::transactions::handle(store, sub, today()).unwrap(),
        Some(("account", sub)) => commands::accounts::handle(store, sub, today()).unwrap(),
        Some(("recurring", sub)) => commands::recurring::handle(store, sub).unwrap(),
        Some(("installment", sub)) => {
            commands::installments::handle(store, sub, today()).unwrap()
        }
        _ => panic!("unexpected command {:?}", args),
    }
}

fn setup() -> Store<MemoryKv> {
    let mut store = Store::open(MemoryKv::new(), today()).unwrap();
    for i in 1..=3 {
        let date = format!("2025-01-0{}", i);
        run(
            &mut store,
            &[
                "tx", "add", "--type", "expense", "--amount", "10", "--date", &date, "--account",
                "cash",
            ],
        );
    }
    store
}

fn rows(store: &Store<MemoryKv>, args: &[&str]) -> Vec<commands::transactions::TransactionRow> {
    let mut argv = vec!["meiledger", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            return commands::transactions::query_rows(store.state(), list_m).unwrap();
        }
    }
    panic!("no tx list subcommand");
}

#[test]
fn list_limit_respected() {
    let store = setup();
    let rows = rows(&store, &["--limit", "2"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, "2025-01-03");
    assert_eq!(rows[0].account, "Cash");
}

#[test]
fn list_range_is_inclusive() {
    let store = setup();
    let rows = rows(&store, &["--from", "2025-01-02", "--to", "2025-01-03"]);
    let dates: Vec<_> = rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["2025-01-03", "2025-01-02"]);
}

#[test]
fn month_filter_and_household_flag() {
    let mut store = setup();
    run(
        &mut store,
        &[
            "tx", "add", "--type", "expense", "--amount", "55,90", "--date", "2025-02-03", "--home",
            "--category", "Pharmacy",
        ],
    );
    let feb = rows(&store, &["--month", "2025-02"]);
    assert_eq!(feb.len(), 1);
    assert_eq!(feb[0].amount, "55.90");
    assert_eq!(feb[0].status, "pending");

    let home = rows(&store, &["--home"]);
    assert_eq!(home.len(), 1);
    assert!(
        store
            .state()
            .categories(CategoryList::Household)
            .iter()
            .any(|c| c == "Pharmacy")
    );
}

#[test]
fn pay_and_edit_through_cli() {
    let mut store = setup();
    run(
        &mut store,
        &["tx", "add", "--type", "expense", "--amount", "80", "--date", "2025-01-04", "--home"],
    );
    run(&mut store, &["tx", "pay", "--id", "4"]);
    assert!(store.state().transaction(4).unwrap().is_paid());
    run(&mut store, &["tx", "pay", "--id", "4", "--undo"]);
    assert!(!store.state().transaction(4).unwrap().is_paid());

    run(&mut store, &["tx", "edit", "--id", "1", "--description", "toner"]);
    assert_eq!(
        store.state().transaction(1).unwrap().description.as_deref(),
        Some("toner")
    );
    run(&mut store, &["tx", "rm", "--id", "2"]);
    assert!(store.state().transaction(2).is_none());
}

#[test]
fn business_add_without_account_fails() {
    let mut store = Store::open(MemoryKv::new(), today()).unwrap();
    let matches = cli::build_cli().get_matches_from([
        "meiledger", "tx", "add", "--type", "income", "--amount", "10",
    ]);
    let Some(("tx", sub)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    assert!(commands::transactions::handle(&mut store, sub, today()).is_err());
    assert!(store.state().transactions.is_empty());
}

#[test]
fn recurring_and_installments_through_cli() {
    let mut store = Store::open(MemoryKv::new(), today()).unwrap();
    run(
        &mut store,
        &[
            "recurring", "add", "--title", "Power", "--category", "Electricity", "--day", "15",
            "--reminder",
        ],
    );
    let reminder = store.state().transactions[0].clone();
    assert!(reminder.is_open_reminder());
    assert_eq!(reminder.date.date(), day(2025, 1, 15));

    run(
        &mut store,
        &["recurring", "resolve", "--id", &reminder.id.to_string(), "--amount", "143.20"],
    );
    assert!(!store.state().transaction(reminder.id).unwrap().is_open_reminder());

    run(&mut store, &["recurring", "sync", "--month", "2025-02"]);
    assert_eq!(store.state().transactions.len(), 2);
    assert_eq!(store.state().ui.selected_month, day(2025, 2, 1));

    run(
        &mut store,
        &[
            "installment", "add", "--category", "Sofa", "--amount", "1200", "--count", "3",
            "--start", "2025-01-10", "--paid",
        ],
    );
    let group: Vec<_> = store
        .state()
        .transactions
        .iter()
        .filter(|t| t.installment_id.is_some())
        .collect();
    assert_eq!(group.len(), 3);
    assert!(group[0].is_paid());
    assert!(!group[1].is_paid());
}
