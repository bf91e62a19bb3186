// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use meiledger::Store;
use meiledger::db::{self, KEY_ACCOUNTS, KvStore};
use meiledger::models::{AccountKind, NewAccount};
use rusqlite::Connection;
use tempfile::tempdir;

fn mem_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn kv_upsert_overwrites() {
    let mut conn = mem_conn();
    assert_eq!(conn.get("missing").unwrap(), None);
    conn.set("k", "one".to_string()).unwrap();
    conn.set("k", "two".to_string()).unwrap();
    assert_eq!(conn.get("k").unwrap().as_deref(), Some("two"));
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn schema_init_is_repeatable() {
    let conn = mem_conn();
    db::init_schema(&conn).unwrap();
}

#[test]
fn ledger_survives_reopen_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.sqlite");
    let path_str = path.to_str().unwrap();

    let conn = db::open_or_init(Some(path_str)).unwrap();
    let mut store = Store::open(conn, day(2025, 9, 1)).unwrap();
    store
        .create_account(NewAccount::new("Workshop", AccountKind::Mei))
        .unwrap();
    drop(store);

    let conn = db::open_or_init(Some(path_str)).unwrap();
    let raw = conn.get(KEY_ACCOUNTS).unwrap().unwrap();
    assert!(raw.contains("Workshop"));
    let store = Store::open(conn, day(2025, 9, 2)).unwrap();
    assert!(store.state().account_by_name("workshop").is_some());
}
