// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Context;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::error::Result;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Meiledger", "meiledger"));

pub const DB_ENV: &str = "MEILEDGER_DB";

pub const KEY_TRANSACTIONS: &str = "transactions";
pub const KEY_CUSTOM_CATEGORIES: &str = "customCategories";
pub const KEY_HOME_CATEGORIES: &str = "homeCategories";
pub const KEY_ACCOUNTS: &str = "accounts";
pub const KEY_RECURRING: &str = "recurringBills";
pub const KEY_UI_STATE: &str = "uiState";
pub const KEY_NEXT_IDS: &str = "nextIds";

/// String-keyed blob storage the ledger persists into.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes every entry or none of them.
    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()>;

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.set_many(&[(key, value)])
    }
}

impl KvStore for Connection {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let v: Option<String> = self
            .query_row("SELECT value FROM kv WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(v)
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let tx = self.transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT INTO kv(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=datetime('now')",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// In-process store, for tests and embedding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryKv {
    entries: BTreeMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        for (key, value) in entries {
            self.entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

/// `MEILEDGER_DB`, then the explicit override, then the platform data dir.
pub fn db_path(overridden: Option<&str>) -> anyhow::Result<PathBuf> {
    if let Ok(p) = std::env::var(DB_ENV) {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p.trim()));
        }
    }
    if let Some(p) = overridden {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("meiledger.sqlite"))
}

pub fn open_or_init(overridden: Option<&str>) -> anyhow::Result<Connection> {
    let path = db_path(overridden)?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS kv(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}
