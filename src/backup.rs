// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::KvStore;
use crate::error::{LedgerError, Result};
use crate::models::{
    Account, DEFAULT_BUSINESS_CATEGORIES, DEFAULT_HOME_CATEGORIES, LedgerState, NextIds,
    RecurringRule, ReportFilter, ReportWindow, Transaction, UiState,
};
use crate::store::{Store, validate_rule, validate_transaction};
use crate::utils::month_start;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Portable copy of the whole ledger. `transactions` and `accounts` are
/// required; everything else falls back to defaults when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub transactions: Vec<Transaction>,
    pub accounts: Vec<Account>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_categories: Option<Vec<String>>,
    #[serde(default)]
    pub recurring_bills: Vec<RecurringRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_month: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ReportFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_ids: Option<NextIds>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl From<&LedgerState> for Snapshot {
    fn from(state: &LedgerState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            transactions: state.transactions.clone(),
            accounts: state.accounts.clone(),
            custom_categories: Some(state.custom_categories.clone()),
            home_categories: Some(state.home_categories.clone()),
            recurring_bills: state.recurring.clone(),
            selected_date: Some(state.ui.selected_date),
            selected_month: Some(state.ui.selected_month),
            filter: Some(state.ui.report.filter),
            start_date: Some(state.ui.report.start_date),
            end_date: Some(state.ui.report.end_date),
            next_ids: Some(state.next_ids),
        }
    }
}

impl Snapshot {
    /// Checks the invariants the store enforces on its own writes: valid
    /// amounts and reminder flags, rule days in range, and unique ids.
    pub fn validate(&self) -> Result<()> {
        fn unique(what: &str, ids: impl Iterator<Item = i64>) -> Result<()> {
            let mut seen = HashSet::new();
            for id in ids {
                if !seen.insert(id) {
                    return Err(LedgerError::ImportFormat(format!(
                        "duplicate {} id {}",
                        what, id
                    )));
                }
            }
            Ok(())
        }
        let rejected = |what: &str, id: i64, err: LedgerError| {
            LedgerError::ImportFormat(format!("{} {}: {}", what, id, err))
        };

        unique("transaction", self.transactions.iter().map(|t| t.id))?;
        unique("account", self.accounts.iter().map(|a| a.id))?;
        unique("rule", self.recurring_bills.iter().map(|r| r.id))?;
        for t in &self.transactions {
            validate_transaction(t).map_err(|e| rejected("transaction", t.id, e))?;
        }
        for r in &self.recurring_bills {
            validate_rule(&r.title, r.amount, r.day).map_err(|e| rejected("rule", r.id, e))?;
        }
        Ok(())
    }

    /// Builds a full ledger, taking UI values missing from the snapshot
    /// from `current`.
    pub fn into_state(self, current: &UiState) -> LedgerState {
        let report = ReportWindow {
            filter: self.filter.unwrap_or(current.report.filter),
            start_date: self.start_date.unwrap_or(current.report.start_date),
            end_date: self.end_date.unwrap_or(current.report.end_date),
        };
        let mut state = LedgerState {
            transactions: self.transactions,
            accounts: self.accounts,
            custom_categories: self
                .custom_categories
                .unwrap_or_else(|| owned(DEFAULT_BUSINESS_CATEGORIES)),
            home_categories: self
                .home_categories
                .unwrap_or_else(|| owned(DEFAULT_HOME_CATEGORIES)),
            recurring: self.recurring_bills,
            ui: UiState {
                selected_date: self.selected_date.unwrap_or(current.selected_date),
                selected_month: self
                    .selected_month
                    .map(month_start)
                    .unwrap_or(current.selected_month),
                report,
            },
            next_ids: self.next_ids.unwrap_or_default(),
        };
        state.reconcile_ids();
        state
    }
}

/// Serializes the whole ledger. Equal ledgers export to equal bytes.
pub fn export(state: &LedgerState) -> Result<String> {
    Ok(serde_json::to_string_pretty(&Snapshot::from(state))?)
}

/// Decodes and validates a snapshot without touching any store.
pub fn decode(blob: &str) -> Result<Snapshot> {
    let snapshot: Snapshot =
        serde_json::from_str(blob).map_err(|e| LedgerError::ImportFormat(e.to_string()))?;
    snapshot.validate()?;
    Ok(snapshot)
}

/// Replaces the store's ledger with `blob`. A blob that fails to decode
/// leaves the store exactly as it was.
pub fn import<S: KvStore>(store: &mut Store<S>, blob: &str) -> Result<()> {
    let snapshot = match decode(blob) {
        Ok(s) => s,
        Err(err) => {
            warn!(error = %err, "backup import rejected");
            return Err(err);
        }
    };
    let state = snapshot.into_state(&store.state().ui);
    let (transactions, accounts) = (state.transactions.len(), state.accounts.len());
    store.replace_state(state)?;
    let month = store.state().ui.selected_month;
    store.ensure_recurring_for_month(month)?;
    info!(transactions, accounts, "backup imported");
    Ok(())
}
