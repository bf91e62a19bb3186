// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::db::{
    KEY_ACCOUNTS, KEY_CUSTOM_CATEGORIES, KEY_HOME_CATEGORIES, KEY_RECURRING, KEY_TRANSACTIONS,
    KEY_NEXT_IDS, KEY_UI_STATE, KvStore,
};
use crate::error::{LedgerError, Result};
use crate::models::{
    Account, AccountPatch, CategoryList, InstallmentRequest, LedgerState, NewAccount,
    NewRule, NewTransaction, RecurringRule, ReportFilter, ReportWindow, RulePatch, Transaction,
    TransactionPatch,
};
use crate::recurrence;
use crate::utils::{filter_bounds, month_start};

/// Owns every ledger collection and writes them through to `S` after each
/// mutation.
pub struct Store<S: KvStore> {
    kv: S,
    state: LedgerState,
}

impl<S: KvStore> Store<S> {
    /// Loads the ledger from `kv`, moves the household month and any preset
    /// report window to `today`, then materializes recurring bills for
    /// `today`'s month.
    pub fn open(kv: S, today: NaiveDate) -> Result<Self> {
        let state = load_state(&kv, today)?;
        let mut store = Self { kv, state };

        let mut ui = store.state.ui;
        ui.selected_month = month_start(today);
        if let Some((start, end)) = filter_bounds(ui.report.filter, today) {
            ui.report.start_date = start;
            ui.report.end_date = end;
        }
        if ui != store.state.ui {
            store.commit(|state| {
                state.ui = ui;
                Ok(())
            })?;
        }

        store.ensure_recurring_for_month(ui.selected_month)?;
        Ok(store)
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn into_inner(self) -> S {
        self.kv
    }

    /// Writes the full ledger to the key-value store.
    pub fn persist(&mut self) -> Result<()> {
        let entries = [
            (
                KEY_TRANSACTIONS,
                serde_json::to_string(&self.state.transactions)?,
            ),
            (
                KEY_CUSTOM_CATEGORIES,
                serde_json::to_string(&self.state.custom_categories)?,
            ),
            (
                KEY_HOME_CATEGORIES,
                serde_json::to_string(&self.state.home_categories)?,
            ),
            (KEY_ACCOUNTS, serde_json::to_string(&self.state.accounts)?),
            (KEY_RECURRING, serde_json::to_string(&self.state.recurring)?),
            (KEY_UI_STATE, serde_json::to_string(&self.state.ui)?),
            (KEY_NEXT_IDS, serde_json::to_string(&self.state.next_ids)?),
        ];
        self.kv.set_many(&entries)
    }

    /// Applies `f` and persists. On any failure the in-memory ledger is
    /// restored to what it was before the call.
    fn commit<T>(&mut self, f: impl FnOnce(&mut LedgerState) -> Result<T>) -> Result<T> {
        let before = self.state.clone();
        let out = match f(&mut self.state) {
            Ok(v) => v,
            Err(err) => {
                self.state = before;
                return Err(err);
            }
        };
        if let Err(err) = self.persist() {
            self.state = before;
            return Err(err);
        }
        Ok(out)
    }

    pub fn create_transaction(&mut self, new: NewTransaction) -> Result<Transaction> {
        validate_new_transaction(&self.state, &new)?;
        let tx = self.commit(|state| Ok(insert_transactions(state, vec![new]).remove(0)))?;
        debug!(id = tx.id, kind = ?tx.kind, amount = %tx.amount, "created transaction");
        Ok(tx)
    }

    /// Shallow merge of `patch` into transaction `id`. Unknown ids are a no-op.
    pub fn update_transaction(&mut self, id: i64, patch: &TransactionPatch) -> Result<bool> {
        let Some(pos) = self.state.transactions.iter().position(|t| t.id == id) else {
            debug!(id, "update ignored, transaction not found");
            return Ok(false);
        };
        let mut updated = self.state.transactions[pos].clone();
        patch.apply(&mut updated);
        validate_transaction(&updated)?;
        self.commit(|state| {
            state.transactions[pos] = updated;
            Ok(())
        })?;
        debug!(id, "updated transaction");
        Ok(true)
    }

    pub fn delete_transaction(&mut self, id: i64) -> Result<bool> {
        if self.state.transaction(id).is_none() {
            debug!(id, "delete ignored, transaction not found");
            return Ok(false);
        }
        self.commit(|state| {
            state.transactions.retain(|t| t.id != id);
            Ok(())
        })?;
        debug!(id, "deleted transaction");
        Ok(true)
    }

    /// Marks a household expense as paid or pending.
    pub fn set_paid(&mut self, id: i64, paid: bool) -> Result<bool> {
        let patch = TransactionPatch {
            is_paid: Some(paid),
            ..Default::default()
        };
        self.update_transaction(id, &patch)
    }

    /// Gives an open reminder its real amount. The row keeps its rule link
    /// and becomes an ordinary unpaid bill. Rows that are not open reminders
    /// are rejected.
    pub fn resolve_reminder(&mut self, id: i64, amount: Decimal) -> Result<bool> {
        match self.state.transaction(id) {
            None => {
                debug!(id, "resolve ignored, transaction not found");
                return Ok(false);
            }
            Some(tx) if !tx.is_open_reminder() => {
                return Err(LedgerError::validation(format!(
                    "Transaction {} is not an open reminder",
                    id
                )));
            }
            Some(_) => {}
        }
        let patch = TransactionPatch {
            amount: Some(amount),
            is_reminder: Some(false),
            is_paid: Some(false),
            ..Default::default()
        };
        self.update_transaction(id, &patch)
    }

    pub fn create_account(&mut self, new: NewAccount) -> Result<Account> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(LedgerError::validation("Account name must not be empty"));
        }
        let account = self.commit(|state| {
            let account = Account {
                id: state.take_account_id(),
                name,
                kind: new.kind,
                initial_balance: new.initial_balance,
                cnpj: new.cnpj,
                description: new.description,
            };
            state.accounts.push(account.clone());
            Ok(account)
        })?;
        debug!(id = account.id, name = %account.name, "created account");
        Ok(account)
    }

    pub fn update_account(&mut self, id: i64, patch: &AccountPatch) -> Result<bool> {
        let Some(pos) = self.state.accounts.iter().position(|a| a.id == id) else {
            debug!(id, "update ignored, account not found");
            return Ok(false);
        };
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(LedgerError::validation("Account name must not be empty"));
        }
        self.commit(|state| {
            patch.apply(&mut state.accounts[pos]);
            Ok(())
        })?;
        debug!(id, "updated account");
        Ok(true)
    }

    /// Removes the account only. Transactions keep their `account_id`.
    pub fn delete_account(&mut self, id: i64) -> Result<bool> {
        if self.state.account(id).is_none() {
            debug!(id, "delete ignored, account not found");
            return Ok(false);
        }
        self.commit(|state| {
            state.accounts.retain(|a| a.id != id);
            Ok(())
        })?;
        debug!(id, "deleted account");
        Ok(true)
    }

    /// Appends `name` to a vocabulary unless already present.
    pub fn add_category(&mut self, list: CategoryList, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("Category name must not be empty"));
        }
        if self.state.categories(list).iter().any(|c| c == name) {
            return Ok(false);
        }
        self.commit(|state| {
            let target = match list {
                CategoryList::Business => &mut state.custom_categories,
                CategoryList::Household => &mut state.home_categories,
            };
            target.push(name.to_string());
            Ok(())
        })?;
        debug!(?list, name, "added category");
        Ok(true)
    }

    pub fn rules(&self) -> &[RecurringRule] {
        &self.state.recurring
    }

    /// Stores a rule and materializes it for the selected month.
    pub fn create_rule(&mut self, new: NewRule) -> Result<RecurringRule> {
        validate_rule(&new.title, new.amount, new.day)?;
        let rule = self.commit(|state| {
            let rule = RecurringRule {
                id: state.take_rule_id(),
                title: new.title.trim().to_string(),
                category: new.category.trim().to_string(),
                amount: new.amount,
                day: new.day,
                kind: new.kind,
                active: true,
            };
            state.recurring.push(rule.clone());
            Ok(rule)
        })?;
        debug!(id = rule.id, title = %rule.title, "created recurring rule");
        let month = self.state.ui.selected_month;
        self.ensure_recurring_for_month(month)?;
        Ok(rule)
    }

    /// Edits apply to months materialized from now on. Rows already created
    /// keep their values.
    pub fn update_rule(&mut self, id: i64, patch: &RulePatch) -> Result<bool> {
        let Some(pos) = self.state.recurring.iter().position(|r| r.id == id) else {
            debug!(id, "update ignored, rule not found");
            return Ok(false);
        };
        let mut updated = self.state.recurring[pos].clone();
        patch.apply(&mut updated);
        validate_rule(&updated.title, updated.amount, updated.day)?;
        self.commit(|state| {
            state.recurring[pos] = updated;
            Ok(())
        })?;
        let month = self.state.ui.selected_month;
        self.ensure_recurring_for_month(month)?;
        Ok(true)
    }

    /// Deactivates the rule. Materialized rows are left alone.
    pub fn delete_rule(&mut self, id: i64) -> Result<bool> {
        let patch = RulePatch {
            active: Some(false),
            ..Default::default()
        };
        self.update_rule(id, &patch)
    }

    /// Creates the missing rows for every active rule in `month` and
    /// persists them together. Safe to call repeatedly.
    pub fn ensure_recurring_for_month(&mut self, month: NaiveDate) -> Result<Vec<Transaction>> {
        let planned = recurrence::plan_month(&self.state, month);
        if planned.is_empty() {
            return Ok(Vec::new());
        }
        let created = self.commit(|state| Ok(insert_transactions(state, planned)))?;
        info!(
            month = %month.format("%Y-%m"),
            count = created.len(),
            "materialized recurring bills"
        );
        Ok(created)
    }

    /// Generates and stores one row per installment.
    pub fn add_installments(&mut self, req: &InstallmentRequest) -> Result<Vec<Transaction>> {
        let group = self.state.next_ids.installment;
        let rows = recurrence::expand_installments(req, group)?;
        let created = self.commit(|state| {
            state.take_installment_group();
            Ok(insert_transactions(state, rows))
        })?;
        info!(
            group,
            count = created.len(),
            category = %req.category,
            "generated installments"
        );
        Ok(created)
    }

    /// Switches the household month, then materializes it.
    pub fn set_selected_month(&mut self, month: NaiveDate) -> Result<Vec<Transaction>> {
        let month = month_start(month);
        if self.state.ui.selected_month != month {
            self.commit(|state| {
                state.ui.selected_month = month;
                Ok(())
            })?;
        }
        self.ensure_recurring_for_month(month)
    }

    pub fn set_selected_date(&mut self, date: NaiveDate) -> Result<()> {
        self.commit(|state| {
            state.ui.selected_date = date;
            Ok(())
        })
    }

    /// Preset filters recompute the window from `today`. `Custom` keeps the
    /// current window until `set_custom_window` is called.
    pub fn set_report_filter(
        &mut self,
        filter: ReportFilter,
        today: NaiveDate,
    ) -> Result<ReportWindow> {
        self.commit(|state| {
            let report = &mut state.ui.report;
            report.filter = filter;
            if let Some((start, end)) = filter_bounds(filter, today) {
                report.start_date = start;
                report.end_date = end;
            }
            Ok(*report)
        })
    }

    pub fn set_custom_window(&mut self, start: NaiveDate, end: NaiveDate) -> Result<ReportWindow> {
        if start > end {
            return Err(LedgerError::validation(format!(
                "Window start {} is after end {}",
                start, end
            )));
        }
        self.commit(|state| {
            state.ui.report = ReportWindow {
                filter: ReportFilter::Custom,
                start_date: start,
                end_date: end,
            };
            Ok(state.ui.report)
        })
    }

    /// Swaps the whole ledger for `state`. Nothing changes if persisting fails.
    pub fn replace_state(&mut self, mut state: LedgerState) -> Result<()> {
        state.reconcile_ids();
        self.commit(|current| {
            *current = state;
            Ok(())
        })
    }
}

fn insert_transactions(state: &mut LedgerState, rows: Vec<NewTransaction>) -> Vec<Transaction> {
    let now = Utc::now();
    let mut created = Vec::with_capacity(rows.len());
    for row in rows {
        let tx = row.into_transaction(state.take_transaction_id(), now);
        state.transactions.push(tx.clone());
        created.push(tx);
    }
    created
}

fn validate_new_transaction(state: &LedgerState, new: &NewTransaction) -> Result<()> {
    if new.amount < Decimal::ZERO {
        return Err(LedgerError::validation("Amount must not be negative"));
    }
    if new.is_reminder == Some(true) && !new.amount.is_zero() {
        return Err(LedgerError::validation("Reminder rows must have a zero amount"));
    }
    if !new.is_home_expense && new.account_id.is_none() {
        return Err(LedgerError::validation(
            "Select an account for business transactions",
        ));
    }
    if let Some(id) = new.account_id {
        if state.account(id).is_none() && !new.is_home_expense {
            return Err(LedgerError::validation(format!("Account {} not found", id)));
        }
    }
    Ok(())
}

pub(crate) fn validate_transaction(tx: &Transaction) -> Result<()> {
    if tx.amount < Decimal::ZERO {
        return Err(LedgerError::validation("Amount must not be negative"));
    }
    if tx.is_open_reminder() && !tx.amount.is_zero() {
        return Err(LedgerError::validation(
            "Reminder rows must have a zero amount until resolved",
        ));
    }
    Ok(())
}

pub(crate) fn validate_rule(title: &str, amount: Decimal, day: u32) -> Result<()> {
    if title.trim().is_empty() {
        return Err(LedgerError::validation("Rule title must not be empty"));
    }
    if amount < Decimal::ZERO {
        return Err(LedgerError::validation("Rule amount must not be negative"));
    }
    if !(1..=31).contains(&day) {
        return Err(LedgerError::validation(format!(
            "Rule day {} is outside 1..=31",
            day
        )));
    }
    Ok(())
}

fn load_key<T: DeserializeOwned>(kv: &impl KvStore, key: &str) -> Result<Option<T>> {
    match kv.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Missing keys fall back to defaults. Present but unreadable keys are errors.
fn load_state(kv: &impl KvStore, today: NaiveDate) -> Result<LedgerState> {
    let mut state = LedgerState::with_defaults(today);
    if let Some(v) = load_key(kv, KEY_TRANSACTIONS)? {
        state.transactions = v;
    }
    if let Some(v) = load_key(kv, KEY_ACCOUNTS)? {
        state.accounts = v;
    }
    if let Some(v) = load_key(kv, KEY_CUSTOM_CATEGORIES)? {
        state.custom_categories = v;
    }
    if let Some(v) = load_key(kv, KEY_HOME_CATEGORIES)? {
        state.home_categories = v;
    }
    if let Some(v) = load_key(kv, KEY_RECURRING)? {
        state.recurring = v;
    }
    if let Some(v) = load_key(kv, KEY_UI_STATE)? {
        state.ui = v;
    }
    if let Some(v) = load_key(kv, KEY_NEXT_IDS)? {
        state.next_ids = v;
    }
    state.reconcile_ids();
    debug!(
        transactions = state.transactions.len(),
        accounts = state.accounts.len(),
        rules = state.recurring.len(),
        "loaded ledger"
    );
    Ok(state)
}
