// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::{filter_bounds, month_start};

pub const DEFAULT_CASH_ACCOUNT: &str = "Cash";

pub const DEFAULT_BUSINESS_CATEGORIES: &[&str] = &[
    "Supplies",
    "Services",
    "Equipment",
    "Marketing",
    "Taxes (DAS)",
    "Transport",
    "Other",
];

pub const DEFAULT_HOME_CATEGORIES: &[&str] = &[
    "Rent",
    "Groceries",
    "Electricity",
    "Water",
    "Internet",
    "Health",
    "Education",
    "Leisure",
    "Other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Registered micro-entrepreneur account, subject to income limits.
    Mei,
    /// Informal cash, no limit tracking.
    Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Fixed,
    Reminder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFilter {
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

/// Which category vocabulary a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryList {
    Business,
    Household,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub date: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    #[serde(default)]
    pub is_home_expense: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_reminder: Option<bool>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TxKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TxKind::Expense
    }

    pub fn is_paid(&self) -> bool {
        self.is_paid.unwrap_or(false)
    }

    pub fn is_open_reminder(&self) -> bool {
        self.is_reminder.unwrap_or(false)
    }
}

/// Fields for a transaction that does not exist yet. The store assigns
/// `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TxKind,
    pub amount: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: NaiveDateTime,
    pub account_id: Option<i64>,
    pub is_home_expense: bool,
    pub is_paid: Option<bool>,
    pub recurring_id: Option<i64>,
    pub installment_id: Option<i64>,
    pub is_reminder: Option<bool>,
}

impl NewTransaction {
    pub fn new(kind: TxKind, amount: Decimal, date: NaiveDateTime) -> Self {
        Self {
            kind,
            amount,
            description: None,
            category: None,
            date,
            account_id: None,
            is_home_expense: false,
            is_paid: None,
            recurring_id: None,
            installment_id: None,
            is_reminder: None,
        }
    }

    pub fn income(amount: Decimal, date: NaiveDateTime) -> Self {
        Self::new(TxKind::Income, amount, date)
    }

    pub fn expense(amount: Decimal, date: NaiveDateTime) -> Self {
        Self::new(TxKind::Expense, amount, date)
    }

    /// Household expense, unpaid until told otherwise.
    pub fn household(amount: Decimal, date: NaiveDateTime) -> Self {
        Self {
            is_home_expense: true,
            is_paid: Some(false),
            ..Self::expense(amount, date)
        }
    }

    pub fn on_date(amount: Decimal, kind: TxKind, day: NaiveDate) -> Self {
        Self::new(kind, amount, day.and_time(NaiveTime::MIN))
    }

    pub fn account(mut self, account_id: i64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn paid(mut self, paid: bool) -> Self {
        self.is_paid = Some(paid);
        self
    }

    pub(crate) fn into_transaction(self, id: i64, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            created_at,
            kind: self.kind,
            amount: self.amount,
            description: self.description,
            category: self.category,
            date: self.date,
            account_id: self.account_id,
            is_home_expense: self.is_home_expense,
            is_paid: self.is_paid,
            recurring_id: self.recurring_id,
            installment_id: self.installment_id,
            is_reminder: self.is_reminder,
        }
    }
}

/// Shallow partial update: every `Some` field replaces the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub kind: Option<TxKind>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub account_id: Option<i64>,
    pub is_home_expense: Option<bool>,
    pub is_paid: Option<bool>,
    pub is_reminder: Option<bool>,
}

impl TransactionPatch {
    pub fn apply(&self, tx: &mut Transaction) {
        if let Some(kind) = self.kind {
            tx.kind = kind;
        }
        if let Some(amount) = self.amount {
            tx.amount = amount;
        }
        if let Some(ref description) = self.description {
            tx.description = Some(description.clone());
        }
        if let Some(ref category) = self.category {
            tx.category = Some(category.clone());
        }
        if let Some(date) = self.date {
            tx.date = date;
        }
        if let Some(account_id) = self.account_id {
            tx.account_id = Some(account_id);
        }
        if let Some(home) = self.is_home_expense {
            tx.is_home_expense = home;
        }
        if let Some(paid) = self.is_paid {
            tx.is_paid = Some(paid);
        }
        if let Some(reminder) = self.is_reminder {
            tx.is_reminder = Some(reminder);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    #[serde(default)]
    pub initial_balance: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: String,
    pub kind: AccountKind,
    pub initial_balance: Decimal,
    pub cnpj: Option<String>,
    pub description: Option<String>,
}

impl NewAccount {
    pub fn new(name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            name: name.into(),
            kind,
            initial_balance: Decimal::ZERO,
            cnpj: None,
            description: None,
        }
    }

    pub fn initial_balance(mut self, amount: Decimal) -> Self {
        self.initial_balance = amount;
        self
    }

    pub fn cnpj(mut self, cnpj: impl Into<String>) -> Self {
        self.cnpj = Some(cnpj.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub initial_balance: Option<Decimal>,
    pub cnpj: Option<String>,
    pub description: Option<String>,
}

impl AccountPatch {
    pub fn apply(&self, account: &mut Account) {
        if let Some(ref name) = self.name {
            account.name = name.clone();
        }
        if let Some(kind) = self.kind {
            account.kind = kind;
        }
        if let Some(balance) = self.initial_balance {
            account.initial_balance = balance;
        }
        if let Some(ref cnpj) = self.cnpj {
            account.cnpj = Some(cnpj.clone());
        }
        if let Some(ref description) = self.description {
            account.description = Some(description.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRule {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub amount: Decimal,
    /// Target day of month, 1..=31. Clamped to month end when materialized.
    pub day: u32,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRule {
    pub title: String,
    pub category: String,
    pub amount: Decimal,
    pub day: u32,
    pub kind: RuleKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RulePatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub day: Option<u32>,
    pub kind: Option<RuleKind>,
    pub active: Option<bool>,
}

impl RulePatch {
    pub fn apply(&self, rule: &mut RecurringRule) {
        if let Some(ref title) = self.title {
            rule.title = title.clone();
        }
        if let Some(ref category) = self.category {
            rule.category = category.clone();
        }
        if let Some(amount) = self.amount {
            rule.amount = amount;
        }
        if let Some(day) = self.day {
            rule.day = day;
        }
        if let Some(kind) = self.kind {
            rule.kind = kind;
        }
        if let Some(active) = self.active {
            rule.active = active;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountMode {
    /// The amount is the purchase total, split across installments.
    Total,
    /// The amount is charged as-is every month.
    PerInstallment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentRequest {
    pub category: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub mode: AmountMode,
    pub count: u32,
    /// Any date in the first installment's month; its day is reused (max 28).
    pub start: NaiveDate,
    /// Applies to the first installment only.
    pub first_paid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportWindow {
    pub filter: ReportFilter,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ReportWindow {
    pub fn resolved(filter: ReportFilter, today: NaiveDate) -> Self {
        let (start_date, end_date) = filter_bounds(filter, today).unwrap_or((today, today));
        Self {
            filter,
            start_date,
            end_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub selected_date: NaiveDate,
    /// First day of the household month being viewed.
    pub selected_month: NaiveDate,
    #[serde(flatten)]
    pub report: ReportWindow,
}

impl UiState {
    pub fn for_today(today: NaiveDate) -> Self {
        Self {
            selected_date: today,
            selected_month: month_start(today),
            report: ReportWindow::resolved(ReportFilter::Monthly, today),
        }
    }
}

/// Next id to hand out per collection. Counters only move forward, so ids
/// of deleted rows are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextIds {
    pub transaction: i64,
    pub account: i64,
    pub rule: i64,
    pub installment: i64,
}

impl Default for NextIds {
    fn default() -> Self {
        Self {
            transaction: 1,
            account: 1,
            rule: 1,
            installment: 1,
        }
    }
}

/// Everything the store owns.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerState {
    pub transactions: Vec<Transaction>,
    pub accounts: Vec<Account>,
    pub custom_categories: Vec<String>,
    pub home_categories: Vec<String>,
    pub recurring: Vec<RecurringRule>,
    pub ui: UiState,
    pub next_ids: NextIds,
}

impl LedgerState {
    pub fn with_defaults(today: NaiveDate) -> Self {
        let mut state = Self {
            transactions: Vec::new(),
            accounts: default_accounts(),
            custom_categories: DEFAULT_BUSINESS_CATEGORIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            home_categories: DEFAULT_HOME_CATEGORIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            recurring: Vec::new(),
            ui: UiState::for_today(today),
            next_ids: NextIds::default(),
        };
        state.reconcile_ids();
        state
    }

    pub fn account(&self, id: i64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn transaction(&self, id: i64) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn rule(&self, id: i64) -> Option<&RecurringRule> {
        self.recurring.iter().find(|r| r.id == id)
    }

    pub fn categories(&self, list: CategoryList) -> &[String] {
        match list {
            CategoryList::Business => &self.custom_categories,
            CategoryList::Household => &self.home_categories,
        }
    }

    pub fn account_by_name(&self, name: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Raises every counter above the ids already present.
    pub fn reconcile_ids(&mut self) {
        fn above(ids: impl Iterator<Item = i64>) -> i64 {
            ids.max().unwrap_or(0) + 1
        }
        let ids = &mut self.next_ids;
        ids.transaction = ids
            .transaction
            .max(above(self.transactions.iter().map(|t| t.id)));
        ids.account = ids.account.max(above(self.accounts.iter().map(|a| a.id)));
        ids.rule = ids.rule.max(above(self.recurring.iter().map(|r| r.id)));
        ids.installment = ids
            .installment
            .max(above(self.transactions.iter().filter_map(|t| t.installment_id)));
    }

    pub(crate) fn take_transaction_id(&mut self) -> i64 {
        let id = self.next_ids.transaction;
        self.next_ids.transaction += 1;
        id
    }

    pub(crate) fn take_account_id(&mut self) -> i64 {
        let id = self.next_ids.account;
        self.next_ids.account += 1;
        id
    }

    pub(crate) fn take_rule_id(&mut self) -> i64 {
        let id = self.next_ids.rule;
        self.next_ids.rule += 1;
        id
    }

    pub(crate) fn take_installment_group(&mut self) -> i64 {
        let id = self.next_ids.installment;
        self.next_ids.installment += 1;
        id
    }
}

pub fn default_accounts() -> Vec<Account> {
    vec![Account {
        id: 1,
        name: DEFAULT_CASH_ACCOUNT.to_string(),
        kind: AccountKind::Cash,
        initial_balance: Decimal::ZERO,
        cnpj: None,
        description: None,
    }]
}
