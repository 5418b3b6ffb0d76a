use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{calendar, codes, ids::IdProvider};
use crate::errors::LedgerError;

/// A single income or expense record, either realized or planned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_amount: Option<f64>,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "calendar::serde_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub is_impulse: bool,
    #[serde(default)]
    pub allocation_type: AllocationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_id: Option<String>,
}

impl Transaction {
    /// Builds a realized expense.
    pub fn expense(
        id: impl Into<String>,
        category: impl Into<String>,
        date: NaiveDate,
        amount: f64,
    ) -> Self {
        TransactionDraft::expense(category, amount).into_transaction(id, date)
    }

    /// Builds an income entry.
    pub fn income(
        id: impl Into<String>,
        category: impl Into<String>,
        date: NaiveDate,
        amount: f64,
    ) -> Self {
        TransactionDraft::income(category, amount).into_transaction(id, date)
    }

    /// Builds a planned budget entry: nothing spent yet, `budget` reserved.
    pub fn planned(
        id: impl Into<String>,
        category: impl Into<String>,
        date: NaiveDate,
        budget: f64,
    ) -> Self {
        TransactionDraft::planned(category, budget).into_transaction(id, date)
    }

    pub fn budget(&self) -> f64 {
        self.budget_amount.unwrap_or(0.0)
    }

    /// Planned entries have no realized amount yet but a positive budget.
    pub fn is_planned(&self) -> bool {
        self.amount == 0.0 && self.budget() > 0.0
    }

    pub fn is_realized(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    /// Applies the populated fields of `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: TransactionPatch) {
        let TransactionPatch {
            kind,
            amount,
            budget_amount,
            category,
            description,
            date,
            is_impulse,
            allocation_type,
        } = patch;
        if let Some(kind) = kind {
            self.kind = kind;
        }
        if let Some(amount) = amount {
            self.amount = amount;
        }
        if let Some(budget_amount) = budget_amount {
            self.budget_amount = budget_amount;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(date) = date {
            self.date = date;
        }
        if let Some(is_impulse) = is_impulse {
            self.is_impulse = is_impulse;
        }
        if let Some(allocation_type) = allocation_type {
            self.allocation_type = allocation_type;
        }
    }

    /// Produces the realized expense that replaces this planned entry.
    ///
    /// Category, description and date carry over, and the allocation does too unless the
    /// confirmation overrides it. The original budget stays attached as the reference
    /// ceiling. The new record leaves the recurrence group.
    pub fn confirmed(&self, id: impl Into<String>, confirmation: Confirmation) -> Transaction {
        Transaction {
            id: id.into(),
            kind: TransactionType::Expense,
            amount: confirmation.amount,
            budget_amount: self.budget_amount,
            category: self.category.clone(),
            description: self.description.clone(),
            date: self.date,
            is_impulse: confirmation.is_impulse,
            allocation_type: confirmation
                .allocation_type
                .unwrap_or(self.allocation_type),
            recurrence_id: None,
        }
    }
}

/// What the user enters when paying a planned entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confirmation {
    pub amount: f64,
    pub is_impulse: bool,
    /// Replaces the planned allocation when set.
    pub allocation_type: Option<AllocationType>,
}

impl Confirmation {
    pub fn amount(amount: f64) -> Self {
        Self {
            amount,
            is_impulse: false,
            allocation_type: None,
        }
    }

    pub fn impulse(mut self, is_impulse: bool) -> Self {
        self.is_impulse = is_impulse;
        self
    }

    pub fn with_allocation(mut self, allocation_type: AllocationType) -> Self {
        self.allocation_type = Some(allocation_type);
        self
    }
}

/// Template for a transaction that has not been dated or identified yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionType,
    pub amount: f64,
    pub budget_amount: Option<f64>,
    pub category: String,
    pub description: String,
    pub is_impulse: bool,
    pub allocation_type: AllocationType,
}

impl TransactionDraft {
    pub fn expense(category: impl Into<String>, amount: f64) -> Self {
        Self {
            kind: TransactionType::Expense,
            amount,
            budget_amount: None,
            category: category.into(),
            description: String::new(),
            is_impulse: false,
            allocation_type: AllocationType::LivingBudget,
        }
    }

    pub fn income(category: impl Into<String>, amount: f64) -> Self {
        Self {
            kind: TransactionType::Income,
            ..Self::expense(category, amount)
        }
    }

    pub fn planned(category: impl Into<String>, budget: f64) -> Self {
        Self {
            budget_amount: Some(budget),
            ..Self::expense(category, 0.0)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_allocation(mut self, allocation_type: AllocationType) -> Self {
        self.allocation_type = allocation_type;
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget_amount = Some(budget);
        self
    }

    pub fn impulse(mut self, is_impulse: bool) -> Self {
        self.is_impulse = is_impulse;
        self
    }

    pub fn into_transaction(self, id: impl Into<String>, date: NaiveDate) -> Transaction {
        Transaction {
            id: id.into(),
            kind: self.kind,
            amount: self.amount,
            budget_amount: self.budget_amount,
            category: self.category,
            description: self.description,
            date,
            is_impulse: self.is_impulse,
            allocation_type: self.allocation_type,
            recurrence_id: None,
        }
    }

    /// Stamps the draft with a fresh id from `ids`.
    pub fn create(self, ids: &dyn IdProvider, date: NaiveDate) -> Transaction {
        self.into_transaction(ids.next_id(), date)
    }
}

/// Partial edit of a transaction; `None` leaves the field as it is.
///
/// `budget_amount` is doubly optional so an edit can clear the budget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub kind: Option<TransactionType>,
    pub amount: Option<f64>,
    pub budget_amount: Option<Option<f64>>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub is_impulse: Option<bool>,
    pub allocation_type: Option<AllocationType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parsed = match codes::normalize(raw).as_str() {
            "INCOME" => TransactionType::Income,
            "EXPENSE" => TransactionType::Expense,
            _ => return Err(codes::unknown("transaction type", raw)),
        };
        codes::note_legacy("transaction type", raw, parsed.as_str());
        Ok(parsed)
    }
}

impl TryFrom<String> for TransactionType {
    type Error = LedgerError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<TransactionType> for &'static str {
    fn from(value: TransactionType) -> Self {
        value.as_str()
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Budget nature a transaction was filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum AllocationType {
    #[default]
    LivingBudget,
    InvestStable,
    InvestRisk,
    Event,
}

impl AllocationType {
    pub const ALL: [AllocationType; 4] = [
        AllocationType::LivingBudget,
        AllocationType::InvestStable,
        AllocationType::InvestRisk,
        AllocationType::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationType::LivingBudget => "LIVING",
            AllocationType::InvestStable => "INVEST_STABLE",
            AllocationType::InvestRisk => "INVEST_RISK",
            AllocationType::Event => "EVENT",
        }
    }

    pub fn is_invest(&self) -> bool {
        matches!(self, AllocationType::InvestStable | AllocationType::InvestRisk)
    }
}

impl FromStr for AllocationType {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parsed = match codes::normalize(raw).as_str() {
            "LIVING" | "LIVING_BUDGET" => AllocationType::LivingBudget,
            "INVEST_STABLE" | "INVEST_SAFE" => AllocationType::InvestStable,
            "INVEST_RISK" | "INVEST_AGGRESSIVE" => AllocationType::InvestRisk,
            "EVENT" => AllocationType::Event,
            _ => return Err(codes::unknown("allocation type", raw)),
        };
        codes::note_legacy("allocation type", raw, parsed.as_str());
        Ok(parsed)
    }
}

impl TryFrom<String> for AllocationType {
    type Error = LedgerError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<AllocationType> for &'static str {
    fn from(value: AllocationType) -> Self {
        value.as_str()
    }
}

impl fmt::Display for AllocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
