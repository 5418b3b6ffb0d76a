use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    calendar::{self, add_days, add_months, nth_weekday_of_month},
    codes,
    ids::IdProvider,
    transaction::{Transaction, TransactionDraft},
};
use crate::errors::{LedgerError, Result};

/// Upper bound on generated occurrences for a single expansion.
pub const MAX_OCCURRENCES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum RecurrenceFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl RecurrenceFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceFrequency::Weekly => "WEEKLY",
            RecurrenceFrequency::Biweekly => "BIWEEKLY",
            RecurrenceFrequency::Monthly => "MONTHLY",
            RecurrenceFrequency::Quarterly => "QUARTERLY",
            RecurrenceFrequency::Semiannual => "SEMIANNUAL",
            RecurrenceFrequency::Annual => "ANNUAL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecurrenceFrequency::Weekly => "Weekly",
            RecurrenceFrequency::Biweekly => "Every 2 weeks",
            RecurrenceFrequency::Monthly => "Monthly",
            RecurrenceFrequency::Quarterly => "Every 3 months",
            RecurrenceFrequency::Semiannual => "Every 6 months",
            RecurrenceFrequency::Annual => "Yearly",
        }
    }

    fn day_step(&self) -> Option<i64> {
        match self {
            RecurrenceFrequency::Weekly => Some(7),
            RecurrenceFrequency::Biweekly => Some(14),
            _ => None,
        }
    }

    fn month_step(&self) -> Option<i32> {
        match self {
            RecurrenceFrequency::Monthly => Some(1),
            RecurrenceFrequency::Quarterly => Some(3),
            RecurrenceFrequency::Semiannual => Some(6),
            RecurrenceFrequency::Annual => Some(12),
            _ => None,
        }
    }
}

impl FromStr for RecurrenceFrequency {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self> {
        let parsed = match codes::normalize(raw).as_str() {
            "WEEKLY" => RecurrenceFrequency::Weekly,
            "BIWEEKLY" | "BI_WEEKLY" => RecurrenceFrequency::Biweekly,
            "MONTHLY" => RecurrenceFrequency::Monthly,
            "QUARTERLY" => RecurrenceFrequency::Quarterly,
            "SEMIANNUAL" | "SEMI_ANNUAL" => RecurrenceFrequency::Semiannual,
            "ANNUAL" | "YEARLY" => RecurrenceFrequency::Annual,
            _ => return Err(codes::unknown("recurrence frequency", raw)),
        };
        codes::note_legacy("recurrence frequency", raw, parsed.as_str());
        Ok(parsed)
    }
}

impl TryFrom<String> for RecurrenceFrequency {
    type Error = LedgerError;

    fn try_from(raw: String) -> Result<Self> {
        raw.parse()
    }
}

impl From<RecurrenceFrequency> for &'static str {
    fn from(value: RecurrenceFrequency) -> Self {
        value.as_str()
    }
}

impl fmt::Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Expansion template: how often, between which (inclusive) dates, and for monthly
/// rules optionally which weekday occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: RecurrenceFrequency,
    #[serde(with = "calendar::serde_date")]
    pub start_date: NaiveDate,
    #[serde(with = "calendar::serde_date")]
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub week_numbers: Vec<u32>,
}

impl RecurrenceRule {
    pub fn new(frequency: RecurrenceFrequency, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            frequency,
            start_date,
            end_date,
            week_numbers: Vec::new(),
        }
    }

    /// Restricts a monthly rule to the given weekday occurrences (1..=5).
    pub fn on_weeks(mut self, weeks: impl IntoIterator<Item = u32>) -> Self {
        self.week_numbers = weeks.into_iter().collect();
        self.week_numbers.sort_unstable();
        self.week_numbers.dedup();
        self
    }

    fn filters_weeks(&self) -> bool {
        self.frequency == RecurrenceFrequency::Monthly && !self.week_numbers.is_empty()
    }

    /// Caller-side checks run before a rule reaches the expander.
    pub fn validate(&self) -> Result<()> {
        if self.start_date > self.end_date {
            return Err(LedgerError::InvalidInput(format!(
                "recurrence ends ({}) before it starts ({})",
                calendar::format_date(self.end_date),
                calendar::format_date(self.start_date)
            )));
        }
        if let Some(week) = self.week_numbers.iter().find(|w| !(1..=5).contains(*w)) {
            return Err(LedgerError::InvalidInput(format!(
                "week number {week} must be between 1 and 5"
            )));
        }
        Ok(())
    }

    /// Lazily walks the dates this rule emits, without the occurrence cap.
    pub fn dates(&self) -> RecurrenceDates<'_> {
        RecurrenceDates {
            rule: self,
            cursor: Some(self.start_date),
            step: 0,
        }
    }
}

/// Iterator over the emitted dates of a [`RecurrenceRule`].
///
/// Month-based steps are always taken from the start date (`start + k * step` months,
/// clamped to the month end), so a rule starting on the 31st lands on the last day of
/// shorter months and returns to the 31st afterwards.
pub struct RecurrenceDates<'a> {
    rule: &'a RecurrenceRule,
    cursor: Option<NaiveDate>,
    step: i64,
}

impl RecurrenceDates<'_> {
    fn advance(&mut self, current: NaiveDate) -> Option<NaiveDate> {
        self.step += 1;
        let rule = self.rule;
        if rule.filters_weeks() {
            return Some(add_days(current, 7));
        }
        if let Some(days) = rule.frequency.day_step() {
            return Some(add_days(current, days));
        }
        let months = rule.frequency.month_step()? as i64 * self.step;
        let months = i32::try_from(months).ok()?;
        Some(add_months(rule.start_date, months))
    }
}

impl Iterator for RecurrenceDates<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        loop {
            let current = self.cursor?;
            if current > self.rule.end_date || current == NaiveDate::MAX {
                self.cursor = None;
                return None;
            }
            self.cursor = self.advance(current);
            let emit = !self.rule.filters_weeks()
                || self
                    .rule
                    .week_numbers
                    .contains(&nth_weekday_of_month(current));
            if emit {
                return Some(current);
            }
        }
    }
}

/// Output of one expansion: the dated records and their shared group id.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceExpansion {
    pub recurrence_id: String,
    pub transactions: Vec<Transaction>,
    /// Set when the occurrence cap stopped expansion before `end_date` was reached.
    pub truncated: bool,
}

impl RecurrenceExpansion {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.transactions.iter().map(|txn| txn.date).collect()
    }
}

/// Expands `template` into one transaction per occurrence of `rule`.
///
/// Each record gets its own id and the expansion-wide recurrence id, both drawn from
/// `ids`. At most [`MAX_OCCURRENCES`] records are produced.
pub fn expand_recurrence(
    template: &TransactionDraft,
    rule: &RecurrenceRule,
    ids: &dyn IdProvider,
) -> RecurrenceExpansion {
    let recurrence_id = ids.next_id();
    let mut dates = rule.dates();
    let mut transactions = Vec::new();

    for date in dates.by_ref().take(MAX_OCCURRENCES) {
        let mut txn = template.clone().into_transaction(ids.next_id(), date);
        txn.recurrence_id = Some(recurrence_id.clone());
        transactions.push(txn);
    }

    let truncated = transactions.len() == MAX_OCCURRENCES && dates.next().is_some();
    if truncated {
        warn!(
            recurrence_id = %recurrence_id,
            frequency = %rule.frequency,
            end = %calendar::format_date(rule.end_date),
            "recurrence expansion hit the occurrence cap"
        );
    }
    debug!(
        recurrence_id = %recurrence_id,
        occurrences = transactions.len(),
        "expanded recurrence"
    );

    RecurrenceExpansion {
        recurrence_id,
        transactions,
        truncated,
    }
}
