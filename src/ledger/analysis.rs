//! Spending breakdowns for the analysis and calendar screens.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    allocation::{classify_nature, Nature},
    budget::{impulse_ratio, Period},
    transaction::Transaction,
};

/// One slice of a breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share<K> {
    pub key: K,
    pub value: f64,
    /// Percent of the breakdown total.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingAnalysis {
    pub period: Period,
    pub total: f64,
    pub by_nature: Vec<Share<Nature>>,
    pub by_category: Vec<Share<String>>,
}

impl SpendingAnalysis {
    /// Breaks the period's expenses down by nature and by category, largest first.
    pub fn build(transactions: &[Transaction], period: Period) -> SpendingAnalysis {
        let mut total = 0.0;
        let mut by_nature: BTreeMap<Nature, f64> = BTreeMap::new();
        let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();

        for txn in transactions
            .iter()
            .filter(|txn| txn.is_expense() && period.contains(txn.date))
        {
            total += txn.amount;
            *by_nature.entry(classify_nature(txn)).or_insert(0.0) += txn.amount;
            *by_category.entry(txn.category.as_str()).or_insert(0.0) += txn.amount;
        }

        SpendingAnalysis {
            period,
            total,
            by_nature: shares(by_nature, total),
            by_category: shares(
                by_category
                    .into_iter()
                    .map(|(category, value)| (category.to_string(), value)),
                total,
            ),
        }
    }

    pub fn nature(&self, nature: Nature) -> f64 {
        self.by_nature
            .iter()
            .find(|share| share.key == nature)
            .map_or(0.0, |share| share.value)
    }
}

fn shares<K>(entries: impl IntoIterator<Item = (K, f64)>, total: f64) -> Vec<Share<K>> {
    let mut out: Vec<Share<K>> = entries
        .into_iter()
        .map(|(key, value)| Share {
            key,
            value,
            percent: if total > 0.0 {
                value / total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    out.sort_by(|a, b| b.value.total_cmp(&a.value));
    out
}

/// How worried the impulse indicator should look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpulseMood {
    Calm,
    Tempted,
    Dancing,
    Exploding,
}

impl ImpulseMood {
    pub fn from_ratio(ratio: f64) -> ImpulseMood {
        if ratio <= 0.0 {
            ImpulseMood::Calm
        } else if ratio < 20.0 {
            ImpulseMood::Tempted
        } else if ratio < 50.0 {
            ImpulseMood::Dancing
        } else {
            ImpulseMood::Exploding
        }
    }

    pub fn of(transactions: &[Transaction]) -> ImpulseMood {
        ImpulseMood::from_ratio(impulse_ratio(transactions))
    }

    pub fn message(&self) -> &'static str {
        match self {
            ImpulseMood::Calm => "All quiet so far",
            ImpulseMood::Tempted => "A little splurge crept in",
            ImpulseMood::Dancing => "Impulse spending is dancing",
            ImpulseMood::Exploding => "Impulse spending exploded, the account is in danger",
        }
    }
}

/// Dots shown under a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayMarkers {
    pub has_income: bool,
    pub has_expense: bool,
    pub has_budget: bool,
}

impl DayMarkers {
    pub fn for_day(transactions: &[Transaction], day: NaiveDate) -> DayMarkers {
        transactions
            .iter()
            .filter(|txn| txn.date == day)
            .fold(DayMarkers::default(), |mut markers, txn| {
                markers.has_income |= txn.is_income();
                markers.has_expense |= txn.is_expense();
                markers.has_budget |= txn.is_expense() && txn.is_planned();
                markers
            })
    }
}
