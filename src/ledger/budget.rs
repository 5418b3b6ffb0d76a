use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    allocation::BudgetPartition,
    calendar::{week_of_month, YearMonth},
    transaction::Transaction,
};

/// Reporting window a subset of transactions is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Month(YearMonth),
    Year(i32),
    All,
}

impl Period {
    pub fn month(year: i32, month: u32) -> Period {
        Period::Month(YearMonth { year, month })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Period::Month(month) => month.contains(date),
            Period::Year(year) => date.year() == *year,
            Period::All => true,
        }
    }
}

/// Selects the expense subset one budget figure is computed over.
///
/// The same filter narrows from a month to a grid week to a single category, so all
/// three granularities share [`aggregate_period`].
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetFilter {
    pub period: Period,
    pub partition: Option<BudgetPartition>,
    pub week: Option<u32>,
    pub category: Option<String>,
}

impl BudgetFilter {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            partition: None,
            week: None,
            category: None,
        }
    }

    pub fn month(month: YearMonth) -> Self {
        Self::new(Period::Month(month))
    }

    pub fn partition(mut self, partition: BudgetPartition) -> Self {
        self.partition = Some(partition);
        self
    }

    pub fn week(mut self, week: u32) -> Self {
        self.week = Some(week);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        transaction.is_expense()
            && self.period.contains(transaction.date)
            && self
                .partition
                .map_or(true, |partition| partition.contains(transaction))
            && self
                .week
                .map_or(true, |week| week_of_month(transaction.date) == week)
            && self
                .category
                .as_deref()
                .map_or(true, |category| transaction.category == category)
    }
}

/// Budget-versus-actual figures for one subset of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BudgetStats {
    /// Sum of planned amounts, realized or not.
    pub budget: f64,
    /// Sum of realized amounts.
    pub spent: f64,
    /// Planned amounts of entries that are still unrealized.
    pub expected: f64,
    pub used: f64,
    pub remaining: f64,
    pub usage_percent: f64,
    pub over_budget: bool,
}

impl BudgetStats {
    pub fn from_entries<'a, I>(entries: I) -> BudgetStats
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut budget = 0.0;
        let mut spent = 0.0;
        let mut expected = 0.0;
        for txn in entries {
            budget += txn.budget();
            spent += txn.amount;
            if txn.is_planned() {
                expected += txn.budget();
            }
        }
        BudgetStats::from_totals(budget, spent, expected)
    }

    pub fn from_totals(budget: f64, spent: f64, expected: f64) -> BudgetStats {
        let used = spent + expected;
        let usage_percent = if budget > 0.0 {
            used / budget * 100.0
        } else {
            0.0
        };
        BudgetStats {
            budget,
            spent,
            expected,
            used,
            remaining: budget - used,
            usage_percent,
            over_budget: used > budget,
        }
    }

    /// True when nothing was planned or spent.
    pub fn is_empty(&self) -> bool {
        self.budget == 0.0 && self.spent == 0.0
    }
}

/// Aggregates the transactions selected by `filter`.
pub fn aggregate_period(transactions: &[Transaction], filter: &BudgetFilter) -> BudgetStats {
    BudgetStats::from_entries(transactions.iter().filter(|txn| filter.matches(txn)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub category: String,
    pub stats: BudgetStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekBudget {
    /// Calendar-grid row, starting at 1.
    pub week: u32,
    pub stats: BudgetStats,
    /// Per-category figures, ordered by category name.
    pub categories: Vec<CategoryBudget>,
}

/// Everything the monthly budget screen shows for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBudgetReport {
    pub month: YearMonth,
    pub living: BudgetStats,
    pub event: BudgetStats,
    pub weeks: Vec<WeekBudget>,
    pub impulse: ImpulseSummary,
}

impl MonthlyBudgetReport {
    pub fn build(transactions: &[Transaction], month: YearMonth) -> MonthlyBudgetReport {
        let month_filter = BudgetFilter::month(month);
        let living_filter = month_filter.clone().partition(BudgetPartition::Living);
        let living = aggregate_period(transactions, &living_filter);
        let event = aggregate_period(
            transactions,
            &month_filter.partition(BudgetPartition::Event),
        );

        let weeks = (1..=month.weeks())
            .map(|week| {
                let week_filter = living_filter.clone().week(week);
                let entries: Vec<&Transaction> = transactions
                    .iter()
                    .filter(|txn| week_filter.matches(txn))
                    .collect();

                let mut by_category: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
                for txn in entries.iter().copied() {
                    by_category.entry(txn.category.as_str()).or_default().push(txn);
                }
                let categories = by_category
                    .into_iter()
                    .map(|(category, items)| CategoryBudget {
                        category: category.to_string(),
                        stats: BudgetStats::from_entries(items),
                    })
                    .collect();

                WeekBudget {
                    week,
                    stats: BudgetStats::from_entries(entries),
                    categories,
                }
            })
            .collect();

        let impulse = aggregate_impulse(transactions, Period::Month(month));
        debug!(month = %month.label(), living_used = living.used, "built monthly budget report");

        MonthlyBudgetReport {
            month,
            living,
            event,
            weeks,
            impulse,
        }
    }

    pub fn week(&self, week: u32) -> Option<&WeekBudget> {
        self.weeks.iter().find(|entry| entry.week == week)
    }
}

/// Impulse spending inside a period plus the all-time impulse ratio.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImpulseSummary {
    pub total: f64,
    /// Category totals, largest first.
    pub by_category: Vec<(String, f64)>,
    /// Share of impulse spending across every expense on record, not just `period`.
    pub ratio: f64,
}

pub fn aggregate_impulse(transactions: &[Transaction], period: Period) -> ImpulseSummary {
    let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
    let mut total = 0.0;
    for txn in transactions
        .iter()
        .filter(|txn| txn.is_expense() && txn.is_impulse && period.contains(txn.date))
    {
        total += txn.amount;
        *by_category.entry(txn.category.as_str()).or_insert(0.0) += txn.amount;
    }

    let mut by_category: Vec<(String, f64)> = by_category
        .into_iter()
        .map(|(category, amount)| (category.to_string(), amount))
        .collect();
    by_category.sort_by(|a, b| b.1.total_cmp(&a.1));

    ImpulseSummary {
        total,
        by_category,
        ratio: impulse_ratio(transactions),
    }
}

/// Percentage of all expense spending that was flagged impulsive.
pub fn impulse_ratio(transactions: &[Transaction]) -> f64 {
    let (impulse, total) = transactions
        .iter()
        .filter(|txn| txn.is_expense())
        .fold((0.0, 0.0), |(impulse, total), txn| {
            let impulse = if txn.is_impulse {
                impulse + txn.amount
            } else {
                impulse
            };
            (impulse, total + txn.amount)
        });
    if total > 0.0 {
        impulse / total * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::AllocationType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> YearMonth {
        YearMonth::new(2024, 1).unwrap()
    }

    #[test]
    fn empty_subset_is_all_zero() {
        let stats = aggregate_period(&[], &BudgetFilter::month(january()));
        assert_eq!(stats, BudgetStats::default());
        assert!(!stats.over_budget);
        assert_eq!(stats.usage_percent, 0.0);
    }

    #[test]
    fn planned_and_realized_entries_combine() {
        let transactions = vec![
            Transaction::planned("a", "Food", date(2024, 1, 3), 50_000.0),
            Transaction::expense("b", "Food", date(2024, 1, 4), 30_000.0),
        ];
        let stats = aggregate_period(
            &transactions,
            &BudgetFilter::month(january()).partition(BudgetPartition::Living),
        );
        assert_eq!(stats.budget, 50_000.0);
        assert_eq!(stats.spent, 30_000.0);
        assert_eq!(stats.expected, 50_000.0);
        assert_eq!(stats.used, 80_000.0);
        assert_eq!(stats.remaining, -30_000.0);
        assert_eq!(stats.usage_percent, 160.0);
        assert!(stats.over_budget);
    }

    #[test]
    fn realized_with_plan_is_not_expected() {
        let mut txn = Transaction::expense("a", "Food", date(2024, 1, 3), 12_000.0);
        txn.budget_amount = Some(10_000.0);
        let stats = BudgetStats::from_entries([&txn]);
        assert_eq!(stats.expected, 0.0);
        assert_eq!(stats.used, 12_000.0);
        assert!(stats.over_budget);
    }

    #[test]
    fn aggregation_ignores_order() {
        let mut transactions = vec![
            Transaction::planned("a", "Food", date(2024, 1, 3), 20_000.0),
            Transaction::expense("b", "Cafe", date(2024, 1, 10), 4_500.0),
            Transaction::planned("c", "Cafe", date(2024, 1, 20), 10_000.0),
        ];
        let filter = BudgetFilter::month(january());
        let forward = aggregate_period(&transactions, &filter);
        transactions.reverse();
        assert_eq!(aggregate_period(&transactions, &filter), forward);
    }

    #[test]
    fn filter_skips_income_other_months_and_partitions() {
        let mut event = Transaction::planned("e", "Gift", date(2024, 1, 5), 100_000.0);
        event.allocation_type = AllocationType::Event;
        let transactions = vec![
            Transaction::income("i", "Salary", date(2024, 1, 25), 3_000_000.0),
            Transaction::expense("f", "Food", date(2024, 2, 1), 9_000.0),
            event,
            Transaction::expense("l", "Food", date(2024, 1, 6), 7_000.0),
        ];
        let living = aggregate_period(
            &transactions,
            &BudgetFilter::month(january()).partition(BudgetPartition::Living),
        );
        assert_eq!(living.spent, 7_000.0);
        assert_eq!(living.budget, 0.0);

        let events = aggregate_period(
            &transactions,
            &BudgetFilter::month(january()).partition(BudgetPartition::Event),
        );
        assert_eq!(events.budget, 100_000.0);
        assert_eq!(events.expected, 100_000.0);
    }

    #[test]
    fn monthly_report_splits_weeks_and_categories() {
        // January 2024 starts on a Monday: grid rows are 1-6, 7-13, 14-20, 21-27, 28-31.
        let transactions = vec![
            Transaction::planned("a", "Food", date(2024, 1, 2), 30_000.0),
            Transaction::expense("b", "Food", date(2024, 1, 3), 12_000.0),
            Transaction::expense("c", "Cafe", date(2024, 1, 5), 5_000.0),
            Transaction::planned("d", "Food", date(2024, 1, 9), 30_000.0),
        ];
        let report = MonthlyBudgetReport::build(&transactions, january());
        assert_eq!(report.weeks.len(), 5);

        let first = report.week(1).unwrap();
        assert_eq!(first.stats.budget, 30_000.0);
        assert_eq!(first.stats.spent, 17_000.0);
        assert_eq!(first.categories.len(), 2);
        assert_eq!(first.categories[0].category, "Cafe");
        assert_eq!(first.categories[1].stats.expected, 30_000.0);

        let second = report.week(2).unwrap();
        assert_eq!(second.stats.expected, 30_000.0);
        assert!(report.week(3).unwrap().categories.is_empty());

        assert_eq!(report.living.budget, 60_000.0);
        assert_eq!(report.living.used, 77_000.0);
        assert!(report.event.is_empty());
    }

    #[test]
    fn impulse_breakdown_is_sorted_and_period_scoped() {
        let mut a = Transaction::expense("a", "Shopping", date(2024, 1, 3), 150_000.0);
        a.is_impulse = true;
        let mut b = Transaction::expense("b", "Cafe", date(2024, 1, 4), 8_000.0);
        b.is_impulse = true;
        let mut c = Transaction::expense("c", "Shopping", date(2024, 2, 4), 50_000.0);
        c.is_impulse = true;
        let d = Transaction::expense("d", "Food", date(2024, 1, 5), 208_000.0);
        let transactions = vec![b, a, c, d];

        let summary = aggregate_impulse(&transactions, Period::Month(january()));
        assert_eq!(summary.total, 158_000.0);
        assert_eq!(
            summary.by_category,
            vec![("Shopping".to_string(), 150_000.0), ("Cafe".to_string(), 8_000.0)]
        );
        // 208_000 of 416_000 across all months.
        assert_eq!(summary.ratio, 50.0);
    }

    #[test]
    fn impulse_ratio_guards_empty_ledgers() {
        assert_eq!(impulse_ratio(&[]), 0.0);
        let income = Transaction::income("i", "Salary", date(2024, 1, 1), 100.0);
        assert_eq!(impulse_ratio(&[income]), 0.0);
    }

    #[test]
    fn impulse_ratio_uses_all_expenses() {
        let mut impulse = Transaction::expense("a", "Shopping", date(2024, 1, 1), 100.0);
        impulse.is_impulse = true;
        let regular = Transaction::expense("b", "Food", date(2023, 6, 1), 300.0);
        assert_eq!(impulse_ratio(&[impulse, regular]), 25.0);
    }
}
