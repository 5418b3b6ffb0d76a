//! Ledger domain models and the pure computations over them.

pub mod allocation;
pub mod analysis;
pub mod asset;
pub mod budget;
pub mod calendar;
pub(crate) mod codes;
pub mod ids;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod loan;
pub mod recurring;
pub mod transaction;

pub use allocation::{classify_nature, BudgetPartition, Nature};
pub use analysis::{DayMarkers, ImpulseMood, Share, SpendingAnalysis};
pub use asset::{net_worth, totals_by_category, Asset, AssetCategory};
pub use budget::{
    aggregate_impulse, aggregate_period, impulse_ratio, BudgetFilter, BudgetStats,
    CategoryBudget, ImpulseSummary, MonthlyBudgetReport, Period, WeekBudget,
};
pub use calendar::YearMonth;
pub use ids::{IdProvider, SequentialIdProvider, UuidIdProvider};
pub use ledger::Ledger;
pub use loan::{
    amortization_payment, amortization_schedule, AmortizationRow, LoanDetails, RepaymentMethod,
};
pub use recurring::{
    expand_recurrence, RecurrenceExpansion, RecurrenceFrequency, RecurrenceRule, MAX_OCCURRENCES,
};
pub use transaction::{
    AllocationType, Confirmation, Transaction, TransactionDraft, TransactionPatch,
    TransactionType,
};
