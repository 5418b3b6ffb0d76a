use crate::ledger::{
    aggregate_impulse, aggregate_period, BudgetFilter, BudgetStats, ImpulseMood, ImpulseSummary,
    Ledger, MonthlyBudgetReport, Period, SpendingAnalysis, YearMonth,
};

use super::ServiceResult;

pub struct BudgetService;

impl BudgetService {
    pub fn monthly_report(ledger: &Ledger, year: i32, month: u32) -> ServiceResult<MonthlyBudgetReport> {
        let month = YearMonth::new(year, month)?;
        Ok(MonthlyBudgetReport::build(&ledger.transactions, month))
    }

    pub fn aggregate(ledger: &Ledger, filter: &BudgetFilter) -> BudgetStats {
        aggregate_period(&ledger.transactions, filter)
    }

    pub fn impulse(ledger: &Ledger, period: Period) -> ImpulseSummary {
        aggregate_impulse(&ledger.transactions, period)
    }

    pub fn analysis(ledger: &Ledger, period: Period) -> SpendingAnalysis {
        SpendingAnalysis::build(&ledger.transactions, period)
    }

    /// Indicator over the whole history, matching the impulse ratio's global scope.
    pub fn mood(ledger: &Ledger) -> ImpulseMood {
        ImpulseMood::of(&ledger.transactions)
    }
}
