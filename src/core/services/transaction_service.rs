//! Business logic helpers for recording, planning and confirming transactions.

use chrono::NaiveDate;
use tracing::info;

use crate::core::services::{ensure_amount, ServiceError, ServiceResult};
use crate::ledger::{
    expand_recurrence, Confirmation, IdProvider, Ledger, RecurrenceRule, Transaction,
    TransactionDraft, TransactionPatch,
};

/// Outcome of inserting one recurrence expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrencePlan {
    pub recurrence_id: String,
    pub occurrences: usize,
    pub truncated: bool,
}

/// Provides validated write paths for ledger transactions.
pub struct TransactionService;

impl TransactionService {
    /// Records a single dated transaction and returns its identifier.
    pub fn add(
        ledger: &mut Ledger,
        draft: TransactionDraft,
        date: NaiveDate,
        ids: &dyn IdProvider,
    ) -> ServiceResult<String> {
        Self::validate_draft(&draft)?;
        Ok(ledger.add_transaction(draft.create(ids, date))?)
    }

    pub fn update(ledger: &mut Ledger, id: &str, patch: TransactionPatch) -> ServiceResult<()> {
        if let Some(amount) = patch.amount {
            ensure_amount("Amount", amount)?;
        }
        if let Some(Some(budget)) = patch.budget_amount {
            ensure_amount("Budget", budget)?;
        }
        if matches!(&patch.category, Some(category) if category.trim().is_empty()) {
            return Err(ServiceError::Invalid("Category is required".into()));
        }
        ledger.update_transaction(id, patch)?;
        Ok(())
    }

    /// Removes one transaction; the rest of its recurrence group is kept.
    pub fn remove(ledger: &mut Ledger, id: &str) -> ServiceResult<Transaction> {
        Ok(ledger.remove_transaction(id)?)
    }

    /// Expands `draft` over `rule` and inserts every occurrence as one batch.
    pub fn plan_recurring(
        ledger: &mut Ledger,
        draft: &TransactionDraft,
        rule: &RecurrenceRule,
        ids: &dyn IdProvider,
    ) -> ServiceResult<RecurrencePlan> {
        Self::validate_draft(draft)?;
        rule.validate()?;
        let expansion = expand_recurrence(draft, rule, ids);
        let plan = RecurrencePlan {
            recurrence_id: expansion.recurrence_id.clone(),
            occurrences: expansion.len(),
            truncated: expansion.truncated,
        };
        ledger.add_transactions(expansion.transactions)?;
        info!(
            recurrence_id = %plan.recurrence_id,
            occurrences = plan.occurrences,
            frequency = %rule.frequency,
            "planned recurring transactions"
        );
        Ok(plan)
    }

    /// Turns a planned entry into the realized expense, returning the new id.
    pub fn confirm_budget(
        ledger: &mut Ledger,
        planned_id: &str,
        confirmation: Confirmation,
        ids: &dyn IdProvider,
    ) -> ServiceResult<String> {
        ensure_amount("Actual amount", confirmation.amount)?;
        let (_, new_id) = ledger.confirm_budget(planned_id, confirmation, ids)?;
        Ok(new_id)
    }

    fn validate_draft(draft: &TransactionDraft) -> ServiceResult<()> {
        if draft.category.trim().is_empty() {
            return Err(ServiceError::Invalid("Category is required".into()));
        }
        ensure_amount("Amount", draft.amount)?;
        let budget = draft.budget_amount.unwrap_or(0.0);
        ensure_amount("Budget", budget)?;
        if draft.amount == 0.0 && budget == 0.0 {
            return Err(ServiceError::Invalid(
                "Either an amount or a budget is required".into(),
            ));
        }
        Ok(())
    }
}
