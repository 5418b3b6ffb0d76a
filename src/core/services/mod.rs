pub mod asset_service;
pub mod budget_service;
pub mod transaction_service;

pub use asset_service::AssetService;
pub use budget_service::BudgetService;
pub use transaction_service::{RecurrencePlan, TransactionService};

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
}

/// Shared guard for user-entered money values.
pub(crate) fn ensure_amount(label: &str, value: f64) -> ServiceResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ServiceError::Invalid(format!(
            "{label} must be a non-negative amount"
        )));
    }
    Ok(())
}
