use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    asset::{self, Asset, AssetCategory},
    ids::IdProvider,
    transaction::{Confirmation, Transaction, TransactionPatch},
};
use crate::errors::{LedgerError, Result};

pub const CURRENT_DOCUMENT_VERSION: &str = "1.0";

/// The persisted household ledger: every asset and transaction the user owns.
///
/// Computation modules only ever see `&[Asset]` / `&[Transaction]` slices of this
/// document; all mutation goes through the methods below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    pub assets: Vec<Asset>,
    pub transactions: Vec<Transaction>,
    #[serde(default = "Ledger::version_default")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            assets: Vec::new(),
            transactions: Vec::new(),
            version: Self::version_default(),
            exported_at: None,
        }
    }

    /// State after a full reset: no history and a single empty cash account.
    pub fn blank(ids: &dyn IdProvider) -> Self {
        let mut ledger = Self::new();
        ledger
            .assets
            .push(Asset::new(ids.next_id(), "Cash", AssetCategory::Cash, 0.0));
        ledger
    }

    pub fn version_default() -> String {
        CURRENT_DOCUMENT_VERSION.to_string()
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_mut(&mut self, id: &str) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.id == id)
    }

    /// Members of one recurrence group, in date order.
    pub fn recurrence_group(&self, recurrence_id: &str) -> Vec<&Transaction> {
        let mut members: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|txn| txn.recurrence_id.as_deref() == Some(recurrence_id))
            .collect();
        members.sort_by_key(|txn| txn.date);
        members
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<String> {
        if self.transaction(&transaction.id).is_some() {
            return Err(LedgerError::InvalidInput(format!(
                "transaction id `{}` already exists",
                transaction.id
            )));
        }
        let id = transaction.id.clone();
        self.transactions.push(transaction);
        info!(id = %id, "added transaction");
        Ok(id)
    }

    /// Inserts a batch, e.g. one recurrence expansion; nothing is added if any id clashes.
    pub fn add_transactions(&mut self, batch: Vec<Transaction>) -> Result<usize> {
        for (idx, txn) in batch.iter().enumerate() {
            let clashes = self.transaction(&txn.id).is_some()
                || batch[..idx].iter().any(|earlier| earlier.id == txn.id);
            if clashes {
                return Err(LedgerError::InvalidInput(format!(
                    "transaction id `{}` already exists",
                    txn.id
                )));
            }
        }
        let count = batch.len();
        self.transactions.extend(batch);
        info!(count, "added transactions");
        Ok(count)
    }

    pub fn update_transaction(&mut self, id: &str, patch: TransactionPatch) -> Result<&Transaction> {
        let txn = self
            .transaction_mut(id)
            .ok_or_else(|| LedgerError::NotFound(format!("transaction `{id}`")))?;
        txn.apply(patch);
        info!(id, "updated transaction");
        Ok(txn)
    }

    /// Removes one transaction; other members of its recurrence group stay.
    pub fn remove_transaction(&mut self, id: &str) -> Result<Transaction> {
        let idx = self
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("transaction `{id}`")))?;
        info!(id, "removed transaction");
        Ok(self.transactions.remove(idx))
    }

    /// Replaces a planned entry with the realized expense in one step.
    ///
    /// The new record takes the planned entry's slot; the planned entry is returned.
    pub fn confirm_budget(
        &mut self,
        planned_id: &str,
        confirmation: Confirmation,
        ids: &dyn IdProvider,
    ) -> Result<(Transaction, String)> {
        let amount = confirmation.amount;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::InvalidInput(format!(
                "confirmed amount must be positive, got {amount}"
            )));
        }
        let idx = self
            .transactions
            .iter()
            .position(|txn| txn.id == planned_id)
            .ok_or_else(|| LedgerError::NotFound(format!("transaction `{planned_id}`")))?;
        if !self.transactions[idx].is_planned() {
            return Err(LedgerError::InvalidInput(format!(
                "transaction `{planned_id}` is not a planned budget entry"
            )));
        }
        let realized = self.transactions[idx].confirmed(ids.next_id(), confirmation);
        let new_id = realized.id.clone();
        let planned = std::mem::replace(&mut self.transactions[idx], realized);
        info!(planned = planned_id, realized = %new_id, "confirmed budget entry");
        Ok((planned, new_id))
    }

    pub fn add_asset(&mut self, asset: Asset, limit: usize) -> Result<String> {
        if self.assets.len() >= limit {
            return Err(LedgerError::AssetLimitReached(limit));
        }
        asset.validate()?;
        if self.asset(&asset.id).is_some() {
            return Err(LedgerError::InvalidInput(format!(
                "asset id `{}` already exists",
                asset.id
            )));
        }
        let id = asset.id.clone();
        self.assets.push(asset);
        info!(id = %id, "added asset");
        Ok(id)
    }

    pub fn remove_asset(&mut self, id: &str) -> Result<Asset> {
        let idx = self
            .assets
            .iter()
            .position(|asset| asset.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("asset `{id}`")))?;
        info!(id, "removed asset");
        Ok(self.assets.remove(idx))
    }

    pub fn net_worth(&self) -> f64 {
        asset::net_worth(&self.assets)
    }

    pub fn total_by_category(&self) -> Vec<(AssetCategory, f64)> {
        asset::totals_by_category(&self.assets)
    }

    /// Drops all history and assets, leaving a single empty cash account.
    pub fn reset(&mut self, ids: &dyn IdProvider) {
        *self = Self::blank(ids);
        info!("ledger reset");
    }

    /// Overwrites the whole document with a restored backup.
    pub fn replace_all(&mut self, restored: Ledger) {
        info!(
            assets = restored.assets.len(),
            transactions = restored.transactions.len(),
            "restored ledger"
        );
        self.assets = restored.assets;
        self.transactions = restored.transactions;
        self.version = Self::version_default();
        self.exported_at = None;
    }
}
