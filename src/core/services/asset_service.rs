use tracing::info;

use crate::config::Config;
use crate::errors::LedgerError;
use crate::ledger::{AmortizationRow, Asset, Ledger};

use super::{ServiceError, ServiceResult};

pub struct AssetService;

impl AssetService {
    /// Adds an asset while respecting the configured asset limit.
    pub fn add(ledger: &mut Ledger, asset: Asset, config: &Config) -> ServiceResult<String> {
        if ledger.assets.iter().any(|existing| existing.name == asset.name) {
            return Err(ServiceError::Invalid(format!(
                "Asset `{}` already exists",
                asset.name
            )));
        }
        Ok(ledger.add_asset(asset, config.max_assets)?)
    }

    pub fn remove(ledger: &mut Ledger, id: &str) -> ServiceResult<Asset> {
        Ok(ledger.remove_asset(id)?)
    }

    pub fn net_worth(ledger: &Ledger) -> f64 {
        ledger.net_worth()
    }

    /// First-month payment of the loan asset `id`.
    pub fn loan_payment(ledger: &Ledger, id: &str) -> ServiceResult<f64> {
        let asset = Self::find(ledger, id)?;
        let payment = asset.estimated_payment()?.ok_or_else(|| {
            ServiceError::Invalid(format!("Asset `{}` has no loan terms", asset.name))
        })?;
        info!(asset = %asset.name, payment, "estimated loan payment");
        Ok(payment)
    }

    pub fn loan_schedule(ledger: &Ledger, id: &str) -> ServiceResult<Vec<AmortizationRow>> {
        Ok(Self::find(ledger, id)?.repayment_schedule()?)
    }

    fn find<'a>(ledger: &'a Ledger, id: &str) -> ServiceResult<&'a Asset> {
        ledger
            .asset(id)
            .ok_or_else(|| LedgerError::NotFound(format!("asset `{id}`")).into())
    }
}
