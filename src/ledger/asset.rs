use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{
    codes,
    loan::{AmortizationRow, LoanDetails},
};
use crate::errors::{LedgerError, Result};

/// Balance-holding account or liability.
///
/// `balance` is a magnitude; whether it counts for or against net worth depends on the
/// category. Holdings restored from old backups may still carry a negative balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub category: AssetCategory,
    pub balance: f64,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_details: Option<LoanDetails>,
}

impl Asset {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: AssetCategory,
        balance: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            balance,
            color: String::new(),
            loan_details: None,
        }
    }

    pub fn loan(
        id: impl Into<String>,
        name: impl Into<String>,
        balance: f64,
        details: LoanDetails,
    ) -> Self {
        Self {
            loan_details: Some(details),
            ..Self::new(id, name, AssetCategory::Loan, balance)
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn is_liability(&self) -> bool {
        self.category == AssetCategory::Loan
    }

    /// Contribution to net worth: positive for holdings, negative for loans.
    pub fn signed_balance(&self) -> f64 {
        if self.is_liability() {
            -self.balance
        } else {
            self.balance
        }
    }

    /// First-month payment estimate for loans carrying repayment terms.
    pub fn estimated_payment(&self) -> Result<Option<f64>> {
        match (&self.loan_details, self.is_liability()) {
            (Some(details), true) => details.monthly_payment(self.balance).map(Some),
            _ => Ok(None),
        }
    }

    pub fn repayment_schedule(&self) -> Result<Vec<AmortizationRow>> {
        match (&self.loan_details, self.is_liability()) {
            (Some(details), true) => details.schedule(self.balance),
            _ => Err(LedgerError::InvalidInput(format!(
                "asset `{}` has no loan terms",
                self.name
            ))),
        }
    }

    /// Rejects values the rest of the ledger cannot represent.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::InvalidInput("asset name is empty".into()));
        }
        if !self.balance.is_finite() || self.balance < 0.0 {
            return Err(LedgerError::InvalidInput(format!(
                "asset `{}` balance must be a non-negative amount",
                self.name
            )));
        }
        if let Some(details) = &self.loan_details {
            if !self.is_liability() {
                return Err(LedgerError::InvalidInput(format!(
                    "asset `{}` carries loan terms but is not a loan",
                    self.name
                )));
            }
            details.validate()?;
        }
        Ok(())
    }

    /// Lenient check for records read back from a backup.
    ///
    /// A negative loan balance is stored as its magnitude. A negative holding is kept
    /// as-is so net worth matches what the old backup showed. Loan terms are checked
    /// strictly.
    pub fn normalize_imported(&mut self) -> Result<()> {
        if !self.balance.is_finite() {
            return Err(LedgerError::InvalidInput(format!(
                "asset `{}` balance is not a number",
                self.name
            )));
        }
        if self.balance < 0.0 {
            if self.is_liability() {
                warn!(asset = %self.id, balance = self.balance, "stored negative loan balance as its magnitude");
                self.balance = -self.balance;
            } else {
                warn!(asset = %self.id, balance = self.balance, "kept negative holding balance from backup");
            }
        }
        if let Some(details) = &self.loan_details {
            details.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum AssetCategory {
    RealEstate,
    Finance,
    Cash,
    Loan,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 4] = [
        AssetCategory::RealEstate,
        AssetCategory::Finance,
        AssetCategory::Cash,
        AssetCategory::Loan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::RealEstate => "REAL_ESTATE",
            AssetCategory::Finance => "FINANCE",
            AssetCategory::Cash => "CASH",
            AssetCategory::Loan => "LOAN",
        }
    }
}

impl FromStr for AssetCategory {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self> {
        let parsed = match codes::normalize(raw).as_str() {
            "REAL_ESTATE" | "REALESTATE" => AssetCategory::RealEstate,
            "FINANCE" => AssetCategory::Finance,
            "CASH" => AssetCategory::Cash,
            "LOAN" | "DEBT" => AssetCategory::Loan,
            _ => return Err(codes::unknown("asset category", raw)),
        };
        codes::note_legacy("asset category", raw, parsed.as_str());
        Ok(parsed)
    }
}

impl TryFrom<String> for AssetCategory {
    type Error = LedgerError;

    fn try_from(raw: String) -> Result<Self> {
        raw.parse()
    }
}

impl From<AssetCategory> for &'static str {
    fn from(value: AssetCategory) -> Self {
        value.as_str()
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holdings minus loans.
pub fn net_worth(assets: &[Asset]) -> f64 {
    assets.iter().map(Asset::signed_balance).sum()
}

/// Balance magnitude per category, in [`AssetCategory::ALL`] order, skipping empty ones.
pub fn totals_by_category(assets: &[Asset]) -> Vec<(AssetCategory, f64)> {
    AssetCategory::ALL
        .iter()
        .filter_map(|category| {
            let mut members = assets.iter().filter(|asset| asset.category == *category).peekable();
            members.peek()?;
            Some((*category, members.map(|asset| asset.balance).sum()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::loan::RepaymentMethod;

    fn sample_assets() -> Vec<Asset> {
        vec![
            Asset::new("1", "Home", AssetCategory::RealEstate, 500_000_000.0),
            Asset::new("2", "Brokerage", AssetCategory::Finance, 5_000_000.0),
            Asset::new("3", "Wallet", AssetCategory::Cash, 2_500_000.0),
            Asset::loan(
                "4",
                "Mortgage",
                300_000_000.0,
                LoanDetails::new("4.2", 360, RepaymentMethod::EqualPayment),
            ),
        ]
    }

    #[test]
    fn net_worth_subtracts_loans() {
        assert_eq!(net_worth(&sample_assets()), 207_500_000.0);
        assert_eq!(net_worth(&[]), 0.0);
    }

    #[test]
    fn totals_follow_category_order() {
        let mut assets = sample_assets();
        assets.push(Asset::new("5", "Savings", AssetCategory::Cash, 500_000.0));
        let totals = totals_by_category(&assets);
        assert_eq!(totals.len(), 4);
        assert_eq!(totals[2], (AssetCategory::Cash, 3_000_000.0));
        assert_eq!(totals[3].0, AssetCategory::Loan);
    }

    #[test]
    fn only_loans_estimate_payments() {
        let assets = sample_assets();
        assert_eq!(assets[0].estimated_payment().unwrap(), None);
        let payment = assets[3].estimated_payment().unwrap().unwrap();
        assert!(payment > 1_000_000.0 && payment < 2_000_000.0);
        assert!(assets[0].repayment_schedule().is_err());
        assert_eq!(assets[3].repayment_schedule().unwrap().len(), 360);
    }

    #[test]
    fn validate_rejects_bad_assets() {
        let negative = Asset::new("1", "Wallet", AssetCategory::Cash, -1.0);
        assert!(negative.validate().is_err());
        let mut stray_terms = Asset::new("2", "Wallet", AssetCategory::Cash, 1.0);
        stray_terms.loan_details = Some(LoanDetails::new("3", 12, RepaymentMethod::Bullet));
        assert!(stray_terms.validate().is_err());
        assert!(sample_assets().iter().all(|asset| asset.validate().is_ok()));
    }

    #[test]
    fn category_codes_normalize() {
        let asset: Asset = serde_json::from_str(
            r#"{"id":"1","name":"Home","category":"real_estate","balance":1,"color":"bg-indigo-400"}"#,
        )
        .unwrap();
        assert_eq!(asset.category, AssetCategory::RealEstate);
        assert_eq!(serde_json::to_value(&asset).unwrap()["category"], "REAL_ESTATE");
    }

    #[test]
    fn imported_negative_balances_are_normalized() {
        let mut card = Asset::new("1", "Card debt", AssetCategory::Cash, -50_000.0);
        assert!(card.validate().is_err());
        card.normalize_imported().unwrap();
        assert_eq!(card.balance, -50_000.0);
        assert_eq!(net_worth(&[card]), -50_000.0);

        let mut loan = Asset::loan(
            "2",
            "Mortgage",
            -1_000.0,
            LoanDetails::new("3", 12, RepaymentMethod::Bullet),
        );
        loan.normalize_imported().unwrap();
        assert_eq!(loan.balance, 1_000.0);
        assert_eq!(loan.signed_balance(), -1_000.0);
    }

    #[test]
    fn oversized_loan_term_fails_validation() {
        let mut loan = Asset::loan(
            "1",
            "Mortgage",
            1_000.0,
            LoanDetails::new("5", u32::MAX, RepaymentMethod::EqualPayment),
        );
        assert!(matches!(loan.validate(), Err(LedgerError::InvalidInput(_))));
        assert!(loan.normalize_imported().is_err());
        assert!(loan.repayment_schedule().is_err());
    }
}
