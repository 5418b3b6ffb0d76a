use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::codes;
use crate::errors::{LedgerError, Result};

/// Longest repayment term accepted, in months (100 years).
pub const MAX_TERM_MONTHS: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum RepaymentMethod {
    /// Constant installment (annuity).
    EqualPayment,
    /// Constant principal portion, interest on the outstanding balance.
    EqualPrincipal,
    /// Interest only, principal due at the end of the term.
    Bullet,
}

impl RepaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepaymentMethod::EqualPayment => "EQUAL_PAYMENT",
            RepaymentMethod::EqualPrincipal => "EQUAL_PRINCIPAL",
            RepaymentMethod::Bullet => "BULLET",
        }
    }
}

impl FromStr for RepaymentMethod {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self> {
        let parsed = match codes::normalize(raw).as_str() {
            "EQUAL_PAYMENT" => RepaymentMethod::EqualPayment,
            "EQUAL_PRINCIPAL" => RepaymentMethod::EqualPrincipal,
            "BULLET" | "BULK" => RepaymentMethod::Bullet,
            _ => return Err(codes::unknown("repayment method", raw)),
        };
        codes::note_legacy("repayment method", raw, parsed.as_str());
        Ok(parsed)
    }
}

impl TryFrom<String> for RepaymentMethod {
    type Error = LedgerError;

    fn try_from(raw: String) -> Result<Self> {
        raw.parse()
    }
}

impl From<RepaymentMethod> for &'static str {
    fn from(value: RepaymentMethod) -> Self {
        value.as_str()
    }
}

impl fmt::Display for RepaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / 12.0
}

/// Payment due in the first month of a loan.
///
/// A zero term is treated as a single month.
pub fn amortization_payment(
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
    method: RepaymentMethod,
) -> f64 {
    let r = monthly_rate(annual_rate_percent);
    let n = term_months.max(1);
    match method {
        RepaymentMethod::EqualPayment => annuity_payment(principal, r, n),
        RepaymentMethod::EqualPrincipal => principal / n as f64 + principal * r,
        RepaymentMethod::Bullet => principal * r,
    }
}

fn annuity_payment(principal: f64, r: f64, n: u32) -> f64 {
    if r == 0.0 {
        return principal / n as f64;
    }
    let growth = (1.0 + r).powf(f64::from(n));
    if !growth.is_finite() {
        // Limit of the annuity formula as the term grows: interest only.
        return principal * r;
    }
    let denominator = growth - 1.0;
    if denominator == 0.0 {
        return principal / n as f64;
    }
    principal * r * growth / denominator
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    /// Outstanding balance after this payment.
    pub balance: f64,
}

/// Month-by-month repayment plan; the final row always clears the balance.
///
/// Terms longer than [`MAX_TERM_MONTHS`] are rejected.
pub fn amortization_schedule(
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
    method: RepaymentMethod,
) -> Result<Vec<AmortizationRow>> {
    check_term(term_months)?;
    let r = monthly_rate(annual_rate_percent);
    let n = term_months.max(1);
    let fixed_payment = annuity_payment(principal, r, n);
    let mut balance = principal;
    let mut rows = Vec::new();

    for month in 1..=n {
        let interest = balance * r;
        let principal_part = if month == n {
            balance
        } else {
            match method {
                RepaymentMethod::EqualPayment => fixed_payment - interest,
                RepaymentMethod::EqualPrincipal => principal / n as f64,
                RepaymentMethod::Bullet => 0.0,
            }
        };
        balance -= principal_part;
        rows.push(AmortizationRow {
            month,
            payment: principal_part + interest,
            principal: principal_part,
            interest,
            balance: balance.max(0.0),
        });
    }

    Ok(rows)
}

fn check_term(term_months: u32) -> Result<()> {
    if term_months > MAX_TERM_MONTHS {
        return Err(LedgerError::InvalidInput(format!(
            "loan term of {term_months} months exceeds {MAX_TERM_MONTHS}"
        )));
    }
    Ok(())
}

/// Terms attached to a loan asset.
///
/// The rate is kept as the decimal string the user typed; older records also stored
/// the month counts as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetails {
    pub interest_rate: String,
    #[serde(alias = "duration", with = "month_count")]
    pub duration_months: u32,
    #[serde(default, alias = "gracePeriod", with = "month_count")]
    pub grace_period_months: u32,
    pub method: RepaymentMethod,
}

impl LoanDetails {
    pub fn new(interest_rate: impl Into<String>, duration_months: u32, method: RepaymentMethod) -> Self {
        Self {
            interest_rate: interest_rate.into(),
            duration_months,
            grace_period_months: 0,
            method,
        }
    }

    /// Annual rate in percent, e.g. `4.5` for `"4.5"` or `"4.5%"`.
    pub fn annual_rate(&self) -> Result<f64> {
        let raw = self.interest_rate.trim().trim_end_matches('%').trim();
        if raw.is_empty() {
            return Ok(0.0);
        }
        let rate: f64 = raw.parse().map_err(|_| {
            LedgerError::InvalidInput(format!("interest rate `{}` is not a number", self.interest_rate))
        })?;
        if !rate.is_finite() || rate < 0.0 {
            return Err(LedgerError::InvalidInput(format!(
                "interest rate `{}` must be a non-negative number",
                self.interest_rate
            )));
        }
        Ok(rate)
    }

    /// Checks the rate parses and the term is within [`MAX_TERM_MONTHS`].
    pub fn validate(&self) -> Result<()> {
        self.annual_rate()?;
        check_term(self.duration_months)?;
        check_term(self.grace_period_months)
    }

    pub fn monthly_payment(&self, principal: f64) -> Result<f64> {
        check_term(self.duration_months)?;
        Ok(amortization_payment(
            principal,
            self.annual_rate()?,
            self.duration_months,
            self.method,
        ))
    }

    pub fn schedule(&self, principal: f64) -> Result<Vec<AmortizationRow>> {
        amortization_schedule(
            principal,
            self.annual_rate()?,
            self.duration_months,
            self.method,
        )
    }
}

mod month_count {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    pub fn serialize<S>(value: &u32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(value),
            Raw::Text(text) if text.trim().is_empty() => Ok(0),
            Raw::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("`{text}` is not a month count"))),
        }
    }
}
