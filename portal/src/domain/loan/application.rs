//! Write payloads: the application form and the sanction form.

use serde::{Deserialize, Serialize};

use super::{Financials, Loan, LoanType};
use crate::domain::calculator::{EmiBreakdown, emi_preview};

/// Smallest proposed interest rate the backend accepts, in percent.
pub const MIN_PROPOSED_RATE: f64 = 0.1;

/// Shortest tenure the backend accepts, in months.
pub const MIN_TENURE_MONTHS: u32 = 6;

/// First invalid field found in a [`LoanApplication`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApplicationError {
    #[error("client name must not be empty")]
    BlankClientName,
    #[error("requested amount must be greater than zero")]
    NonPositiveAmount,
    #[error("proposed interest rate must be at least 0.1%")]
    RateTooLow,
    #[error("tenure must be at least 6 months")]
    TenureTooShort,
    #[error("revenue must be greater than zero")]
    NonPositiveRevenue,
    #[error("EBITDA must be greater than zero")]
    NonPositiveEbitda,
    #[error("rating must not be empty")]
    BlankRating,
}

impl ApplicationError {
    /// JSON path of the offending field.
    pub fn field(self) -> &'static str {
        match self {
            Self::BlankClientName => "clientName",
            Self::NonPositiveAmount => "requestedAmount",
            Self::RateTooLow => "proposedInterestRate",
            Self::TenureTooShort => "tenureMonths",
            Self::NonPositiveRevenue => "financials.revenue",
            Self::NonPositiveEbitda => "financials.ebitda",
            Self::BlankRating => "financials.rating",
        }
    }
}

/// Fields a USER supplies when creating a loan or editing a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub client_name: String,
    pub loan_type: LoanType,
    pub requested_amount: f64,
    pub proposed_interest_rate: f64,
    pub tenure_months: u32,
    pub financials: Financials,
}

impl LoanApplication {
    /// Check the form against the backend's acceptance rules.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.client_name.trim().is_empty() {
            return Err(ApplicationError::BlankClientName);
        }
        if !(self.requested_amount.is_finite() && self.requested_amount > 0.0) {
            return Err(ApplicationError::NonPositiveAmount);
        }
        if !(self.proposed_interest_rate.is_finite()
            && self.proposed_interest_rate >= MIN_PROPOSED_RATE)
        {
            return Err(ApplicationError::RateTooLow);
        }
        if self.tenure_months < MIN_TENURE_MONTHS {
            return Err(ApplicationError::TenureTooShort);
        }
        if !(self.financials.revenue.is_finite() && self.financials.revenue > 0.0) {
            return Err(ApplicationError::NonPositiveRevenue);
        }
        if !(self.financials.ebitda.is_finite() && self.financials.ebitda > 0.0) {
            return Err(ApplicationError::NonPositiveEbitda);
        }
        if self.financials.rating.trim().is_empty() {
            return Err(ApplicationError::BlankRating);
        }
        Ok(())
    }

    /// EMI preview for the proposed terms.
    pub fn emi(&self) -> Option<EmiBreakdown> {
        emi_preview(
            Some(self.requested_amount),
            Some(self.tenure_months),
            Some(self.proposed_interest_rate),
        )
    }
}

impl From<&Loan> for LoanApplication {
    fn from(loan: &Loan) -> Self {
        Self {
            client_name: loan.client_name.clone(),
            loan_type: loan.loan_type,
            requested_amount: loan.requested_amount,
            proposed_interest_rate: loan.proposed_interest_rate,
            tenure_months: loan.tenure_months,
            financials: loan.financials.clone(),
        }
    }
}

/// Invalid sanction values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SanctionError {
    #[error("sanctioned amount must be greater than zero")]
    NonPositiveAmount,
    #[error("approved interest rate must be greater than zero")]
    NonPositiveRate,
}

/// Administrative terms recorded on a loan under review.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sanction {
    pub sanctioned_amount: f64,
    pub approved_interest_rate: f64,
}

impl Sanction {
    /// Both values must be positive.
    pub fn validate(&self) -> Result<(), SanctionError> {
        if !(self.sanctioned_amount.is_finite() && self.sanctioned_amount > 0.0) {
            return Err(SanctionError::NonPositiveAmount);
        }
        if !(self.approved_interest_rate.is_finite() && self.approved_interest_rate > 0.0) {
            return Err(SanctionError::NonPositiveRate);
        }
        Ok(())
    }
}
