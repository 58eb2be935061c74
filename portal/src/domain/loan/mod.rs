//! Loan records as exchanged with the backend, plus the write payloads.
//!
//! Field names follow the backend's camelCase JSON. Timestamps are UTC
//! instants.

mod application;
mod status_machine;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use application::{ApplicationError, LoanApplication, Sanction, SanctionError};
pub use status_machine::{
    LoanAction, StatusChange, authorize_create, authorize_delete, authorize_edit,
    authorize_sanction, authorize_transition, available_actions, check_loan_for_action,
    check_reason, check_role,
};

/// Backend identifier of a loan (an opaque document id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoanId(String);

/// A loan id was empty after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("loan id must not be blank")]
pub struct BlankLoanIdError;

impl LoanId {
    /// Wrap a raw identifier, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, BlankLoanIdError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(BlankLoanIdError);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LoanId {
    type Err = BlankLoanIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LoanId {
    type Error = BlankLoanIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LoanId> for String {
    fn from(value: LoanId) -> Self {
        value.0
    }
}

/// The five lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    /// Editable by its owner.
    Draft,
    /// Waiting for an administrator to pick it up.
    Submitted,
    /// Being reviewed by an administrator.
    UnderReview,
    /// Terminal: approved.
    Approved,
    /// Terminal: rejected with a reason.
    Rejected,
}

impl LoanStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Submitted,
        Self::UnderReview,
        Self::Approved,
        Self::Rejected,
    ];

    /// Wire form used in backend paths and query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Approved and rejected loans freeze everything but administrative metadata.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown loan status: {0}")]
pub struct UnknownStatusError(pub String);

impl FromStr for LoanStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == trimmed)
            .ok_or_else(|| UnknownStatusError(trimmed.to_owned()))
    }
}

/// Product the applicant asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanType {
    /// Fixed-term loan.
    TermLoan,
    /// Working-capital facility.
    WorkingCapital,
    /// Overdraft line.
    Overdraft,
    /// Small and medium enterprise loan.
    SmeLoan,
}

/// Applicant financials captured with the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financials {
    /// Annual revenue.
    pub revenue: f64,
    /// Earnings before interest, taxes, depreciation and amortisation.
    pub ebitda: f64,
    /// Credit rating label.
    pub rating: String,
}

/// One entry of the backend's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Who acted.
    #[serde(default)]
    pub by: Option<String>,
    /// Action name as recorded by the backend.
    pub action: String,
    /// Free-text comment, e.g. a rejection reason.
    #[serde(default)]
    pub comments: Option<String>,
    /// When the action happened.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Loan record as last confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: LoanId,
    pub client_name: String,
    pub loan_type: LoanType,
    pub requested_amount: f64,
    pub proposed_interest_rate: f64,
    pub tenure_months: u32,
    #[serde(default)]
    pub financials: Financials,
    pub status: LoanStatus,
    #[serde(default)]
    pub sanctioned_amount: Option<f64>,
    #[serde(default)]
    pub approved_interest_rate: Option<f64>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub deleted_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actions: Vec<AuditEntry>,
}
