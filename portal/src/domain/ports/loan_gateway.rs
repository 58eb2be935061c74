//! Driven port for the backend's loan endpoints.
//!
//! Every call carries the session's bearer token. The backend re-validates
//! each request and may refuse what the local status machine allowed.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use super::GatewayError;
use crate::domain::{
    BearerToken, Loan, LoanApplication, LoanId, LoanStatus, Sanction, StatusChange,
};

/// Backend loan endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanGateway: Send + Sync {
    /// One page of loans, optionally restricted to a status.
    async fn list(
        &self,
        token: &BearerToken,
        request: PageRequest,
        status: Option<LoanStatus>,
    ) -> Result<Page<Loan>, GatewayError>;

    /// A single loan by id.
    async fn get(&self, token: &BearerToken, id: &LoanId) -> Result<Loan, GatewayError>;

    /// Create a DRAFT loan owned by the caller.
    async fn create(
        &self,
        token: &BearerToken,
        application: &LoanApplication,
    ) -> Result<Loan, GatewayError>;

    /// Replace the editable fields of a DRAFT loan.
    async fn update(
        &self,
        token: &BearerToken,
        id: &LoanId,
        application: &LoanApplication,
    ) -> Result<Loan, GatewayError>;

    /// Soft-delete a loan.
    async fn delete(&self, token: &BearerToken, id: &LoanId) -> Result<Loan, GatewayError>;

    /// Apply a status transition.
    async fn apply(
        &self,
        token: &BearerToken,
        id: &LoanId,
        change: &StatusChange,
    ) -> Result<Loan, GatewayError>;

    /// Record sanctioned amount and rate on a loan under review.
    async fn sanction(
        &self,
        token: &BearerToken,
        id: &LoanId,
        sanction: &Sanction,
    ) -> Result<Loan, GatewayError>;
}
