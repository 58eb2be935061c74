//! `LoanGateway` over the `/loans` endpoints.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use reqwest::Method;

use super::BackendClient;
use super::dto::{EmptyBodyDto, RejectRequestDto};
use crate::domain::ports::{GatewayError, LoanGateway};
use crate::domain::{
    BearerToken, Loan, LoanApplication, LoanId, LoanStatus, Sanction, StatusChange,
};

#[async_trait]
impl LoanGateway for BackendClient {
    async fn list(
        &self,
        token: &BearerToken,
        request: PageRequest,
        status: Option<LoanStatus>,
    ) -> Result<Page<Loan>, GatewayError> {
        let mut url = match status {
            Some(status) => self.endpoint(&["loans", "status", status.as_str()])?,
            None => self.endpoint(&["loans", "paginated"])?,
        };
        request.apply_to(&mut url);
        self.send(self.request(Method::GET, url, Some(token))).await
    }

    async fn get(&self, token: &BearerToken, id: &LoanId) -> Result<Loan, GatewayError> {
        let url = self.endpoint(&["loans", id.as_str()])?;
        self.send(self.request(Method::GET, url, Some(token))).await
    }

    async fn create(
        &self,
        token: &BearerToken,
        application: &LoanApplication,
    ) -> Result<Loan, GatewayError> {
        let url = self.endpoint(&["loans"])?;
        self.send(self.request(Method::POST, url, Some(token)).json(application))
            .await
    }

    async fn update(
        &self,
        token: &BearerToken,
        id: &LoanId,
        application: &LoanApplication,
    ) -> Result<Loan, GatewayError> {
        let url = self.endpoint(&["loans", id.as_str()])?;
        self.send(self.request(Method::PUT, url, Some(token)).json(application))
            .await
    }

    async fn delete(&self, token: &BearerToken, id: &LoanId) -> Result<Loan, GatewayError> {
        let url = self.endpoint(&["loans", id.as_str()])?;
        self.send(self.request(Method::DELETE, url, Some(token)))
            .await
    }

    async fn apply(
        &self,
        token: &BearerToken,
        id: &LoanId,
        change: &StatusChange,
    ) -> Result<Loan, GatewayError> {
        let url = self.endpoint(&["loans", id.as_str(), change.action().path_segment()])?;
        let request = self.request(Method::PATCH, url, Some(token));
        let request = match change {
            StatusChange::Reject { reason } => request.json(&RejectRequestDto {
                rejection_reason: reason,
            }),
            StatusChange::Submit | StatusChange::MarkUnderReview | StatusChange::Approve => {
                request.json(&EmptyBodyDto {})
            }
        };
        self.send(request).await
    }

    async fn sanction(
        &self,
        token: &BearerToken,
        id: &LoanId,
        sanction: &Sanction,
    ) -> Result<Loan, GatewayError> {
        let url = self.endpoint(&["loans", id.as_str(), "sanction"])?;
        self.send(self.request(Method::PUT, url, Some(token)).json(sanction))
            .await
    }
}
