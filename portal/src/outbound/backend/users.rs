//! `UserDirectory` over `/admin/users`.

use async_trait::async_trait;
use reqwest::Method;

use super::BackendClient;
use super::dto::{ActiveRequestDto, NewUserRequestDto};
use crate::domain::ports::{GatewayError, UserDirectory};
use crate::domain::{BearerToken, NewUserAccount, UserAccount, UserAccountId};

#[async_trait]
impl UserDirectory for BackendClient {
    async fn list_users(&self, token: &BearerToken) -> Result<Vec<UserAccount>, GatewayError> {
        let url = self.endpoint(&["admin", "users"])?;
        self.send(self.request(Method::GET, url, Some(token))).await
    }

    async fn create_user(
        &self,
        token: &BearerToken,
        account: &NewUserAccount,
    ) -> Result<UserAccount, GatewayError> {
        let url = self.endpoint(&["admin", "users"])?;
        let body = NewUserRequestDto {
            email: account.email().as_ref(),
            password: account.password(),
            role: account.role(),
        };
        self.send(self.request(Method::POST, url, Some(token)).json(&body))
            .await
    }

    async fn set_active(
        &self,
        token: &BearerToken,
        id: &UserAccountId,
        active: bool,
    ) -> Result<UserAccount, GatewayError> {
        let url = self.endpoint(&["admin", "users", id.as_str(), "status"])?;
        self.send(
            self.request(Method::PUT, url, Some(token))
                .json(&ActiveRequestDto { active }),
        )
        .await
    }
}
