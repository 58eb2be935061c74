//! `AuthGateway` over `/auth/login` and `/users/me`.

use async_trait::async_trait;
use reqwest::Method;

use super::BackendClient;
use super::dto::{LoginRequestDto, LoginResponseDto, MeResponseDto};
use crate::domain::ports::{AuthGateway, GatewayError};
use crate::domain::{BearerToken, Identity, LoginCredentials};

#[async_trait]
impl AuthGateway for BackendClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<BearerToken, GatewayError> {
        let url = self.endpoint(&["auth", "login"])?;
        let request = self.request(Method::POST, url, None).json(&LoginRequestDto {
            email: credentials.email(),
            password: credentials.password(),
        });
        let response: LoginResponseDto = self.send(request).await?;
        response.into_token().map_err(GatewayError::decode)
    }

    async fn me(&self, token: &BearerToken) -> Result<Identity, GatewayError> {
        let url = self.endpoint(&["users", "me"])?;
        let response: MeResponseDto = self
            .send(self.request(Method::GET, url, Some(token)))
            .await?;
        response.into_identity().map_err(GatewayError::decode)
    }
}
