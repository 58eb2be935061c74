//! Driven port for login and the identity probe.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::{BearerToken, Identity, LoginCredentials};

/// Backend authentication endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a bearer token (`POST /auth/login`).
    async fn login(&self, credentials: &LoginCredentials) -> Result<BearerToken, GatewayError>;

    /// Ask who the token belongs to (`GET /users/me`).
    async fn me(&self, token: &BearerToken) -> Result<Identity, GatewayError>;
}
