//! Driven port for the backend's user administration endpoints.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::{BearerToken, NewUserAccount, UserAccount, UserAccountId};

/// Backend `/admin/users` endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// All accounts.
    async fn list_users(&self, token: &BearerToken) -> Result<Vec<UserAccount>, GatewayError>;

    /// Create an account.
    async fn create_user(
        &self,
        token: &BearerToken,
        account: &NewUserAccount,
    ) -> Result<UserAccount, GatewayError>;

    /// Activate or deactivate an account.
    async fn set_active(
        &self,
        token: &BearerToken,
        id: &UserAccountId,
        active: bool,
    ) -> Result<UserAccount, GatewayError>;
}
