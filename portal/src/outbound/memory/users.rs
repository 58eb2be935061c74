//! Administrator user management.

use async_trait::async_trait;

use super::{InMemoryBackend, business_error, require_role};
use crate::domain::ports::{GatewayError, UserDirectory};
use crate::domain::{BearerToken, NewUserAccount, Role, UserAccount, UserAccountId};

#[async_trait]
impl UserDirectory for InMemoryBackend {
    async fn list_users(&self, token: &BearerToken) -> Result<Vec<UserAccount>, GatewayError> {
        let state = self.lock();
        require_role(&state.caller(token)?, &[Role::Admin])?;
        Ok(state.accounts.iter().map(|account| account.view()).collect())
    }

    async fn create_user(
        &self,
        token: &BearerToken,
        account: &NewUserAccount,
    ) -> Result<UserAccount, GatewayError> {
        let mut state = self.lock();
        require_role(&state.caller(token)?, &[Role::Admin])?;
        if state.account_by_email(account.email().as_ref()).is_some() {
            return Err(business_error("User already exists"));
        }
        let created = state.add_account(account.email().clone(), account.password(), account.role());
        Ok(created.view())
    }

    async fn set_active(
        &self,
        token: &BearerToken,
        id: &UserAccountId,
        active: bool,
    ) -> Result<UserAccount, GatewayError> {
        let mut state = self.lock();
        require_role(&state.caller(token)?, &[Role::Admin])?;
        let account = state
            .accounts
            .iter_mut()
            .find(|account| &account.id == id)
            .ok_or_else(|| GatewayError::not_found(format!("user {id} not found")))?;
        account.active = active;
        Ok(account.view())
    }
}
