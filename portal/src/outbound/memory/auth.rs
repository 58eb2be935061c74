//! Login and identity probe.

use async_trait::async_trait;
use uuid::Uuid;

use super::{InMemoryBackend, business_error};
use crate::domain::ports::{AuthGateway, GatewayError};
use crate::domain::{BearerToken, Identity, LoginCredentials};

#[async_trait]
impl AuthGateway for InMemoryBackend {
    async fn login(&self, credentials: &LoginCredentials) -> Result<BearerToken, GatewayError> {
        let mut state = self.lock();
        let account = state
            .account_by_email(credentials.email())
            .filter(|account| account.password == credentials.password())
            .cloned()
            .ok_or_else(|| business_error("Invalid credentials"))?;
        if !account.active {
            return Err(business_error("User account is inactive"));
        }
        let raw = format!("mem-{}", Uuid::new_v4());
        state.tokens.insert(raw.clone(), account.id);
        BearerToken::new(raw).map_err(|error| GatewayError::decode(error.to_string()))
    }

    async fn me(&self, token: &BearerToken) -> Result<Identity, GatewayError> {
        let caller = self.lock().caller(token)?;
        Ok(Identity {
            id: Some(caller.id.as_str().to_owned()),
            email: caller.email,
            role: caller.role,
        })
    }
}
