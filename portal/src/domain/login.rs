//! Login: credentials in, session out.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::{AuthGateway, GatewayError};
use super::{Error, LoginCredentials, Session};

/// Builds sessions from credentials via the backend.
#[derive(Clone)]
pub struct LoginService {
    auth: Arc<dyn AuthGateway>,
    clock: Arc<dyn Clock>,
}

impl LoginService {
    /// Service over the given gateway and clock.
    pub fn new(auth: Arc<dyn AuthGateway>, clock: Arc<dyn Clock>) -> Self {
        Self { auth, clock }
    }

    /// Exchange credentials for a token, probe the identity, and build the
    /// session. Nothing is returned unless both calls succeed.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Session, Error> {
        let token = self
            .auth
            .login(credentials)
            .await
            .map_err(refused_login)?;
        let identity = self.auth.me(&token).await.map_err(refused_login)?;
        info!(email = %identity.email, role = %identity.role, "session established");
        Ok(Session::init(token, identity, self.clock.utc()))
    }
}

fn refused_login(error: GatewayError) -> Error {
    match error {
        GatewayError::Unauthorized { .. }
        | GatewayError::Forbidden { .. }
        | GatewayError::NotFound { .. }
        | GatewayError::Rejected { .. } => Error::unauthorized("invalid email or password"),
        other => Error::from(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockAuthGateway;
    use crate::domain::test_support::{FixtureClock, identity};
    use crate::domain::{BearerToken, ErrorCode, Role};
    use rstest::rstest;

    fn credentials() -> LoginCredentials {
        LoginCredentials::try_from_parts("user@loanapp.com", "user123").expect("credentials")
    }

    fn service(auth: MockAuthGateway) -> LoginService {
        LoginService::new(Arc::new(auth), Arc::new(FixtureClock::at_epoch()))
    }

    #[rstest]
    #[tokio::test]
    async fn login_probes_identity_with_new_token() {
        let mut auth = MockAuthGateway::new();
        auth.expect_login()
            .returning(|_| Ok(BearerToken::new("issued").expect("token")));
        auth.expect_me()
            .withf(|token| token.expose() == "issued")
            .returning(|_| Ok(identity(Role::User)));

        let session = service(auth).login(&credentials()).await.expect("login");

        assert_eq!(session.role(), Role::User);
        assert_eq!(session.token().expose(), "issued");
        assert_eq!(session.probed_at(), FixtureClock::epoch());
    }

    #[rstest]
    #[case(GatewayError::unauthorized("bad credentials"), ErrorCode::Unauthorized)]
    #[case(GatewayError::rejected(400_u16, "bad credentials"), ErrorCode::Unauthorized)]
    #[case(GatewayError::transport("connection refused"), ErrorCode::ServiceUnavailable)]
    #[tokio::test]
    async fn failed_login_leaves_no_session(
        #[case] failure: GatewayError,
        #[case] expected: ErrorCode,
    ) {
        let mut auth = MockAuthGateway::new();
        auth.expect_login().return_once(move |_| Err(failure));
        auth.expect_me().never();

        let error = service(auth)
            .login(&credentials())
            .await
            .expect_err("login fails");

        assert_eq!(error.code(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_probe_fails_login() {
        let mut auth = MockAuthGateway::new();
        auth.expect_login()
            .returning(|_| Ok(BearerToken::new("issued").expect("token")));
        auth.expect_me()
            .returning(|_| Err(GatewayError::unauthorized("inactive user")));

        let result = service(auth).login(&credentials()).await;

        assert_eq!(result.map_err(|err| err.code()).err(), Some(ErrorCode::Unauthorized));
    }
}
