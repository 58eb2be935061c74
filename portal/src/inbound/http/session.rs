//! Cookie-backed storage of the portal session.
//!
//! Wraps the Actix session so handlers only deal with domain values: the
//! [`Session`] itself and the per-route [`ListingState`]. The cookie holds
//! the bearer token, email, role, optional backend user id and the time of
//! the last identity probe. A cookie carrying only some of these values, or
//! values that no longer parse, is treated as no session at all.

use actix_session::Session as CookieSession;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::{
    BearerToken, Email, Error, ErrorCode, Identity, ListingState, Role, Session,
};

pub(crate) const TOKEN_KEY: &str = "token";
pub(crate) const EMAIL_KEY: &str = "email";
pub(crate) const ROLE_KEY: &str = "role";
pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const PROBED_AT_KEY: &str = "probed_at";

/// Listing routes whose filter and cursor survive between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingRoute {
    /// `/dashboard/loans`.
    Loans,
    /// `/dashboard/review-loans`.
    ReviewLoans,
}

impl ListingRoute {
    /// Every listing route.
    pub const ALL: [Self; 2] = [Self::Loans, Self::ReviewLoans];

    fn key(self) -> &'static str {
        match self {
            Self::Loans => "listing.loans",
            Self::ReviewLoans => "listing.review-loans",
        }
    }
}

/// Newtype wrapper that exposes portal-level session operations.
#[derive(Clone)]
pub struct SessionContext(CookieSession);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: CookieSession) -> Self {
        Self(session)
    }

    /// Store every value of `session`, replacing what was there.
    pub fn persist(&self, session: &Session) -> Result<(), Error> {
        let identity = session.identity();
        self.insert(TOKEN_KEY, session.token().expose())?;
        self.insert(EMAIL_KEY, identity.email.as_ref())?;
        self.insert(ROLE_KEY, identity.role.as_str())?;
        match identity.id.as_deref() {
            Some(id) => self.insert(USER_ID_KEY, id)?,
            None => {
                self.0.remove(USER_ID_KEY);
            }
        }
        self.insert(PROBED_AT_KEY, session.probed_at())
    }

    /// Session stored in the cookie, if it is complete and well formed.
    pub fn load(&self) -> Option<Session> {
        let token = self.read::<String>(TOKEN_KEY);
        let email = self.read::<String>(EMAIL_KEY);
        let role = self.read::<String>(ROLE_KEY);
        let probed_at = self.read::<DateTime<Utc>>(PROBED_AT_KEY);
        let user_id = self.read::<String>(USER_ID_KEY);

        match (token, email, role, probed_at) {
            (Read::Missing, Read::Missing, Read::Missing, Read::Missing) => None,
            (Read::Present(token), Read::Present(email), Read::Present(role), Read::Present(at)) => {
                let restored = restore(token, &email, &role, user_id.present(), at);
                if restored.is_none() {
                    warn!("session cookie holds unparseable values; ignoring it");
                }
                restored
            }
            _ => {
                warn!("session cookie is incomplete; ignoring it");
                None
            }
        }
    }

    /// Drop every stored value at once.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// End the session when `result` is an authentication failure.
    ///
    /// Any backend call made with the session's token goes through here, so
    /// an expired credential both clears the cookie and redirects to login.
    pub fn settle<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
        if let Err(error) = &result {
            if error.code() == ErrorCode::Unauthorized {
                self.purge();
            }
        }
        result
    }

    /// Stored state of `route`, or a fresh one with `page_size` rows.
    pub fn listing_state(&self, route: ListingRoute, page_size: u32) -> Result<ListingState, Error> {
        match self.read::<ListingState>(route.key()) {
            Read::Present(state) => Ok(state),
            Read::Missing | Read::Malformed => ListingState::new(page_size)
                .map_err(|err| Error::internal(format!("invalid listing page size: {err}"))),
        }
    }

    /// Remember the state of `route`.
    pub fn store_listing(&self, route: ListingRoute, state: &ListingState) -> Result<(), Error> {
        self.insert(route.key(), state)
    }

    /// A mutation succeeded: every stored listing returns to page 0 and
    /// keeps its filter.
    pub fn reset_listings(&self) -> Result<(), Error> {
        for route in ListingRoute::ALL {
            if let Read::Present(mut state) = self.read::<ListingState>(route.key()) {
                state.after_mutation();
                self.store_listing(route, &state)?;
            }
        }
        Ok(())
    }

    /// Issue a fresh session identifier, e.g. right after login.
    pub fn renew(&self) {
        self.0.renew();
    }

    fn insert(&self, key: &str, value: impl Serialize) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Read<T> {
        match self.0.get::<T>(key) {
            Ok(Some(value)) => Read::Present(value),
            Ok(None) => Read::Missing,
            Err(error) => {
                warn!(key, %error, "unreadable session value");
                Read::Malformed
            }
        }
    }
}

enum Read<T> {
    Present(T),
    Missing,
    Malformed,
}

impl<T> Read<T> {
    fn present(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Missing | Self::Malformed => None,
        }
    }
}

fn restore(
    token: String,
    email: &str,
    role: &str,
    user_id: Option<String>,
    probed_at: DateTime<Utc>,
) -> Option<Session> {
    let token = BearerToken::new(token).ok()?;
    let email = Email::new(email).ok()?;
    let role = role.parse::<Role>().ok()?;
    let identity = Identity {
        id: user_id,
        email,
        role,
    };
    Some(Session::init(token, identity, probed_at))
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = CookieSession::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
