//! Session context: who is logged in, with which role and credential.
//!
//! A [`Session`] is an immutable value. Login builds one with
//! [`Session::init`]; logout drops it. The only other change is a confirmed
//! re-probe, which yields a new value with a fresher `probed_at`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::BearerToken;

/// Role carried by an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Loan applicant.
    User,
    /// Reviewer with administrative rights.
    Admin,
}

impl Role {
    /// Wire form used by the backend and the session cookie.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRoleError(pub String);

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            other => Err(UnknownRoleError(other.to_owned())),
        }
    }
}

/// Validation failures for [`Email`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EmailValidationError {
    /// Blank once trimmed.
    #[error("email must not be empty")]
    Empty,
    /// Not of the form `local@domain`.
    #[error("email must contain a single '@' between non-empty parts")]
    Malformed,
}

/// Trimmed email address with a single `@` between non-empty parts.
///
/// # Examples
/// ```
/// use portal::domain::Email;
///
/// let email = Email::new(" User@LoanApp.com ").unwrap();
/// assert_eq!(email.as_ref(), "User@LoanApp.com");
/// assert!(Email::new("no-at-sign").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and wrap an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EmailValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmailValidationError::Empty);
        }
        let mut parts = trimmed.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(trimmed.to_owned()))
            }
            _ => Err(EmailValidationError::Malformed),
        }
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Result of the identity probe (`GET /users/me`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Backend user id, when the backend reports one.
    pub id: Option<String>,
    /// Login email.
    pub email: Email,
    /// Authoritative role.
    pub role: Role,
}

impl Identity {
    /// Whether a loan's `createdBy` value names this identity.
    ///
    /// The backend records either the user id or the login email.
    pub fn owns(&self, created_by: &str) -> bool {
        self.id.as_deref() == Some(created_by) || self.email.as_ref() == created_by
    }
}

/// Authenticated session: identity plus credential.
///
/// ## Invariants
/// - The role never changes for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Identity,
    token: BearerToken,
    probed_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from a credential and a successful identity probe.
    pub fn init(token: BearerToken, identity: Identity, probed_at: DateTime<Utc>) -> Self {
        Self {
            identity,
            token,
            probed_at,
        }
    }

    /// Identity confirmed by the last probe.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Role of the logged-in user.
    pub fn role(&self) -> Role {
        self.identity.role
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.identity.email
    }

    /// Bearer credential used for every backend call.
    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    /// When the identity was last confirmed by the backend.
    pub fn probed_at(&self) -> DateTime<Utc> {
        self.probed_at
    }

    /// Whether the cached identity is still younger than `ttl` at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.probed_at) < ttl
    }

    /// Accept a re-probe result.
    ///
    /// Returns `None` when the probe reports a different user or role, which
    /// ends the session.
    pub fn reconfirm(&self, probed: Identity, now: DateTime<Utc>) -> Option<Self> {
        if probed.role != self.identity.role || probed.email != self.identity.email {
            return None;
        }
        Some(Self {
            identity: probed,
            token: self.token.clone(),
            probed_at: now,
        })
    }
}
