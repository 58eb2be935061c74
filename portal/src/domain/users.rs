//! User accounts managed from the administration screen.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{Email, EmailValidationError, Role};

/// Backend identifier of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserAccountId(String);

impl UserAccountId {
    /// Wrap a raw identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: UserAccountId,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

/// Validation failures for [`NewUserAccount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NewUserAccountError {
    #[error(transparent)]
    Email(#[from] EmailValidationError),
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Account an administrator asks the backend to create.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUserAccount {
    email: Email,
    password: Zeroizing<String>,
    role: Role,
}

impl NewUserAccount {
    /// Validate the administrator's input.
    pub fn try_new(email: &str, password: &str, role: Role) -> Result<Self, NewUserAccountError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(NewUserAccountError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
            role,
        })
    }

    /// Login email of the new account.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Initial password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Role assigned at creation.
    pub fn role(&self) -> Role {
        self.role
    }
}

impl fmt::Debug for NewUserAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUserAccount")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}
