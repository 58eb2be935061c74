//! Wire shapes that exist only at the backend boundary.
//!
//! Loans, pages and user accounts decode straight into domain types; the
//! DTOs here cover request bodies and the responses that need translating.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{BearerToken, Email, Identity, Role};

#[derive(Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Deserialize)]
pub(super) struct LoginResponseDto {
    token: String,
}

impl LoginResponseDto {
    pub(super) fn into_token(self) -> Result<BearerToken, String> {
        BearerToken::new(self.token).map_err(|error| error.to_string())
    }
}

/// `GET /users/me`: the backend's user document. Password hashes and other
/// fields are ignored.
#[derive(Deserialize)]
pub(super) struct MeResponseDto {
    #[serde(default)]
    id: Option<String>,
    email: String,
    role: String,
}

impl MeResponseDto {
    pub(super) fn into_identity(self) -> Result<Identity, String> {
        let email = Email::new(&self.email).map_err(|error| format!("email: {error}"))?;
        let role = self
            .role
            .parse::<Role>()
            .map_err(|error| format!("role: {error}"))?;
        Ok(Identity {
            id: self.id.filter(|id| !id.trim().is_empty()),
            email,
            role,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RejectRequestDto<'a> {
    pub(super) rejection_reason: &'a str,
}

#[derive(Serialize)]
pub(super) struct EmptyBodyDto {}

#[derive(Serialize)]
pub(super) struct NewUserRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) role: Role,
}

#[derive(Serialize)]
pub(super) struct ActiveRequestDto {
    pub(super) active: bool,
}

/// Error envelope of the backend. `message` is either a string or a map of
/// field names to validation messages.
#[derive(Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBodyDto {
    pub(super) fn describe(self) -> Option<String> {
        let from_message = match self.message {
            Some(Value::String(text)) => Some(text),
            Some(Value::Object(fields)) => {
                let joined = fields
                    .iter()
                    .map(|(field, reason)| match reason {
                        Value::String(text) => format!("{field}: {text}"),
                        other => format!("{field}: {other}"),
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                Some(joined)
            }
            _ => None,
        };
        from_message
            .or(self.error)
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
    }
}
