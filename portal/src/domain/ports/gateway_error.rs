//! Failure taxonomy shared by every backend-facing port.

use tracing::warn;

use super::define_port_error;
use crate::domain::Error;

define_port_error! {
    /// Errors raised when talking to the backend collaborator.
    pub enum GatewayError {
        /// The credential is missing, invalid, or expired (HTTP 401).
        Unauthorized { message: String } =>
            "backend rejected the credential: {message}",
        /// The backend refused the action for this user (HTTP 403).
        Forbidden { message: String } =>
            "backend refused the action: {message}",
        /// The referenced record does not exist (HTTP 404).
        NotFound { message: String } =>
            "backend record not found: {message}",
        /// Any other refusal from a reachable backend.
        Rejected { status: u16, message: String } =>
            "backend rejected the request ({status}): {message}",
        /// The backend could not be reached or timed out.
        Transport { message: String } =>
            "backend unreachable: {message}",
        /// The backend answered with a payload the portal cannot read.
        Decode { message: String } =>
            "backend response could not be decoded: {message}",
    }
}

impl From<GatewayError> for Error {
    fn from(value: GatewayError) -> Self {
        match value {
            GatewayError::Unauthorized { message } => {
                Error::unauthorized(format!("session expired: {message}"))
            }
            GatewayError::Forbidden { message } | GatewayError::Rejected { message, .. } => {
                Error::backend_rejection(message)
            }
            GatewayError::NotFound { message } => Error::not_found(message),
            GatewayError::Transport { message } => {
                warn!(%message, "backend unreachable");
                Error::service_unavailable("the loan service is unavailable")
            }
            GatewayError::Decode { message } => {
                Error::internal(format!("unreadable backend response: {message}"))
            }
        }
    }
}
