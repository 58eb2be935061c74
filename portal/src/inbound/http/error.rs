//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while turning failures
//! into the portal's navigation outcomes. Authentication, authorisation and
//! missing-record failures become `303 See Other` redirects; policy
//! violations and backend refusals become JSON error bodies. Every response
//! carries the `Trace-Id` header when the error captured one.

use actix_web::http::header::{self, HeaderName};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, PortalRoute, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

/// Listing location used when a referenced loan no longer exists.
pub const LOAN_NOT_FOUND_LOCATION: &str = "/dashboard/loans?notice=loan-not-found";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized | ErrorCode::Forbidden | ErrorCode::NotFound => {
            StatusCode::SEE_OTHER
        }
        ErrorCode::ActionForbidden => StatusCode::FORBIDDEN,
        ErrorCode::InvalidTransition | ErrorCode::EditNotAllowed | ErrorCode::ActionInFlight => {
            StatusCode::CONFLICT
        }
        ErrorCode::MissingReason => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::BackendRejection => StatusCode::BAD_GATEWAY,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Redirect target for codes that navigate instead of reporting.
pub fn redirect_for(code: ErrorCode) -> Option<&'static str> {
    match code {
        ErrorCode::Unauthorized => Some(PortalRoute::Login.path()),
        ErrorCode::Forbidden => Some(PortalRoute::Dashboard.path()),
        ErrorCode::NotFound => Some(LOAN_NOT_FOUND_LOCATION),
        _ => None,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((HeaderName::from_static(TRACE_ID_HEADER), id.to_owned()));
        }
        if let Some(location) = redirect_for(self.code()) {
            builder.insert_header((header::LOCATION, location));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}
