//! Shared transport for the backend REST adapter.
//!
//! Owns URL building, bearer and trace headers, status mapping and JSON
//! decoding. The port implementations in the sibling modules only choose
//! paths and payloads.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::ErrorBodyDto;
use crate::domain::ports::GatewayError;
use crate::domain::{BearerToken, TRACE_ID_HEADER, TraceId};

/// Reqwest client bound to one backend base URL (e.g. `http://host/api`).
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base: Url,
}

impl BackendClient {
    /// Build a client with an explicit per-request timeout.
    ///
    /// ```rust,ignore
    /// let client = BackendClient::new(Url::parse("http://localhost:8080/api")?, timeout)?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// Base URL every path is appended to.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    pub(super) fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                GatewayError::transport(format!("backend base URL {} cannot take a path", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request carrying the JSON accept header, the caller's trace
    /// identifier and, when given, the bearer credential.
    pub(super) fn request(
        &self,
        method: Method,
        url: Url,
        token: Option<&BearerToken>,
    ) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(trace_id) = TraceId::current() {
            request = request.header(TRACE_ID_HEADER, trace_id.to_string());
        }
        if let Some(token) = token {
            request = request.header(reqwest::header::AUTHORIZATION, token.authorization());
        }
        request
    }

    /// Send and decode a JSON body, mapping failures onto [`GatewayError`].
    pub(super) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref()).map_err(|error| {
            debug!(%error, body = %body_preview(body.as_ref()), "undecodable backend payload");
            GatewayError::decode(error.to_string())
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_decode() {
        GatewayError::decode(error.to_string())
    } else {
        GatewayError::transport(error.to_string())
    }
}

/// Turn a non-success response into the port taxonomy, keeping the
/// backend's own message when its error body carries one.
fn map_status_error(status: StatusCode, body: &[u8]) -> GatewayError {
    let message = serde_json::from_slice::<ErrorBodyDto>(body)
        .ok()
        .and_then(ErrorBodyDto::describe)
        .unwrap_or_else(|| {
            let preview = body_preview(body);
            if preview.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                preview
            }
        });

    match status {
        StatusCode::UNAUTHORIZED => GatewayError::unauthorized(message),
        StatusCode::FORBIDDEN => GatewayError::forbidden(message),
        StatusCode::NOT_FOUND => GatewayError::not_found(message),
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            GatewayError::transport(message)
        }
        _ => GatewayError::rejected(status.as_u16(), message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
