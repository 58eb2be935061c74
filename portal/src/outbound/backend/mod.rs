//! REST adapter for the loan backend.
//!
//! One [`BackendClient`] implements every backend-facing port. Requests carry
//! the session's bearer token and the current trace identifier; responses are
//! decoded into domain types and failures into `GatewayError`.

mod auth;
mod client;
mod dto;
mod loans;
mod users;

pub use client::BackendClient;
