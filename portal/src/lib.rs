//! Loan portal: backend-for-frontend of the loan-origination system.
//!
//! The portal keeps the user's session in an encrypted cookie, admits or
//! redirects every route entry, and brokers loan and user operations to the
//! backend over REST.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
