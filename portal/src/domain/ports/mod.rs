//! Domain ports for the hexagonal boundary.
//!
//! All three ports face the backend collaborator. Outbound adapters implement
//! them over REST or in memory; services depend only on the traits.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_gateway;
mod gateway_error;
mod loan_gateway;
mod user_directory;

#[cfg(test)]
pub use auth_gateway::MockAuthGateway;
pub use auth_gateway::AuthGateway;
pub use gateway_error::GatewayError;
#[cfg(test)]
pub use loan_gateway::MockLoanGateway;
pub use loan_gateway::LoanGateway;
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::UserDirectory;
