//! Outbound adapters implementing the domain ports.
//!
//! - **backend**: reqwest client for the loan backend's REST API
//! - **memory**: in-process backend honouring the same rules, for tests and
//!   demo mode
//!
//! Adapters translate between wire formats and domain types. They hold no
//! portal policy; the backend remains the authority on every rule.

pub mod backend;
pub mod memory;
