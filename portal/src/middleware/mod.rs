//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every route, currently the
//! trace identifier.

pub mod trace;

pub use trace::Trace;
