//! Pagination primitives shared by the loan portal listings.
//!
//! The backend collaborator returns Spring-style page envelopes. This crate
//! models that envelope ([`Page`]), the request that produced it
//! ([`PageRequest`]), and the client-side cursor that walks through pages
//! ([`Pager`]). The pager treats the last observed `totalPages` as the upper
//! bound, so moving past either edge is a no-op rather than an error.

mod page;
mod pager;
mod request;

pub use page::Page;
pub use pager::Pager;
pub use request::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest, PageRequestError};
