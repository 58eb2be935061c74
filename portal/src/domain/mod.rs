//! Domain primitives, policies and services of the loan portal.
//!
//! Purpose: hold everything that decides what a user may see or do, without
//! any knowledge of HTTP or of how the backend is reached. Inbound adapters
//! call the services; outbound adapters implement the [`ports`].
//!
//! Public surface:
//! - Session context: [`Session`], [`Identity`], [`Role`], [`BearerToken`].
//! - Financial calculator: [`compute_emi`], [`emi_preview`].
//! - Loan status machine: [`authorize_transition`], [`available_actions`],
//!   [`LoanDesk`].
//! - Access guard layer: [`AccessGuard`], [`role_satisfies`].
//! - Loan listing policy: [`LoanListing`], [`ListingState`].
//! - Error (alias to `error::Error`) and stable [`ErrorCode`]s.

pub mod access;
pub mod auth;
pub mod calculator;
pub mod error;
pub mod listing;
pub mod loan;
pub mod loan_desk;
pub mod login;
pub mod ports;
pub mod session;
pub mod trace_id;
pub mod user_admin;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::access::{
    AccessGuard, GuardDecision, GuardOutcome, PortalRoute, ProbeOutcome, SessionUpdate,
    authentication_gate, role_gate, role_satisfies,
};
pub use self::auth::{BearerToken, EmptyTokenError, LoginCredentials, LoginValidationError};
pub use self::calculator::{EmiBreakdown, LoanTerms, TermsError, compute_emi, emi_preview};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::listing::{DashboardStats, ListingState, LoanListing, STATS_PAGE_SIZE, visible_page};
pub use self::loan::{
    ApplicationError, AuditEntry, Financials, Loan, LoanAction, LoanApplication, LoanId,
    LoanStatus, LoanType, Sanction, SanctionError, StatusChange, UnknownStatusError,
    authorize_create, authorize_delete, authorize_edit, authorize_sanction,
    authorize_transition, available_actions,
};
pub use self::loan_desk::LoanDesk;
pub use self::login::LoginService;
pub use self::session::{Email, EmailValidationError, Identity, Role, Session, UnknownRoleError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user_admin::UserAdministration;
pub use self::users::{NewUserAccount, NewUserAccountError, UserAccount, UserAccountId};

/// Convenient result alias for domain services and handlers.
pub type ApiResult<T> = Result<T, Error>;
