//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the JSON shape of their domain counterparts but
//! live in the inbound adapter layer where framework concerns belong.

#![expect(
    dead_code,
    reason = "Schema mirrors are only read by utoipa's derive output"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No session, bad credentials or an expired credential.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The role does not open the requested route.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// Role or ownership does not permit the loan action.
    #[schema(rename = "action_forbidden")]
    ActionForbidden,
    /// The loan's status does not permit the transition.
    #[schema(rename = "invalid_transition")]
    InvalidTransition,
    /// A rejection was attempted without a reason.
    #[schema(rename = "missing_reason")]
    MissingReason,
    /// The loan can no longer be edited.
    #[schema(rename = "edit_not_allowed")]
    EditNotAllowed,
    /// Another action for the loan is still pending.
    #[schema(rename = "action_in_flight")]
    ActionInFlight,
    /// The referenced record does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The backend refused the request.
    #[schema(rename = "backend_rejection")]
    BackendRejection,
    /// The backend could not be reached.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred inside the portal.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_transition")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Only DRAFT loans can be submitted")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Financials`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Financials)]
pub struct FinancialsSchema {
    #[schema(example = 1_200_000.0)]
    revenue: f64,
    #[schema(example = 180_000.0)]
    ebitda: f64,
    #[schema(example = "BBB")]
    rating: String,
}

/// OpenAPI schema for [`crate::domain::LoanApplication`].
#[derive(ToSchema)]
#[schema(as = crate::domain::LoanApplication)]
#[schema(rename_all = "camelCase")]
pub struct LoanApplicationSchema {
    #[schema(example = "Acme Traders")]
    client_name: String,
    #[schema(example = "TERM_LOAN")]
    loan_type: String,
    #[schema(example = 500_000.0)]
    requested_amount: f64,
    #[schema(example = 11.5)]
    proposed_interest_rate: f64,
    #[schema(example = 36)]
    tenure_months: u32,
    financials: FinancialsSchema,
}

/// OpenAPI schema for [`crate::domain::Sanction`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Sanction)]
#[schema(rename_all = "camelCase")]
pub struct SanctionSchema {
    #[schema(example = 450_000.0)]
    sanctioned_amount: f64,
    #[schema(example = 10.75)]
    approved_interest_rate: f64,
}

/// OpenAPI schema for [`crate::domain::AuditEntry`].
#[derive(ToSchema)]
#[schema(as = crate::domain::AuditEntry)]
pub struct AuditEntrySchema {
    by: Option<String>,
    #[schema(example = "SUBMITTED")]
    action: String,
    comments: Option<String>,
    #[schema(example = "2024-03-01T09:00:00Z")]
    timestamp: Option<String>,
}

/// OpenAPI schema for [`crate::domain::Loan`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Loan)]
#[schema(rename_all = "camelCase")]
pub struct LoanSchema {
    #[schema(example = "65f1c0ffee42")]
    id: String,
    client_name: String,
    loan_type: String,
    requested_amount: f64,
    proposed_interest_rate: f64,
    tenure_months: u32,
    financials: FinancialsSchema,
    #[schema(example = "UNDER_REVIEW")]
    status: String,
    sanctioned_amount: Option<f64>,
    approved_interest_rate: Option<f64>,
    rejection_reason: Option<String>,
    deleted: bool,
    created_by: Option<String>,
    updated_by: Option<String>,
    approved_by: Option<String>,
    deleted_by: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
    approved_at: Option<String>,
    deleted_at: Option<String>,
    actions: Vec<AuditEntrySchema>,
}

/// OpenAPI schema for a page of loans in the Spring envelope.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct LoanPageSchema {
    content: Vec<LoanSchema>,
    number: u32,
    size: u32,
    total_pages: u32,
    total_elements: u64,
    first: bool,
    last: bool,
    empty: bool,
}

/// OpenAPI schema for [`crate::domain::EmiBreakdown`].
#[derive(ToSchema)]
#[schema(as = crate::domain::EmiBreakdown)]
#[schema(rename_all = "camelCase")]
pub struct EmiBreakdownSchema {
    #[schema(example = 8885)]
    emi: i64,
    #[schema(example = 6619)]
    total_interest: i64,
    #[schema(example = 106_619)]
    total_payable: i64,
}

/// OpenAPI schema for [`crate::domain::DashboardStats`].
#[derive(ToSchema)]
#[schema(as = crate::domain::DashboardStats)]
#[schema(rename_all = "camelCase")]
pub struct DashboardStatsSchema {
    total: u64,
    draft: u64,
    submitted: u64,
    under_review: u64,
    approved: u64,
    rejected: u64,
}

/// OpenAPI schema for [`crate::domain::UserAccount`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UserAccount)]
pub struct UserAccountSchema {
    #[schema(example = "65f0a1b2c3d4")]
    id: String,
    #[schema(example = "analyst@loanapp.com")]
    email: String,
    #[schema(example = "USER")]
    role: String,
    active: bool,
}
