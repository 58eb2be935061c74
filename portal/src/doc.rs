//! OpenAPI documentation for the portal's route entries.
//!
//! Domain types stay free of utoipa derives; their schemas come from the
//! mirrors in [`crate::inbound::http::schemas`]. The document is served by
//! Swagger UI in debug builds and printed by the `openapi-dump` binary.

use crate::inbound::http::auth::{LoginRequest, LoginView};
use crate::inbound::http::dashboard::{DashboardView, EmiPreviewView};
use crate::inbound::http::health::ProbeReport;
use crate::inbound::http::listing::{ListingNotice, ListingView};
use crate::inbound::http::loans::{
    ApplyLoanView, EditLoanView, LoanDetailView, StatusChangeRequest,
};
use crate::inbound::http::schemas::{
    AuditEntrySchema, DashboardStatsSchema, EmiBreakdownSchema, ErrorCodeSchema, ErrorSchema,
    FinancialsSchema, LoanApplicationSchema, LoanPageSchema, LoanSchema, SanctionSchema,
    UserAccountSchema,
};
use crate::inbound::http::users::{CreateUserRequest, UserStatusRequest, UsersView};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by POST /login.",
            ))),
        );
    }
}

/// OpenAPI document for the portal.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Loan portal",
        description = "Route entries of the loan-origination front end: session, dashboard, \
                       loan workflow and user administration. Guard failures answer \
                       303 See Other with a Location header."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login_page,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::dashboard::dashboard,
        crate::inbound::http::dashboard::emi_preview_handler,
        crate::inbound::http::listing::list_loans,
        crate::inbound::http::listing::next_loans_page,
        crate::inbound::http::listing::previous_loans_page,
        crate::inbound::http::listing::list_review_loans,
        crate::inbound::http::listing::next_review_page,
        crate::inbound::http::listing::previous_review_page,
        crate::inbound::http::loans::apply_loan_form,
        crate::inbound::http::loans::apply_loan,
        crate::inbound::http::loans::loan_detail,
        crate::inbound::http::loans::edit_loan_form,
        crate::inbound::http::loans::edit_loan,
        crate::inbound::http::loans::change_status,
        crate::inbound::http::loans::delete_loan,
        crate::inbound::http::loans::sanction_loan,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::set_user_status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        FinancialsSchema,
        LoanApplicationSchema,
        SanctionSchema,
        AuditEntrySchema,
        LoanSchema,
        LoanPageSchema,
        EmiBreakdownSchema,
        DashboardStatsSchema,
        UserAccountSchema,
        LoginRequest,
        LoginView,
        DashboardView,
        EmiPreviewView,
        ListingNotice,
        ListingView,
        ApplyLoanView,
        EditLoanView,
        LoanDetailView,
        StatusChangeRequest,
        CreateUserRequest,
        UserStatusRequest,
        UsersView,
        ProbeReport,
    )),
    tags(
        (name = "session", description = "Login and logout"),
        (name = "dashboard", description = "Landing page and statistics"),
        (name = "loans", description = "Applications, detail and workflow"),
        (name = "review", description = "Administrator review queue"),
        (name = "users", description = "User administration"),
        (name = "health", description = "Orchestrator probes")
    )
)]
pub struct ApiDoc;
