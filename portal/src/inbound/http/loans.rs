//! Loan application, detail and workflow endpoints.
//!
//! ```text
//! GET  /dashboard/apply-loan
//! POST /dashboard/apply-loan             {"clientName":"Acme Traders",...}
//! GET  /dashboard/loans/{id}
//! GET  /dashboard/loans/{id}/edit
//! POST /dashboard/loans/{id}/edit        {"clientName":"Acme Traders",...}
//! POST /dashboard/loans/{id}/status      {"status":"REJECTED","reason":"Weak cash flow"}
//! POST /dashboard/loans/{id}/delete
//! POST /dashboard/loans/{id}/sanction    {"sanctionedAmount":450000,"approvedInterestRate":10.75}
//! ```
//!
//! Every successful mutation sends the stored listings back to page 0.

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use super::ApiResult;
use super::guard::enter;
use super::schemas::{
    EmiBreakdownSchema, ErrorSchema, LoanApplicationSchema, LoanSchema, SanctionSchema,
};
use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{
    EmiBreakdown, Error, Identity, Loan, LoanAction, LoanApplication, LoanDesk, LoanId,
    LoanStatus, LoanType, PortalRoute, Role, Sanction, authorize_edit, available_actions,
};

/// Loan page of the detail screen.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetailView {
    #[schema(value_type = LoanSchema)]
    pub loan: Loan,
    /// Workflow actions the caller may trigger now.
    #[schema(value_type = Vec<String>, example = json!(["under-review"]))]
    pub available_actions: Vec<LoanAction>,
    /// A mutating call for this loan is still waiting on the backend.
    pub pending_action: bool,
    #[schema(value_type = Option<EmiBreakdownSchema>)]
    pub emi: Option<EmiBreakdown>,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_sanction: bool,
}

impl LoanDetailView {
    fn render(loan: Loan, actor: &Identity, desk: &LoanDesk) -> Self {
        let available_actions = available_actions(&loan, actor);
        let pending_action = desk.pending(&loan.id);
        let emi = LoanApplication::from(&loan).emi();
        let can_edit = authorize_edit(&loan, actor).is_ok();
        let is_admin = actor.role == Role::Admin;
        let can_sanction = is_admin && loan.status == LoanStatus::UnderReview;
        Self {
            loan,
            available_actions,
            pending_action,
            emi,
            can_edit,
            can_delete: is_admin,
            can_sanction,
        }
    }
}

/// Empty application form.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyLoanView {
    #[schema(example = "/dashboard/apply-loan")]
    pub action: &'static str,
    /// Endpoint recomputing the EMI while the form is edited.
    #[schema(example = "/dashboard/emi-preview")]
    pub emi_preview: &'static str,
    #[schema(value_type = Vec<String>, example = json!(["TERM_LOAN", "WORKING_CAPITAL"]))]
    pub loan_types: [LoanType; 4],
}

/// Draft loaded into the edit form.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditLoanView {
    #[schema(value_type = String, example = "loan-1")]
    pub loan_id: LoanId,
    #[schema(value_type = LoanApplicationSchema)]
    pub application: LoanApplication,
    #[schema(value_type = Option<EmiBreakdownSchema>)]
    pub emi: Option<EmiBreakdown>,
}

/// Body of `POST /dashboard/loans/{id}/status`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StatusChangeRequest {
    /// Target status.
    #[schema(value_type = String, example = "REJECTED")]
    pub status: LoanStatus,
    /// Mandatory when rejecting.
    #[schema(example = "Weak cash flow")]
    pub reason: Option<String>,
}

fn loan_id(raw: &str) -> Result<LoanId, Error> {
    LoanId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(serde_json::json!({ "field": "id" }))
    })
}

fn detail_location(id: &LoanId) -> String {
    format!("{}/{id}", PortalRoute::Loans.path())
}

/// Blank application form.
#[utoipa::path(
    get,
    path = "/dashboard/apply-loan",
    responses(
        (status = 200, description = "Application form", body = ApplyLoanView),
        (status = 303, description = "No session; redirect to /login")
    ),
    tags = ["loans"],
    operation_id = "applyLoanForm"
)]
#[get("/dashboard/apply-loan")]
pub async fn apply_loan_form(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ApplyLoanView>> {
    enter(&state, &session, PortalRoute::ApplyLoan).await?;
    Ok(web::Json(ApplyLoanView {
        action: PortalRoute::ApplyLoan.path(),
        emi_preview: "/dashboard/emi-preview",
        loan_types: [
            LoanType::TermLoan,
            LoanType::WorkingCapital,
            LoanType::Overdraft,
            LoanType::SmeLoan,
        ],
    }))
}

/// Submit a new application; the backend stores it as a DRAFT.
#[utoipa::path(
    post,
    path = "/dashboard/apply-loan",
    request_body = LoanApplicationSchema,
    responses(
        (status = 201, description = "Draft created", body = LoanDetailView),
        (status = 303, description = "No session; redirect to /login"),
        (status = 400, description = "Invalid application", body = ErrorSchema),
        (status = 403, description = "Administrators cannot apply", body = ErrorSchema),
        (status = 502, description = "Backend refused the application", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "applyLoan"
)]
#[post("/dashboard/apply-loan")]
pub async fn apply_loan(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoanApplication>,
) -> ApiResult<HttpResponse> {
    let current = enter(&state, &session, PortalRoute::ApplyLoan).await?;
    let created = session.settle(state.desk.create(&current, &payload).await)?;
    session.reset_listings()?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, detail_location(&created.id)))
        .json(LoanDetailView::render(
            created,
            current.identity(),
            &state.desk,
        )))
}

/// Loan detail with the actions open to the caller.
#[utoipa::path(
    get,
    path = "/dashboard/loans/{id}",
    params(("id" = String, Path, description = "Loan identifier")),
    responses(
        (status = 200, description = "Loan detail", body = LoanDetailView),
        (status = 303, description = "No session, or the loan does not exist"),
        (status = 503, description = "Backend unavailable", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "loanDetail"
)]
#[get("/dashboard/loans/{id}")]
pub async fn loan_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<LoanDetailView>> {
    let current = enter(&state, &session, PortalRoute::LoanDetail).await?;
    let id = loan_id(&path)?;
    let loan = session.settle(state.desk.fetch(&current, &id).await)?;
    Ok(web::Json(LoanDetailView::render(
        loan,
        current.identity(),
        &state.desk,
    )))
}

/// Draft loaded into the edit form.
#[utoipa::path(
    get,
    path = "/dashboard/loans/{id}/edit",
    params(("id" = String, Path, description = "Loan identifier")),
    responses(
        (status = 200, description = "Editable draft", body = EditLoanView),
        (status = 303, description = "No session, or the loan does not exist"),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 409, description = "Loan is no longer a draft", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "editLoanForm"
)]
#[get("/dashboard/loans/{id}/edit")]
pub async fn edit_loan_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<EditLoanView>> {
    let current = enter(&state, &session, PortalRoute::EditLoan).await?;
    let id = loan_id(&path)?;
    let loan = session.settle(state.desk.fetch(&current, &id).await)?;
    authorize_edit(&loan, current.identity())?;
    let application = LoanApplication::from(&loan);
    Ok(web::Json(EditLoanView {
        emi: application.emi(),
        loan_id: loan.id,
        application,
    }))
}

/// Replace the editable fields of a draft.
#[utoipa::path(
    post,
    path = "/dashboard/loans/{id}/edit",
    params(("id" = String, Path, description = "Loan identifier")),
    request_body = LoanApplicationSchema,
    responses(
        (status = 200, description = "Draft updated", body = LoanDetailView),
        (status = 400, description = "Invalid application", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 409, description = "Not a draft, or another action is pending", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "editLoan"
)]
#[post("/dashboard/loans/{id}/edit")]
pub async fn edit_loan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<LoanApplication>,
) -> ApiResult<web::Json<LoanDetailView>> {
    let current = enter(&state, &session, PortalRoute::EditLoan).await?;
    let id = loan_id(&path)?;
    let updated = session.settle(state.desk.edit(&current, &id, &payload).await)?;
    session.reset_listings()?;
    Ok(web::Json(LoanDetailView::render(
        updated,
        current.identity(),
        &state.desk,
    )))
}

/// Move a loan to another status: submit, review, approve or reject.
#[utoipa::path(
    post,
    path = "/dashboard/loans/{id}/status",
    params(("id" = String, Path, description = "Loan identifier")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Transition confirmed", body = LoanDetailView),
        (status = 403, description = "Role or ownership forbids the action", body = ErrorSchema),
        (status = 409, description = "Invalid transition or action pending", body = ErrorSchema),
        (status = 422, description = "Rejection without a reason", body = ErrorSchema),
        (status = 502, description = "Backend refused the transition", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "changeLoanStatus"
)]
#[post("/dashboard/loans/{id}/status")]
pub async fn change_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<StatusChangeRequest>,
) -> ApiResult<web::Json<LoanDetailView>> {
    let current = enter(&state, &session, PortalRoute::LoanDetail).await?;
    let id = loan_id(&path)?;
    let StatusChangeRequest { status, reason } = payload.into_inner();
    let updated = session.settle(
        state
            .desk
            .transition(&current, &id, status, reason.as_deref())
            .await,
    )?;
    session.reset_listings()?;
    Ok(web::Json(LoanDetailView::render(
        updated,
        current.identity(),
        &state.desk,
    )))
}

/// Soft-delete a loan. Administrators only.
#[utoipa::path(
    post,
    path = "/dashboard/loans/{id}/delete",
    params(("id" = String, Path, description = "Loan identifier")),
    responses(
        (status = 200, description = "Loan marked deleted", body = LoanDetailView),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 409, description = "Another action is pending", body = ErrorSchema)
    ),
    tags = ["review"],
    operation_id = "deleteLoan"
)]
#[post("/dashboard/loans/{id}/delete")]
pub async fn delete_loan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<LoanDetailView>> {
    let current = enter(&state, &session, PortalRoute::LoanDetail).await?;
    let id = loan_id(&path)?;
    let deleted = session.settle(state.desk.delete(&current, &id).await)?;
    session.reset_listings()?;
    Ok(web::Json(LoanDetailView::render(
        deleted,
        current.identity(),
        &state.desk,
    )))
}

/// Record sanctioned terms on a loan under review. Administrators only.
#[utoipa::path(
    post,
    path = "/dashboard/loans/{id}/sanction",
    params(("id" = String, Path, description = "Loan identifier")),
    request_body = SanctionSchema,
    responses(
        (status = 200, description = "Sanction recorded", body = LoanDetailView),
        (status = 400, description = "Non-positive terms", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 409, description = "Loan is not under review", body = ErrorSchema)
    ),
    tags = ["review"],
    operation_id = "sanctionLoan"
)]
#[post("/dashboard/loans/{id}/sanction")]
pub async fn sanction_loan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<Sanction>,
) -> ApiResult<web::Json<LoanDetailView>> {
    let current = enter(&state, &session, PortalRoute::LoanDetail).await?;
    let id = loan_id(&path)?;
    let updated = session.settle(state.desk.sanction(&current, &id, &payload).await)?;
    session.reset_listings()?;
    Ok(web::Json(LoanDetailView::render(
        updated,
        current.identity(),
        &state.desk,
    )))
}
