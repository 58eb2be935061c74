//! Dashboard landing page and the reactive EMI preview.
//!
//! ```text
//! GET /dashboard
//! GET /dashboard/emi-preview?amount=500000&tenureMonths=36&interestRate=11.5
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};

use super::ApiResult;
use super::guard::enter;
use super::schemas::{DashboardStatsSchema, ErrorSchema};
use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{DashboardStats, EmiBreakdown, PortalRoute, Role, emi_preview};

/// Landing view after login.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    #[schema(example = "user@loanapp.com")]
    pub email: String,
    #[schema(example = "USER")]
    pub role: String,
    #[schema(value_type = DashboardStatsSchema)]
    pub stats: DashboardStats,
    /// Listing the status counters link to.
    #[schema(example = "/dashboard/loans")]
    pub listing_target: &'static str,
}

/// Raw form inputs of the EMI preview.
///
/// Every value is optional text: the form recomputes while the user types,
/// so anything that does not parse is treated as not entered yet.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmiPreviewQuery {
    #[param(example = "500000")]
    pub amount: Option<String>,
    #[param(example = "36")]
    pub tenure_months: Option<String>,
    /// Annual rate in percent.
    #[param(example = "11.5")]
    pub interest_rate: Option<String>,
}

impl EmiPreviewQuery {
    fn preview(&self) -> Option<EmiBreakdown> {
        emi_preview(
            parse_input(self.amount.as_deref()),
            parse_input(self.tenure_months.as_deref()),
            parse_input(self.interest_rate.as_deref()),
        )
    }
}

fn parse_input<T: std::str::FromStr>(raw: Option<&str>) -> Option<T> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse().ok())
}

/// EMI outputs; all `null` until the inputs are computable.
#[derive(Debug, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmiPreviewView {
    pub emi: Option<i64>,
    pub total_interest: Option<i64>,
    pub total_payable: Option<i64>,
}

impl From<Option<EmiBreakdown>> for EmiPreviewView {
    fn from(value: Option<EmiBreakdown>) -> Self {
        value.map_or_else(Self::default, |breakdown| Self {
            emi: Some(breakdown.emi),
            total_interest: Some(breakdown.total_interest),
            total_payable: Some(breakdown.total_payable),
        })
    }
}

pub(super) fn listing_target(role: Role) -> &'static str {
    match role {
        Role::Admin => PortalRoute::ReviewLoans.path(),
        Role::User => PortalRoute::Loans.path(),
    }
}

/// Dashboard with per-status counts over the loans visible to the caller.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardView),
        (status = 303, description = "No session; redirect to /login"),
        (status = 503, description = "Backend unavailable", body = ErrorSchema)
    ),
    tags = ["dashboard"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardView>> {
    let current = enter(&state, &session, PortalRoute::Dashboard).await?;
    let stats = session.settle(state.listing.dashboard_stats(&current).await)?;
    Ok(web::Json(DashboardView {
        email: current.email().to_string(),
        role: current.role().as_str().to_owned(),
        stats,
        listing_target: listing_target(current.role()),
    }))
}

/// Recompute the EMI preview for the application form.
#[utoipa::path(
    get,
    path = "/dashboard/emi-preview",
    params(EmiPreviewQuery),
    responses(
        (status = 200, description = "EMI preview", body = EmiPreviewView),
        (status = 303, description = "No session; redirect to /login")
    ),
    tags = ["loans"],
    operation_id = "emiPreview"
)]
#[get("/dashboard/emi-preview")]
pub async fn emi_preview_handler(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<EmiPreviewQuery>,
) -> ApiResult<web::Json<EmiPreviewView>> {
    enter(&state, &session, PortalRoute::ApplyLoan).await?;
    Ok(web::Json(EmiPreviewView::from(query.preview())))
}
