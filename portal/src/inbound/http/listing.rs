//! Loan listings: the applicant's `/dashboard/loans` and the administrator's
//! `/dashboard/review-loans`.
//!
//! ```text
//! GET  /dashboard/loans?status=DRAFT
//! POST /dashboard/loans/next
//! POST /dashboard/loans/previous
//! GET  /dashboard/review-loans?status=SUBMITTED
//! POST /dashboard/review-loans/next
//! POST /dashboard/review-loans/previous
//! ```
//!
//! Entering a listing always starts at page 0. The filter and cursor are kept
//! in the session cookie so the paging buttons continue from where the last
//! response left off; at either edge they answer `204 No Content` without
//! calling the backend.

use actix_web::{HttpResponse, get, post, web};
use pagination::Page;
use serde::{Deserialize, Serialize};

use super::ApiResult;
use super::guard::enter;
use super::schemas::ErrorSchema;
use super::session::{ListingRoute, SessionContext};
use super::state::HttpState;
use crate::domain::{
    Error, Identity, ListingState, Loan, LoanAction, LoanDesk, LoanStatus, PortalRoute,
    available_actions,
};

/// Notice keys a listing may be entered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ListingNotice {
    /// A loan the caller tried to open does not exist.
    LoanNotFound,
}

/// Query accepted on listing entry.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    /// Status filter; empty or absent lists every status.
    #[param(example = "SUBMITTED")]
    pub status: Option<String>,
    /// Notice to show above the table, e.g. `loan-not-found`.
    pub notice: Option<String>,
}

impl ListingQuery {
    fn status_filter(&self) -> Result<Option<LoanStatus>, Error> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse::<LoanStatus>().map(Some).map_err(|err| {
                Error::invalid_request(err.to_string())
                    .with_details(serde_json::json!({ "field": "status" }))
            }),
        }
    }

    // Unknown notices are dropped rather than echoed back.
    fn notice(&self) -> Option<ListingNotice> {
        self.notice
            .as_deref()
            .and_then(|raw| serde_json::from_value(serde_json::Value::from(raw)).ok())
    }
}

/// A listed loan plus what the caller may do with it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRow {
    #[serde(flatten)]
    pub loan: Loan,
    pub available_actions: Vec<LoanAction>,
    /// A mutating call for this loan is still waiting on the backend.
    pub pending_action: bool,
}

impl LoanRow {
    fn build(loan: Loan, actor: &Identity, desk: &LoanDesk) -> Self {
        let available_actions = available_actions(&loan, actor);
        let pending_action = desk.pending(&loan.id);
        Self {
            loan,
            available_actions,
            pending_action,
        }
    }
}

/// One rendered listing page.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    /// Spring page envelope whose rows are loans with `availableActions` and
    /// `pendingAction` added.
    #[schema(value_type = Object)]
    pub page: Page<LoanRow>,
    #[schema(value_type = Option<String>, example = "SUBMITTED")]
    pub status_filter: Option<LoanStatus>,
    pub notice: Option<ListingNotice>,
    pub has_next: bool,
    pub has_previous: bool,
}

impl ListingView {
    fn render(
        page: Page<Loan>,
        state: &ListingState,
        notice: Option<ListingNotice>,
        actor: &Identity,
        desk: &LoanDesk,
    ) -> Self {
        let pager = state.pager;
        Self {
            page: page.map(|loan| LoanRow::build(loan, actor, desk)),
            status_filter: state.status_filter,
            notice,
            has_next: pager.page().saturating_add(1) < pager.total_pages(),
            has_previous: pager.page() > 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Next,
    Previous,
}

fn portal_route(route: ListingRoute) -> PortalRoute {
    match route {
        ListingRoute::Loans => PortalRoute::Loans,
        ListingRoute::ReviewLoans => PortalRoute::ReviewLoans,
    }
}

async fn open_listing(
    state: &HttpState,
    session: &SessionContext,
    route: ListingRoute,
    query: &ListingQuery,
) -> ApiResult<ListingView> {
    let current = enter(state, session, portal_route(route)).await?;
    let filter = query.status_filter()?;
    let mut listing = session.listing_state(route, state.page_size)?;
    listing.enter(filter);
    let page = session.settle(state.listing.load(&current, &mut listing).await)?;
    session.store_listing(route, &listing)?;
    Ok(ListingView::render(
        page,
        &listing,
        query.notice(),
        current.identity(),
        &state.desk,
    ))
}

async fn step_listing(
    state: &HttpState,
    session: &SessionContext,
    route: ListingRoute,
    step: Step,
) -> ApiResult<HttpResponse> {
    let current = enter(state, session, portal_route(route)).await?;
    let mut listing = session.listing_state(route, state.page_size)?;
    let moved = match step {
        Step::Next => state.listing.next_page(&current, &mut listing).await,
        Step::Previous => state.listing.previous_page(&current, &mut listing).await,
    };
    let Some(page) = session.settle(moved)? else {
        return Ok(HttpResponse::NoContent().finish());
    };
    session.store_listing(route, &listing)?;
    Ok(HttpResponse::Ok().json(ListingView::render(
        page,
        &listing,
        None,
        current.identity(),
        &state.desk,
    )))
}

/// The caller's loans, deleted ones hidden for applicants.
#[utoipa::path(
    get,
    path = "/dashboard/loans",
    params(ListingQuery),
    responses(
        (status = 200, description = "First page of the listing", body = ListingView),
        (status = 303, description = "No session; redirect to /login"),
        (status = 400, description = "Unknown status filter", body = ErrorSchema),
        (status = 503, description = "Backend unavailable", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "listLoans"
)]
#[get("/dashboard/loans")]
pub async fn list_loans(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListingQuery>,
) -> ApiResult<web::Json<ListingView>> {
    open_listing(&state, &session, ListingRoute::Loans, &query)
        .await
        .map(web::Json)
}

/// Next page of `/dashboard/loans`.
#[utoipa::path(
    post,
    path = "/dashboard/loans/next",
    responses(
        (status = 200, description = "Next page", body = ListingView),
        (status = 204, description = "Already on the last page")
    ),
    tags = ["loans"],
    operation_id = "nextLoansPage"
)]
#[post("/dashboard/loans/next")]
pub async fn next_loans_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    step_listing(&state, &session, ListingRoute::Loans, Step::Next).await
}

/// Previous page of `/dashboard/loans`.
#[utoipa::path(
    post,
    path = "/dashboard/loans/previous",
    responses(
        (status = 200, description = "Previous page", body = ListingView),
        (status = 204, description = "Already on the first page")
    ),
    tags = ["loans"],
    operation_id = "previousLoansPage"
)]
#[post("/dashboard/loans/previous")]
pub async fn previous_loans_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    step_listing(&state, &session, ListingRoute::Loans, Step::Previous).await
}

/// Every loan, soft-deleted ones included. Administrators only.
#[utoipa::path(
    get,
    path = "/dashboard/review-loans",
    params(ListingQuery),
    responses(
        (status = 200, description = "First page of the review queue", body = ListingView),
        (status = 303, description = "No session, or not an administrator"),
        (status = 400, description = "Unknown status filter", body = ErrorSchema),
        (status = 503, description = "Backend unavailable", body = ErrorSchema)
    ),
    tags = ["review"],
    operation_id = "listReviewLoans"
)]
#[get("/dashboard/review-loans")]
pub async fn list_review_loans(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListingQuery>,
) -> ApiResult<web::Json<ListingView>> {
    open_listing(&state, &session, ListingRoute::ReviewLoans, &query)
        .await
        .map(web::Json)
}

/// Next page of `/dashboard/review-loans`.
#[utoipa::path(
    post,
    path = "/dashboard/review-loans/next",
    responses(
        (status = 200, description = "Next page", body = ListingView),
        (status = 204, description = "Already on the last page")
    ),
    tags = ["review"],
    operation_id = "nextReviewPage"
)]
#[post("/dashboard/review-loans/next")]
pub async fn next_review_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    step_listing(&state, &session, ListingRoute::ReviewLoans, Step::Next).await
}

/// Previous page of `/dashboard/review-loans`.
#[utoipa::path(
    post,
    path = "/dashboard/review-loans/previous",
    responses(
        (status = 200, description = "Previous page", body = ListingView),
        (status = 204, description = "Already on the first page")
    ),
    tags = ["review"],
    operation_id = "previousReviewPage"
)]
#[post("/dashboard/review-loans/previous")]
pub async fn previous_review_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    step_listing(&state, &session, ListingRoute::ReviewLoans, Step::Previous).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn query(status: Option<&str>, notice: Option<&str>) -> ListingQuery {
        ListingQuery {
            status: status.map(str::to_owned),
            notice: notice.map(str::to_owned),
        }
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("  "), None)]
    #[case(Some("UNDER_REVIEW"), Some(LoanStatus::UnderReview))]
    fn status_filters_parse(#[case] raw: Option<&str>, #[case] expected: Option<LoanStatus>) {
        assert_eq!(query(raw, None).status_filter().expect("valid filter"), expected);
    }

    #[rstest]
    fn unknown_status_is_a_bad_request() {
        let error = query(Some("PENDING"), None)
            .status_filter()
            .expect_err("unknown status");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case(Some("loan-not-found"), Some(ListingNotice::LoanNotFound))]
    #[case(Some("<script>"), None)]
    #[case(None, None)]
    fn only_known_notices_survive(
        #[case] raw: Option<&str>,
        #[case] expected: Option<ListingNotice>,
    ) {
        assert_eq!(query(None, raw).notice(), expected);
    }
}
