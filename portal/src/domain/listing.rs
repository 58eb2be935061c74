//! Loan listing policy: visibility and pagination state for loan pages.
//!
//! Administrators see every record, soft-deleted ones included. Everyone
//! else sees the page with deleted records removed; the totals stay as the
//! backend reported them, so a user's page can show fewer rows than its
//! size while `totalElements` still counts the hidden ones.

use std::sync::Arc;

use pagination::{Page, PageRequest, PageRequestError, Pager};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ports::LoanGateway;
use super::{Error, Loan, LoanStatus, Role, Session};

/// Page size used for the dashboard statistics query.
pub const STATS_PAGE_SIZE: u32 = 1000;

/// Filter and cursor of one listing route, kept across requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingState {
    pub status_filter: Option<LoanStatus>,
    pub pager: Pager,
}

impl ListingState {
    /// Fresh state at page 0 with `page_size` rows per page.
    pub fn new(page_size: u32) -> Result<Self, PageRequestError> {
        Ok(Self {
            status_filter: None,
            pager: Pager::new(page_size)?,
        })
    }

    /// Route entry: apply `filter` and go back to page 0.
    pub fn enter(&mut self, filter: Option<LoanStatus>) {
        self.status_filter = filter;
        self.pager.reset();
    }

    /// A mutation succeeded: back to page 0, filter kept.
    pub fn after_mutation(&mut self) {
        self.pager.reset();
    }
}

/// Apply the visibility rule for `role`.
///
/// # Examples
/// ```
/// use pagination::{Page, PageRequest};
/// use portal::domain::{visible_page, Role};
///
/// let page = Page::assemble(Vec::new(), PageRequest::default(), 0);
/// assert!(visible_page(page, Role::User).empty);
/// ```
pub fn visible_page(page: Page<Loan>, role: Role) -> Page<Loan> {
    match role {
        Role::Admin => page,
        Role::User => page.retain(|loan| !loan.deleted),
    }
}

/// Per-status counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: u64,
    pub draft: u64,
    pub submitted: u64,
    pub under_review: u64,
    pub approved: u64,
    pub rejected: u64,
}

impl DashboardStats {
    /// Count the loans in `loans`.
    pub fn tally<'a>(loans: impl IntoIterator<Item = &'a Loan>) -> Self {
        loans.into_iter().fold(Self::default(), |mut stats, loan| {
            stats.total += 1;
            match loan.status {
                LoanStatus::Draft => stats.draft += 1,
                LoanStatus::Submitted => stats.submitted += 1,
                LoanStatus::UnderReview => stats.under_review += 1,
                LoanStatus::Approved => stats.approved += 1,
                LoanStatus::Rejected => stats.rejected += 1,
            }
            stats
        })
    }
}

/// Fetches loan pages and applies the visibility rule.
#[derive(Clone)]
pub struct LoanListing {
    loans: Arc<dyn LoanGateway>,
}

impl LoanListing {
    /// Listing over the given gateway.
    pub fn new(loans: Arc<dyn LoanGateway>) -> Self {
        Self { loans }
    }

    /// Request the full page and return the subset `session` may see.
    pub async fn list_loans(
        &self,
        session: &Session,
        request: PageRequest,
        status_filter: Option<LoanStatus>,
    ) -> Result<Page<Loan>, Error> {
        let page = self
            .loans
            .list(session.token(), request, status_filter)
            .await?;
        debug!(
            page = request.page(),
            size = request.size(),
            status = ?status_filter,
            returned = page.content.len(),
            "loan page fetched"
        );
        Ok(visible_page(page, session.role()))
    }

    /// Load the page `state` points at and record the reported bounds.
    pub async fn load(&self, session: &Session, state: &mut ListingState) -> Result<Page<Loan>, Error> {
        let page = self
            .list_loans(session, state.pager.request(), state.status_filter)
            .await?;
        state.pager.observe(&page);
        Ok(page)
    }

    /// Move forward one page; `None` at the last page, without a request.
    pub async fn next_page(
        &self,
        session: &Session,
        state: &mut ListingState,
    ) -> Result<Option<Page<Loan>>, Error> {
        if !state.pager.next() {
            return Ok(None);
        }
        self.load(session, state).await.map(Some)
    }

    /// Move back one page; `None` at page 0, without a request.
    pub async fn previous_page(
        &self,
        session: &Session,
        state: &mut ListingState,
    ) -> Result<Option<Page<Loan>>, Error> {
        if !state.pager.previous() {
            return Ok(None);
        }
        self.load(session, state).await.map(Some)
    }

    /// Counts over the first [`STATS_PAGE_SIZE`] visible loans.
    pub async fn dashboard_stats(&self, session: &Session) -> Result<DashboardStats, Error> {
        let request = PageRequest::first(STATS_PAGE_SIZE)
            .map_err(|err| Error::internal(format!("invalid statistics page: {err}")))?;
        let page = self.list_loans(session, request, None).await?;
        Ok(DashboardStats::tally(&page.content))
    }
}
