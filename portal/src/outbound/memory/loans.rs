//! Loan endpoints with the backend's workflow rules.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use super::{Account, InMemoryBackend, State, business_error, require_role};
use crate::domain::ports::{GatewayError, LoanGateway};
use crate::domain::{
    AuditEntry, BearerToken, Financials, Loan, LoanApplication, LoanId, LoanStatus, Role,
    Sanction, StatusChange,
};

impl State {
    fn loan_mut(&mut self, id: &LoanId) -> Result<&mut Loan, GatewayError> {
        self.loans
            .iter_mut()
            .find(|loan| &loan.id == id)
            .ok_or_else(|| GatewayError::not_found(format!("loan {id} not found")))
    }
}

fn owns(caller: &Account, loan: &Loan) -> bool {
    loan.created_by
        .as_deref()
        .is_none_or(|by| by == caller.email.as_ref() || by == caller.id.as_str())
}

fn require_owner(caller: &Account, loan: &Loan) -> Result<(), GatewayError> {
    if owns(caller, loan) {
        Ok(())
    } else {
        Err(GatewayError::forbidden("Access Denied"))
    }
}

fn require_status(loan: &Loan, expected: LoanStatus, message: &str) -> Result<(), GatewayError> {
    if loan.status == expected {
        Ok(())
    } else {
        Err(business_error(message))
    }
}

fn check_application(application: &LoanApplication) -> Result<(), GatewayError> {
    application
        .validate()
        .map_err(|error| business_error(format!("{}: {error}", error.field())))
}

fn check_financials(financials: &Financials) -> Result<(), GatewayError> {
    if financials.revenue <= 0.0 {
        return Err(business_error("Revenue must be greater than zero"));
    }
    if financials.rating.trim().is_empty() {
        return Err(business_error("Financial rating is required"));
    }
    Ok(())
}

fn audit(
    loan: &mut Loan,
    caller: &Account,
    action: &str,
    comments: impl Into<String>,
    now: DateTime<Utc>,
) {
    loan.updated_by = Some(caller.id.as_str().to_owned());
    loan.updated_at = Some(now);
    loan.actions.push(AuditEntry {
        by: Some(caller.id.as_str().to_owned()),
        action: action.to_owned(),
        comments: Some(comments.into()),
        timestamp: Some(now),
    });
}

fn apply_change(
    loan: &mut Loan,
    caller: &Account,
    change: &StatusChange,
    now: DateTime<Utc>,
) -> Result<(), GatewayError> {
    match change {
        StatusChange::Submit => {
            require_role(caller, &[Role::User])?;
            require_owner(caller, loan)?;
            require_status(loan, LoanStatus::Draft, "Only DRAFT loans can be submitted")?;
            check_financials(&loan.financials)?;
            loan.status = LoanStatus::Submitted;
            audit(loan, caller, "SUBMITTED", "Loan submitted for approval", now);
        }
        StatusChange::MarkUnderReview => {
            require_role(caller, &[Role::Admin])?;
            require_status(
                loan,
                LoanStatus::Submitted,
                "Loan must be SUBMITTED to move to UNDER_REVIEW",
            )?;
            loan.status = LoanStatus::UnderReview;
            audit(loan, caller, "UNDER_REVIEW", "Loan moved to under review", now);
        }
        StatusChange::Approve => {
            require_role(caller, &[Role::Admin])?;
            require_status(loan, LoanStatus::UnderReview, "Loan must be UNDER_REVIEW to approve")?;
            loan.status = LoanStatus::Approved;
            loan.approved_by = Some(caller.id.as_str().to_owned());
            loan.approved_at = Some(now);
            audit(loan, caller, "APPROVED", "Loan approved", now);
        }
        StatusChange::Reject { reason } => {
            require_role(caller, &[Role::Admin])?;
            require_status(loan, LoanStatus::UnderReview, "Loan must be UNDER_REVIEW to reject")?;
            if reason.trim().is_empty() {
                return Err(business_error("Rejection reason is mandatory"));
            }
            loan.status = LoanStatus::Rejected;
            loan.rejection_reason = Some(reason.clone());
            audit(loan, caller, "REJECTED", reason.clone(), now);
        }
    }
    Ok(())
}

#[async_trait]
impl LoanGateway for InMemoryBackend {
    async fn list(
        &self,
        token: &BearerToken,
        request: PageRequest,
        status: Option<LoanStatus>,
    ) -> Result<Page<Loan>, GatewayError> {
        self.simulate_latency().await;
        let state = self.lock();
        state.caller(token)?;
        let matching: Vec<&Loan> = state
            .loans
            .iter()
            .filter(|loan| status.is_none_or(|wanted| loan.status == wanted))
            .collect();
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(request.size()).unwrap_or(usize::MAX);
        let content = matching
            .into_iter()
            .skip(offset)
            .take(size)
            .cloned()
            .collect();
        Ok(Page::assemble(content, request, total))
    }

    async fn get(&self, token: &BearerToken, id: &LoanId) -> Result<Loan, GatewayError> {
        self.simulate_latency().await;
        let mut state = self.lock();
        state.caller(token)?;
        state.loan_mut(id).map(|loan| loan.clone())
    }

    async fn create(
        &self,
        token: &BearerToken,
        application: &LoanApplication,
    ) -> Result<Loan, GatewayError> {
        self.simulate_latency().await;
        let now = self.clock.utc();
        let mut state = self.lock();
        let caller = state.caller(token)?;
        require_role(&caller, &[Role::User, Role::Admin])?;
        check_application(application)?;

        state.next_loan += 1;
        let id = LoanId::new(format!("loan-{}", state.next_loan))
            .map_err(|error| GatewayError::decode(error.to_string()))?;
        let loan = Loan {
            id,
            client_name: application.client_name.trim().to_owned(),
            loan_type: application.loan_type,
            requested_amount: application.requested_amount,
            proposed_interest_rate: application.proposed_interest_rate,
            tenure_months: application.tenure_months,
            financials: application.financials.clone(),
            status: LoanStatus::Draft,
            sanctioned_amount: None,
            approved_interest_rate: None,
            rejection_reason: None,
            deleted: false,
            created_by: Some(caller.email.to_string()),
            updated_by: None,
            approved_by: None,
            deleted_by: None,
            created_at: Some(now),
            updated_at: None,
            approved_at: None,
            deleted_at: None,
            actions: vec![AuditEntry {
                by: Some(caller.id.as_str().to_owned()),
                action: "CREATED".to_owned(),
                comments: Some("Loan created".to_owned()),
                timestamp: Some(now),
            }],
        };
        state.loans.push(loan.clone());
        Ok(loan)
    }

    async fn update(
        &self,
        token: &BearerToken,
        id: &LoanId,
        application: &LoanApplication,
    ) -> Result<Loan, GatewayError> {
        self.simulate_latency().await;
        let now = self.clock.utc();
        let mut state = self.lock();
        let caller = state.caller(token)?;
        require_role(&caller, &[Role::User])?;
        check_application(application)?;
        let loan = state.loan_mut(id)?;
        require_status(loan, LoanStatus::Draft, "Cannot edit loan after submission")?;
        require_owner(&caller, loan)?;

        loan.client_name = application.client_name.trim().to_owned();
        loan.loan_type = application.loan_type;
        loan.requested_amount = application.requested_amount;
        loan.proposed_interest_rate = application.proposed_interest_rate;
        loan.tenure_months = application.tenure_months;
        loan.financials = application.financials.clone();
        audit(loan, &caller, "UPDATED", "Loan fields updated", now);
        Ok(loan.clone())
    }

    async fn delete(&self, token: &BearerToken, id: &LoanId) -> Result<Loan, GatewayError> {
        self.simulate_latency().await;
        let now = self.clock.utc();
        let mut state = self.lock();
        let caller = state.caller(token)?;
        require_role(&caller, &[Role::Admin])?;
        let loan = state.loan_mut(id)?;
        loan.deleted = true;
        loan.deleted_at = Some(now);
        loan.deleted_by = Some(caller.id.as_str().to_owned());
        audit(loan, &caller, "DELETED", "Loan soft deleted", now);
        Ok(loan.clone())
    }

    async fn apply(
        &self,
        token: &BearerToken,
        id: &LoanId,
        change: &StatusChange,
    ) -> Result<Loan, GatewayError> {
        self.simulate_latency().await;
        let now = self.clock.utc();
        let mut state = self.lock();
        let caller = state.caller(token)?;
        let loan = state.loan_mut(id)?;
        apply_change(loan, &caller, change, now)?;
        Ok(loan.clone())
    }

    async fn sanction(
        &self,
        token: &BearerToken,
        id: &LoanId,
        sanction: &Sanction,
    ) -> Result<Loan, GatewayError> {
        self.simulate_latency().await;
        let now = self.clock.utc();
        let mut state = self.lock();
        let caller = state.caller(token)?;
        require_role(&caller, &[Role::Admin])?;
        let loan = state.loan_mut(id)?;
        require_status(loan, LoanStatus::UnderReview, "Loan must be UNDER_REVIEW to sanction")?;
        sanction
            .validate()
            .map_err(|error| business_error(error.to_string()))?;
        loan.sanctioned_amount = Some(sanction.sanctioned_amount);
        loan.approved_interest_rate = Some(sanction.approved_interest_rate);
        audit(loan, &caller, "SANCTIONED", "Loan sanctioned by admin", now);
        Ok(loan.clone())
    }
}
