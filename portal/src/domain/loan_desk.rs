//! Loan desk: every loan read and mutation goes through here.
//!
//! Local checks run before anything touches the network. Mutations hold a
//! per-loan in-flight guard, so a second trigger for the same loan fails with
//! `action_in_flight` until the first call resolves. Every backend call that
//! yields an existing loan draws a ticket before it is issued; the
//! confirmed-loan register only accepts a response whose ticket is newer than
//! the one it holds, so local state is the last confirmed response in issue
//! order. A loan leaves the register once no ticket for it is outstanding.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::json;
use tracing::{debug, info};

use super::loan::{
    check_loan_for_action, check_reason, check_role, authorize_create, authorize_delete,
    authorize_edit, authorize_sanction,
};
use super::ports::{GatewayError, LoanGateway};
use super::{Error, Loan, LoanAction, LoanApplication, LoanId, LoanStatus, Role, Sanction, Session};

#[derive(Default)]
struct ConfirmedLoans {
    last_ticket: AtomicU64,
    slots: Mutex<HashMap<LoanId, Slot>>,
}

#[derive(Default)]
struct Slot {
    outstanding: usize,
    held: Option<(u64, Loan)>,
}

impl ConfirmedLoans {
    fn issue(&self, id: &LoanId) -> Ticket<'_> {
        let number = self.last_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().entry(id.clone()).or_default().outstanding += 1;
        Ticket {
            register: self,
            id: id.clone(),
            number,
        }
    }

    fn get(&self, id: &LoanId) -> Option<Loan> {
        self.lock()
            .get(id)
            .and_then(|slot| slot.held.as_ref())
            .map(|(_, loan)| loan.clone())
    }

    fn tracked(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<LoanId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Claim on a slot of the register; dropping it releases the slot.
struct Ticket<'a> {
    register: &'a ConfirmedLoans,
    id: LoanId,
    number: u64,
}

impl Ticket<'_> {
    /// Store `loan` unless a newer ticket already confirmed one; return the
    /// newest confirmed record either way.
    fn record(&self, loan: Loan) -> Loan {
        let mut slots = self.register.lock();
        let Some(slot) = slots.get_mut(&self.id) else {
            return loan;
        };
        let newer = slot
            .held
            .as_ref()
            .filter(|(held, _)| *held > self.number)
            .map(|(held, newest)| (*held, newest.clone()));
        if let Some((held_ticket, newest)) = newer {
            debug!(
                loan_id = %self.id,
                stale_ticket = self.number,
                held_ticket,
                "discarding out-of-order loan response"
            );
            return newest;
        }
        slot.held = Some((self.number, loan.clone()));
        loan
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        let mut slots = self.register.lock();
        let drained = slots.get_mut(&self.id).is_some_and(|slot| {
            slot.outstanding = slot.outstanding.saturating_sub(1);
            slot.outstanding == 0
        });
        if drained {
            slots.remove(&self.id);
        }
    }
}

struct InFlight {
    pending: Arc<Mutex<HashSet<LoanId>>>,
    id: LoanId,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Service behind the loan detail, application and review screens.
#[derive(Clone)]
pub struct LoanDesk {
    loans: Arc<dyn LoanGateway>,
    pending: Arc<Mutex<HashSet<LoanId>>>,
    confirmed: Arc<ConfirmedLoans>,
}

impl LoanDesk {
    /// Desk over the given gateway.
    pub fn new(loans: Arc<dyn LoanGateway>) -> Self {
        Self {
            loans,
            pending: Arc::default(),
            confirmed: Arc::default(),
        }
    }

    /// Whether a mutating call for `id` is still waiting on the backend.
    pub fn pending(&self, id: &LoanId) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// Last confirmed record for `id` while calls for it are outstanding.
    pub fn confirmed(&self, id: &LoanId) -> Option<Loan> {
        self.confirmed.get(id)
    }

    /// Number of loans the register currently holds.
    pub fn tracked_loans(&self) -> usize {
        self.confirmed.tracked()
    }

    /// Fetch a loan fresh from the backend.
    pub async fn fetch(&self, session: &Session, id: &LoanId) -> Result<Loan, Error> {
        self.confirm(id, self.loans.get(session.token(), id)).await
    }

    /// Move `id` into `target` on behalf of the session.
    ///
    /// Check order: role, rejection reason, in-flight guard, then ownership
    /// and current status against a freshly fetched record.
    pub async fn transition(
        &self,
        session: &Session,
        id: &LoanId,
        target: LoanStatus,
        reason: Option<&str>,
    ) -> Result<Loan, Error> {
        let actor = session.identity();
        let action = LoanAction::for_target(target).ok_or_else(|| {
            Error::invalid_transition(format!("no transition leads to {target}"))
        })?;
        check_role(action, actor)?;
        let change = check_reason(action, reason)?;

        let _in_flight = self.begin(id)?;
        let current = self.fetch(session, id).await?;
        check_loan_for_action(&current, actor, action)?;

        let updated = self
            .confirm(id, self.loans.apply(session.token(), id, &change))
            .await?;
        info!(
            loan_id = %id,
            %action,
            status = %updated.status,
            actor = %actor.email,
            "loan transition confirmed"
        );
        Ok(updated)
    }

    /// Replace the editable fields of a draft.
    ///
    /// Status and ownership are checked before the payload, so a locked loan
    /// reports `edit_not_allowed` whatever the payload holds.
    pub async fn edit(
        &self,
        session: &Session,
        id: &LoanId,
        application: &LoanApplication,
    ) -> Result<Loan, Error> {
        let _in_flight = self.begin(id)?;
        let current = self.fetch(session, id).await?;
        authorize_edit(&current, session.identity())?;
        validate_application(application)?;

        let updated = self
            .confirm(id, self.loans.update(session.token(), id, application))
            .await?;
        info!(loan_id = %id, actor = %session.email(), "loan draft updated");
        Ok(updated)
    }

    /// Soft-delete a loan.
    pub async fn delete(&self, session: &Session, id: &LoanId) -> Result<Loan, Error> {
        authorize_delete(session.identity())?;
        let _in_flight = self.begin(id)?;
        let deleted = self
            .confirm(id, self.loans.delete(session.token(), id))
            .await?;
        info!(loan_id = %id, actor = %session.email(), "loan soft-deleted");
        Ok(deleted)
    }

    /// Record sanctioned terms on a loan under review.
    pub async fn sanction(
        &self,
        session: &Session,
        id: &LoanId,
        sanction: &Sanction,
    ) -> Result<Loan, Error> {
        if session.role() != Role::Admin {
            return Err(Error::action_forbidden("only administrators may sanction loans"));
        }
        let _in_flight = self.begin(id)?;
        let current = self.fetch(session, id).await?;
        authorize_sanction(&current, session.identity(), sanction)?;

        let updated = self
            .confirm(id, self.loans.sanction(session.token(), id, sanction))
            .await?;
        info!(loan_id = %id, actor = %session.email(), "loan sanction recorded");
        Ok(updated)
    }

    /// Create a DRAFT application owned by the session's user.
    pub async fn create(
        &self,
        session: &Session,
        application: &LoanApplication,
    ) -> Result<Loan, Error> {
        authorize_create(session.identity())?;
        validate_application(application)?;
        let created = self.loans.create(session.token(), application).await?;
        info!(loan_id = %created.id, actor = %session.email(), "loan application created");
        Ok(created)
    }

    fn begin(&self, id: &LoanId) -> Result<InFlight, Error> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if !pending.insert(id.clone()) {
            return Err(Error::action_in_flight(format!(
                "an action for loan {id} is already pending"
            )));
        }
        Ok(InFlight {
            pending: Arc::clone(&self.pending),
            id: id.clone(),
        })
    }

    async fn confirm<F>(&self, id: &LoanId, call: F) -> Result<Loan, Error>
    where
        F: Future<Output = Result<Loan, GatewayError>>,
    {
        let ticket = self.confirmed.issue(id);
        let loan = call.await?;
        Ok(ticket.record(loan))
    }
}

fn validate_application(application: &LoanApplication) -> Result<(), Error> {
    application.validate().map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": err.field(), "code": "invalid_field" }))
    })
}
