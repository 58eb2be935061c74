//! The loan status machine: one transition table and the checks every loan
//! action goes through before a backend call is issued.
//!
//! | From         | Action            | To           | Actor        |
//! |--------------|-------------------|--------------|--------------|
//! | DRAFT        | submit            | SUBMITTED    | owning USER  |
//! | SUBMITTED    | under-review      | UNDER_REVIEW | ADMIN        |
//! | UNDER_REVIEW | approve           | APPROVED     | ADMIN        |
//! | UNDER_REVIEW | reject (+reason)  | REJECTED     | ADMIN        |
//!
//! Checks that need no loan (role, reason) are separate from the checks that
//! need the current record (ownership, status) so callers can reject locally
//! before fetching anything. The backend stays the authority: passing these
//! checks only means the request is worth sending.

use std::fmt;

use serde::Serialize;

use super::{Loan, LoanStatus, Sanction};
use crate::domain::{Error, Identity, Role};

/// A status transition a user can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanAction {
    /// DRAFT → SUBMITTED.
    Submit,
    /// SUBMITTED → UNDER_REVIEW.
    UnderReview,
    /// UNDER_REVIEW → APPROVED.
    Approve,
    /// UNDER_REVIEW → REJECTED.
    Reject,
}

struct Rule {
    action: LoanAction,
    from: LoanStatus,
    to: LoanStatus,
    role: Role,
    owner_only: bool,
}

static TRANSITIONS: [Rule; 4] = [
    Rule {
        action: LoanAction::Submit,
        from: LoanStatus::Draft,
        to: LoanStatus::Submitted,
        role: Role::User,
        owner_only: true,
    },
    Rule {
        action: LoanAction::UnderReview,
        from: LoanStatus::Submitted,
        to: LoanStatus::UnderReview,
        role: Role::Admin,
        owner_only: false,
    },
    Rule {
        action: LoanAction::Approve,
        from: LoanStatus::UnderReview,
        to: LoanStatus::Approved,
        role: Role::Admin,
        owner_only: false,
    },
    Rule {
        action: LoanAction::Reject,
        from: LoanStatus::UnderReview,
        to: LoanStatus::Rejected,
        role: Role::Admin,
        owner_only: false,
    },
];

fn rule(action: LoanAction) -> &'static Rule {
    match action {
        LoanAction::Submit => &TRANSITIONS[0],
        LoanAction::UnderReview => &TRANSITIONS[1],
        LoanAction::Approve => &TRANSITIONS[2],
        LoanAction::Reject => &TRANSITIONS[3],
    }
}

impl LoanAction {
    /// Every action, in table order.
    pub const ALL: [Self; 4] = [Self::Submit, Self::UnderReview, Self::Approve, Self::Reject];

    /// Action that moves a loan into `target`; `None` for DRAFT.
    pub fn for_target(target: LoanStatus) -> Option<Self> {
        TRANSITIONS
            .iter()
            .find(|rule| rule.to == target)
            .map(|rule| rule.action)
    }

    /// Backend path segment (`PATCH /loans/{id}/{segment}`).
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::UnderReview => "under-review",
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    /// Status the loan must be in.
    pub fn from_status(self) -> LoanStatus {
        rule(self).from
    }

    /// Status the loan ends up in.
    pub fn target(self) -> LoanStatus {
        rule(self).to
    }

    /// Role allowed to trigger the action.
    pub fn required_role(self) -> Role {
        rule(self).role
    }
}

impl fmt::Display for LoanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Authorised transition, ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    Submit,
    MarkUnderReview,
    Approve,
    Reject {
        /// Trimmed, non-empty reason.
        reason: String,
    },
}

impl StatusChange {
    /// Action this change performs.
    pub fn action(&self) -> LoanAction {
        match self {
            Self::Submit => LoanAction::Submit,
            Self::MarkUnderReview => LoanAction::UnderReview,
            Self::Approve => LoanAction::Approve,
            Self::Reject { .. } => LoanAction::Reject,
        }
    }
}

/// Role check; needs no loan.
pub fn check_role(action: LoanAction, actor: &Identity) -> Result<(), Error> {
    let required = action.required_role();
    if actor.role == required {
        Ok(())
    } else {
        Err(Error::action_forbidden(format!(
            "{action} requires the {required} role"
        )))
    }
}

/// Reason check; turns the action into a [`StatusChange`].
///
/// Only `reject` needs a reason. Blank reasons count as missing.
pub fn check_reason(action: LoanAction, reason: Option<&str>) -> Result<StatusChange, Error> {
    match action {
        LoanAction::Submit => Ok(StatusChange::Submit),
        LoanAction::UnderReview => Ok(StatusChange::MarkUnderReview),
        LoanAction::Approve => Ok(StatusChange::Approve),
        LoanAction::Reject => match reason.map(str::trim) {
            Some(reason) if !reason.is_empty() => Ok(StatusChange::Reject {
                reason: reason.to_owned(),
            }),
            _ => Err(Error::missing_reason("a rejection reason is required")),
        },
    }
}

/// Ownership and current-status checks against the freshly fetched loan.
pub fn check_loan_for_action(loan: &Loan, actor: &Identity, action: LoanAction) -> Result<(), Error> {
    let rule = rule(action);
    if rule.owner_only && !is_owner(loan, actor) {
        return Err(Error::action_forbidden(format!(
            "only the owner of loan {} may {action} it",
            loan.id
        )));
    }
    if loan.status != rule.from {
        return Err(Error::invalid_transition(format!(
            "loan {} is {} and cannot move to {}",
            loan.id, loan.status, rule.to
        )));
    }
    Ok(())
}

/// Single validation entry point for a transition on a known loan.
///
/// Runs the checks in order: role, reason, ownership, status.
///
/// # Examples
/// ```
/// use portal::domain::{authorize_transition, ErrorCode, LoanAction};
/// # use portal::domain::{Email, Identity, Role};
/// # let admin = Identity { id: None, email: Email::new("admin@loanapp.com").unwrap(), role: Role::Admin };
/// # let loan: portal::domain::Loan = serde_json::from_value(serde_json::json!({
/// #     "id": "1", "clientName": "Acme", "loanType": "TERM_LOAN", "requestedAmount": 1.0,
/// #     "proposedInterestRate": 1.0, "tenureMonths": 6, "status": "UNDER_REVIEW"
/// # })).unwrap();
/// let err = authorize_transition(&loan, &admin, LoanAction::Reject, Some("  ")).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::MissingReason);
/// ```
pub fn authorize_transition(
    loan: &Loan,
    actor: &Identity,
    action: LoanAction,
    reason: Option<&str>,
) -> Result<StatusChange, Error> {
    check_role(action, actor)?;
    let change = check_reason(action, reason)?;
    check_loan_for_action(loan, actor, action)?;
    Ok(change)
}

/// Actions the local table permits for `actor` on `loan`.
///
/// Rejection is listed without its reason; the caller still has to supply one.
pub fn available_actions(loan: &Loan, actor: &Identity) -> Vec<LoanAction> {
    if loan.deleted {
        return Vec::new();
    }
    LoanAction::ALL
        .into_iter()
        .filter(|action| {
            check_role(*action, actor).is_ok() && check_loan_for_action(loan, actor, *action).is_ok()
        })
        .collect()
}

/// Draft edits: status first, then role and ownership.
pub fn authorize_edit(loan: &Loan, actor: &Identity) -> Result<(), Error> {
    if loan.status != LoanStatus::Draft {
        return Err(Error::edit_not_allowed(format!(
            "loan {} is {} and can no longer be edited",
            loan.id, loan.status
        )));
    }
    if actor.role != Role::User || !is_owner(loan, actor) {
        return Err(Error::action_forbidden(format!(
            "only the owner of loan {} may edit it",
            loan.id
        )));
    }
    Ok(())
}

/// Soft delete is open to administrators from any state.
pub fn authorize_delete(actor: &Identity) -> Result<(), Error> {
    if actor.role == Role::Admin {
        Ok(())
    } else {
        Err(Error::action_forbidden("only administrators may delete loans"))
    }
}

/// New applications come from users only.
pub fn authorize_create(actor: &Identity) -> Result<(), Error> {
    if actor.role == Role::User {
        Ok(())
    } else {
        Err(Error::action_forbidden("only users may apply for loans"))
    }
}

/// Sanction terms: administrator, loan under review, positive values.
pub fn authorize_sanction(loan: &Loan, actor: &Identity, sanction: &Sanction) -> Result<(), Error> {
    if actor.role != Role::Admin {
        return Err(Error::action_forbidden("only administrators may sanction loans"));
    }
    sanction.validate().map_err(|err| {
        Error::invalid_request(err.to_string())
    })?;
    if loan.status != LoanStatus::UnderReview {
        return Err(Error::invalid_transition(format!(
            "loan {} is {} and cannot be sanctioned",
            loan.id, loan.status
        )));
    }
    Ok(())
}

// A missing `createdBy` defers ownership to the backend.
fn is_owner(loan: &Loan, actor: &Identity) -> bool {
    loan.created_by
        .as_deref()
        .is_none_or(|created_by| actor.owns(created_by))
}
