//! Behaviour tests for the loan lifecycle across applicant and
//! administrator sessions.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

// The shared harness carries helpers only the HTTP suite uses.
#[allow(dead_code)]
#[path = "support/portal.rs"]
mod portal_support;

use std::cell::RefCell;

use portal_support::{Portal, Reply, application};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

struct LifecycleWorld {
    portal: RefCell<Portal>,
    loan_id: RefCell<Option<String>>,
    last: RefCell<Option<Reply>>,
}

impl LifecycleWorld {
    fn record(&self, reply: Reply) {
        self.last.replace(Some(reply));
    }

    fn last(&self) -> Reply {
        self.last.borrow().clone().expect("a response was recorded")
    }

    fn loan_id(&self) -> String {
        self.loan_id.borrow().clone().expect("a loan was created")
    }

    fn move_loan(&self, status: &str, reason: Option<&str>) {
        let id = self.loan_id();
        let reply = self.portal.borrow_mut().change_status(&id, status, reason);
        self.record(reply);
    }
}

#[fixture]
fn world() -> LifecycleWorld {
    LifecycleWorld {
        portal: RefCell::new(Portal::start()),
        loan_id: RefCell::new(None),
        last: RefCell::new(None),
    }
}

#[given("the applicant is signed in")]
fn the_applicant_is_signed_in(world: &LifecycleWorld) {
    let reply = world.portal.borrow_mut().login_as_user();
    assert_eq!(reply.status, 303);
}

#[given("a visitor without a session")]
fn a_visitor_without_a_session(world: &LifecycleWorld) {
    world.portal.borrow_mut().clear_cookies();
}

#[when("the administrator signs in")]
fn the_administrator_signs_in(world: &LifecycleWorld) {
    let reply = world.portal.borrow_mut().login_as_admin();
    assert_eq!(reply.status, 303);
}

#[when("the applicant applies for a loan")]
fn the_applicant_applies_for_a_loan(world: &LifecycleWorld) {
    let id = world.portal.borrow_mut().apply("Acme Traders");
    world.loan_id.replace(Some(id));
}

#[when("the applicant submits the loan")]
fn the_applicant_submits_the_loan(world: &LifecycleWorld) {
    world.move_loan("SUBMITTED", None);
}

#[when("the applicant edits the loan")]
fn the_applicant_edits_the_loan(world: &LifecycleWorld) {
    let id = world.loan_id();
    let reply = world
        .portal
        .borrow_mut()
        .post(&format!("/dashboard/loans/{id}/edit"), application("Renamed"));
    world.record(reply);
}

#[when("the administrator moves the loan to {status}")]
fn the_administrator_moves_the_loan_to(world: &LifecycleWorld, status: String) {
    world.move_loan(&status, None);
}

#[when("the administrator rejects the loan without a reason")]
fn the_administrator_rejects_the_loan_without_a_reason(world: &LifecycleWorld) {
    world.move_loan("REJECTED", None);
}

#[when("the administrator rejects the loan because {reason}")]
fn the_administrator_rejects_the_loan_because(world: &LifecycleWorld, reason: String) {
    world.move_loan("REJECTED", Some(&reason));
}

#[when("the client opens {path}")]
fn the_client_opens(world: &LifecycleWorld, path: String) {
    let reply = world.portal.borrow_mut().get(&path);
    world.record(reply);
}

#[then("the loan status is {status}")]
fn the_loan_status_is(world: &LifecycleWorld, status: String) {
    let reply = world.last();
    assert_eq!(reply.status, 200, "unexpected body {:?}", reply.body);
    assert_eq!(reply.str_at("/loan/status"), Some(status.as_str()));
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &LifecycleWorld, status: u16) {
    assert_eq!(world.last().status, status);
}

#[then("the client is redirected to {location}")]
fn the_client_is_redirected_to(world: &LifecycleWorld, location: String) {
    let reply = world.last();
    assert_eq!(reply.status, 303);
    assert_eq!(reply.location.as_deref(), Some(location.as_str()));
}

#[scenario(
    path = "tests/features/loan_lifecycle.feature",
    name = "An application travels from draft to approval"
)]
fn an_application_travels_from_draft_to_approval(world: LifecycleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/loan_lifecycle.feature",
    name = "A rejection needs a reason"
)]
fn a_rejection_needs_a_reason(world: LifecycleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/loan_lifecycle.feature",
    name = "Submitted applications are locked"
)]
fn submitted_applications_are_locked(world: LifecycleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/loan_lifecycle.feature",
    name = "Applicants are turned back from the review queue"
)]
fn applicants_are_turned_back_from_the_review_queue(world: LifecycleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/loan_lifecycle.feature",
    name = "Visitors without a session are sent to login"
)]
fn visitors_without_a_session_are_sent_to_login(world: LifecycleWorld) {
    drop(world);
}
