//! End-to-end checks of the portal's route entries over the in-memory backend.
//!
//! Each test drives a real server the way a browser would: it keeps the
//! session cookie, does not follow redirects and reads JSON bodies.

#[path = "support/portal.rs"]
mod portal_support;

use portal_support::{ADMIN_EMAIL, PAGE_SIZE, Portal, USER_EMAIL, application};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn portal() -> Portal {
    Portal::start()
}

fn signed_in_user() -> Portal {
    let mut portal = Portal::start();
    let reply = portal.login_as_user();
    assert_eq!(reply.status, 303);
    portal
}

#[rstest]
fn login_page_is_open_without_a_session(mut portal: Portal) {
    let reply = portal.get("/login");

    assert_eq!(reply.status, 200);
    assert_eq!(reply.str_at("/action"), Some("/login"));
}

#[rstest]
#[case("/dashboard")]
#[case("/dashboard/loans")]
#[case("/dashboard/review-loans")]
#[case("/dashboard/apply-loan")]
#[case("/dashboard/users")]
#[case("/dashboard/loans/loan-1")]
fn protected_entries_redirect_to_login_without_a_session(mut portal: Portal, #[case] path: &str) {
    let reply = portal.get(path);

    assert_eq!(reply.status, 303, "{path}");
    assert_eq!(reply.location.as_deref(), Some("/login"));
}

#[rstest]
fn signing_in_lands_on_the_dashboard(mut portal: Portal) {
    let reply = portal.login_as_user();

    assert_eq!(reply.status, 303);
    assert_eq!(reply.location.as_deref(), Some("/dashboard"));
    assert!(portal.has_session_cookie());

    let dashboard = portal.get("/dashboard");
    assert_eq!(dashboard.status, 200);
    assert_eq!(dashboard.str_at("/email"), Some(USER_EMAIL));
    assert_eq!(dashboard.str_at("/role"), Some("USER"));
    assert_eq!(dashboard.str_at("/listingTarget"), Some("/dashboard/loans"));
}

#[rstest]
fn bad_credentials_return_to_login_without_a_session(mut portal: Portal) {
    let reply = portal.login(USER_EMAIL, "wrong");

    assert_eq!(reply.status, 303);
    assert_eq!(reply.location.as_deref(), Some("/login"));
    assert!(!portal.has_session_cookie());
}

#[rstest]
fn blank_credentials_are_rejected_before_the_backend(mut portal: Portal) {
    let reply = portal.login("", "user123");

    assert_eq!(reply.status, 400);
    assert_eq!(reply.str_at("/code"), Some("invalid_request"));
    assert_eq!(reply.str_at("/details/field"), Some("email"));
}

#[rstest]
fn a_signed_in_visitor_skips_the_login_page() {
    let mut portal = signed_in_user();

    let reply = portal.get("/login");

    assert_eq!(reply.status, 303);
    assert_eq!(reply.location.as_deref(), Some("/dashboard"));
}

#[rstest]
fn logout_ends_the_session() {
    let mut portal = signed_in_user();

    let reply = portal.post("/logout", Value::Null);
    assert_eq!(reply.status, 303);
    assert_eq!(reply.location.as_deref(), Some("/login"));
    assert!(!portal.has_session_cookie());

    let after = portal.get("/dashboard");
    assert_eq!(after.location.as_deref(), Some("/login"));
}

#[rstest]
#[case("/dashboard/review-loans")]
#[case("/dashboard/users")]
fn applicants_are_turned_back_from_admin_entries(#[case] path: &str) {
    let mut portal = signed_in_user();

    let reply = portal.get(path);

    assert_eq!(reply.status, 303);
    assert_eq!(reply.location.as_deref(), Some("/dashboard"));
}

#[rstest]
fn administrators_cannot_submit_applications(mut portal: Portal) {
    portal.login_as_admin();

    let reply = portal.post("/dashboard/apply-loan", application("Acme Traders"));

    assert_eq!(reply.status, 403);
    assert_eq!(reply.str_at("/code"), Some("action_forbidden"));
}

#[rstest]
fn administrators_are_pointed_at_the_review_queue(mut portal: Portal) {
    portal.login_as_admin();

    let dashboard = portal.get("/dashboard");

    assert_eq!(dashboard.str_at("/email"), Some(ADMIN_EMAIL));
    assert_eq!(
        dashboard.str_at("/listingTarget"),
        Some("/dashboard/review-loans")
    );
}

#[rstest]
fn emi_preview_reflects_the_entered_terms() {
    let mut portal = signed_in_user();

    let reply = portal.get("/dashboard/emi-preview?amount=100000&tenureMonths=12&interestRate=12");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body.get("emi").and_then(Value::as_i64), Some(8885));

    let incomplete = portal.get("/dashboard/emi-preview?amount=100000&tenureMonths=abc");
    assert_eq!(incomplete.status, 200);
    assert!(incomplete.body.get("emi").is_some_and(Value::is_null));
}

#[rstest]
fn applying_creates_a_draft_with_a_detail_location() {
    let mut portal = signed_in_user();

    let reply = portal.post("/dashboard/apply-loan", application("Acme Traders"));

    assert_eq!(reply.status, 201);
    let id = reply.str_at("/loan/id").expect("loan id").to_owned();
    assert_eq!(
        reply.location.as_deref(),
        Some(format!("/dashboard/loans/{id}").as_str())
    );
    assert_eq!(reply.str_at("/loan/status"), Some("DRAFT"));
    assert_eq!(reply.body.get("canEdit"), Some(&Value::Bool(true)));
    assert_eq!(reply.body.pointer("/availableActions"), Some(&json!(["submit"])));
}

#[rstest]
fn invalid_applications_name_the_offending_field() {
    let mut portal = signed_in_user();
    let mut body = application("Acme Traders");
    body["tenureMonths"] = json!(3);

    let reply = portal.post("/dashboard/apply-loan", body);

    assert_eq!(reply.status, 400);
    assert_eq!(reply.str_at("/details/field"), Some("tenureMonths"));
}

#[rstest]
fn the_full_workflow_reaches_approval() {
    let mut portal = signed_in_user();
    let id = portal.apply("Acme Traders");

    let submitted = portal.change_status(&id, "SUBMITTED", None);
    assert_eq!(submitted.status, 200);
    assert_eq!(submitted.str_at("/loan/status"), Some("SUBMITTED"));

    let edit = portal.post(&format!("/dashboard/loans/{id}/edit"), application("Renamed"));
    assert_eq!(edit.status, 409);
    assert_eq!(edit.str_at("/code"), Some("edit_not_allowed"));

    let self_review = portal.change_status(&id, "UNDER_REVIEW", None);
    assert_eq!(self_review.status, 403);
    assert_eq!(self_review.str_at("/code"), Some("action_forbidden"));

    portal.login_as_admin();
    let reviewing = portal.change_status(&id, "UNDER_REVIEW", None);
    assert_eq!(reviewing.str_at("/loan/status"), Some("UNDER_REVIEW"));
    assert_eq!(reviewing.body.get("canSanction"), Some(&Value::Bool(true)));

    let no_reason = portal.change_status(&id, "REJECTED", Some("  "));
    assert_eq!(no_reason.status, 422);
    assert_eq!(no_reason.str_at("/code"), Some("missing_reason"));

    let approved = portal.change_status(&id, "APPROVED", None);
    assert_eq!(approved.status, 200);
    assert_eq!(approved.str_at("/loan/status"), Some("APPROVED"));
    assert_eq!(approved.body.pointer("/availableActions"), Some(&json!([])));

    let again = portal.change_status(&id, "APPROVED", None);
    assert_eq!(again.status, 409);
    assert_eq!(again.str_at("/code"), Some("invalid_transition"));
}

#[rstest]
fn rejected_loans_keep_their_reason() {
    let mut portal = signed_in_user();
    let id = portal.apply("Acme Traders");
    portal.change_status(&id, "SUBMITTED", None);
    portal.login_as_admin();
    portal.change_status(&id, "UNDER_REVIEW", None);

    let rejected = portal.change_status(&id, "REJECTED", Some("Insufficient collateral"));

    assert_eq!(rejected.status, 200);
    assert_eq!(rejected.str_at("/loan/status"), Some("REJECTED"));
    assert_eq!(
        rejected.str_at("/loan/rejectionReason"),
        Some("Insufficient collateral")
    );
}

#[rstest]
fn workflow_errors_carry_the_trace_id() {
    let mut portal = signed_in_user();
    let id = portal.apply("Acme Traders");

    let reply = portal.change_status(&id, "APPROVED", None);

    assert_eq!(reply.status, 403);
    let trace_id = reply.trace_id.as_deref().expect("trace id header");
    assert_eq!(reply.str_at("/traceId"), Some(trace_id));
}

#[rstest]
fn missing_loans_return_to_the_listing_with_a_notice() {
    let mut portal = signed_in_user();

    let reply = portal.get("/dashboard/loans/loan-404");
    assert_eq!(reply.status, 303);
    let location = reply.location.expect("location");
    assert_eq!(location, "/dashboard/loans?notice=loan-not-found");

    let listing = portal.get(&location);
    assert_eq!(listing.status, 200);
    assert_eq!(listing.str_at("/notice"), Some("loan-not-found"));
}

#[rstest]
fn the_listing_pages_forward_and_back() {
    let mut portal = signed_in_user();
    for name in ["First", "Second", "Third"] {
        portal.apply(name);
    }

    let first = portal.get("/dashboard/loans");
    assert_eq!(first.status, 200);
    assert_eq!(
        first.body.pointer("/page/content").and_then(Value::as_array).map(Vec::len),
        Some(usize::try_from(PAGE_SIZE).expect("page size"))
    );
    assert_eq!(first.body.get("hasNext"), Some(&Value::Bool(true)));
    assert_eq!(first.body.get("hasPrevious"), Some(&Value::Bool(false)));

    let second = portal.post("/dashboard/loans/next", Value::Null);
    assert_eq!(second.status, 200);
    assert_eq!(second.str_at("/page/content/0/clientName"), Some("Third"));
    assert_eq!(second.body.get("hasNext"), Some(&Value::Bool(false)));

    let beyond = portal.post("/dashboard/loans/next", Value::Null);
    assert_eq!(beyond.status, 204);

    let back = portal.post("/dashboard/loans/previous", Value::Null);
    assert_eq!(back.status, 200);
    assert_eq!(back.str_at("/page/content/0/clientName"), Some("First"));
}

#[rstest]
fn status_filters_narrow_the_listing() {
    let mut portal = signed_in_user();
    let submitted = portal.apply("Submitted Co");
    portal.apply("Draft Co");
    portal.change_status(&submitted, "SUBMITTED", None);

    let filtered = portal.get("/dashboard/loans?status=SUBMITTED");
    assert_eq!(filtered.str_at("/statusFilter"), Some("SUBMITTED"));
    assert_eq!(
        filtered.body.pointer("/page/totalElements").and_then(Value::as_u64),
        Some(1)
    );

    let unknown = portal.get("/dashboard/loans?status=PENDING");
    assert_eq!(unknown.status, 400);
    assert_eq!(unknown.str_at("/details/field"), Some("status"));
}

#[rstest]
fn administrators_manage_accounts(mut portal: Portal) {
    portal.login_as_admin();

    let listed = portal.get("/dashboard/users");
    assert_eq!(listed.status, 200);
    assert_eq!(
        listed.body.get("users").and_then(Value::as_array).map(Vec::len),
        Some(2)
    );

    let created = portal.post(
        "/dashboard/users",
        json!({ "email": "analyst@loanapp.com", "password": "s3cret", "role": "USER" }),
    );
    assert_eq!(created.status, 201);
    assert_eq!(created.str_at("/email"), Some("analyst@loanapp.com"));
    assert_eq!(created.body.get("active"), Some(&Value::Bool(true)));

    let duplicate = portal.post(
        "/dashboard/users",
        json!({ "email": "analyst@loanapp.com", "password": "s3cret", "role": "USER" }),
    );
    assert_eq!(duplicate.status, 502);
    assert_eq!(duplicate.str_at("/code"), Some("backend_rejection"));

    let malformed = portal.post(
        "/dashboard/users",
        json!({ "email": "not-an-email", "password": "s3cret", "role": "USER" }),
    );
    assert_eq!(malformed.status, 400);
    assert_eq!(malformed.str_at("/details/field"), Some("email"));
}

#[rstest]
fn deactivated_applicants_lose_their_session() {
    let mut portal = signed_in_user();
    let applicant_cookie = portal.swap_cookie(None);

    portal.login_as_admin();
    let listed = portal.get("/dashboard/users");
    let applicant_id = listed
        .body
        .get("users")
        .and_then(Value::as_array)
        .and_then(|users| {
            users
                .iter()
                .find(|user| user.get("email").and_then(Value::as_str) == Some(USER_EMAIL))
        })
        .and_then(|user| user.get("id"))
        .and_then(Value::as_str)
        .expect("applicant id")
        .to_owned();
    let deactivated = portal.put(
        &format!("/dashboard/users/{applicant_id}/status"),
        json!({ "active": false }),
    );
    assert_eq!(deactivated.body.get("active"), Some(&Value::Bool(false)));

    portal.swap_cookie(applicant_cookie);
    let reply = portal.get("/dashboard/loans");

    assert_eq!(reply.status, 303);
    assert_eq!(reply.location.as_deref(), Some("/login"));
    assert!(!portal.has_session_cookie());
}

#[rstest]
#[case("/health/ready")]
#[case("/health/live")]
fn probes_answer_without_a_session(mut portal: Portal, #[case] path: &str) {
    let reply = portal.get(path);

    assert_eq!(reply.status, 200);
    assert_eq!(reply.str_at("/status"), Some("ok"));
}
