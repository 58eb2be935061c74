//! Unit tests for the portal boundary lint.

use std::path::Path;

use rstest::rstest;

use super::*;

fn rules_broken(file: &str, contents: &str) -> Vec<Rule> {
    match lint_sources(&[LintSource::new(file, contents)]) {
        Ok(()) => Vec::new(),
        Err(LintError::Violations(found)) => found.into_iter().map(|v| v.rule).collect(),
        Err(other) => panic!("expected a verdict, got: {other}"),
    }
}

#[rstest]
#[case(
    "inbound/http/loans.rs",
    "use crate::domain::LoanId; fn handler() { let _ = LoanId::new(\"loan-1\"); }",
    &[]
)]
#[case(
    "inbound/http/loans.rs",
    "use crate::outbound::backend::BackendClient; fn handler() { let _ = BackendClient::base; }",
    &[Rule::Layers]
)]
#[case(
    "inbound/http/loans.rs",
    "fn handler() { let _ = portal::outbound::memory::InMemoryBackend::new(); }",
    &[Rule::Layers]
)]
#[case(
    "domain/loan_desk.rs",
    "use crate::domain::ports::LoanGateway; fn desk() {}",
    &[]
)]
#[case(
    "domain/calculator.rs",
    "use super::super::inbound::http; fn emi() {}",
    &[Rule::Layers]
)]
#[case(
    "domain/loan/mod.rs",
    "use utoipa::ToSchema; #[derive(ToSchema)] struct Loan;",
    &[Rule::Layers]
)]
#[case(
    "outbound/backend/loans.rs",
    "use reqwest::Method; fn verb() -> Method { Method::GET }",
    &[]
)]
#[case(
    "outbound/backend/loans.rs",
    "fn reply() { let _ = actix_web::HttpResponse::Ok(); }",
    &[Rule::Layers]
)]
fn layers_keep_their_dependencies(
    #[case] file: &str,
    #[case] contents: &str,
    #[case] expected: &[Rule],
) {
    assert_eq!(rules_broken(file, contents), expected);
}

#[rstest]
#[case("use crate::domain::{BearerToken, Identity, LoginCredentials};", &[])]
#[case("use crate::domain::loan_desk::LoanDesk;", &[Rule::Ports])]
#[case("use crate::domain::LoginService;", &[Rule::Ports])]
#[case("use super::super::listing::LoanListing;", &[Rule::Ports])]
fn ports_stay_below_the_services(#[case] contents: &str, #[case] expected: &[Rule]) {
    assert_eq!(rules_broken("domain/ports/loan_gateway.rs", contents), expected);
}

#[rstest]
#[case("inbound/http/session.rs", "use actix_session::Session;", &[])]
#[case(
    "inbound/http/session_config/parsing.rs",
    "use actix_session::config::PersistentSession;",
    &[]
)]
#[case(
    "inbound/http/users.rs",
    "use actix_session::Session;",
    &[Rule::Confinement]
)]
#[case("outbound/backend/client.rs", "use reqwest::Client;", &[])]
#[case(
    "outbound/memory/mod.rs",
    "fn client() { let _ = reqwest::Client::new(); }",
    &[Rule::Confinement]
)]
fn adapter_crates_stay_in_their_adapter(
    #[case] file: &str,
    #[case] contents: &str,
    #[case] expected: &[Rule],
) {
    assert_eq!(rules_broken(file, contents), expected);
}

#[rstest]
#[case(
    "#[get(\"/dashboard/loans/{id}\")] \
     async fn show(state: State, session: Session) -> Reply { \
         let _ = enter(&state, &session, PortalRoute::LoanDetail).await?; Reply::ok() }",
    &[]
)]
#[case(
    "#[post(\"/dashboard/loans/next\")] \
     async fn next(state: State, session: Session) -> Reply { step_listing(&state, &session).await } \
     async fn step_listing(state: &State, session: &Session) -> Reply { \
         let _ = enter(state, session, PortalRoute::Loans).await?; Reply::ok() }",
    &[]
)]
#[case(
    "#[get(\"/dashboard/users\")] async fn users(state: State) -> Reply { state.users().await }",
    &[Rule::Guard]
)]
#[case(
    "#[get(\"/dashboard\")] async fn home(listing: Listing) -> Reply { listing.enter(1).await }",
    &[Rule::Guard]
)]
#[case(
    "#[post(\"/login\")] async fn login(state: State) -> Reply { state.login().await }",
    &[]
)]
#[case(
    "#[get(\"/health/ready\")] async fn ready() -> Reply { Reply::ok() }",
    &[]
)]
fn handlers_pass_through_the_guard(#[case] contents: &str, #[case] expected: &[Rule]) {
    assert_eq!(rules_broken("inbound/http/loans.rs", contents), expected);
}

#[rstest]
fn guard_is_only_required_of_http_handlers() {
    let contents = "#[get(\"/dashboard\")] async fn home() {}";
    assert!(rules_broken("outbound/memory/mod.rs", contents).is_empty());
}

#[rstest]
fn test_only_items_are_ignored() {
    let contents = "pub fn emi() {} \
         #[cfg(test)] mod tests { use actix_web::test; use crate::outbound::memory::InMemoryBackend; }";
    assert!(rules_broken("domain/calculator.rs", contents).is_empty());
}

#[rstest]
fn findings_carry_file_and_rule() {
    let err = lint_sources(&[LintSource::new(
        "domain/users.rs",
        "use reqwest::Client; use crate::outbound::backend::BackendClient;",
    )])
    .expect_err("two layer breaches");
    let rendered: Vec<String> = err.violations().iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        [
            "domain/users.rs [layers]: domain code must not depend on crate::outbound",
            "domain/users.rs [layers]: domain code must not use the `reqwest` crate",
        ]
    );
}

#[rstest]
#[case("domain/loan_desk.rs", Some(Layer::Domain))]
#[case("domain/ports/mod.rs", Some(Layer::Ports))]
#[case("inbound/http/guard.rs", Some(Layer::Inbound))]
#[case("outbound/memory/mod.rs", Some(Layer::Outbound))]
#[case("server/mod.rs", None)]
fn files_map_to_their_layer(#[case] file: &str, #[case] expected: Option<Layer>) {
    assert_eq!(Layer::of(Path::new(file)), expected);
}

#[rstest]
#[case("outbound/backend/tests.rs", true)]
#[case("inbound/http/test_utils.rs", true)]
#[case("domain/test_support.rs", true)]
#[case("inbound/http/tests/fixtures.rs", true)]
#[case("outbound/backend/client.rs", false)]
#[case("domain/loan/status_machine.rs", false)]
fn test_only_files_are_recognised(#[case] file: &str, #[case] expected: bool) {
    assert_eq!(is_test_source(Path::new(file)), expected);
}

#[rstest]
fn files_outside_a_layer_are_refused() {
    let result = lint_sources(&[LintSource::new("server/mod.rs", "fn main() {}")]);
    assert!(
        matches!(result, Err(LintError::UnknownLayer(_))),
        "result: {result:?}"
    );
}

#[rstest]
fn unparsable_sources_are_reported() {
    let result = lint_sources(&[LintSource::new("domain/users.rs", "fn broken( {")]);
    assert!(
        matches!(result, Err(LintError::Parse { .. })),
        "result: {result:?}"
    );
}
