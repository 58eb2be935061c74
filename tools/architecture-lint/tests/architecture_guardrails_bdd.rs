//! Behaviour tests for the portal boundary lint.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use architecture_lint::{LintError, Violation};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

const GUARDED_LOAN_PAGE: &str = r#"
use actix_web::{HttpResponse, get, web};
use crate::domain::{LoanId, PortalRoute};
use super::guard::enter;

#[get("/dashboard/loans/{id}")]
async fn show_loan(state: web::Data<State>, session: Session, id: web::Path<String>) -> Result<HttpResponse, Error> {
    let entry = enter(&state, &session, PortalRoute::LoanDetail).await?;
    let loan = state.loans.fetch(&entry, &LoanId::new(id.into_inner())).await?;
    Ok(HttpResponse::Ok().json(loan))
}
"#;

const UNGUARDED_LOAN_PAGE: &str = r#"
use actix_web::{HttpResponse, get, web};
use crate::domain::LoanId;

#[get("/dashboard/loans/{id}")]
async fn show_loan(state: web::Data<State>, id: web::Path<String>) -> Result<HttpResponse, Error> {
    let loan = state.loans.fetch(&LoanId::new(id.into_inner())).await?;
    Ok(HttpResponse::Ok().json(loan))
}
"#;

const LOAN_DESK: &str = r#"
use std::sync::Arc;
use crate::domain::ports::LoanGateway;

pub struct LoanDesk {
    loans: Arc<dyn LoanGateway>,
}
"#;

const LOAN_DESK_WITH_CLIENT: &str = r#"
use crate::outbound::backend::BackendClient;

pub struct LoanDesk {
    client: BackendClient,
}
"#;

const LOAN_PORT: &str = r#"
use async_trait::async_trait;
use crate::domain::{Loan, LoanId};

#[async_trait]
pub trait LoanGateway: Send + Sync {
    async fn fetch(&self, id: &LoanId) -> Result<Loan, GatewayError>;
}
"#;

const SESSION_ADAPTER: &str = r#"
use actix_session::Session as CookieSession;

pub struct SessionContext(CookieSession);
"#;

const BACKEND_ADAPTER: &str = r#"
use reqwest::Client;
use crate::domain::ports::LoanGateway;

pub struct HttpLoanGateway {
    client: Client,
}
"#;

#[derive(Debug, Default)]
struct LintWorld {
    sources: BTreeMap<&'static str, String>,
    result: Option<Result<usize, LintError>>,
    expected: Vec<PathBuf>,
}

#[fixture]
fn world() -> Mutex<LintWorld> {
    Mutex::new(LintWorld::default())
}

fn put_source(world: &Mutex<LintWorld>, file: &'static str, contents: &str) {
    let mut world = world.lock().expect("world lock");
    world.sources.insert(file, contents.to_owned());
}

fn layered_portal(world: &Mutex<LintWorld>) {
    put_source(world, "domain/loan_desk.rs", LOAN_DESK);
    put_source(world, "domain/ports/loan_gateway.rs", LOAN_PORT);
    put_source(world, "inbound/http/loans.rs", GUARDED_LOAN_PAGE);
    put_source(world, "inbound/http/session.rs", SESSION_ADAPTER);
    put_source(world, "outbound/backend/loans.rs", BACKEND_ADAPTER);
}

#[given("a portal with a guarded loan page, a desk over its port and a backend adapter")]
fn a_layered_portal(world: &Mutex<LintWorld>) {
    layered_portal(world);
}

#[given("a loan detail handler that reads the loan without calling enter")]
fn an_unguarded_loan_page(world: &Mutex<LintWorld>) {
    put_source(world, "inbound/http/loans.rs", UNGUARDED_LOAN_PAGE);
}

#[given("a loan desk that builds the backend client itself")]
fn a_desk_with_its_own_client(world: &Mutex<LintWorld>) {
    put_source(world, "domain/loan_desk.rs", LOAN_DESK_WITH_CLIENT);
}

#[given("a loan gateway port that imports the loan desk")]
fn a_port_over_the_desk(world: &Mutex<LintWorld>) {
    let contents = format!("use crate::domain::loan_desk::LoanDesk;\n{LOAN_PORT}");
    put_source(world, "domain/ports/loan_gateway.rs", &contents);
}

#[given("an in-memory backend that builds an HTTP client")]
fn a_memory_backend_with_http(world: &Mutex<LintWorld>) {
    put_source(
        world,
        "outbound/memory/mod.rs",
        "pub struct InMemoryBackend; \
         impl InMemoryBackend { pub fn client() -> reqwest::Client { reqwest::Client::new() } }",
    );
}

#[given("a users handler that reads the cookie session directly")]
fn a_users_page_with_the_cookie_session(world: &Mutex<LintWorld>) {
    put_source(
        world,
        "inbound/http/users.rs",
        r#"
use actix_session::Session;
use actix_web::{HttpResponse, get};

#[get("/dashboard/users")]
async fn list_users(state: State, session: Session) -> Result<HttpResponse, Error> {
    let _entry = enter(&state, &session, PortalRoute::Users).await?;
    Ok(HttpResponse::Ok().finish())
}
"#,
    );
}

#[given("a layered portal with an unguarded page and a desk that builds the backend client")]
fn a_portal_with_two_breaches(world: &Mutex<LintWorld>) {
    layered_portal(world);
    an_unguarded_loan_page(world);
    a_desk_with_its_own_client(world);
}

#[when("the architecture lint runs")]
fn run_architecture_lint(world: &Mutex<LintWorld>) {
    let sources = world.lock().expect("world lock").sources.clone();

    let temp_dir = TempDir::new().expect("tempdir");
    let portal_dir = temp_dir.path().join("portal");
    let src_dir = portal_dir.join("src");
    for (file, contents) in &sources {
        let path = src_dir.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directories");
        }
        fs::write(&path, contents).expect("write source file");
    }

    let result = architecture_lint::lint_portal_sources(&portal_dir);
    world.lock().expect("world lock").result = Some(result);
}

#[then("the lint succeeds")]
fn lint_succeeds(world: &Mutex<LintWorld>) {
    let world = world.lock().expect("world lock");
    let outcome = world.result.as_ref().expect("lint must have run");
    assert!(
        matches!(outcome, Ok(checked) if *checked == world.sources.len()),
        "expected every file to pass, got: {outcome:?}"
    );
}

fn violations(world: &LintWorld) -> Vec<Violation> {
    match world.result.as_ref().expect("lint must have run") {
        Err(LintError::Violations(found)) => found.clone(),
        other => panic!("expected violations, got: {other:?}"),
    }
}

#[then("the {rule} rule flags {file}")]
fn rule_flags_file(world: &Mutex<LintWorld>, rule: String, file: String) {
    let mut world = world.lock().expect("world lock");
    let found = violations(&world);
    let file = PathBuf::from(file);
    assert!(
        found
            .iter()
            .any(|violation| violation.file == file && violation.rule.name() == rule),
        "expected a {rule} violation in {file:?}, got: {found:?}"
    );
    world.expected.push(file);
}

#[then("no other file is flagged")]
fn no_other_file_is_flagged(world: &Mutex<LintWorld>) {
    let world = world.lock().expect("world lock");
    let stray: Vec<_> = violations(&world)
        .into_iter()
        .filter(|violation| !world.expected.contains(&violation.file))
        .collect();
    assert!(stray.is_empty(), "unexpected violations: {stray:?}");
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "A layered portal passes the lint"
)]
fn a_layered_portal_passes(world: Mutex<LintWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "A loan page that skips the access guard is refused"
)]
fn an_unguarded_loan_page_is_refused(world: Mutex<LintWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "The loan desk may not reach past its port"
)]
fn the_desk_stays_behind_its_port(world: Mutex<LintWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "A port may not lean on the loan desk"
)]
fn ports_stay_below_the_desk(world: Mutex<LintWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "The demo backend may not speak HTTP"
)]
fn the_demo_backend_stays_offline(world: Mutex<LintWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "Only the session adapter reads the cookie session"
)]
fn the_cookie_session_stays_in_its_adapter(world: Mutex<LintWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "Every violation is reported"
)]
fn every_violation_is_reported(world: Mutex<LintWorld>) {
    let _ = world;
}
