//! Portal harness: a real Actix server over the in-memory backend.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The browser side keeps the latest
//! session cookie between requests and never follows redirects, so tests can
//! assert on `303 See Other` locations.

use std::net::TcpListener;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};
use awc::Client;
use chrono::Duration;
use mockable::DefaultClock;
use portal::Trace;
use portal::domain::TRACE_ID_HEADER;
use portal::inbound::http::configure;
use portal::inbound::http::health::{HealthState, live, ready};
use portal::inbound::http::session_config::{KeySource, SessionSettings};
use portal::inbound::http::state::{HttpState, HttpStateOptions, HttpStatePorts};
use portal::outbound::memory::InMemoryBackend;
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

pub(crate) const USER_EMAIL: &str = "user@loanapp.com";
pub(crate) const USER_PASSWORD: &str = "user123";
pub(crate) const ADMIN_EMAIL: &str = "admin@loanapp.com";
pub(crate) const ADMIN_PASSWORD: &str = "admin123";

/// Rows per listing page in the harness.
pub(crate) const PAGE_SIZE: u32 = 2;

/// What the browser saw for one request.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub(crate) status: u16,
    pub(crate) location: Option<String>,
    pub(crate) trace_id: Option<String>,
    pub(crate) body: Value,
}

impl Reply {
    pub(crate) fn str_at(&self, pointer: &str) -> Option<&str> {
        self.body.pointer(pointer).and_then(Value::as_str)
    }
}

pub(crate) struct Portal {
    runtime: Runtime,
    local: LocalSet,
    base_url: String,
    server: ServerHandle,
    pub(crate) backend: Arc<InMemoryBackend>,
    cookie: Option<String>,
}

impl Portal {
    /// Start a portal whose guard re-probes the backend on every entry.
    pub(crate) fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        let local = LocalSet::new();
        let backend = Arc::new(InMemoryBackend::with_demo_accounts(Arc::new(DefaultClock)));

        let (base_url, server) = local
            .block_on(&runtime, spawn_portal(Arc::clone(&backend)))
            .expect("portal server");

        Self {
            runtime,
            local,
            base_url,
            server,
            backend,
            cookie: None,
        }
    }

    pub(crate) fn has_session_cookie(&self) -> bool {
        self.cookie.is_some()
    }

    /// Forget the session cookie, as a fresh browser would.
    pub(crate) fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    /// Switch to another browser's cookie, returning the current one.
    pub(crate) fn swap_cookie(&mut self, other: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.cookie, other)
    }

    pub(crate) fn get(&mut self, path: &str) -> Reply {
        self.send(Method::GET, path, None)
    }

    pub(crate) fn post(&mut self, path: &str, payload: Value) -> Reply {
        self.send(Method::POST, path, Some(payload))
    }

    pub(crate) fn put(&mut self, path: &str, payload: Value) -> Reply {
        self.send(Method::PUT, path, Some(payload))
    }

    pub(crate) fn login(&mut self, email: &str, password: &str) -> Reply {
        self.post("/login", json!({ "email": email, "password": password }))
    }

    pub(crate) fn login_as_user(&mut self) -> Reply {
        self.login(USER_EMAIL, USER_PASSWORD)
    }

    pub(crate) fn login_as_admin(&mut self) -> Reply {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD)
    }

    /// Apply for a term loan and return its identifier.
    pub(crate) fn apply(&mut self, client_name: &str) -> String {
        let reply = self.post("/dashboard/apply-loan", application(client_name));
        assert_eq!(reply.status, 201, "apply failed: {:?}", reply.body);
        reply
            .str_at("/loan/id")
            .expect("created loan id")
            .to_owned()
    }

    pub(crate) fn change_status(&mut self, id: &str, status: &str, reason: Option<&str>) -> Reply {
        self.post(
            &format!("/dashboard/loans/{id}/status"),
            json!({ "status": status, "reason": reason }),
        )
    }

    fn send(&mut self, method: Method, path: &str, payload: Option<Value>) -> Reply {
        let url = format!("{}{path}", self.base_url);
        let cookie = self.cookie.clone();
        let (reply, set_cookie) = self.local.block_on(&self.runtime, async move {
            let client = Client::builder().disable_redirects().finish();
            let mut request = client.request(method, url);
            if let Some(cookie) = cookie {
                request = request.insert_header((header::COOKIE, cookie));
            }
            let mut response = match payload {
                Some(payload) => request.send_json(&payload).await,
                None => request.send().await,
            }
            .expect("portal request");

            let header_text = |name: header::HeaderName| {
                response
                    .headers()
                    .get(name)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned)
            };
            let set_cookie = header_text(header::SET_COOKIE);
            let location = header_text(header::LOCATION);
            let trace_id = header_text(header::HeaderName::from_static(TRACE_ID_HEADER));
            let status = response.status().as_u16();
            let bytes = response.body().await.expect("response body");
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (
                Reply {
                    status,
                    location,
                    trace_id,
                    body,
                },
                set_cookie,
            )
        });
        if let Some(set_cookie) = set_cookie {
            self.absorb(&set_cookie);
        }
        reply
    }

    fn absorb(&mut self, set_cookie: &str) {
        let pair = set_cookie.split(';').next().unwrap_or_default().trim();
        match pair.split_once('=') {
            Some(("session", "")) => self.cookie = None,
            Some(("session", _)) => self.cookie = Some(pair.to_owned()),
            _ => {}
        }
    }
}

impl Drop for Portal {
    fn drop(&mut self) {
        let server = self.server.clone();
        self.local.block_on(&self.runtime, async move {
            server.stop(true).await;
        });
    }
}

/// A valid application body.
pub(crate) fn application(client_name: &str) -> Value {
    json!({
        "clientName": client_name,
        "loanType": "TERM_LOAN",
        "requestedAmount": 100_000.0,
        "proposedInterestRate": 12.0,
        "tenureMonths": 12,
        "financials": { "revenue": 500_000.0, "ebitda": 80_000.0, "rating": "A" }
    })
}

async fn spawn_portal(backend: Arc<InMemoryBackend>) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;

    let http_state = web::Data::new(HttpState::new(
        HttpStatePorts {
            auth: backend.clone(),
            loans: backend.clone(),
            users: backend,
            clock: Arc::new(DefaultClock),
        },
        HttpStateOptions {
            probe_ttl: Duration::zero(),
            page_size: PAGE_SIZE,
        },
    ));
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();
    let session = SessionSettings {
        key: Key::generate(),
        key_source: KeySource::Ephemeral,
        cookie_secure: false,
        same_site: SameSite::Lax,
    };

    let server = HttpServer::new(move || {
        App::new()
            .app_data(http_state.clone())
            .app_data(health_state.clone())
            .wrap(Trace)
            .service(ready)
            .service(live)
            .service(
                web::scope("")
                    .wrap(session.middleware())
                    .configure(configure),
            )
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}
