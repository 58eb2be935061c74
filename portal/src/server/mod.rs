//! Server construction and middleware wiring.

mod settings;

pub use settings::PortalSettings;

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tracing::info;

use portal::Trace;
#[cfg(debug_assertions)]
use portal::doc::ApiDoc;
use portal::inbound::http::configure;
use portal::inbound::http::health::{HealthState, live, ready};
use portal::inbound::http::session_config::SessionSettings;
use portal::inbound::http::state::{HttpState, HttpStateOptions, HttpStatePorts};
use portal::outbound::backend::BackendClient;
use portal::outbound::memory::InMemoryBackend;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Everything `create_server` needs, resolved from settings at startup.
pub struct ServerConfig {
    pub session: SessionSettings,
    pub bind_addr: SocketAddr,
    pub ports: HttpStatePorts,
    pub options: HttpStateOptions,
}

impl ServerConfig {
    /// Resolve settings into a server configuration.
    ///
    /// # Errors
    /// Fails when a setting is malformed or the backend client cannot be
    /// built.
    pub fn from_settings(
        settings: &PortalSettings,
        session: SessionSettings,
    ) -> color_eyre::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let ports = if settings.memory_backend() {
            info!("serving from the in-memory backend with demo accounts");
            let backend = Arc::new(InMemoryBackend::with_demo_accounts(Arc::clone(&clock)));
            HttpStatePorts {
                auth: backend.clone(),
                loans: backend.clone(),
                users: backend,
                clock,
            }
        } else {
            let client = Arc::new(BackendClient::new(
                settings.backend_url()?,
                settings.request_timeout(),
            )?);
            info!(backend = %client.base(), "using the REST backend");
            HttpStatePorts {
                auth: client.clone(),
                loans: client.clone(),
                users: client,
                clock,
            }
        };

        Ok(Self {
            session,
            bind_addr: settings.bind_addr()?,
            ports,
            options: HttpStateOptions {
                probe_ttl: settings.probe_ttl(),
                page_size: settings.page_size()?,
            },
        })
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
    } = deps;

    let portal = web::scope("")
        .wrap(session.middleware())
        .configure(configure);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.service(portal)
}

/// Construct an Actix HTTP server and mark it ready.
///
/// The [`HttpState`] is built once here and shared by every worker, so the
/// loan desk's in-flight guard sees all requests.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        session,
        bind_addr,
        ports,
        options,
    } = config;
    let http_state = web::Data::new(HttpState::new(ports, options));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    info!(%bind_addr, "portal listening");
    Ok(server)
}
