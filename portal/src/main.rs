//! Portal entry-point: loads settings, wires the backend and serves the
//! route entries.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use portal::inbound::http::health::HealthState;
use portal::inbound::http::session_config::{BuildMode, KeySource, session_settings_from_env};
use server::{PortalSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = PortalSettings::load_from_iter(std::env::args_os())?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())?;
    match &session.key_source {
        KeySource::File(path) => info!(
            path = %path.display(),
            fingerprint = %session.fingerprint(),
            "session key loaded"
        ),
        KeySource::Ephemeral => warn!(
            fingerprint = %session.fingerprint(),
            "using temporary session key (dev only)"
        ),
    }

    let config = ServerConfig::from_settings(&settings, session)?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await?;
    Ok(())
}
