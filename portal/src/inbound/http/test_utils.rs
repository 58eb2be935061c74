//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};

use super::session_config::{KeySource, SessionSettings};

/// Production cookie middleware with a fresh key and the `Secure` flag off,
/// so plain-HTTP test requests carry the cookie back.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionSettings {
        key: Key::generate(),
        key_source: KeySource::Ephemeral,
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
    .middleware()
}
