//! Session cookie configuration read from the environment.
//!
//! | Variable                  | Release build     | Debug build              |
//! |---------------------------|-------------------|--------------------------|
//! | `SESSION_KEY_FILE`        | must be readable  | ephemeral key if missing |
//! | `SESSION_COOKIE_SECURE`   | required          | defaults to secure       |
//! | `SESSION_SAMESITE`        | required          | defaults to `Lax`        |
//! | `SESSION_ALLOW_EPHEMERAL` | required, must be off | defaults to off      |
//!
//! Debug builds log a warning for every value they had to default.

pub mod fingerprint;
mod parsing;

use std::path::PathBuf;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

use self::fingerprint::key_fingerprint;
use self::parsing::{Toggle, parse_bool, parse_same_site};

/// Where the key is read from when `SESSION_KEY_FILE` is unset.
pub const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
/// Shortest key file accepted in release builds.
pub const SESSION_KEY_MIN_LEN: usize = 64;
/// Shortest key material a cookie key can be derived from.
pub const SESSION_KEY_DERIVE_MIN_LEN: usize = 32;
/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "session";
/// Hours a session cookie stays valid.
pub const SESSION_TTL_HOURS: i64 = 2;

pub(crate) const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
pub(crate) const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub(crate) const SAMESITE_ENV: &str = "SESSION_SAMESITE";
pub(crate) const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Strict or lenient validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing or invalid values fall back to defaults with a warning.
    Debug,
    /// Missing or invalid values are fatal.
    Release,
}

impl BuildMode {
    /// Mode matching how this binary was compiled.
    ///
    /// # Examples
    /// ```
    /// use portal::inbound::http::session_config::BuildMode;
    ///
    /// let expected = if cfg!(debug_assertions) {
    ///     BuildMode::Debug
    /// } else {
    ///     BuildMode::Release
    /// };
    /// assert_eq!(BuildMode::from_debug_assertions(), expected);
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    pub(crate) fn is_lenient(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Where the active cookie key came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeySource {
    /// Derived from the bytes of a key file.
    File(PathBuf),
    /// Generated at startup; sessions do not survive a restart.
    Ephemeral,
}

/// Validated cookie settings.
#[derive(Clone)]
pub struct SessionSettings {
    pub key: Key,
    pub key_source: KeySource,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Short SHA-256 fingerprint of the signing key, safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        key_fingerprint(&self.key)
    }

    /// Private (encrypted) cookie session middleware for these settings.
    #[must_use]
    pub fn middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name(SESSION_COOKIE_NAME.to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(self.cookie_secure)
            .cookie_http_only(true)
            .cookie_content_security(CookieContentSecurity::Private)
            .cookie_same_site(self.same_site)
            .session_lifecycle(PersistentSession::default().session_ttl(
                actix_web::cookie::time::Duration::hours(SESSION_TTL_HOURS),
            ))
            .build()
    }
}

/// Invalid or missing session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Read and validate the session settings.
///
/// # Examples
/// ```
/// use mockable::MockEnv;
/// use portal::inbound::http::session_config::{BuildMode, session_settings_from_env};
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("lenient defaults");
/// assert!(settings.cookie_secure);
/// assert_eq!(settings.fingerprint().len(), 16);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = Toggle::read(env, COOKIE_SECURE_ENV, parse_bool)
        .resolve(mode, true, BOOL_EXPECTED)?;
    let same_site = read_same_site(env, mode, cookie_secure)?;
    let allow_ephemeral = Toggle::read(env, ALLOW_EPHEMERAL_ENV, parse_bool)
        .resolve(mode, false, BOOL_EXPECTED)?;
    if allow_ephemeral && !mode.is_lenient() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let (key, key_source) = load_key(env, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        key_source,
        cookie_secure,
        same_site,
    })
}

fn read_same_site<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let fallback = if mode.is_lenient() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let same_site = Toggle::read(env, SAMESITE_ENV, parse_same_site).resolve(
        mode,
        fallback,
        SAMESITE_EXPECTED,
    )?;
    if same_site == SameSite::None && !cookie_secure {
        if !mode.is_lenient() {
            return Err(SessionConfigError::InsecureSameSiteNone);
        }
        warn!("SESSION_SAMESITE=None without a secure cookie; browsers may drop the session");
    }
    Ok(same_site)
}

fn load_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<(Key, KeySource), SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path).map(Zeroizing::new) {
        Ok(bytes) => {
            let length = bytes.len();
            let min_len = if mode.is_lenient() {
                SESSION_KEY_DERIVE_MIN_LEN
            } else {
                SESSION_KEY_MIN_LEN
            };
            if length < min_len {
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len,
                });
            }
            Ok((Key::derive_from(&bytes), KeySource::File(path)))
        }
        Err(error) if mode.is_lenient() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                %error,
                "session key unreadable; using an ephemeral key"
            );
            Ok((Key::generate(), KeySource::Ephemeral))
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}
