//! Process settings loaded via OrthoConfig.
//!
//! Values come from `PORTAL_*` environment variables, an optional
//! configuration file and command-line flags. Session cookie settings are
//! read separately by `session_settings_from_env`.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BACKEND_URL: &str = "http://localhost:8080/api";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:4200";

/// Invalid values in otherwise well-formed settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("PORTAL_BACKEND_URL is not a valid URL: {0}")]
    BackendUrl(#[source] url::ParseError),
    #[error("PORTAL_BIND is not a socket address: {0}")]
    Bind(#[source] std::net::AddrParseError),
    #[error("PORTAL_PAGE_SIZE must be at least 1")]
    PageSize,
}

/// Settings controlling where the portal listens and which backend it uses.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// Base URL of the loan backend's REST API.
    pub backend_url: Option<String>,
    /// Listener address.
    pub bind: Option<String>,
    /// Per-request timeout for backend calls.
    #[ortho_config(default = 10)]
    pub request_timeout_secs: u64,
    /// Seconds a confirmed identity is trusted before the guard re-probes.
    #[ortho_config(default = 300)]
    pub probe_ttl_secs: i64,
    /// Rows per listing page.
    #[ortho_config(default = 10)]
    pub page_size: u32,
    /// Serve from the in-process backend seeded with demo accounts.
    pub memory_backend: Option<bool>,
}

impl PortalSettings {
    /// Parsed backend base URL.
    pub fn backend_url(&self) -> Result<Url, SettingsError> {
        Url::parse(self.backend_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL))
            .map_err(SettingsError::BackendUrl)
    }

    /// Parsed listener address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(SettingsError::Bind)
    }

    /// Whether to serve from the in-process demo backend.
    pub fn memory_backend(&self) -> bool {
        self.memory_backend.unwrap_or(false)
    }

    /// Backend request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Trust window of a confirmed identity.
    pub fn probe_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.probe_ttl_secs)
    }

    /// Listing page size, rejecting zero.
    pub fn page_size(&self) -> Result<u32, SettingsError> {
        if self.page_size == 0 {
            return Err(SettingsError::PageSize);
        }
        Ok(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for portal settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "PORTAL_BACKEND_URL",
        "PORTAL_BIND",
        "PORTAL_REQUEST_TIMEOUT_SECS",
        "PORTAL_PROBE_TTL_SECS",
        "PORTAL_PAGE_SIZE",
        "PORTAL_MEMORY_BACKEND",
    ];

    fn load_from_empty_args() -> PortalSettings {
        PortalSettings::load_from_iter([OsString::from("portal")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.backend_url().expect("default URL").as_str(),
            DEFAULT_BACKEND_URL
        );
        assert_eq!(
            settings.bind_addr().expect("default bind"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.probe_ttl(), chrono::Duration::minutes(5));
        assert_eq!(settings.page_size().expect("default page size"), 10);
        assert!(!settings.memory_backend());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("PORTAL_BACKEND_URL", Some("https://loans.example.com/api")),
            ("PORTAL_BIND", Some("127.0.0.1:9000")),
            ("PORTAL_REQUEST_TIMEOUT_SECS", Some("3")),
            ("PORTAL_PROBE_TTL_SECS", Some("60")),
            ("PORTAL_PAGE_SIZE", Some("25")),
            ("PORTAL_MEMORY_BACKEND", Some("true")),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.backend_url().expect("URL").host_str(),
            Some("loans.example.com")
        );
        assert_eq!(settings.bind_addr().expect("bind").port(), 9000);
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
        assert_eq!(settings.probe_ttl(), chrono::Duration::seconds(60));
        assert_eq!(settings.page_size().expect("page size"), 25);
        assert!(settings.memory_backend());
    }

    #[rstest]
    #[case(Some("true"), true)]
    #[case(Some("false"), false)]
    #[case(None, false)]
    fn demo_backend_follows_the_environment(
        #[case] value: Option<&'static str>,
        #[case] expected: bool,
    ) {
        let mut vars = VARS.map(|var| (var, None::<&str>));
        if let Some(entry) = vars.iter_mut().find(|entry| entry.0 == "PORTAL_MEMORY_BACKEND") {
            entry.1 = value;
        }
        let _guard = lock_env(vars);

        assert_eq!(load_from_empty_args().memory_backend(), expected);
    }

    #[rstest]
    #[case("PORTAL_BACKEND_URL", "not a url")]
    #[case("PORTAL_BIND", "localhost")]
    #[case("PORTAL_PAGE_SIZE", "0")]
    fn malformed_values_are_reported(#[case] name: &'static str, #[case] value: &'static str) {
        let mut vars = VARS.map(|var| (var, None::<&str>));
        for entry in &mut vars {
            if entry.0 == name {
                entry.1 = Some(value);
            }
        }
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        let failed = settings.backend_url().is_err()
            || settings.bind_addr().is_err()
            || settings.page_size().is_err();
        assert!(failed, "{name}={value} should be rejected");
    }
}
