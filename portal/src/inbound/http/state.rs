//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O. Build it once
//! per process: the loan desk's in-flight guard and confirmed-loan register
//! must be shared by every worker.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;
use pagination::DEFAULT_PAGE_SIZE;

use crate::domain::ports::{AuthGateway, LoanGateway, UserDirectory};
use crate::domain::{AccessGuard, LoanDesk, LoanListing, LoginService, UserAdministration};

/// Default time a confirmed identity is trusted before re-probing.
pub const DEFAULT_PROBE_TTL_SECONDS: i64 = 300;

/// Parameter object bundling the port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: Arc<dyn AuthGateway>,
    pub loans: Arc<dyn LoanGateway>,
    pub users: Arc<dyn UserDirectory>,
    pub clock: Arc<dyn Clock>,
}

/// Tunables of the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpStateOptions {
    /// How long a confirmed identity is trusted by the role gate.
    pub probe_ttl: Duration,
    /// Rows per listing page.
    pub page_size: u32,
}

impl Default for HttpStateOptions {
    fn default() -> Self {
        Self {
            probe_ttl: Duration::seconds(DEFAULT_PROBE_TTL_SECONDS),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: LoginService,
    pub guard: AccessGuard,
    pub listing: LoanListing,
    pub desk: LoanDesk,
    pub users: UserAdministration,
    pub page_size: u32,
}

impl HttpState {
    /// Wire the domain services over `ports`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use portal::inbound::http::state::{HttpState, HttpStateOptions, HttpStatePorts};
    /// use portal::outbound::memory::InMemoryBackend;
    ///
    /// let backend = Arc::new(InMemoryBackend::with_demo_accounts(Arc::new(DefaultClock)));
    /// let state = HttpState::new(
    ///     HttpStatePorts {
    ///         auth: backend.clone(),
    ///         loans: backend.clone(),
    ///         users: backend,
    ///         clock: Arc::new(DefaultClock),
    ///     },
    ///     HttpStateOptions::default(),
    /// );
    /// assert_eq!(state.page_size, 10);
    /// ```
    pub fn new(ports: HttpStatePorts, options: HttpStateOptions) -> Self {
        let HttpStatePorts {
            auth,
            loans,
            users,
            clock,
        } = ports;
        Self {
            login: LoginService::new(Arc::clone(&auth), Arc::clone(&clock)),
            guard: AccessGuard::new(auth, clock, options.probe_ttl),
            listing: LoanListing::new(Arc::clone(&loans)),
            desk: LoanDesk::new(loans),
            users: UserAdministration::new(users),
            page_size: options.page_size,
        }
    }
}
