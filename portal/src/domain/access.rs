//! Access guard layer: the authentication gate and the role gate.
//!
//! Both gates are pure decisions over a [`GuardOutcome`]. [`AccessGuard`]
//! composes them at a route entry and owns the only side effect, the identity
//! probe that confirms a session's role once its cached identity has aged
//! past the probe TTL.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;
use tracing::{debug, info, warn};

use super::ports::AuthGateway;
use super::{Role, Session};

/// Where a guard sends the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Enter the route.
    Allow,
    /// Not authenticated: go to the login entry point.
    RedirectToLogin,
    /// Authenticated but the role does not open the route.
    RedirectToDashboard,
}

impl GuardOutcome {
    /// Redirect target, if any.
    pub fn location(self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin => Some(PortalRoute::Login.path()),
            Self::RedirectToDashboard => Some(PortalRoute::Dashboard.path()),
        }
    }
}

/// Route entries of the portal and the roles they declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalRoute {
    Login,
    Dashboard,
    Loans,
    ApplyLoan,
    LoanDetail,
    EditLoan,
    ReviewLoans,
    Users,
}

impl PortalRoute {
    /// Path pattern of the route entry.
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Loans => "/dashboard/loans",
            Self::ApplyLoan => "/dashboard/apply-loan",
            Self::LoanDetail => "/dashboard/loans/{id}",
            Self::EditLoan => "/dashboard/loans/{id}/edit",
            Self::ReviewLoans => "/dashboard/review-loans",
            Self::Users => "/dashboard/users",
        }
    }

    /// Whether the route needs a session at all.
    pub fn is_protected(self) -> bool {
        !matches!(self, Self::Login)
    }

    /// Roles declared by the route; empty means any authenticated user.
    pub fn required_roles(self) -> &'static [Role] {
        match self {
            Self::ReviewLoans | Self::Users => &[Role::Admin],
            _ => &[],
        }
    }
}

/// Capability check: no declared roles, or `actual` is one of them.
///
/// # Examples
/// ```
/// use portal::domain::{role_satisfies, Role};
///
/// assert!(role_satisfies(&[], Role::User));
/// assert!(role_satisfies(&[Role::Admin], Role::Admin));
/// assert!(!role_satisfies(&[Role::Admin], Role::User));
/// ```
pub fn role_satisfies(required: &[Role], actual: Role) -> bool {
    required.is_empty() || required.contains(&actual)
}

/// Authentication gate: a session exists.
pub fn authentication_gate(session: Option<&Session>) -> GuardOutcome {
    match session {
        Some(_) => GuardOutcome::Allow,
        None => GuardOutcome::RedirectToLogin,
    }
}

/// Result of confirming the session's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The backend (or a fresh cache entry) confirmed this role.
    Confirmed(Role),
    /// The probe failed or contradicted the session.
    Failed,
}

/// Role gate over a probe result.
pub fn role_gate(required: &[Role], probe: ProbeOutcome) -> GuardOutcome {
    match probe {
        ProbeOutcome::Failed => GuardOutcome::RedirectToLogin,
        ProbeOutcome::Confirmed(role) if role_satisfies(required, role) => GuardOutcome::Allow,
        ProbeOutcome::Confirmed(_) => GuardOutcome::RedirectToDashboard,
    }
}

/// What the caller must do with its stored session after a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Keep what is stored.
    Unchanged,
    /// Store the re-probed session.
    Refreshed(Session),
    /// Drop the stored session.
    Cleared,
}

/// Guard result for one route entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardDecision {
    pub outcome: GuardOutcome,
    pub session: SessionUpdate,
}

impl GuardDecision {
    fn keep(outcome: GuardOutcome) -> Self {
        Self {
            outcome,
            session: SessionUpdate::Unchanged,
        }
    }

    fn clear() -> Self {
        Self {
            outcome: GuardOutcome::RedirectToLogin,
            session: SessionUpdate::Cleared,
        }
    }

    /// Session to use for the rest of the request, if the route was allowed.
    pub fn admitted(self, current: Option<Session>) -> Option<Session> {
        if self.outcome != GuardOutcome::Allow {
            return None;
        }
        match self.session {
            SessionUpdate::Refreshed(session) => Some(session),
            SessionUpdate::Unchanged => current,
            SessionUpdate::Cleared => None,
        }
    }
}

/// Evaluates both gates at a route entry.
#[derive(Clone)]
pub struct AccessGuard {
    auth: Arc<dyn AuthGateway>,
    clock: Arc<dyn Clock>,
    probe_ttl: Duration,
}

impl AccessGuard {
    /// Build a guard that trusts a cached identity for `probe_ttl`.
    pub fn new(auth: Arc<dyn AuthGateway>, clock: Arc<dyn Clock>, probe_ttl: Duration) -> Self {
        Self {
            auth,
            clock,
            probe_ttl,
        }
    }

    /// Evaluate the authentication gate, then the role gate, for `route`.
    pub async fn admit(&self, route: PortalRoute, session: Option<&Session>) -> GuardDecision {
        if !route.is_protected() {
            return GuardDecision::keep(GuardOutcome::Allow);
        }
        let Some(session) = session else {
            return GuardDecision::keep(authentication_gate(None));
        };
        let required = route.required_roles();
        if required.is_empty() {
            return GuardDecision::keep(GuardOutcome::Allow);
        }

        let now = self.clock.utc();
        if session.is_fresh(now, self.probe_ttl) {
            debug!(route = route.path(), "role gate using cached identity");
            return GuardDecision::keep(role_gate(
                required,
                ProbeOutcome::Confirmed(session.role()),
            ));
        }

        match self.auth.me(session.token()).await {
            Ok(identity) => match session.reconfirm(identity, now) {
                Some(refreshed) => GuardDecision {
                    outcome: role_gate(required, ProbeOutcome::Confirmed(refreshed.role())),
                    session: SessionUpdate::Refreshed(refreshed),
                },
                None => {
                    warn!(
                        email = %session.email(),
                        "identity probe contradicted the session; ending it"
                    );
                    GuardDecision::clear()
                }
            },
            Err(error) => {
                info!(%error, route = route.path(), "identity probe failed");
                GuardDecision::clear()
            }
        }
    }
}
