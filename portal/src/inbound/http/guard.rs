//! Route-entry guard: runs the access guard and applies its verdict to the
//! cookie session.

use tracing::debug;

use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{Error, GuardOutcome, PortalRoute, Session, SessionUpdate};

/// Admit the caller into `route` or fail with the redirecting error.
///
/// A refreshed session is written back to the cookie; a cleared one is
/// purged before the redirect to login.
pub async fn enter(
    state: &HttpState,
    context: &SessionContext,
    route: PortalRoute,
) -> Result<Session, Error> {
    let current = context.load();
    let decision = state.guard.admit(route, current.as_ref()).await;

    match &decision.session {
        SessionUpdate::Refreshed(refreshed) => context.persist(refreshed)?,
        SessionUpdate::Cleared => context.purge(),
        SessionUpdate::Unchanged => {}
    }

    match decision.outcome {
        GuardOutcome::Allow => decision
            .admitted(current)
            .ok_or_else(|| Error::unauthorized("login required")),
        GuardOutcome::RedirectToLogin => {
            debug!(route = route.path(), "no usable session; redirecting to login");
            Err(Error::unauthorized("login required"))
        }
        GuardOutcome::RedirectToDashboard => {
            debug!(route = route.path(), "role does not open route; redirecting to dashboard");
            Err(Error::forbidden(format!(
                "{} is not available to this role",
                route.path()
            )))
        }
    }
}
