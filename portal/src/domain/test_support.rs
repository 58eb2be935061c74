//! Shared doubles for domain service tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use super::{BearerToken, Email, Identity, Role, Session};

/// Clock whose time only moves when a test advances it.
#[derive(Debug, Clone)]
pub(crate) struct FixtureClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixtureClock {
    pub(crate) fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
            .single()
            .expect("fixture timestamp is valid")
    }

    pub(crate) fn at_epoch() -> Self {
        Self {
            now: Arc::new(Mutex::new(Self::epoch())),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.now().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now()
    }
}

pub(crate) const USER_EMAIL: &str = "user@loanapp.com";
pub(crate) const ADMIN_EMAIL: &str = "admin@loanapp.com";

pub(crate) fn identity(role: Role) -> Identity {
    let email = match role {
        Role::User => USER_EMAIL,
        Role::Admin => ADMIN_EMAIL,
    };
    Identity {
        id: None,
        email: Email::new(email).expect("fixture email"),
        role,
    }
}

pub(crate) fn session_probed_at(role: Role, probed_at: DateTime<Utc>) -> Session {
    Session::init(
        BearerToken::new(format!("{}-token", role.as_str().to_lowercase())).expect("token"),
        identity(role),
        probed_at,
    )
}

pub(crate) fn session(role: Role) -> Session {
    session_probed_at(role, FixtureClock::epoch())
}
