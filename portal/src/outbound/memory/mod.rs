//! In-memory stand-in for the loan backend.
//!
//! Implements every backend-facing port with the backend's own rules: role
//! checks per endpoint, the status workflow, soft deletion and the audit
//! trail. Used by integration tests and by the demo mode of the binary.
//!
//! Seeded accounts: `admin@loanapp.com` / `admin123` (ADMIN) and
//! `user@loanapp.com` / `user123` (USER).

mod auth;
mod loans;
mod users;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use mockable::Clock;

use crate::domain::ports::GatewayError;
use crate::domain::{BearerToken, Email, Loan, Role, UserAccount, UserAccountId};

/// Seeded administrator login.
pub const DEMO_ADMIN: (&str, &str) = ("admin@loanapp.com", "admin123");
/// Seeded applicant login.
pub const DEMO_USER: (&str, &str) = ("user@loanapp.com", "user123");

#[derive(Clone)]
struct Account {
    id: UserAccountId,
    email: Email,
    password: String,
    role: Role,
    active: bool,
}

impl Account {
    fn view(&self) -> UserAccount {
        UserAccount {
            id: self.id.clone(),
            email: self.email.to_string(),
            role: self.role,
            active: self.active,
        }
    }
}

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    tokens: HashMap<String, UserAccountId>,
    loans: Vec<Loan>,
    next_loan: u64,
    next_user: u64,
}

impl State {
    fn add_account(&mut self, email: Email, password: &str, role: Role) -> Account {
        self.next_user += 1;
        let account = Account {
            id: UserAccountId::new(format!("user-{}", self.next_user)),
            email,
            password: password.to_owned(),
            role,
            active: true,
        };
        self.accounts.push(account.clone());
        account
    }

    fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|account| account.email.as_ref().eq_ignore_ascii_case(email.trim()))
    }

    /// Resolve a bearer token to an active account.
    fn caller(&self, token: &BearerToken) -> Result<Account, GatewayError> {
        self.tokens
            .get(token.expose())
            .and_then(|id| self.accounts.iter().find(|account| &account.id == id))
            .filter(|account| account.active)
            .cloned()
            .ok_or_else(|| GatewayError::unauthorized("invalid or expired token"))
    }
}

fn require_role(caller: &Account, allowed: &[Role]) -> Result<(), GatewayError> {
    if allowed.contains(&caller.role) {
        Ok(())
    } else {
        Err(GatewayError::forbidden("Access Denied"))
    }
}

fn business_error(message: impl Into<String>) -> GatewayError {
    GatewayError::rejected(400_u16, message)
}

/// Backend double holding users, tokens and loans in process memory.
#[derive(Clone)]
pub struct InMemoryBackend {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
    latency_ms: Arc<AtomicU64>,
}

impl InMemoryBackend {
    /// Empty backend without any account.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::default(),
            clock,
            latency_ms: Arc::default(),
        }
    }

    /// Backend seeded with the demo administrator and applicant.
    pub fn with_demo_accounts(clock: Arc<dyn Clock>) -> Self {
        let backend = Self::new(clock);
        {
            let mut state = backend.lock();
            for ((email, password), role) in [(DEMO_ADMIN, Role::Admin), (DEMO_USER, Role::User)] {
                if let Ok(email) = Email::new(email) {
                    state.add_account(email, password, role);
                }
            }
        }
        backend
    }

    /// Delay every loan call by `latency`, to exercise in-flight behaviour.
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    /// Invalidate a previously issued token, as if it expired.
    pub fn expire_token(&self, token: &BearerToken) {
        self.lock().tokens.remove(token.expose());
    }

    /// Change the role of an account, leaving its tokens valid.
    pub fn change_role(&self, email: &str, role: Role) {
        let mut state = self.lock();
        if let Some(account) = state
            .accounts
            .iter_mut()
            .find(|account| account.email.as_ref().eq_ignore_ascii_case(email))
        {
            account.role = role;
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        let millis = self.latency_ms.load(Ordering::SeqCst);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }
}
