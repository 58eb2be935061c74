//! Administrator-only management of user accounts.

use std::sync::Arc;

use tracing::info;

use super::ports::UserDirectory;
use super::{Error, NewUserAccount, Role, Session, UserAccount, UserAccountId};

/// Lists, creates and (de)activates accounts for administrators.
#[derive(Clone)]
pub struct UserAdministration {
    directory: Arc<dyn UserDirectory>,
}

impl UserAdministration {
    /// Service over the given directory.
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Every account known to the backend.
    pub async fn list(&self, session: &Session) -> Result<Vec<UserAccount>, Error> {
        require_admin(session)?;
        Ok(self.directory.list_users(session.token()).await?)
    }

    /// Create an account.
    pub async fn create(
        &self,
        session: &Session,
        account: &NewUserAccount,
    ) -> Result<UserAccount, Error> {
        require_admin(session)?;
        let created = self
            .directory
            .create_user(session.token(), account)
            .await?;
        info!(user_id = %created.id, role = %created.role, actor = %session.email(), "user created");
        Ok(created)
    }

    /// Activate or deactivate an account.
    pub async fn set_active(
        &self,
        session: &Session,
        id: &UserAccountId,
        active: bool,
    ) -> Result<UserAccount, Error> {
        require_admin(session)?;
        let updated = self
            .directory
            .set_active(session.token(), id, active)
            .await?;
        info!(user_id = %id, active, actor = %session.email(), "user status changed");
        Ok(updated)
    }
}

fn require_admin(session: &Session) -> Result<(), Error> {
    if session.role() == Role::Admin {
        Ok(())
    } else {
        Err(Error::forbidden("user administration requires the ADMIN role"))
    }
}
