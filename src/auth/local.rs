//! Identity provider backed by the admin account in the config file.
//!
//! The password is stored as a hex SHA-256 digest. Sessions are persisted to
//! the storage directory so they survive between CLI invocations.

use crate::auth::persist::SessionFile;
use crate::auth::traits::{IdentityProvider, Listeners, Session, SessionListener, SubscriptionId};
use crate::config::AdminConfig;
use crate::error::{Error, Result};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hex SHA-256 digest of `password`, as stored in `admin.password_sha256`.
#[must_use]
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Single-admin identity provider.
#[derive(Debug)]
pub struct LocalIdentity {
    admin: AdminConfig,
    file: SessionFile,
    listeners: Listeners,
}

impl LocalIdentity {
    /// Create a provider for `admin`, persisting sessions to `file`.
    #[must_use]
    pub fn new(admin: AdminConfig, file: SessionFile) -> Self {
        Self {
            admin,
            file,
            listeners: Listeners::new(),
        }
    }

    fn credentials_match(&self, email: &str, password: &str) -> bool {
        !self.admin.email.is_empty()
            && !self.admin.password_sha256.is_empty()
            && self.admin.email.eq_ignore_ascii_case(email.trim())
            && self
                .admin
                .password_sha256
                .eq_ignore_ascii_case(&hash_password(password))
    }
}

impl IdentityProvider for LocalIdentity {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        if !self.credentials_match(email, password) {
            return Err(Error::Auth("Invalid login credentials".to_string()));
        }

        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: None,
            user_id: format!("local:{}", self.admin.email.to_lowercase()),
            email: self.admin.email.clone(),
            expires_at: Some(Utc::now() + Duration::hours(self.admin.session_hours)),
        };
        self.file.save(&session)?;
        self.listeners.notify(Some(&session));
        Ok(session)
    }

    fn get_session(&self) -> Result<Option<Session>> {
        self.file.load()
    }

    fn sign_out(&self) -> Result<()> {
        self.file.clear()?;
        self.listeners.notify(None);
        Ok(())
    }

    fn subscribe(&self, listener: SessionListener) -> SubscriptionId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.remove(id);
    }
}
