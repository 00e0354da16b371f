//! In-memory identity provider (for testing).

use crate::auth::traits::{IdentityProvider, Listeners, Session, SessionListener, SubscriptionId};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Identity provider with a fixed account list and no persistence.
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    accounts: RwLock<HashMap<String, String>>,
    session: RwLock<Option<Session>>,
    listeners: Listeners,
    fail_sign_out: AtomicBool,
}

impl MemoryIdentity {
    /// Create a provider with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.accounts
            .write()
            .unwrap()
            .insert(email.to_string(), password.to_string());
        self
    }

    /// Install `session` directly, without notifying listeners.
    pub fn set_session(&self, session: Option<Session>) {
        *self.session.write().unwrap() = session;
    }

    /// Simulate the provider revoking the session on its own.
    pub fn invalidate(&self) {
        *self.session.write().unwrap() = None;
        self.listeners.notify(None);
    }

    /// Make the next `sign_out` report a remote failure (local state is
    /// still cleared).
    pub fn fail_next_sign_out(&self) {
        self.fail_sign_out.store(true, Ordering::SeqCst);
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl IdentityProvider for MemoryIdentity {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let matches = self
            .accounts
            .read()
            .unwrap()
            .get(email)
            .is_some_and(|p| p == password);
        if !matches {
            return Err(Error::Auth("Invalid login credentials".to_string()));
        }

        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: None,
            user_id: format!("user-{email}"),
            email: email.to_string(),
            expires_at: None,
        };
        *self.session.write().unwrap() = Some(session.clone());
        self.listeners.notify(Some(&session));
        Ok(session)
    }

    fn get_session(&self) -> Result<Option<Session>> {
        Ok(self.session.read().unwrap().clone())
    }

    fn sign_out(&self) -> Result<()> {
        *self.session.write().unwrap() = None;
        self.listeners.notify(None);
        if self.fail_sign_out.swap(false, Ordering::SeqCst) {
            return Err(Error::Auth("sign-out request failed".to_string()));
        }
        Ok(())
    }

    fn subscribe(&self, listener: SessionListener) -> SubscriptionId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn sign_in_checks_password() {
        let identity = MemoryIdentity::new().with_account("admin@example.com", "secret");
        assert!(identity.sign_in("admin@example.com", "wrong").is_err());
        assert!(identity.sign_in("nobody@example.com", "secret").is_err());

        let session = identity.sign_in("admin@example.com", "secret").unwrap();
        assert_eq!(session.email, "admin@example.com");
        assert_eq!(identity.get_session().unwrap(), Some(session));
    }

    #[test]
    fn changes_are_broadcast() {
        let identity = MemoryIdentity::new().with_account("a@b.c", "pw");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        identity.subscribe(Arc::new(move |session: Option<&Session>| {
            s.lock().unwrap().push(session.is_some());
        }));

        identity.sign_in("a@b.c", "pw").unwrap();
        identity.invalidate();
        assert_eq!(*seen.lock().unwrap(), [true, false]);
        assert!(identity.get_session().unwrap().is_none());
    }

    #[test]
    fn failed_sign_out_still_clears() {
        let identity = MemoryIdentity::new().with_account("a@b.c", "pw");
        identity.sign_in("a@b.c", "pw").unwrap();
        identity.fail_next_sign_out();
        assert!(identity.sign_out().is_err());
        assert!(identity.get_session().unwrap().is_none());
        assert!(identity.sign_out().is_ok());
    }
}
