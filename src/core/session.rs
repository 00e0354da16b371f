//! Admin session gate.
//!
//! The gate owns the current session and derives the admin flag from it.
//! It is passed by reference to everything that needs to check admin; there
//! is no global session.

use crate::auth::{IdentityProvider, Listeners, Session, SessionListener, SubscriptionId};
use std::sync::{Arc, RwLock};

/// Message shown for any failed login, whatever the cause.
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid email or password";

type SessionSlot = Arc<RwLock<Option<Session>>>;

/// Holds the active session and broadcasts changes.
pub struct SessionGate {
    provider: Arc<dyn IdentityProvider>,
    session: SessionSlot,
    listeners: Arc<Listeners>,
    subscription: Option<SubscriptionId>,
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("is_admin", &self.is_admin())
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}

impl SessionGate {
    /// Create an unmounted gate with no session.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            session: Arc::new(RwLock::new(None)),
            listeners: Arc::new(Listeners::new()),
            subscription: None,
        }
    }

    /// Rehydrate any existing session and start following provider changes.
    ///
    /// A provider that cannot report its session leaves the gate signed out.
    pub fn mount(&mut self) {
        if self.subscription.is_some() {
            return;
        }

        match self.provider.get_session() {
            Ok(session) => apply(&self.session, &self.listeners, session),
            Err(e) => tracing::warn!(error = %e, "could not restore session"),
        }

        let slot = Arc::clone(&self.session);
        let listeners = Arc::clone(&self.listeners);
        let id = self.provider.subscribe(Arc::new(move |session: Option<&Session>| {
            apply(&slot, &listeners, session.cloned());
        }));
        self.subscription = Some(id);
    }

    /// Stop following provider changes.
    pub fn teardown(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.provider.unsubscribe(id);
        }
    }

    /// Whether the gate is subscribed to the provider.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Sign in. Returns false on any failure and leaves the session unset;
    /// callers show [`LOGIN_FAILED_MESSAGE`].
    pub fn login(&self, email: &str, password: &str) -> bool {
        match self.provider.sign_in(email, password) {
            Ok(session) => {
                tracing::info!(email = %session.email, "signed in");
                apply(&self.session, &self.listeners, Some(session));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-in failed");
                false
            }
        }
    }

    /// Sign out. The local session is cleared even if the provider fails.
    pub fn logout(&self) {
        if let Err(e) = self.provider.sign_out() {
            tracing::warn!(error = %e, "remote sign-out failed; clearing local session");
        }
        apply(&self.session, &self.listeners, None);
    }

    /// True iff a session is present.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session.read().unwrap().is_some()
    }

    /// Copy of the current session.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.session.read().unwrap().clone()
    }

    /// User id of the current session.
    #[must_use]
    pub fn user_id(&self) -> Option<String> {
        self.session.read().unwrap().as_ref().map(|s| s.user_id.clone())
    }

    /// Register for session changes made through this gate or the provider.
    pub fn subscribe(&self, listener: SessionListener) -> SubscriptionId {
        self.listeners.add(listener)
    }

    /// Remove a registration.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.remove(id);
    }
}

impl Drop for SessionGate {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Store `next` and notify listeners if it differs from the current session.
fn apply(slot: &SessionSlot, listeners: &Listeners, next: Option<Session>) {
    {
        let mut current = slot.write().unwrap();
        if *current == next {
            return;
        }
        current.clone_from(&next);
    }
    listeners.notify(next.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryIdentity;
    use std::sync::Mutex;

    fn provider() -> Arc<MemoryIdentity> {
        Arc::new(MemoryIdentity::new().with_account("admin@example.com", "secret"))
    }

    #[test]
    fn starts_signed_out() {
        let gate = SessionGate::new(provider());
        assert!(!gate.is_admin());
        assert!(gate.session().is_none());
    }

    #[test]
    fn login_sets_admin() {
        let gate = SessionGate::new(provider());
        assert!(gate.login("admin@example.com", "secret"));
        assert!(gate.is_admin());
        assert_eq!(gate.user_id().as_deref(), Some("user-admin@example.com"));
    }

    #[test]
    fn failed_login_leaves_session_unset() {
        let gate = SessionGate::new(provider());
        assert!(!gate.login("admin@example.com", "wrong"));
        assert!(!gate.is_admin());
    }

    #[test]
    fn logout_clears_even_when_provider_fails() {
        let identity = provider();
        let gate = SessionGate::new(identity.clone());
        gate.login("admin@example.com", "secret");
        identity.fail_next_sign_out();
        gate.logout();
        assert!(!gate.is_admin());
    }

    #[test]
    fn mount_rehydrates_existing_session() {
        let identity = provider();
        identity.sign_in("admin@example.com", "secret").unwrap();

        let mut gate = SessionGate::new(identity);
        assert!(!gate.is_admin());
        gate.mount();
        assert!(gate.is_admin());
    }

    #[test]
    fn external_invalidation_drops_admin() {
        let identity = provider();
        let mut gate = SessionGate::new(identity.clone());
        gate.mount();
        gate.login("admin@example.com", "secret");

        identity.invalidate();
        assert!(!gate.is_admin());
    }

    #[test]
    fn teardown_unsubscribes() {
        let identity = provider();
        let mut gate = SessionGate::new(identity.clone());
        gate.mount();
        gate.mount();
        assert_eq!(identity.subscriber_count(), 1);

        gate.teardown();
        assert_eq!(identity.subscriber_count(), 0);
        assert!(!gate.is_mounted());
    }

    #[test]
    fn drop_unsubscribes() {
        let identity = provider();
        {
            let mut gate = SessionGate::new(identity.clone());
            gate.mount();
        }
        assert_eq!(identity.subscriber_count(), 0);
    }

    #[test]
    fn changes_are_rebroadcast_once() {
        let identity = provider();
        let mut gate = SessionGate::new(identity.clone());
        gate.mount();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        gate.subscribe(Arc::new(move |session: Option<&Session>| {
            s.lock().unwrap().push(session.is_some());
        }));

        gate.login("admin@example.com", "secret");
        identity.invalidate();
        gate.logout();
        assert_eq!(*seen.lock().unwrap(), [true, false]);
    }
}
