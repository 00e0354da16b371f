//! Identity provider trait and session types.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// An authenticated session. Holding one means admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for backend requests.
    pub access_token: String,

    /// Token used to renew the session, when the provider issues one.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Provider user id.
    pub user_id: String,

    /// Signed-in email.
    pub email: String,

    /// When the session stops being valid.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether the session has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Handle returned by [`IdentityProvider::subscribe`].
pub type SubscriptionId = u64;

/// Called with the new session (or `None`) whenever it changes.
pub type SessionListener = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

/// External identity service.
pub trait IdentityProvider: Send + Sync {
    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns an auth error on bad credentials, or a transport error.
    fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// The current session, if one exists and is still valid.
    ///
    /// # Errors
    ///
    /// Returns an error if persisted state cannot be read.
    fn get_session(&self) -> Result<Option<Session>>;

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote sign-out fails. Local state is cleared
    /// regardless.
    fn sign_out(&self) -> Result<()>;

    /// Register for session change notifications.
    fn subscribe(&self, listener: SessionListener) -> SubscriptionId;

    /// Remove a registration. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Listener registry shared by provider implementations.
#[derive(Default)]
pub struct Listeners {
    next_id: AtomicU64,
    items: Mutex<Vec<(SubscriptionId, SessionListener)>>,
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish_non_exhaustive()
    }
}

impl Listeners {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`.
    pub fn add(&self, listener: SessionListener) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.items.lock().unwrap().push((id, listener));
        id
    }

    /// Drop the registration `id`.
    pub fn remove(&self, id: SubscriptionId) {
        self.items.lock().unwrap().retain(|(i, _)| *i != id);
    }

    /// Call every listener with `session`.
    ///
    /// Listeners are called outside the lock, so they may unsubscribe.
    pub fn notify(&self, session: Option<&Session>) {
        let listeners: Vec<SessionListener> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(session);
        }
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    /// Whether nobody is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
