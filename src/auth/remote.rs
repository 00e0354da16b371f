//! Identity provider for the hosted backend's auth API.
//!
//! Password sign-in uses `/auth/v1/token?grant_type=password`; sign-out
//! revokes the token with `/auth/v1/logout`. The session is persisted locally
//! and renewed with its refresh token once it expires.

use crate::auth::persist::SessionFile;
use crate::auth::traits::{IdentityProvider, Listeners, Session, SessionListener, SubscriptionId};
use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::storage::remote::error_message;
use chrono::{Duration, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self, fallback_email: &str) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            user_id: self.user.id,
            email: self.user.email.unwrap_or_else(|| fallback_email.to_string()),
            expires_at: self.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

/// Identity provider talking to the hosted auth API.
#[derive(Debug)]
pub struct RemoteIdentity {
    client: Client,
    config: RemoteConfig,
    file: SessionFile,
    listeners: Listeners,
}

impl RemoteIdentity {
    /// Create a new remote identity provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete or the HTTP
    /// client cannot be built.
    pub fn new(config: RemoteConfig, file: SessionFile) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            file,
            listeners: Listeners::new(),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.config.base_url())
    }

    fn revoke(&self, access_token: &str) -> Result<()> {
        let response = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()?;
        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status();
        let body = response.text().unwrap_or_default();
        Err(Error::Auth(
            error_message(&body).unwrap_or_else(|| status.to_string()),
        ))
    }

    /// Exchange credentials at the token endpoint for a session.
    fn request_token(
        &self,
        grant_type: &str,
        body: &Value,
        fallback_email: &str,
    ) -> Result<Session> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.config.anon_key)
            .json(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Auth(
                error_message(&body).unwrap_or_else(|| status.to_string()),
            ));
        }

        let token: TokenResponse = response.json()?;
        Ok(token.into_session(fallback_email))
    }

    /// Renew an expired session with its refresh token.
    ///
    /// Any failure clears the stored session; the caller is signed out.
    fn refresh(&self, expired: &Session) -> Result<Option<Session>> {
        let renewed = match &expired.refresh_token {
            Some(token) => {
                tracing::debug!(email = %expired.email, "refreshing expired session");
                let body = json!({ "refresh_token": token });
                self.request_token("refresh_token", &body, &expired.email)
            }
            None => Err(Error::Auth("session expired".to_string())),
        };

        match renewed {
            Ok(session) => {
                self.file.save(&session)?;
                self.listeners.notify(Some(&session));
                Ok(Some(session))
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not refresh session");
                self.file.clear()?;
                self.listeners.notify(None);
                Ok(None)
            }
        }
    }
}

impl IdentityProvider for RemoteIdentity {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        tracing::debug!(email, "password sign-in");
        let session = self.request_token(
            "password",
            &json!({ "email": email, "password": password }),
            email,
        )?;
        self.file.save(&session)?;
        self.listeners.notify(Some(&session));
        Ok(session)
    }

    fn get_session(&self) -> Result<Option<Session>> {
        match self.file.load_stored()? {
            Some(session) if session.is_expired(Utc::now()) => self.refresh(&session),
            stored => Ok(stored),
        }
    }

    fn sign_out(&self) -> Result<()> {
        let current = self.file.load()?;
        self.file.clear()?;
        self.listeners.notify(None);
        match current {
            Some(session) => self.revoke(&session.access_token),
            None => Ok(()),
        }
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
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    fn identity(dir: &TempDir) -> RemoteIdentity {
        RemoteIdentity::new(
            RemoteConfig {
                url: "https://project.example.co/".to_string(),
                anon_key: "anon".to_string(),
                ..RemoteConfig::default()
            },
            SessionFile::in_dir(dir.path()),
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_incomplete_config() {
        let dir = TempDir::new().unwrap();
        let result = RemoteIdentity::new(RemoteConfig::default(), SessionFile::in_dir(dir.path()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn auth_urls() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            identity(&dir).auth_url("token"),
            "https://project.example.co/auth/v1/token"
        );
    }

    #[test]
    fn token_response_maps_to_session() {
        let json = r#"{
            "access_token": "jwt",
            "refresh_token": "r",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": {"id": "9b1d", "email": "admin@example.com"}
        }"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        let session = token.into_session("typed@example.com");
        assert_eq!(session.user_id, "9b1d");
        assert_eq!(session.email, "admin@example.com");
        assert!(!session.is_expired(Utc::now()));
    }

    #[test]
    fn sign_out_without_session_skips_remote() {
        let dir = TempDir::new().unwrap();
        assert!(identity(&dir).sign_out().is_ok());
    }

    fn expired_session(refresh_token: Option<&str>) -> Session {
        Session {
            access_token: "old".to_string(),
            refresh_token: refresh_token.map(String::from),
            user_id: "9b1d".to_string(),
            email: "admin@example.com".to_string(),
            expires_at: Some(Utc::now() - Duration::minutes(5)),
        }
    }

    fn unreachable_identity(dir: &TempDir) -> RemoteIdentity {
        RemoteIdentity::new(
            RemoteConfig {
                url: "http://127.0.0.1:9".to_string(),
                anon_key: "anon".to_string(),
                timeout_secs: 2,
                ..RemoteConfig::default()
            },
            SessionFile::in_dir(dir.path()),
        )
        .unwrap()
    }

    #[test]
    fn expired_session_without_refresh_token_signs_out() {
        let dir = TempDir::new().unwrap();
        let file = SessionFile::in_dir(dir.path());
        file.save(&expired_session(None)).unwrap();

        let identity = identity(&dir);
        let signed_out = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&signed_out);
        identity.subscribe(Arc::new(move |s: Option<&Session>| {
            flag.store(s.is_none(), Ordering::SeqCst);
        }));

        assert!(identity.get_session().unwrap().is_none());
        assert!(!file.path().exists());
        assert!(signed_out.load(Ordering::SeqCst));
    }

    #[test]
    fn failed_refresh_clears_session() {
        let dir = TempDir::new().unwrap();
        let file = SessionFile::in_dir(dir.path());
        file.save(&expired_session(Some("r"))).unwrap();

        assert!(unreachable_identity(&dir).get_session().unwrap().is_none());
        assert!(file.load_stored().unwrap().is_none());
    }

    #[test]
    fn refreshed_token_keeps_known_email() {
        let json = r#"{
            "access_token": "new",
            "refresh_token": "r2",
            "expires_in": 3600,
            "user": {"id": "9b1d"}
        }"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        let session = token.into_session("admin@example.com");
        assert_eq!(session.email, "admin@example.com");
        assert_eq!(session.refresh_token.as_deref(), Some("r2"));
    }

    #[test]
    fn persisted_session_is_rehydrated() {
        let dir = TempDir::new().unwrap();
        let session = Session {
            access_token: "jwt".to_string(),
            refresh_token: None,
            user_id: "9b1d".to_string(),
            email: "admin@example.com".to_string(),
            expires_at: None,
        };
        SessionFile::in_dir(dir.path()).save(&session).unwrap();
        assert_eq!(identity(&dir).get_session().unwrap(), Some(session));
    }
}
