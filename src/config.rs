//! Configuration loading and management.
//!
//! Configuration is loaded with the following precedence:
//! 1. Environment variables (`SLOWANDARAIN_*`)
//! 2. Config file (`~/.slowandarain/config.toml`)
//! 3. Defaults

use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Local storage configuration.
    pub storage: StorageConfig,

    /// Which backend serves content, images and sessions.
    pub backend: BackendConfig,

    /// Hosted backend connection settings.
    pub remote: RemoteConfig,

    /// Local admin account (file backend only).
    pub admin: AdminConfig,

    /// Carousel configuration.
    pub carousel: CarouselConfig,

    /// Feedback relay configuration.
    pub feedback: FeedbackConfig,

    /// Notice (toast) retention.
    pub notices: NoticeConfig,
}

/// Local storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding local tables, objects and the persisted session.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: home_dir(),
        }
    }
}

/// Backend selection.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend kind.
    pub kind: BackendKind,

    /// Base URL for images served by the file backend (empty for `file://`).
    pub public_base_url: Option<String>,
}

/// Backend kind.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON tables and an objects directory under the storage path (default).
    #[default]
    File,

    /// Hosted backend-as-a-service over HTTP.
    Remote,
}

/// Hosted backend connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Project URL, e.g. `https://xyz.example.co`.
    pub url: String,

    /// Public (anon) API key sent with every request.
    pub anon_key: String,

    /// Storage bucket holding images.
    pub bucket: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            bucket: "images".to_string(),
            timeout_secs: 30,
        }
    }
}

impl RemoteConfig {
    /// Check that the connection settings are usable.
    ///
    /// # Errors
    ///
    /// Returns a config error if the URL or key is missing.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Config("remote.url is not set".to_string()));
        }
        if self.anon_key.trim().is_empty() {
            return Err(Error::Config("remote.anon_key is not set".to_string()));
        }
        Ok(())
    }

    /// Project URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// Local admin account used with the file backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Admin email.
    pub email: String,

    /// Hex SHA-256 digest of the admin password (empty disables login).
    pub password_sha256: String,

    /// Lifetime of a local session in hours.
    pub session_hours: i64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password_sha256: String::new(),
            session_hours: 24 * 7,
        }
    }
}

/// Carousel configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Auto-advance period in milliseconds.
    pub interval_ms: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self { interval_ms: 3000 }
    }
}

/// Feedback relay configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Form relay endpoint (empty disables submissions).
    pub endpoint: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_secs: 15,
        }
    }
}

/// Notice retention.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NoticeConfig {
    /// Maximum notices kept per board before the oldest are dropped.
    pub max_retained: usize,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self { max_retained: 50 }
    }
}

/// Get the default slowandarain home directory.
///
/// Uses `SLOWANDARAIN_HOME` if set, otherwise `~/.slowandarain`.
#[must_use]
pub fn home_dir() -> PathBuf {
    if let Ok(home) = env::var("SLOWANDARAIN_HOME") {
        return PathBuf::from(home);
    }
    dirs::home_dir().map_or_else(|| PathBuf::from(".slowandarain"), |h| h.join(".slowandarain"))
}

/// Load configuration with precedence: env vars → file → defaults.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
pub fn load_config() -> Result<Config> {
    let mut config = Config::default();

    let config_path = get_config_path();
    if config_path.exists() {
        let contents = fs::read_to_string(&config_path).map_err(Error::Storage)?;
        config = toml::from_str(&contents).map_err(|e| Error::Config(e.to_string()))?;
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the path to the config file.
fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var("SLOWANDARAIN_CONFIG") {
        return PathBuf::from(path);
    }
    home_dir().join("config.toml")
}

/// Apply environment variable overrides to config.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(path) = env::var("SLOWANDARAIN_STORAGE_PATH") {
        config.storage.path = PathBuf::from(path);
    } else if let Ok(home) = env::var("SLOWANDARAIN_HOME") {
        config.storage.path = PathBuf::from(home);
    }

    if let Ok(kind) = env::var("SLOWANDARAIN_BACKEND") {
        config.backend.kind = match kind.to_lowercase().as_str() {
            "remote" => BackendKind::Remote,
            _ => BackendKind::File,
        };
    }

    if let Ok(url) = env::var("SLOWANDARAIN_REMOTE_URL") {
        config.remote.url = url;
    }

    if let Ok(key) = env::var("SLOWANDARAIN_REMOTE_ANON_KEY") {
        config.remote.anon_key = key;
    }

    if let Ok(endpoint) = env::var("SLOWANDARAIN_FEEDBACK_ENDPOINT") {
        config.feedback.endpoint = endpoint;
    }

    if let Ok(val) = env::var("SLOWANDARAIN_CAROUSEL_INTERVAL_MS") {
        if let Ok(ms) = val.parse() {
            config.carousel.interval_ms = ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.backend.kind, BackendKind::File);
        assert_eq!(config.remote.bucket, "images");
        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.carousel.interval_ms, 3000);
        assert_eq!(config.notices.max_retained, 50);
        assert!(config.feedback.endpoint.is_empty());
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
            [backend]
            kind = "remote"

            [remote]
            url = "https://project.example.co/"
            anon_key = "anon"

            [carousel]
            interval_ms = 5000

            [feedback]
            endpoint = "https://relay.example.com/f/abc"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.backend.kind, BackendKind::Remote);
        assert_eq!(config.remote.base_url(), "https://project.example.co");
        assert_eq!(config.remote.bucket, "images"); // Default
        assert_eq!(config.carousel.interval_ms, 5000);
        assert_eq!(config.feedback.endpoint, "https://relay.example.com/f/abc");
        assert!(config.remote.validate().is_ok());
    }

    #[test]
    fn partial_config_uses_defaults() {
        let toml = r#"
            [admin]
            email = "admin@example.com"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.admin.email, "admin@example.com");
        assert_eq!(config.admin.session_hours, 168); // Default
        assert_eq!(config.carousel.interval_ms, 3000); // Default
    }

    #[test]
    fn remote_validation_requires_url_and_key() {
        let mut remote = RemoteConfig::default();
        assert!(matches!(remote.validate(), Err(Error::Config(_))));

        remote.url = "https://project.example.co".to_string();
        assert!(matches!(remote.validate(), Err(Error::Config(_))));

        remote.anon_key = "anon".to_string();
        assert!(remote.validate().is_ok());
    }
}
