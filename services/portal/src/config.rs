//! Portal client configuration
//!
//! Values come from built-in defaults, then an optional `portal.toml`, then
//! `PORTAL_*` environment variables (e.g. `PORTAL_API_URL`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::ApiResult;

/// Backend address used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Portal client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Base URL every endpoint is relative to
    pub api_url: String,
    /// Session file; defaults to the platform data directory
    pub store_path: Option<PathBuf>,
    /// Per-request timeout in seconds, `0` disables it
    pub request_timeout_secs: u64,
    /// Pause between a successful login and the dashboard redirect
    pub redirect_delay_ms: u64,
    /// Where downloaded documents are saved
    pub download_dir: PathBuf,
    /// When set, the session lives in Redis instead of the session file
    pub redis_url: Option<String>,
}

impl PortalConfig {
    /// Load configuration from `portal.toml` (if present) and the environment
    pub fn from_env() -> ApiResult<Self> {
        Self::load(None)
    }

    /// Load configuration, reading `file` instead of `portal.toml` when given
    pub fn load(file: Option<&Path>) -> ApiResult<Self> {
        let mut builder = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("request_timeout_secs", 30_i64)?
            .set_default("redirect_delay_ms", 1500_i64)?
            .set_default("download_dir", ".")?;

        builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("portal").required(false)),
        };

        let config: PortalConfig = builder
            .add_source(Environment::with_prefix("PORTAL").try_parsing(true))
            .build()?
            .try_deserialize()?;

        if config.api_url.trim().is_empty() {
            return Err(ConfigError::Message("api_url must not be empty".to_string()).into());
        }

        Ok(config)
    }

    /// Configuration pointing at `api_url` with every other value defaulted
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            store_path: None,
            request_timeout_secs: 30,
            redirect_delay_ms: 1500,
            download_dir: PathBuf::from("."),
            redis_url: None,
        }
    }

    /// Request timeout, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Delay before navigating to the dashboard after login
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    /// Session file location, falling back to the platform data directory
    pub fn resolved_store_path(&self) -> ApiResult<PathBuf> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }

        directories::ProjectDirs::from("org", "school", "alumni-portal")
            .map(|dirs| dirs.data_dir().join("session.json"))
            .ok_or_else(|| {
                ConfigError::Message(
                    "could not determine a data directory; set PORTAL_STORE_PATH".to_string(),
                )
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "PORTAL_API_URL",
            "PORTAL_STORE_PATH",
            "PORTAL_REQUEST_TIMEOUT_SECS",
            "PORTAL_REDIRECT_DELAY_MS",
            "PORTAL_DOWNLOAD_DIR",
            "PORTAL_REDIS_URL",
        ] {
            // SAFETY: tests touching the environment are serialized
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_portal_config_defaults() {
        clear_env();
        let config = PortalConfig::from_env().expect("Failed to create portal config");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.redirect_delay(), Duration::from_millis(1500));
        assert_eq!(config.download_dir, PathBuf::from("."));
        assert!(config.store_path.is_none());
        assert!(config.redis_url.is_none());
    }

    #[test]
    #[serial]
    fn test_portal_config_from_env_overrides() {
        clear_env();
        // SAFETY: tests touching the environment are serialized
        unsafe {
            std::env::set_var("PORTAL_API_URL", "https://school.example/api");
            std::env::set_var("PORTAL_REQUEST_TIMEOUT_SECS", "0");
            std::env::set_var("PORTAL_STORE_PATH", "/tmp/portal-session.json");
        }

        let config = PortalConfig::from_env().expect("Failed to create portal config");
        clear_env();

        assert_eq!(config.api_url, "https://school.example/api");
        assert_eq!(config.request_timeout(), None);
        assert_eq!(
            config.resolved_store_path().unwrap(),
            PathBuf::from("/tmp/portal-session.json")
        );
    }

    #[test]
    #[serial]
    fn test_portal_config_from_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal.toml");
        std::fs::write(
            &path,
            "api_url = \"http://backend:8000/api\"\nredirect_delay_ms = 0\n",
        )
        .unwrap();

        let config = PortalConfig::load(Some(&path)).unwrap();
        assert_eq!(config.api_url, "http://backend:8000/api");
        assert_eq!(config.redirect_delay(), Duration::ZERO);
    }

    #[test]
    fn test_with_api_url_uses_defaults() {
        let config = PortalConfig::with_api_url("http://127.0.0.1:1/api");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.redirect_delay_ms, 1500);
    }
}
