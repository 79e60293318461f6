//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `FEISHU_` prefix; all settings are flat.
//!
//! # Example
//!
//! ```no_run
//! use feishu_docs_agent::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Talking to {}", config.base_url);
//! ```

mod error;

pub use error::{ConfigError, ValidationError};

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::adapters::feishu::{Credentials, DEFAULT_BASE_URL};
use crate::domain::foundation::FolderToken;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Pre-issued user or tenant access token (personal mode)
    pub access_token: Option<SecretString>,

    /// App id for the tenant token exchange (enterprise mode)
    pub app_id: Option<String>,

    /// App secret for the tenant token exchange
    pub app_secret: Option<SecretString>,

    /// Folder used when an action names none
    pub ai_folder_token: Option<String>,

    /// API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Pause before the single retry of a transient failure
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `FEISHU` prefix
    /// 3. Deserializes into the typed configuration struct
    ///
    /// # Environment Variable Format
    ///
    /// - `FEISHU_APP_ID=cli_xxx` -> `app_id = "cli_xxx"`
    /// - `FEISHU_TIMEOUT_SECS=10` -> `timeout_secs = 10`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().prefix("FEISHU"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate configuration values
    ///
    /// Credentials are not required here; actions report them missing when
    /// they need them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ValidationError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }

    /// Resolve which credentials to use
    ///
    /// An access token wins; otherwise both app id and app secret are needed.
    pub fn credentials(&self) -> Result<Credentials, ValidationError> {
        if let Some(token) = non_blank_secret(&self.access_token) {
            return Ok(Credentials::access_token(token));
        }

        let app_id = self.app_id.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let app_secret = non_blank_secret(&self.app_secret);
        match (app_id, app_secret) {
            (Some(id), Some(secret)) => Ok(Credentials::app(id, secret)),
            (Some(_), None) => Err(ValidationError::MissingRequired("FEISHU_APP_SECRET")),
            (None, Some(_)) => Err(ValidationError::MissingRequired("FEISHU_APP_ID")),
            (None, None) => Err(ValidationError::MissingRequired(
                "FEISHU_ACCESS_TOKEN or FEISHU_APP_ID/FEISHU_APP_SECRET",
            )),
        }
    }

    /// Configured default folder, if any
    pub fn default_folder(&self) -> Option<FolderToken> {
        self.ai_folder_token
            .as_deref()
            .and_then(|token| FolderToken::new(token).ok())
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            app_id: None,
            app_secret: None,
            ai_folder_token: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

fn non_blank_secret(secret: &Option<SecretString>) -> Option<String> {
    secret
        .as_ref()
        .map(|s| s.expose_secret().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_retry_delay() -> u64 {
    500
}
