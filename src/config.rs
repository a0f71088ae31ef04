//! Client configuration: an optional JSON file plus environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chat_api::payload::{DEFAULT_HISTORY_LIMIT, DEFAULT_LANGUAGE, DEFAULT_TIMEZONE};
use chat_api::url::DEFAULT_BASE_URL;
use chat_api::ChatApiConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::retry::{RetryPolicy, DEFAULT_SESSION_READY_ATTEMPTS, DEFAULT_SESSION_READY_DELAY_MS};
use crate::scroll::DEFAULT_SCROLL_THRESHOLD_PX;

pub const CONFIG_PATH_ENV_VAR: &str = "HEALTHMATE_CHAT_CONFIG_PATH";
pub const BASE_URL_ENV_VAR: &str = "HEALTHMATE_CHAT_BASE_URL";
pub const TIMEZONE_ENV_VAR: &str = "HEALTHMATE_CHAT_TIMEZONE";
pub const LANGUAGE_ENV_VAR: &str = "HEALTHMATE_CHAT_LANGUAGE";
pub const AUTH_COOKIE_ENV_VAR: &str = "HEALTHMATE_CHAT_AUTH_COOKIE";
pub const STORAGE_DIR_ENV_VAR: &str = "HEALTHMATE_CHAT_STORAGE_DIR";

pub const DEFAULT_STORAGE_DIR: &str = ".healthmate_chat";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WELCOME_MESSAGE: &str =
    "Hello, I'm HealthMate. Ask me anything about your health goals, meals or workouts.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config value for '{field}': {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub base_url: String,
    pub timezone: String,
    pub language: String,
    pub auth_cookie: Option<String>,
    pub storage_dir: PathBuf,
    /// Connect timeout for requests. The streamed body itself has no timeout.
    pub request_timeout_secs: u64,
    pub history_limit: u32,
    pub scroll_threshold_px: u32,
    pub session_ready_attempts: u32,
    pub session_ready_delay_ms: u64,
    pub welcome_message: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            auth_cookie: None,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            scroll_threshold_px: DEFAULT_SCROLL_THRESHOLD_PX,
            session_ready_attempts: DEFAULT_SESSION_READY_ATTEMPTS,
            session_ready_delay_ms: DEFAULT_SESSION_READY_DELAY_MS,
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults, then the file named by [`CONFIG_PATH_ENV_VAR`] if set, then
    /// individual environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env_string_opt(CONFIG_PATH_ENV_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Empty environment values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(value) = env_string_opt(BASE_URL_ENV_VAR) {
            self.base_url = value;
        }
        if let Some(value) = env_string_opt(TIMEZONE_ENV_VAR) {
            self.timezone = value;
        }
        if let Some(value) = env_string_opt(LANGUAGE_ENV_VAR) {
            self.language = value;
        }
        if let Some(value) = env_string_opt(AUTH_COOKIE_ENV_VAR) {
            self.auth_cookie = Some(value);
        }
        if let Some(value) = env_string_opt(STORAGE_DIR_ENV_VAR) {
            self.storage_dir = PathBuf::from(value);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timezone.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "timezone",
                reason: "must not be blank".to_string(),
            });
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "language",
                reason: "must not be blank".to_string(),
            });
        }
        if self.session_ready_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "session_ready_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn api_config(&self) -> ChatApiConfig {
        let mut api = ChatApiConfig::new(self.base_url.clone());
        if let Some(cookie) = &self.auth_cookie {
            api = api.with_auth_cookie(cookie.clone());
        }
        if self.request_timeout_secs > 0 {
            api = api.with_connect_timeout(Duration::from_secs(self.request_timeout_secs));
        }
        api
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.session_ready_attempts,
            Duration::from_millis(self.session_ready_delay_ms),
        )
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value.trim().to_string())
        }
    })
}
