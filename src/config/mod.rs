use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod error;
pub mod load;

pub use error::{ConfigError, ConfigWarning};
pub use load::{load_settings, load_settings_from_env, LoadedSettings};

pub const DEFAULT_MAKE_TIMEOUT_SECS: u64 = 25;
pub const DEFAULT_MAKE_RETRIES: u32 = 2;
pub const DEFAULT_CLAUDE_TIMEOUT_SECS: u64 = 25;
pub const DEFAULT_RETRY_DELAY_UNIT_MS: u64 = 1000;
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Timeouts, retry counts and endpoint bases. Loadable from YAML and
/// overridable from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub make_timeout_secs: u64,
    pub make_retries: u32,
    pub claude_timeout_secs: u64,
    pub retry_delay_unit_ms: u64,
    pub poll_timeout_secs: u64,
    pub anthropic_api_base: String,
    pub telegram_api_base: String,
    pub log_path: Option<PathBuf>,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            make_timeout_secs: DEFAULT_MAKE_TIMEOUT_SECS,
            make_retries: DEFAULT_MAKE_RETRIES,
            claude_timeout_secs: DEFAULT_CLAUDE_TIMEOUT_SECS,
            retry_delay_unit_ms: DEFAULT_RETRY_DELAY_UNIT_MS,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            anthropic_api_base: DEFAULT_ANTHROPIC_API_BASE.to_string(),
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            log_path: None,
        }
    }
}

impl Tunables {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.make_timeout_secs)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.claude_timeout_secs)
    }

    pub fn retry_delay_unit(&self) -> Duration {
        Duration::from_millis(self.retry_delay_unit_ms)
    }
}

/// Process configuration, built once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bot_token: String,
    pub webhook_url: String,
    pub status_webhook_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub claude_model: Option<String>,
    pub admin_chat_id: Option<i64>,
    pub tunables: Tunables,
}

impl Settings {
    /// Returns `(api_key, model)` only when both are present.
    pub fn model_credentials(&self) -> Option<(&str, &str)> {
        match (
            self.anthropic_api_key.as_deref(),
            self.claude_model.as_deref(),
        ) {
            (Some(key), Some(model)) => Some((key, model)),
            _ => None,
        }
    }

    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        match (&self.anthropic_api_key, &self.claude_model) {
            (Some(_), None) => warnings.push(ConfigWarning::ApiKeyWithoutModel),
            (None, Some(_)) => warnings.push(ConfigWarning::ModelWithoutApiKey),
            (None, None) => warnings.push(ConfigWarning::ClassifierDisabled),
            (Some(_), Some(_)) => {}
        }
        if self.admin_chat_id.is_none() {
            warnings.push(ConfigWarning::AdminChatMissing);
        }
        if self.status_webhook_url.is_none() {
            warnings.push(ConfigWarning::StatusWebhookMissing);
        }
        warnings
    }
}
