use super::{ConfigError, ConfigWarning, Settings, Tunables};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_PATH_VAR: &str = "DISPATCH_RELAY_CONFIG";

#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub warnings: Vec<ConfigWarning>,
}

pub fn load_settings_from_env() -> Result<LoadedSettings, ConfigError> {
    load_settings(|key| std::env::var(key).ok())
}

/// Builds settings from a variable lookup. Tunables come from the YAML file
/// named by `DISPATCH_RELAY_CONFIG` when set, then individual variables
/// override them.
pub fn load_settings<F>(lookup: F) -> Result<LoadedSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let mut missing = Vec::new();
    let bot_token = get("BOT_TOKEN");
    if bot_token.is_none() {
        missing.push("BOT_TOKEN".to_string());
    }
    let webhook_url = get("MAKE_WEBHOOK_URL");
    if webhook_url.is_none() {
        missing.push("MAKE_WEBHOOK_URL".to_string());
    }
    let (Some(bot_token), Some(webhook_url)) = (bot_token, webhook_url) else {
        return Err(ConfigError::MissingRequired(missing));
    };

    let mut tunables = match get(CONFIG_PATH_VAR) {
        Some(path) => Tunables::from_path(Path::new(path.trim()))?,
        None => Tunables::default(),
    };
    apply_overrides(&mut tunables, &get)?;

    let admin_chat_id = get("ADMIN_CHAT_ID")
        .map(|raw| parse_var::<i64>("ADMIN_CHAT_ID", &raw))
        .transpose()?;

    let settings = Settings {
        bot_token: bot_token.trim().to_string(),
        webhook_url: webhook_url.trim().to_string(),
        status_webhook_url: get("MAKE_STATUS_WEBHOOK_URL").map(|v| v.trim().to_string()),
        anthropic_api_key: get("ANTHROPIC_API_KEY").map(|v| v.trim().to_string()),
        claude_model: get("CLAUDE_MODEL").map(|v| v.trim().to_string()),
        admin_chat_id,
        tunables,
    };
    let warnings = settings.warnings();
    Ok(LoadedSettings { settings, warnings })
}

fn apply_overrides<G>(tunables: &mut Tunables, get: &G) -> Result<(), ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    if let Some(raw) = get("MAKE_TIMEOUT_SECS") {
        tunables.make_timeout_secs = parse_var("MAKE_TIMEOUT_SECS", &raw)?;
    }
    if let Some(raw) = get("MAKE_RETRIES") {
        tunables.make_retries = parse_var("MAKE_RETRIES", &raw)?;
    }
    if let Some(raw) = get("CLAUDE_TIMEOUT_SECS") {
        tunables.claude_timeout_secs = parse_var("CLAUDE_TIMEOUT_SECS", &raw)?;
    }
    if let Some(raw) = get("RETRY_DELAY_UNIT_MS") {
        tunables.retry_delay_unit_ms = parse_var("RETRY_DELAY_UNIT_MS", &raw)?;
    }
    if let Some(raw) = get("POLL_TIMEOUT_SECS") {
        tunables.poll_timeout_secs = parse_var("POLL_TIMEOUT_SECS", &raw)?;
    }
    if let Some(raw) = get("ANTHROPIC_API_BASE") {
        tunables.anthropic_api_base = raw.trim().to_string();
    }
    if let Some(raw) = get("TELEGRAM_API_BASE") {
        tunables.telegram_api_base = raw.trim().to_string();
    }
    if let Some(raw) = get("DISPATCH_RELAY_LOG") {
        tunables.log_path = Some(PathBuf::from(raw.trim()));
    }
    Ok(())
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: err.to_string(),
        })
}
