#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingRequired(Vec<String>),
    #[error("invalid value `{value}` for `{key}`: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Non-fatal startup findings. Each one degrades a single feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    ApiKeyWithoutModel,
    ModelWithoutApiKey,
    ClassifierDisabled,
    AdminChatMissing,
    StatusWebhookMissing,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKeyWithoutModel => write!(
                f,
                "ANTHROPIC_API_KEY is set but CLAUDE_MODEL is not; classification runs in fallback mode"
            ),
            Self::ModelWithoutApiKey => write!(
                f,
                "CLAUDE_MODEL is set but ANTHROPIC_API_KEY is not; classification runs in fallback mode"
            ),
            Self::ClassifierDisabled => write!(
                f,
                "ANTHROPIC_API_KEY and CLAUDE_MODEL are unset; classification runs in fallback mode"
            ),
            Self::AdminChatMissing => write!(
                f,
                "ADMIN_CHAT_ID is unset; admin notifications and status buttons are disabled"
            ),
            Self::StatusWebhookMissing => write!(
                f,
                "MAKE_STATUS_WEBHOOK_URL is unset; status updates will be reported as not configured"
            ),
        }
    }
}
