use crate::config::Settings;
use std::sync::Arc;

pub mod backend;
pub mod budget;
pub mod goal;
pub mod prompt;
pub mod response_parse;
pub mod types;
pub mod validate;

pub use backend::{AnthropicBackend, ModelBackend, ModelError};
pub use budget::normalize_budget;
pub use goal::extract_goal;
pub use response_parse::extract_json_object;
pub use types::{ClassificationResult, ClassifiedFields, Intent, Service};
pub use validate::validate_result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    NotConfigured,
    RequestFailed(String),
    NonTextResponse,
    NoJsonObject,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "model is not configured"),
            Self::RequestFailed(reason) => write!(f, "model request failed: {reason}"),
            Self::NonTextResponse => write!(f, "model reply had no text content"),
            Self::NoJsonObject => write!(f, "model reply contained no json object"),
        }
    }
}

/// Outcome of one classification. Both variants carry a complete result, so
/// callers can always proceed; the variant records whether the model was
/// actually used.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    Classified(ClassificationResult),
    Fallback {
        result: ClassificationResult,
        reason: FallbackReason,
    },
}

impl ClassificationOutcome {
    pub fn result(&self) -> &ClassificationResult {
        match self {
            Self::Classified(result) => result,
            Self::Fallback { result, .. } => result,
        }
    }

    pub fn into_result(self) -> ClassificationResult {
        match self {
            Self::Classified(result) => result,
            Self::Fallback { result, .. } => result,
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Self::Classified(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }
}

#[derive(Clone)]
pub struct Classifier {
    backend: Option<Arc<dyn ModelBackend>>,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("configured", &self.backend.is_some())
            .finish()
    }
}

impl Classifier {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Classifier that always answers with the local fallback.
    pub fn unconfigured() -> Self {
        Self { backend: None }
    }

    /// Uses the Anthropic backend when both the API key and the model are set.
    pub fn from_settings(settings: &Settings) -> Self {
        match settings.model_credentials() {
            Some((api_key, model)) => Self::new(Arc::new(AnthropicBackend::new(
                &settings.tunables.anthropic_api_base,
                api_key,
                model,
                settings.tunables.model_timeout(),
                prompt::MAX_RESPONSE_TOKENS,
            ))),
            None => Self::unconfigured(),
        }
    }

    /// Classifies `text` with a single model call. Never fails: any problem
    /// yields [`ClassificationOutcome::Fallback`] with the goal derived from
    /// the raw text.
    pub fn classify(&self, text: &str) -> ClassificationOutcome {
        let Some(backend) = self.backend.as_ref() else {
            return fallback(text, FallbackReason::NotConfigured);
        };

        let reply = match backend.complete(prompt::SYSTEM_PROMPT, text) {
            Ok(reply) => reply,
            Err(ModelError::NonText) => return fallback(text, FallbackReason::NonTextResponse),
            Err(err) => return fallback(text, FallbackReason::RequestFailed(err.to_string())),
        };

        let Some(parsed) = extract_json_object(&reply) else {
            return fallback(text, FallbackReason::NoJsonObject);
        };

        let mut result = validate_result(&parsed);
        if result.fields.goal.is_empty() {
            result.fields.goal = extract_goal(text);
        }
        ClassificationOutcome::Classified(result)
    }
}

fn fallback(text: &str, reason: FallbackReason) -> ClassificationOutcome {
    let mut result = ClassificationResult::fallback();
    result.fields.goal = extract_goal(text);
    ClassificationOutcome::Fallback { result, reason }
}
