use crate::shared::http::{agent_with_timeout, classify_transport, TransportFailure};
use crate::shared::truncate_chars;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Transport(TransportFailure),
    #[error("model api returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model api response could not be decoded: {0}")]
    Decode(String),
    #[error("model api response has no text content")]
    NonText,
}

/// One synchronous completion against a language model.
pub trait ModelBackend: Send + Sync {
    fn complete(&self, system: &str, user_text: &str) -> Result<String, ModelError>;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserTurn<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API backend over a blocking `ureq` agent.
#[derive(Debug, Clone)]
pub struct AnthropicBackend {
    agent: ureq::Agent,
    api_base: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicBackend {
    pub fn new(
        api_base: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
        max_tokens: u32,
    ) -> Self {
        Self {
            agent: agent_with_timeout(timeout),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.api_base)
    }
}

impl ModelBackend for AnthropicBackend {
    fn complete(&self, system: &str, user_text: &str) -> Result<String, ModelError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: [UserTurn {
                role: "user",
                content: user_text,
            }],
        };
        let body = serde_json::to_value(&body).map_err(|e| ModelError::Decode(e.to_string()))?;

        let response = self
            .agent
            .post(&self.endpoint())
            .set("x-api-key", &self.api_key)
            .set("anthropic-version", ANTHROPIC_VERSION)
            .set("content-type", "application/json")
            .send_json(body)
            .map_err(|err| match err {
                ureq::Error::Status(status, response) => {
                    let body = response.into_string().unwrap_or_default();
                    ModelError::Status {
                        status,
                        body: truncate_chars(&body, ERROR_BODY_CHARS).to_string(),
                    }
                }
                ureq::Error::Transport(transport) => {
                    ModelError::Transport(classify_transport(&transport))
                }
            })?;

        let parsed: MessagesResponse = response
            .into_json()
            .map_err(|e| ModelError::Decode(e.to_string()))?;
        first_text_block(parsed)
    }
}

fn first_text_block(response: MessagesResponse) -> Result<String, ModelError> {
    let block = response.content.into_iter().next().ok_or(ModelError::NonText)?;
    if block.kind != "text" {
        return Err(ModelError::NonText);
    }
    block.text.ok_or(ModelError::NonText)
}
