use super::types::{InlineKeyboardMarkup, Update};
use super::{ChatTransport, TelegramError, UpdateSource};
use crate::shared::http::agent_with_timeout;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const LONG_POLL_GRACE_SECS: u64 = 10;
const ALLOWED_UPDATES: &str = r#"["message","callback_query"]"#;

#[derive(Debug, Clone, Deserialize)]
struct TelegramEnvelope<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

/// Bot API client over blocking `ureq` calls.
#[derive(Debug, Clone)]
pub struct TelegramApiClient {
    agent: ureq::Agent,
    api_base: String,
    bot_token: String,
    poll_timeout_secs: u64,
}

impl TelegramApiClient {
    pub fn new(api_base: &str, bot_token: &str, poll_timeout_secs: u64) -> Self {
        Self {
            agent: agent_with_timeout(Duration::from_secs(
                poll_timeout_secs + LONG_POLL_GRACE_SECS,
            )),
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            poll_timeout_secs,
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }

    fn decode<T: DeserializeOwned>(
        method: &str,
        response: ureq::Response,
    ) -> Result<T, TelegramError> {
        let envelope: TelegramEnvelope<T> = response
            .into_json()
            .map_err(|e| TelegramError::Decode(format!("{method}: {e}")))?;
        if !envelope.ok {
            return Err(TelegramError::ApiResponse(
                envelope
                    .description
                    .unwrap_or_else(|| format!("{method} failed")),
            ));
        }
        envelope
            .result
            .ok_or_else(|| TelegramError::Decode(format!("{method}: missing result")))
    }

    fn map_error(method: &str, err: ureq::Error) -> TelegramError {
        match err {
            ureq::Error::Status(status, response) => {
                let description = response
                    .into_json::<TelegramEnvelope<serde_json::Value>>()
                    .ok()
                    .and_then(|envelope| envelope.description)
                    .unwrap_or_else(|| format!("{method} failed with HTTP {status}"));
                TelegramError::ApiResponse(description)
            }
            ureq::Error::Transport(transport) => {
                TelegramError::ApiRequest(format!("{method}: {transport}"))
            }
        }
    }

    fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, TelegramError> {
        let body = serde_json::to_value(body).map_err(|e| TelegramError::Decode(e.to_string()))?;
        let response = self
            .agent
            .post(&self.endpoint(method))
            .send_json(body)
            .map_err(|e| Self::map_error(method, e))?;
        Self::decode(method, response)
    }

    pub fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let mut query = vec![
            ("timeout", timeout_secs.to_string()),
            ("allowed_updates", ALLOWED_UPDATES.to_string()),
        ];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }
        let encoded = query
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}?{encoded}", self.endpoint("getUpdates"));

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| Self::map_error("getUpdates", e))?;
        Self::decode("getUpdates", response)
    }

    pub fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(keyboard) = keyboard {
            body["reply_markup"] =
                serde_json::to_value(keyboard).map_err(|e| TelegramError::Decode(e.to_string()))?;
        }
        let _: serde_json::Value = self.post("sendMessage", &body)?;
        Ok(())
    }

    pub fn answer_callback_query(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), TelegramError> {
        let mut body = json!({ "callback_query_id": callback_id });
        if let Some(text) = text.filter(|v| !v.trim().is_empty()) {
            body["text"] = json!(text);
        }
        let _: serde_json::Value = self.post("answerCallbackQuery", &body)?;
        Ok(())
    }
}

impl ChatTransport for TelegramApiClient {
    fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        TelegramApiClient::send_message(self, chat_id, text, keyboard)
    }

    fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), TelegramError> {
        self.answer_callback_query(callback_id, text)
    }
}

impl UpdateSource for TelegramApiClient {
    fn next_batch(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        self.get_updates(offset, self.poll_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_without_result_decodes_for_any_payload_type() {
        let envelope: TelegramEnvelope<Vec<Update>> =
            serde_json::from_str(r#"{"ok":false,"description":"Unauthorized"}"#)
                .expect("error envelope");
        assert!(!envelope.ok);
        assert_eq!(envelope.description.as_deref(), Some("Unauthorized"));
        assert!(envelope.result.is_none());

        let envelope: TelegramEnvelope<Vec<Update>> =
            serde_json::from_str(r#"{"ok":true,"result":[{"update_id":3}]}"#).expect("batch");
        assert_eq!(envelope.result.map(|updates| updates.len()), Some(1));
        assert!(envelope.description.is_none());
    }

    #[test]
    fn endpoint_embeds_token_and_method() {
        let client = TelegramApiClient::new("https://api.telegram.test/", "123:abc", 30);
        assert_eq!(
            client.endpoint("getUpdates"),
            "https://api.telegram.test/bot123:abc/getUpdates"
        );
    }
}
