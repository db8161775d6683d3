use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

pub fn validate_trace_id_value(value: &str) -> Result<(i64, i64), String> {
    if value.is_empty() {
        return Err("trace id must be non-empty".to_string());
    }
    let (chat, message) = value
        .split_once(':')
        .ok_or_else(|| "trace id must have the form `<chat_id>:<message_id>`".to_string())?;
    let chat_id = chat
        .parse::<i64>()
        .map_err(|_| format!("trace id chat component `{chat}` is not an integer"))?;
    let message_id = message
        .parse::<i64>()
        .map_err(|_| format!("trace id message component `{message}` is not an integer"))?;
    Ok((chat_id, message_id))
}

/// Correlates one inbound chat message across logs, webhook payloads and
/// admin status callbacks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    pub fn from_message(chat_id: i64, message_id: i64) -> Self {
        Self(format!("{chat_id}:{message_id}"))
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        validate_trace_id_value(raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn chat_id(&self) -> Option<i64> {
        validate_trace_id_value(&self.0).ok().map(|(chat, _)| chat)
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::borrow::Borrow<str> for TraceId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for TraceId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl<'de> Deserialize<'de> for TraceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .map_err(|err| D::Error::custom(format!("invalid trace id `{raw}`: {err}")))
    }
}
