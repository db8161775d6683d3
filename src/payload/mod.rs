use crate::classifier::{ClassificationResult, Intent, Service};
use crate::shared::TraceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod status;

pub use status::{
    build_status_update, parse_status_callback, status_callback_data, StatusCode, StatusError,
    StatusUpdatePayload,
};

pub const SOURCE_TELEGRAM: &str = "telegram";

/// UTC ISO-8601 with second precision, e.g. `2026-02-01T12:00:00Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub name: Option<String>,
}

/// Metadata of one inbound chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEnvelope {
    pub trace_id: TraceId,
    pub created_at: String,
    pub chat_id: i64,
    pub message_id: i64,
    pub user: UserInfo,
    pub text: String,
}

/// Body of the primary downstream webhook. Every key is always serialized;
/// optional values go out as `null` and `goal` is always a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingPayload {
    pub trace_id: TraceId,
    pub created_at: String,
    pub source: String,
    pub chat_id: i64,
    pub message_id: i64,
    pub user: UserInfo,
    pub text: String,
    pub intent: Intent,
    pub service: Service,
    pub confidence: f64,
    pub summary: String,
    pub goal: String,
    pub budget: Option<i64>,
    pub deadline_text: Option<String>,
    pub contact: Option<String>,
}

pub fn build_payload(
    envelope: &MessageEnvelope,
    classification: &ClassificationResult,
) -> OutgoingPayload {
    let fields = &classification.fields;
    OutgoingPayload {
        trace_id: envelope.trace_id.clone(),
        created_at: envelope.created_at.clone(),
        source: SOURCE_TELEGRAM.to_string(),
        chat_id: envelope.chat_id,
        message_id: envelope.message_id,
        user: envelope.user.clone(),
        text: envelope.text.clone(),
        intent: classification.intent,
        service: classification.service,
        confidence: classification.confidence,
        summary: classification.summary.clone(),
        goal: fields.goal.trim().to_string(),
        budget: fields.budget,
        deadline_text: fields.deadline_text.clone(),
        contact: fields.contact.clone(),
    }
}
