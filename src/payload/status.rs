use crate::shared::TraceId;
use serde::{Deserialize, Serialize};

pub const STATUS_UPDATE_ACTION: &str = "status_update";
pub const STATUS_CALLBACK_PREFIX: &str = "st";

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("unknown status code `{0}`")]
    UnknownCode(String),
    #[error("malformed status callback `{0}`")]
    MalformedCallback(String),
}

/// Lifecycle codes an administrator can assign to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    InProgress,
    WaitingClient,
    Done,
    Rejected,
}

impl StatusCode {
    pub const ALL: [StatusCode; 4] = [
        Self::InProgress,
        Self::WaitingClient,
        Self::Done,
        Self::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::WaitingClient => "waiting_client",
            Self::Done => "done",
            Self::Rejected => "rejected",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::InProgress => "В работе",
            Self::WaitingClient => "Ждём клиента",
            Self::Done => "Завершено",
            Self::Rejected => "Отклонено",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, StatusError> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == raw)
            .ok_or_else(|| StatusError::UnknownCode(raw.to_string()))
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdatePayload {
    pub action: String,
    pub trace_id: TraceId,
    pub status: String,
    pub status_code: StatusCode,
    pub changed_at: String,
}

pub fn build_status_update(
    trace_id: &TraceId,
    code: StatusCode,
    changed_at: &str,
) -> StatusUpdatePayload {
    StatusUpdatePayload {
        action: STATUS_UPDATE_ACTION.to_string(),
        trace_id: trace_id.clone(),
        status: code.label().to_string(),
        status_code: code,
        changed_at: changed_at.to_string(),
    }
}

/// Inline-button payload, `st:<status_code>:<trace_id>`.
pub fn status_callback_data(code: StatusCode, trace_id: &TraceId) -> String {
    format!("{STATUS_CALLBACK_PREFIX}:{}:{trace_id}", code.as_str())
}

/// Splits callback data into a validated code and trace id. Unknown codes
/// are rejected here, before any payload exists.
pub fn parse_status_callback(data: &str) -> Result<(StatusCode, TraceId), StatusError> {
    let malformed = || StatusError::MalformedCallback(data.to_string());
    let rest = data
        .strip_prefix(STATUS_CALLBACK_PREFIX)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or_else(malformed)?;
    let (code, trace) = rest.split_once(':').ok_or_else(malformed)?;
    let code = StatusCode::parse(code)?;
    let trace_id = TraceId::parse(trace).map_err(|_| malformed())?;
    Ok((code, trace_id))
}
