use serde::{Deserialize, Serialize};

pub const SUMMARY_PLACEHOLDER: &str = "Нет описания";
pub const FALLBACK_SUMMARY: &str = "Не удалось классифицировать";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Lead,
    Question,
    Support,
    #[default]
    Other,
}

impl Intent {
    pub const ALL: [Intent; 4] = [Self::Lead, Self::Question, Self::Support, Self::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Question => "question",
            Self::Support => "support",
            Self::Other => "other",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|intent| intent.as_str() == value)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    AiAgents,
    MakeAutomation,
    GptAssistants,
    Consultation,
    #[default]
    Unknown,
}

impl Service {
    pub const ALL: [Service; 5] = [
        Self::AiAgents,
        Self::MakeAutomation,
        Self::GptAssistants,
        Self::Consultation,
        Self::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AiAgents => "ai_agents",
            Self::MakeAutomation => "make_automation",
            Self::GptAssistants => "gpt_assistants",
            Self::Consultation => "consultation",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|service| service.as_str() == value)
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured attributes pulled out of the message. `goal` uses the empty
/// string as its "absent" value and is never null on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassifiedFields {
    pub budget: Option<i64>,
    pub deadline_text: Option<String>,
    pub contact: Option<String>,
    #[serde(default)]
    pub goal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: Intent,
    pub service: Service,
    pub confidence: f64,
    pub summary: String,
    pub fields: ClassifiedFields,
}

impl ClassificationResult {
    /// The fixed result used whenever the model is unavailable or unusable.
    pub fn fallback() -> Self {
        Self {
            intent: Intent::Other,
            service: Service::Unknown,
            confidence: 0.0,
            summary: FALLBACK_SUMMARY.to_string(),
            fields: ClassifiedFields::default(),
        }
    }
}
