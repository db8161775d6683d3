use dispatch_relay::classifier::{extract_goal, validate_result};
use dispatch_relay::payload::{build_payload, MessageEnvelope, OutgoingPayload, UserInfo};
use dispatch_relay::shared::TraceId;
use serde_json::{json, Value};

fn payload_for(message_id: i64, text: &str, classification: Value) -> Value {
    let map = classification
        .as_object()
        .cloned()
        .expect("classification object");
    let envelope = MessageEnvelope {
        trace_id: TraceId::from_message(123, message_id),
        created_at: "2026-02-01T12:00:00Z".to_string(),
        chat_id: 123,
        message_id,
        user: UserInfo {
            id: Some(123),
            username: Some("user".to_string()),
            name: Some("User".to_string()),
        },
        text: text.to_string(),
    };
    serde_json::to_value(build_payload(&envelope, &validate_result(&map))).expect("payload json")
}

#[test]
fn goal_is_always_a_string_in_payload() {
    let with_goal = payload_for(
        1,
        "Нужен бот для записи",
        json!({"intent": "lead", "service": "gpt_assistants", "confidence": 0.9,
               "summary": "Нужен бот",
               "fields": {"budget": 50000, "deadline_text": "к пятнице", "contact": "@user",
                          "goal": "бот для записи клиентов"}}),
    );
    assert_eq!(with_goal["goal"], "бот для записи клиентов");
    assert_eq!(with_goal["budget"], 50000);

    let null_goal = payload_for(
        2,
        "Сколько стоит?",
        json!({"intent": "question", "service": "unknown", "confidence": 0.5,
               "summary": "Вопрос",
               "fields": {"budget": null, "deadline_text": null, "contact": null, "goal": null}}),
    );
    assert_eq!(null_goal["goal"], "");

    let no_fields = payload_for(
        3,
        "Привет",
        json!({"intent": "other", "service": "unknown", "confidence": 0.0, "summary": "Не понятно"}),
    );
    assert_eq!(no_fields["goal"], "");
    assert!(no_fields["budget"].is_null());

    let padded = payload_for(
        4,
        "Нужен агент",
        json!({"intent": "lead", "service": "ai_agents", "confidence": 0.8, "summary": "Агент",
               "fields": {"goal": "  агент для поддержки  "}}),
    );
    assert_eq!(padded["goal"], "агент для поддержки");
}

#[test]
fn payload_serializes_every_key_and_decodes_back() {
    let value = payload_for(
        5,
        "Хочу автоматизацию",
        json!({"intent": "lead", "service": "make_automation", "confidence": 1.7}),
    );
    let keys: Vec<&str> = value
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    for key in [
        "trace_id",
        "created_at",
        "source",
        "chat_id",
        "message_id",
        "user",
        "text",
        "intent",
        "service",
        "confidence",
        "summary",
        "goal",
        "budget",
        "deadline_text",
        "contact",
    ] {
        assert!(keys.contains(&key), "missing {key}");
    }
    assert_eq!(value["confidence"], 1.0);

    let decoded: OutgoingPayload = serde_json::from_value(value).expect("decode payload");
    assert_eq!(decoded.trace_id.as_str(), "123:5");
}

#[test]
fn goal_fallback_extracts_request_phrases() {
    let automation = extract_goal("Хочу автоматизацию на Make, бюджет 30к, до понедельника, @nikkk8");
    assert!(automation.to_lowercase().contains("автоматизаци"), "{automation}");

    let bot = extract_goal("Нужен бот для записи клиентов, бюджет 50к, до пятницы");
    assert!(bot.contains("бот"), "{bot}");

    let integration = extract_goal("Нужна интеграция с CRM, @username");
    assert!(integration.contains("интеграци"), "{integration}");

    assert_eq!(extract_goal(""), "");
    assert_eq!(extract_goal("Привет, как дела?"), "");
}
