mod support;

use dispatch_relay::classifier::{
    AnthropicBackend, Classifier, Intent, ModelBackend, ModelError, Service,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use support::MockHttpServer;

fn backend(base_url: &str) -> AnthropicBackend {
    AnthropicBackend::new(
        base_url,
        "test-key",
        "claude-test",
        Duration::from_secs(5),
        512,
    )
}

fn text_reply(text: &str) -> String {
    json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}]
    })
    .to_string()
}

#[test]
fn backend_posts_messages_request_with_auth_headers() {
    let server = MockHttpServer::start(1, |_, _| (200, text_reply("{\"intent\":\"spam\"}")));

    let reply = backend(&server.base_url)
        .complete("system prompt", "Нужен сайт")
        .expect("reply");
    assert_eq!(reply, "{\"intent\":\"spam\"}");

    let requests = server.finish();
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/v1/messages");
    assert_eq!(request.header("x-api-key"), Some("test-key"));
    assert_eq!(request.header("anthropic-version"), Some("2023-06-01"));

    let body = request.json();
    assert_eq!(body["model"], "claude-test");
    assert_eq!(body["max_tokens"], 512);
    assert_eq!(body["system"], "system prompt");
    assert_eq!(
        body["messages"],
        json!([{"role": "user", "content": "Нужен сайт"}])
    );
}

#[test]
fn backend_surfaces_http_errors() {
    let server = MockHttpServer::start(1, |_, _| {
        (500, r#"{"type":"error","error":{"type":"api_error"}}"#.to_string())
    });

    let err = backend(&server.base_url)
        .complete("system", "text")
        .expect_err("server error");
    match err {
        ModelError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("api_error"));
        }
        other => panic!("unexpected error: {other}"),
    }
    server.finish();
}

#[test]
fn backend_rejects_non_text_first_block() {
    let server = MockHttpServer::start(1, |_, _| {
        (
            200,
            json!({"content": [{"type": "tool_use", "id": "t1", "name": "x", "input": {}}]})
                .to_string(),
        )
    });

    let err = backend(&server.base_url)
        .complete("system", "text")
        .expect_err("non-text reply");
    assert!(matches!(err, ModelError::NonText));
    server.finish();
}

#[test]
fn classifier_normalizes_fenced_model_reply() {
    let reply = "Вот результат:\n```json\n{\"intent\":\"lead\",\"service\":\"gpt_assistants\",\
        \"confidence\":0.83,\"summary\":\"Бот для записи\",\
        \"fields\":{\"budget\":\"50к\",\"deadline_text\":\"до пятницы\",\"contact\":null,\
        \"goal\":\"бот для записи клиентов\"}}\n```";
    let server = MockHttpServer::start(1, move |_, _| (200, text_reply(reply)));
    let classifier = Classifier::new(Arc::new(backend(&server.base_url)));

    let outcome = classifier.classify("Нужен бот для записи клиентов, бюджет 50к, до пятницы");
    assert_eq!(outcome.fallback_reason(), None);
    let result = outcome.result();
    assert_eq!(result.intent, Intent::Lead);
    assert_eq!(result.service, Service::GptAssistants);
    assert_eq!(result.summary, "Бот для записи");
    assert_eq!(result.fields.budget, Some(50_000));
    assert_eq!(result.fields.deadline_text.as_deref(), Some("до пятницы"));
    assert_eq!(result.fields.contact, None);
    assert_eq!(result.fields.goal, "бот для записи клиентов");
    server.finish();
}

#[test]
fn classifier_falls_back_when_model_errors() {
    let server = MockHttpServer::start(1, |_, _| (500, "{}".to_string()));
    let classifier = Classifier::new(Arc::new(backend(&server.base_url)));

    let outcome = classifier.classify("Хочу заказать сайт для кафе");
    assert!(outcome.fallback_reason().is_some());
    let result = outcome.result();
    assert_eq!(result.intent, Intent::Other);
    assert_eq!(result.service, Service::Unknown);
    assert_eq!(result.confidence, 0.0);
    assert!(result.fields.goal.starts_with("заказать сайт"));
    server.finish();
}

#[test]
fn classifier_falls_back_when_reply_has_no_json() {
    let server = MockHttpServer::start(1, |_, _| (200, text_reply("Не могу помочь")));
    let classifier = Classifier::new(Arc::new(backend(&server.base_url)));

    let outcome = classifier.classify("привет");
    assert!(outcome.fallback_reason().is_some());
    assert_eq!(outcome.result().intent, Intent::Other);
    server.finish();
}
