use super::budget::normalize_budget;
use super::types::{ClassificationResult, ClassifiedFields, Intent, Service, SUMMARY_PLACEHOLDER};
use serde_json::{Map, Value};

/// Top-level keys the model sometimes uses for the goal instead of
/// `fields.goal`.
pub const GOAL_ALTERNATE_KEYS: &[&str] = &["goal", "цель", "request"];

/// Normalizes a parsed model object into a complete result.
///
/// Missing or mistyped values take their defaults: `other`, `unknown`, `0.0`,
/// the summary placeholder and empty fields. An empty `goal` is left for the
/// caller to fill from the raw text.
pub fn validate_result(data: &Map<String, Value>) -> ClassificationResult {
    let intent = data
        .get("intent")
        .and_then(Value::as_str)
        .and_then(|raw| Intent::from_wire(raw.trim()))
        .unwrap_or_default();
    let service = data
        .get("service")
        .and_then(Value::as_str)
        .and_then(|raw| Service::from_wire(raw.trim()))
        .unwrap_or_default();

    let summary = data
        .get("summary")
        .and_then(coerce_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| SUMMARY_PLACEHOLDER.to_string());

    ClassificationResult {
        intent,
        service,
        confidence: coerce_confidence(data.get("confidence")),
        summary,
        fields: validate_fields(data),
    }
}

fn validate_fields(data: &Map<String, Value>) -> ClassifiedFields {
    let empty = Map::new();
    let fields = data
        .get("fields")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    ClassifiedFields {
        budget: fields.get("budget").and_then(normalize_budget),
        deadline_text: string_only(fields.get("deadline_text")),
        contact: string_only(fields.get("contact")),
        goal: goal_value(fields, data),
    }
}

fn goal_value(fields: &Map<String, Value>, data: &Map<String, Value>) -> String {
    std::iter::once(fields.get("goal"))
        .chain(GOAL_ALTERNATE_KEYS.iter().map(|key| data.get(*key)))
        .flatten()
        .filter_map(coerce_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Numbers and numeric strings, clamped to `[0, 1]`. Booleans are not
/// treated as numbers, so `true` yields `0.0` rather than `1.0`.
pub fn coerce_confidence(raw: Option<&Value>) -> f64 {
    let value = match raw {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn string_only(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn empty_object_yields_complete_defaults() {
        let result = validate_result(&Map::new());
        assert_eq!(result.intent, Intent::Other);
        assert_eq!(result.service, Service::Unknown);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.summary, SUMMARY_PLACEHOLDER);
        assert_eq!(result.fields, ClassifiedFields::default());

        let encoded = serde_json::to_value(&result).expect("encode");
        for key in ["intent", "service", "confidence", "summary", "fields"] {
            assert!(encoded.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn well_formed_reply_is_preserved() {
        let result = validate_result(&object(json!({
            "intent": "lead",
            "service": "make_automation",
            "confidence": 0.85,
            "summary": "Автоматизация заявок",
            "fields": {
                "budget": "40-60к",
                "deadline_text": "до пятницы",
                "contact": "@client",
                "goal": "  автоматизация заявок  "
            }
        })));
        assert_eq!(result.intent, Intent::Lead);
        assert_eq!(result.service, Service::MakeAutomation);
        assert_eq!(result.confidence, 0.85);
        assert_eq!(result.fields.budget, Some(40_000));
        assert_eq!(result.fields.deadline_text.as_deref(), Some("до пятницы"));
        assert_eq!(result.fields.contact.as_deref(), Some("@client"));
        assert_eq!(result.fields.goal, "автоматизация заявок");
    }

    #[test]
    fn unknown_enum_values_and_bad_types_coerce_to_defaults() {
        let result = validate_result(&object(json!({
            "intent": "purchase",
            "service": 7,
            "confidence": "very high",
            "summary": "",
            "fields": "none"
        })));
        assert_eq!(result.intent, Intent::Other);
        assert_eq!(result.service, Service::Unknown);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.summary, SUMMARY_PLACEHOLDER);
        assert_eq!(result.fields.goal, "");
    }

    #[test]
    fn confidence_is_clamped_and_string_numbers_accepted() {
        assert_eq!(coerce_confidence(Some(&json!(1.7))), 1.0);
        assert_eq!(coerce_confidence(Some(&json!(-0.2))), 0.0);
        assert_eq!(coerce_confidence(Some(&json!("0.4"))), 0.4);
        assert_eq!(coerce_confidence(Some(&Value::Null)), 0.0);
        assert_eq!(coerce_confidence(None), 0.0);
    }

    #[test]
    fn boolean_confidence_is_not_a_score() {
        assert_eq!(coerce_confidence(Some(&json!(true))), 0.0);
        assert_eq!(coerce_confidence(Some(&json!(false))), 0.0);
        let result = validate_result(&object(json!({"intent": "lead", "confidence": true})));
        assert_eq!(result.intent, Intent::Lead);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn non_string_deadline_and_contact_are_dropped() {
        let result = validate_result(&object(json!({
            "fields": {"deadline_text": 5, "contact": ["@a"], "budget": 12000}
        })));
        assert_eq!(result.fields.deadline_text, None);
        assert_eq!(result.fields.contact, None);
        assert_eq!(result.fields.budget, Some(12_000));
    }

    #[test]
    fn goal_falls_back_to_alternate_top_level_keys() {
        let result = validate_result(&object(json!({
            "fields": {"goal": "   "},
            "цель": "чат-бот для салона"
        })));
        assert_eq!(result.fields.goal, "чат-бот для салона");

        let result = validate_result(&object(json!({"goal": "CRM integration"})));
        assert_eq!(result.fields.goal, "CRM integration");
    }

    #[test]
    fn numeric_summary_is_stringified() {
        let result = validate_result(&object(json!({"summary": 42})));
        assert_eq!(result.summary, "42");
    }
}
