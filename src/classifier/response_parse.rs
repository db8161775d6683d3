use serde_json::{Map, Value};

const FENCE: &str = "```";

/// Pulls the first JSON object out of a model reply.
///
/// Replies are tried as a bare object, then as the contents of a markdown
/// fence, then by a brace-balanced scan over the raw text. The scan tracks
/// string literals so braces inside values do not end an object early, and a
/// nested `fields` object never truncates the outer one. `None` means no
/// object could be recovered; callers treat it like a malformed reply.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_object(trimmed)
        .or_else(|| fenced_object(trimmed))
        .or_else(|| scan_balanced_object(trimmed))
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn fenced_object(text: &str) -> Option<Map<String, Value>> {
    let mut rest = text;
    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let close = after_open.find(FENCE)?;
        let body = strip_fence_tag(&after_open[..close]);
        if let Some(map) = parse_object(body) {
            return Some(map);
        }
        rest = &after_open[close + FENCE.len()..];
    }
    None
}

fn strip_fence_tag(body: &str) -> &str {
    let trimmed = body.trim_start_matches([' ', '\t']);
    let lowered = trimmed.get(..4).map(str::to_ascii_lowercase);
    if lowered.as_deref() == Some("json") {
        &trimmed[4..]
    } else {
        trimmed
    }
}

fn scan_balanced_object(text: &str) -> Option<Map<String, Value>> {
    let mut from = 0usize;
    while from < text.len() {
        match scan_from(&text[from..]) {
            ScanOutcome::Found(map) => return Some(map),
            ScanOutcome::Exhausted => return None,
            // An opener that never closed; restart just past it.
            ScanOutcome::Unclosed(offset) => from += offset + 1,
        }
    }
    None
}

enum ScanOutcome {
    Found(Map<String, Value>),
    Exhausted,
    Unclosed(usize),
}

fn scan_from(text: &str) -> ScanOutcome {
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(idx);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(open) = start.take() {
                        if let Some(map) = parse_object(&text[open..=idx]) {
                            return ScanOutcome::Found(map);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    match start {
        Some(open) if depth > 0 => ScanOutcome::Unclosed(open),
        _ => ScanOutcome::Exhausted,
    }
}
