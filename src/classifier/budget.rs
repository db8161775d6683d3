use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const THOUSAND: f64 = 1000.0;

fn range_pattern() -> Option<&'static Regex> {
    static RANGE: OnceLock<Option<Regex>> = OnceLock::new();
    RANGE
        .get_or_init(|| Regex::new(r"^(\d+(?:\.\d+)?)[-–—](\d+(?:\.\d+)?)([kк])?$").ok())
        .as_ref()
}

/// Maps a raw budget value from the model to whole currency units.
///
/// Numbers are truncated. Strings accept `50k`/`50к`, ranges such as
/// `40-60к` (the lower bound wins; a bare range under a thousand is read in
/// thousands) and plain numbers, with spaces ignored and
/// a comma read as the decimal point. Negative amounts and anything else
/// yield `None`.
pub fn normalize_budget(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(number) => number.as_f64().and_then(truncate),
        Value::String(text) => normalize_budget_text(text),
        _ => None,
    }
}

pub fn normalize_budget_text(text: &str) -> Option<i64> {
    let compact: String = text
        .to_lowercase()
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| if ch == ',' { '.' } else { ch })
        .collect();
    if compact.is_empty() {
        return None;
    }

    if let Some(captures) = range_pattern().and_then(|re| re.captures(&compact)) {
        let lower = captures.get(1)?.as_str().parse::<f64>().ok()?;
        // Bare short ranges ("40-60") are budget shorthand for thousands.
        let multiplier = if captures.get(3).is_some() || lower < THOUSAND {
            THOUSAND
        } else {
            1.0
        };
        return truncate(lower * multiplier);
    }

    if let Some(prefix) = compact
        .strip_suffix('k')
        .or_else(|| compact.strip_suffix('к'))
    {
        return parse_number(prefix).and_then(|value| truncate(value * THOUSAND));
    }

    parse_number(&compact).and_then(truncate)
}

fn parse_number(raw: &str) -> Option<f64> {
    if raw.is_empty() || !raw.chars().all(|ch| ch.is_ascii_digit() || ch == '.') {
        return None;
    }
    raw.parse::<f64>().ok()
}

fn truncate(value: f64) -> Option<i64> {
    if !value.is_finite() || value < 0.0 || value >= i64::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i64)
}
