use crate::shared::truncate_chars;
use regex::Regex;
use std::sync::OnceLock;

pub const GOAL_MAX_CHARS: usize = 60;
pub const GOAL_MIN_CHARS: usize = 4;
const ELLIPSIS: &str = "...";

// Order matters: the first trigger that matches anywhere in the text wins.
const TRIGGERS: &[&str] = &[
    r"(?i)\bинтересу(?:ет|ют)\s+",
    r"(?i)\b(?:хочу|хотим|хотелось\s+бы)\s+",
    r"(?i)\bнуж(?:ен|на|но|ны)\s+",
    r"(?i)\b(?:ищу|ищем)\s+",
    r"(?i)\blooking\s+for\s+",
    r"(?i)\binterested\s+in\s+",
    r"(?i)\bwant(?:\s+to)?\s+",
    r"(?i)\bneed(?:s)?(?:\s+to)?\s+",
];

const STOP: &str = r"(?i)[,.;!?\n]|@\w|\d{3,}|\b(?:бюджет|budget|срок|сроки|дедлайн|deadline|до|until|by)\b";

fn trigger_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        TRIGGERS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    })
}

fn stop_pattern() -> Option<&'static Regex> {
    static STOP_RE: OnceLock<Option<Regex>> = OnceLock::new();
    STOP_RE.get_or_init(|| Regex::new(STOP).ok()).as_ref()
}

/// Derives a short goal phrase from raw message text.
///
/// Returns an empty string when no trigger phrase is present or the captured
/// phrase is too short to be meaningful.
pub fn extract_goal(text: &str) -> String {
    let Some(tail) = trigger_patterns()
        .iter()
        .find_map(|re| re.find(text).map(|m| &text[m.end()..]))
    else {
        return String::new();
    };

    let end = stop_pattern()
        .and_then(|re| re.find(tail))
        .map(|m| m.start())
        .unwrap_or(tail.len());
    let phrase = tail[..end]
        .trim_start()
        .trim_end_matches(|ch: char| ch.is_whitespace() || is_trailing_punctuation(ch));

    if phrase.chars().count() < GOAL_MIN_CHARS {
        return String::new();
    }
    let clipped = truncate_chars(phrase, GOAL_MAX_CHARS);
    if clipped.len() < phrase.len() {
        format!("{}{ELLIPSIS}", clipped.trim_end())
    } else {
        phrase.to_string()
    }
}

fn is_trailing_punctuation(ch: char) -> bool {
    matches!(
        ch,
        '.' | ',' | ';' | ':' | '!' | '?' | '-' | '–' | '—' | '(' | '"' | '\'' | '«'
    )
}
