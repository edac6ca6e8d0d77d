//! Structured replies and the tolerant parser that produces them.
//!
//! The completion service is asked for one of two JSON shapes, but nothing
//! guarantees it complies. Replies are first deserialized into "raw" structs
//! whose fields are all optional and untyped, then validated into
//! [`SummaryReply`] / [`AnswerReply`]: list fields are coerced and capped,
//! missing scalars get language-appropriate defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RagError, Result};
use crate::language::Language;
use crate::text::ellipsize;

pub const MAX_KEY_POINTS: usize = 5;
pub const MAX_WARNINGS: usize = 5;
pub const MAX_NEXT_STEPS: usize = 5;
pub const MAX_BREAKDOWN: usize = 5;
pub const MAX_KEY_FACTS: usize = 5;

/// Plain-language summary of a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReply {
    pub introduction: String,
    pub key_points: Vec<String>,
    pub warnings: Vec<String>,
    pub next_steps: Vec<String>,
}

/// Answer to a question about a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReply {
    pub simple_answer: String,
    pub breakdown: Vec<String>,
    pub key_facts: Vec<String>,
}

/// Summary shape as received, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSummary {
    #[serde(default, alias = "intro", alias = "summary")]
    introduction: Option<Value>,
    #[serde(default, alias = "key_points", alias = "points")]
    key_points: Option<Value>,
    #[serde(default, alias = "risks")]
    warnings: Option<Value>,
    #[serde(default, alias = "next_steps")]
    next_steps: Option<Value>,
}

/// Answer shape as received, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnswer {
    #[serde(default, alias = "simple_answer", alias = "answer")]
    simple_answer: Option<Value>,
    #[serde(default)]
    breakdown: Option<Value>,
    #[serde(default, alias = "key_facts", alias = "facts")]
    key_facts: Option<Value>,
}

/// A reply shape the completion service can be asked for.
pub trait StructuredReply: Sized {
    /// Shape name used in logs.
    const KIND: &'static str;

    /// Parse and validate a raw model reply.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Parse`] if no JSON value of a usable type can be
    /// found in `raw`.
    fn parse(raw: &str, language: Language) -> Result<Self>;
}

impl SummaryReply {
    fn from_raw(raw: RawSummary, language: Language) -> Self {
        let profile = language.profile();
        Self {
            introduction: coerce_text(raw.introduction)
                .unwrap_or_else(|| profile.default_introduction.to_string()),
            key_points: coerce_list(raw.key_points, MAX_KEY_POINTS),
            warnings: coerce_list(raw.warnings, MAX_WARNINGS),
            next_steps: coerce_list(raw.next_steps, MAX_NEXT_STEPS),
        }
    }

    /// The fixed summary returned when the model reply is unusable.
    pub fn fallback(language: Language) -> Self {
        let profile = language.profile();
        Self {
            introduction: profile.fallback_introduction.to_string(),
            key_points: profile.fallback_key_points.iter().map(|p| p.to_string()).collect(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }
}

impl StructuredReply for SummaryReply {
    const KIND: &'static str = "summary";

    fn parse(raw: &str, language: Language) -> Result<Self> {
        let raw_summary = match parse_json(raw)? {
            // Bare array of key points, the format older prompts asked for.
            points @ Value::Array(_) => {
                RawSummary { key_points: Some(points), ..Default::default() }
            }
            object @ Value::Object(_) => serde_json::from_value(object)
                .map_err(|e| RagError::Parse(format!("invalid summary object: {e}")))?,
            other => {
                return Err(RagError::Parse(format!(
                    "expected a JSON object for the summary, got {}",
                    json_type(&other)
                )));
            }
        };
        Ok(Self::from_raw(raw_summary, language))
    }
}

impl AnswerReply {
    fn from_raw(raw: RawAnswer, language: Language) -> Self {
        Self {
            simple_answer: coerce_text(raw.simple_answer)
                .unwrap_or_else(|| language.profile().default_answer.to_string()),
            breakdown: coerce_list(raw.breakdown, MAX_BREAKDOWN),
            key_facts: coerce_list(raw.key_facts, MAX_KEY_FACTS),
        }
    }

    /// Answer built from a prefix of the raw reply when it cannot be parsed.
    ///
    /// `raw` is `None` when the completion request itself failed.
    pub fn fallback(raw: Option<&str>, language: Language, max_chars: usize) -> Self {
        let text = raw.map(|r| strip_code_fences(r).trim()).unwrap_or_default();
        let simple_answer = if text.is_empty() {
            language.profile().answer_unavailable.to_string()
        } else {
            ellipsize(text, max_chars)
        };
        Self { simple_answer, breakdown: Vec::new(), key_facts: Vec::new() }
    }
}

impl StructuredReply for AnswerReply {
    const KIND: &'static str = "answer";

    fn parse(raw: &str, language: Language) -> Result<Self> {
        let raw_answer = match parse_json(raw)? {
            object @ Value::Object(_) => serde_json::from_value(object)
                .map_err(|e| RagError::Parse(format!("invalid answer object: {e}")))?,
            text @ Value::String(_) => {
                RawAnswer { simple_answer: Some(text), ..Default::default() }
            }
            other => {
                return Err(RagError::Parse(format!(
                    "expected a JSON object for the answer, got {}",
                    json_type(&other)
                )));
            }
        };
        Ok(Self::from_raw(raw_answer, language))
    }
}

/// Remove a surrounding markdown code fence (```` ```json ... ``` ````).
///
/// The fence may sit on a single line and may omit the language tag. A
/// fenced block inside surrounding prose is extracted as well. Text without
/// a fence is returned trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        return fence_body(rest);
    }
    if let Some(idx) = trimmed.find("```") {
        let rest = &trimmed[idx + 3..];
        if rest.contains("```") {
            return fence_body(rest);
        }
    }
    trimmed
}

/// Content after an opening fence, up to the closing fence if there is one.
fn fence_body(after_open: &str) -> &str {
    let tag_len = after_open.find(|c: char| !c.is_ascii_alphanumeric()).unwrap_or(after_open.len());
    let (tag, rest) = after_open.split_at(tag_len);
    // A tag ends at a line break; on a single line only "json" counts as one.
    let body = if rest.starts_with(['\n', '\r']) || tag.eq_ignore_ascii_case("json") {
        rest
    } else {
        after_open
    };
    body.find("```").map_or(body, |end| &body[..end]).trim()
}

/// The outermost `{ ... }` span of `input`, if any.
fn extract_json_object(input: &str) -> Option<&str> {
    let start = input.find('{')?;
    let end = input.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&input[start..=end])
}

fn parse_json(raw: &str) -> Result<Value> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(RagError::Parse("empty reply".to_string()));
    }
    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(first_err) => extract_json_object(cleaned)
            .and_then(|object| serde_json::from_str(object).ok())
            .ok_or_else(|| RagError::Parse(format!("reply is not valid JSON: {first_err}"))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A non-blank string, or `None`. Arrays of strings are joined with spaces.
fn coerce_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Array(items) => {
            let joined = items.iter().filter_map(scalar_text).collect::<Vec<_>>().join(" ");
            Some(joined).filter(|s| !s.is_empty())
        }
        other => scalar_text(&other),
    }
}

/// A list of at most `max` non-blank strings.
fn coerce_list(value: Option<Value>, max: usize) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).take(max).collect(),
        Some(other) => scalar_text(&other).into_iter().collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_json() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n[1]\n```  "), "[1]");
        assert_eq!(strip_code_fences("Here you go:\n```json\n{}\n```\nThanks"), "{}");
        assert_eq!(strip_code_fences("  plain text  "), "plain text");
    }

    #[test]
    fn strips_single_line_fences() {
        assert_eq!(strip_code_fences("```json {\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```JSON{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```The fee is $25.```"), "The fee is $25.");
        assert_eq!(strip_code_fences("```json {\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn parses_single_line_fenced_answer() {
        let raw =
            "```json {\"simpleAnswer\": \"Yes, you can cancel.\", \"keyFacts\": [\"30 days\"]}```";
        let answer = AnswerReply::parse(raw, Language::English).unwrap();
        assert_eq!(answer.simple_answer, "Yes, you can cancel.");
        assert_eq!(answer.key_facts, vec!["30 days"]);

        let untagged = "```{\"simpleAnswer\": \"No.\"}```";
        assert_eq!(AnswerReply::parse(untagged, Language::English).unwrap().simple_answer, "No.");
    }

    #[test]
    fn fallback_keeps_single_line_fenced_text() {
        let raw = "```json The deposit is returned within 14 days.```";
        assert!(AnswerReply::parse(raw, Language::English).is_err());
        let answer = AnswerReply::fallback(Some(raw), Language::English, 500);
        assert_eq!(answer.simple_answer, "The deposit is returned within 14 days.");
    }

    #[test]
    fn parses_complete_answer() {
        let raw = r#"{
            "simpleAnswer": "You pay $25.", "breakdown": ["Step 1"], "keyFacts": ["Fee: $25"]
        }"#;
        let answer = AnswerReply::parse(raw, Language::English).unwrap();
        assert_eq!(answer.simple_answer, "You pay $25.");
        assert_eq!(answer.breakdown, vec!["Step 1"]);
        assert_eq!(answer.key_facts, vec!["Fee: $25"]);
    }

    #[test]
    fn fills_defaults_for_missing_fields() {
        let answer = AnswerReply::parse("{}", Language::French).unwrap();
        assert_eq!(answer.simple_answer, Language::French.profile().default_answer);
        assert!(answer.breakdown.is_empty());
        assert!(answer.key_facts.is_empty());

        let summary = SummaryReply::parse(r#"{"keyPoints": ["a"]}"#, Language::English).unwrap();
        assert_eq!(summary.introduction, Language::English.profile().default_introduction);
        assert_eq!(summary.key_points, vec!["a"]);
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn caps_and_coerces_lists() {
        let raw = r#"{
            "introduction": "Lease",
            "keyPoints": ["1", 2, true, null, {"x": 1}, "  ", "3", "4", "5", "6", "7"],
            "warnings": "Single warning",
            "nextSteps": 42
        }"#;
        let summary = SummaryReply::parse(raw, Language::English).unwrap();
        assert_eq!(summary.key_points, vec!["1", "2", "true", "3", "4"]);
        assert_eq!(summary.warnings, vec!["Single warning"]);
        assert_eq!(summary.next_steps, vec!["42"]);
    }

    #[test]
    fn accepts_bare_array_summary() {
        let summary = SummaryReply::parse(r#"["a", "b"]"#, Language::English).unwrap();
        assert_eq!(summary.key_points, vec!["a", "b"]);
        assert_eq!(summary.introduction, Language::English.profile().default_introduction);
    }

    #[test]
    fn finds_json_inside_prose() {
        let raw = "Sure! Here is the answer: {\"simpleAnswer\": \"Yes\"} Hope it helps.";
        assert_eq!(AnswerReply::parse(raw, Language::English).unwrap().simple_answer, "Yes");
    }

    #[test]
    fn accepts_snake_case_and_alias_keys() {
        let raw = r#"{"answer": "No", "key_facts": ["fact"]}"#;
        let answer = AnswerReply::parse(raw, Language::English).unwrap();
        assert_eq!(answer.simple_answer, "No");
        assert_eq!(answer.key_facts, vec!["fact"]);
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            AnswerReply::parse("The fee is $25.", Language::English),
            Err(RagError::Parse(_))
        ));
        assert!(matches!(SummaryReply::parse("", Language::English), Err(RagError::Parse(_))));
        assert!(matches!(SummaryReply::parse("42", Language::English), Err(RagError::Parse(_))));
    }

    #[test]
    fn answer_fallback_uses_raw_prefix() {
        let answer = AnswerReply::fallback(
            Some("The late fee is twenty five dollars."),
            Language::English,
            12,
        );
        assert_eq!(answer.simple_answer, "The late fee...");
        assert!(answer.breakdown.is_empty());
        assert!(answer.key_facts.is_empty());

        let unavailable = AnswerReply::fallback(None, Language::German, 100);
        assert_eq!(unavailable.simple_answer, Language::German.profile().answer_unavailable);
    }

    #[test]
    fn summary_fallback_is_populated() {
        let summary = SummaryReply::fallback(Language::Spanish);
        assert_eq!(summary.key_points.len(), MAX_KEY_POINTS);
        assert!(!summary.introduction.is_empty());
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(SummaryReply::fallback(Language::English)).unwrap();
        assert!(value.get("keyPoints").is_some());
        assert!(value.get("nextSteps").is_some());
        let value =
            serde_json::to_value(AnswerReply::fallback(None, Language::English, 10)).unwrap();
        assert!(value.get("simpleAnswer").is_some());
        assert!(value.get("keyFacts").is_some());
    }
}
