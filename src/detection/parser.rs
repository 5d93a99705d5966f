//! Oracle output decoding
//!
//! The oracle is asked for a JSON verdict but is a free-text generator, so
//! its output may arrive fenced, wrapped in prose, malformed or not as JSON
//! at all. [`decode`] is total: every input yields a well-formed [`Verdict`],
//! tagged with whether it came from the oracle's JSON or from the heuristic
//! fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Score used when the oracle gives none we can read
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Single reason attached to heuristic verdicts
pub const FALLBACK_REASON: &str = "AI analysis completed";

static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```[ \t]*json[ \t]*\r?\n(.*?)```").expect("valid regex"));

static ANY_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[^\n`]*\r?\n(.*?)```").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Spam,
    NotSpam,
    Suspicious,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spam => "spam",
            Self::NotSpam => "not_spam",
            Self::Suspicious => "suspicious",
        }
    }

    /// Accepts `spam`, `not_spam`, `suspicious` in any case, with `_`, `-` or
    /// space as separator.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c.to_ascii_lowercase() })
            .collect();

        match normalized.as_str() {
            "spam" => Some(Self::Spam),
            "not_spam" | "notspam" => Some(Self::NotSpam),
            "suspicious" => Some(Self::Suspicious),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    /// Confidence in `[0, 1]`
    pub score: f64,
    pub reasons: Vec<String>,
    pub indicators: Map<String, Value>,
}

impl Verdict {
    /// Verdict used when the oracle output carries no usable JSON
    pub fn heuristic(raw: &str) -> Self {
        let label = if raw.to_lowercase().contains("spam") {
            Label::Spam
        } else {
            Label::NotSpam
        };

        Self {
            label,
            score: NEUTRAL_SCORE,
            reasons: vec![FALLBACK_REASON.to_string()],
            indicators: Map::new(),
        }
    }
}

/// Outcome of decoding oracle output
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The oracle's own JSON verdict
    Structured(Verdict),
    /// Heuristic verdict derived from unparseable text
    Heuristic(Verdict),
}

impl Decoded {
    pub fn verdict(&self) -> &Verdict {
        match self {
            Self::Structured(v) | Self::Heuristic(v) => v,
        }
    }

    pub fn into_verdict(self) -> Verdict {
        match self {
            Self::Structured(v) | Self::Heuristic(v) => v,
        }
    }

    pub fn is_heuristic(&self) -> bool {
        matches!(self, Self::Heuristic(_))
    }
}

/// Wire shape expected from the oracle. Only `label` is mandatory.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    label: String,
    #[serde(default)]
    score: Option<Value>,
    #[serde(default)]
    reasons: Option<Value>,
    #[serde(default)]
    indicators: Option<Value>,
}

impl RawVerdict {
    fn into_verdict(self) -> Option<Verdict> {
        let label = Label::parse_lenient(&self.label)?;

        let score = self.score
            .as_ref()
            .and_then(|s| match s {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            })
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(0.0, 1.0))
            .unwrap_or(NEUTRAL_SCORE);

        let reasons = match self.reasons {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            Some(Value::String(s)) => vec![s],
            _ => Vec::new(),
        };

        let indicators = match self.indicators {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        Some(Verdict { label, score, reasons, indicators })
    }
}

/// Decode oracle output into a verdict. Never fails.
pub fn decode(raw: &str) -> Decoded {
    let candidate = extract_candidate(raw);

    let parsed = try_parse(candidate).or_else(|| brace_slice(candidate).and_then(try_parse));

    match parsed {
        Some(verdict) => Decoded::Structured(verdict),
        None => {
            tracing::debug!("Oracle response is not a JSON verdict ({} bytes)", raw.len());
            Decoded::Heuristic(Verdict::heuristic(raw))
        }
    }
}

/// Shorthand for `decode(raw).into_verdict()`
pub fn parse(raw: &str) -> Verdict {
    decode(raw).into_verdict()
}

/// ```json fence first, then any fence, then the whole text
fn extract_candidate(raw: &str) -> &str {
    JSON_FENCE
        .captures(raw)
        .or_else(|| ANY_FENCE.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_else(|| raw.trim())
}

fn try_parse(candidate: &str) -> Option<Verdict> {
    serde_json::from_str::<RawVerdict>(candidate)
        .ok()
        .and_then(RawVerdict::into_verdict)
}

fn brace_slice(candidate: &str) -> Option<&str> {
    let start = candidate.find('{')?;
    let end = candidate.rfind('}')?;
    (start < end).then(|| &candidate[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_well_formed(v: &Verdict) {
        assert!(matches!(v.label, Label::Spam | Label::NotSpam | Label::Suspicious));
        assert!((0.0..=1.0).contains(&v.score), "score out of range: {}", v.score);
    }

    #[test]
    fn test_plain_json() {
        let decoded = decode(r#"{"label":"suspicious","score":0.62,"reasons":["odd sender"],"indicators":{"impersonation":true}}"#);
        assert!(!decoded.is_heuristic());

        let v = decoded.into_verdict();
        assert_eq!(v.label, Label::Suspicious);
        assert_eq!(v.score, 0.62);
        assert_eq!(v.reasons, vec!["odd sender"]);
        assert_eq!(v.indicators["impersonation"], json!(true));
    }

    #[test]
    fn test_json_fence_preferred_over_other_fences() {
        let raw = "Here you go:\n```text\nnot json\n```\nand\n```json\n{\"label\":\"spam\",\"score\":0.91,\"reasons\":[\"urgency\"],\"indicators\":{\"urgency_language\":true}}\n```\n";
        let decoded = decode(raw);
        assert!(!decoded.is_heuristic());

        let v = decoded.verdict();
        assert_eq!(v.label, Label::Spam);
        assert_eq!(v.score, 0.91);
        assert_eq!(v.reasons, vec!["urgency"]);
        assert_eq!(v.indicators["urgency_language"], json!(true));
    }

    #[test]
    fn test_bare_fence() {
        let raw = "```\n{\"label\": \"not_spam\", \"score\": 0.1}\n```";
        let v = parse(raw);
        assert_eq!(v.label, Label::NotSpam);
        assert_eq!(v.score, 0.1);
    }

    #[test]
    fn test_missing_optional_fields_default_to_empty() {
        let decoded = decode(r#"{"label":"spam","score":0.8}"#);
        assert!(!decoded.is_heuristic());

        let v = decoded.into_verdict();
        assert!(v.reasons.is_empty());
        assert!(v.indicators.is_empty());
    }

    #[test]
    fn test_fallback_scenario() {
        let decoded = decode("I think this is definitely SPAM content.");
        assert!(decoded.is_heuristic());
        assert_eq!(
            decoded.into_verdict(),
            Verdict {
                label: Label::Spam,
                score: 0.5,
                reasons: vec!["AI analysis completed".to_string()],
                indicators: Map::new(),
            }
        );
    }

    #[test]
    fn test_fallback_without_spam_mention() {
        let v = parse("Looks like a normal message from a friend.");
        assert_eq!(v.label, Label::NotSpam);
        assert_eq!(v.score, NEUTRAL_SCORE);
    }

    #[test]
    fn test_malformed_json_falls_back() {
        let decoded = decode("```json\n{\"label\": \"spam\", \"score\": 0.9,\n```");
        assert!(decoded.is_heuristic());
        assert_eq!(decoded.verdict().label, Label::Spam);
    }

    #[test]
    fn test_unknown_label_is_wrong_shape() {
        let decoded = decode(r#"{"label":"phishing","score":0.9}"#);
        assert!(decoded.is_heuristic());
        assert_eq!(decoded.verdict().label, Label::NotSpam);
    }

    #[test]
    fn test_prose_around_json_is_recovered() {
        let v = parse("Sure! {\"label\": \"Not Spam\", \"score\": \"0.2\"} Hope that helps.");
        assert_eq!(v.label, Label::NotSpam);
        assert_eq!(v.score, 0.2);
    }

    #[test]
    fn test_scores_are_clamped_and_defaulted() {
        assert_eq!(parse(r#"{"label":"spam","score":1.7}"#).score, 1.0);
        assert_eq!(parse(r#"{"label":"spam","score":-3}"#).score, 0.0);
        assert_eq!(parse(r#"{"label":"spam"}"#).score, NEUTRAL_SCORE);
        assert_eq!(parse(r#"{"label":"spam","score":"high"}"#).score, NEUTRAL_SCORE);
        assert_eq!(parse(r#"{"label":"spam","score":null}"#).score, NEUTRAL_SCORE);
    }

    #[test]
    fn test_odd_reason_and_indicator_shapes() {
        let v = parse(r#"{"label":"spam","reasons":["a", 3, null, "b"],"indicators":[1,2]}"#);
        assert_eq!(v.reasons, vec!["a", "b"]);
        assert!(v.indicators.is_empty());

        let v = parse(r#"{"label":"spam","reasons":"single reason"}"#);
        assert_eq!(v.reasons, vec!["single reason"]);
    }

    #[test]
    fn test_label_spellings() {
        assert_eq!(Label::parse_lenient("SPAM"), Some(Label::Spam));
        assert_eq!(Label::parse_lenient("not-spam"), Some(Label::NotSpam));
        assert_eq!(Label::parse_lenient(" Not Spam "), Some(Label::NotSpam));
        assert_eq!(Label::parse_lenient("Suspicious"), Some(Label::Suspicious));
        assert_eq!(Label::parse_lenient("ham"), None);
    }

    #[test]
    fn test_decode_is_total() {
        let fixed = [
            "",
            "   ",
            "{",
            "}",
            "}{",
            "[]",
            "null",
            "42",
            "\"spam\"",
            "```",
            "```json",
            "```json\n```",
            "{\"label\": 5}",
            "{\"score\": 0.9}",
            "\u{0}\u{1}\u{fffd}",
        ];
        for raw in fixed {
            assert_well_formed(&parse(raw));
        }

        // Deterministic pseudo-random strings over a JSON-heavy alphabet
        let alphabet: Vec<char> = "{}[]\":,`\n abcjsonlpmSPAM0123456789.-_é".chars().collect();
        let mut seed: u64 = 0x9e3779b97f4a7c15;
        for _ in 0..500 {
            let len = (seed % 64) as usize;
            let mut s = String::with_capacity(len);
            for _ in 0..len {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                s.push(alphabet[(seed >> 33) as usize % alphabet.len()]);
            }
            assert_well_formed(&parse(&s));
        }
    }
}
