//! Response Normalizer: turns a free-form model completion into a bounded
//! `EvaluationResult`.
//!
//! Two tiers:
//! 1. strict: the completion (minus markdown fences) decodes as a JSON object
//!    with a `score`. Lists are capped at `MAX_LIST_ITEMS`, feedback at
//!    `MAX_FEEDBACK_CHARS`.
//! 2. degraded: the completion is not JSON at all. A score is scraped with a
//!    pattern match and the text itself becomes the feedback.
//!
//! A completion that *is* JSON but has no usable score is an error, not a
//! degraded result.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const MAX_LIST_ITEMS: usize = 4;
pub const MAX_FEEDBACK_CHARS: usize = 300;
const FEEDBACK_CUT_CHARS: usize = 297;
/// Sentence and word boundaries at or before this character index are ignored.
const BOUNDARY_FLOOR: usize = 250;
const FALLBACK_FEEDBACK_CHARS: usize = 500;
const MIN_SCORE: i64 = 0;
const MAX_SCORE: i64 = 100;

pub const UNPARSED_FEEDBACK_PLACEHOLDER: &str =
    "Unable to parse detailed feedback. Please try again.";

static SCORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""score"\s*:\s*(\d+)"#).unwrap());

/// The normalized evaluation returned to API callers.
/// Optional fields are omitted from the JSON body when absent.
///
/// `score` is always clamped into 0..=100, even when the model answers outside
/// the range it was asked for (150 becomes 100, -5 becomes 0). Passing
/// out-of-range scores through would need a signed type here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub score: u32, // 0..=100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvements: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_skills: Option<Vec<String>>,
}

/// Which tier produced the result.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Parsed(EvaluationResult),
    Degraded(EvaluationResult),
}

impl Normalized {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Normalized::Degraded(_))
    }

    pub fn into_result(self) -> EvaluationResult {
        match self {
            Normalized::Parsed(r) | Normalized::Degraded(r) => r,
        }
    }
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Missing 'score' field in response")]
    MissingScore,

    #[error("Invalid 'score' value in response: {0}")]
    InvalidScore(String),
}

pub fn normalize(raw: &str) -> Result<Normalized, NormalizeError> {
    let text = strip_json_fences(raw);

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(fields)) => parse_fields(&fields).map(Normalized::Parsed),
        Ok(_) => Err(NormalizeError::MissingScore),
        Err(e) => {
            tracing::debug!("Completion is not JSON ({e}); salvaging");
            Ok(Normalized::Degraded(salvage(text)))
        }
    }
}

fn parse_fields(fields: &Map<String, Value>) -> Result<EvaluationResult, NormalizeError> {
    let score = fields.get("score").ok_or(NormalizeError::MissingScore)?;

    Ok(EvaluationResult {
        score: coerce_score(score)?,
        feedback: fields
            .get("feedback")
            .and_then(Value::as_str)
            .map(truncate_feedback),
        improvements: bounded_list(fields.get("improvements")),
        missing_keywords: bounded_list(fields.get("missingKeywords")),
        matching_skills: bounded_list(fields.get("matchingSkills")),
    })
}

fn salvage(text: &str) -> EvaluationResult {
    let score = SCORE_RE
        .captures(text)
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .map(|n| n.min(MAX_SCORE as u64) as u32)
        .unwrap_or(0);

    EvaluationResult {
        score,
        feedback: Some(text.chars().take(FALLBACK_FEEDBACK_CHARS).collect()),
        improvements: Some(vec![UNPARSED_FEEDBACK_PLACEHOLDER.to_string()]),
        missing_keywords: Some(Vec::new()),
        matching_skills: Some(Vec::new()),
    }
}

/// Integers pass through, floats truncate toward zero, numeric strings are parsed.
/// Fractional strings such as "61.5" are accepted too and truncate to 61.
/// The result is clamped into 0..=100.
fn coerce_score(value: &Value) -> Result<u32, NormalizeError> {
    let raw = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    };

    raw.map(|n| n.clamp(MIN_SCORE, MAX_SCORE) as u32)
        .ok_or_else(|| NormalizeError::InvalidScore(value.to_string()))
}

fn bounded_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .take(MAX_LIST_ITEMS)
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

/// Trims `feedback` and, when it exceeds `MAX_FEEDBACK_CHARS`, cuts it within
/// the first `FEEDBACK_CUT_CHARS` characters: just before the last period past
/// `BOUNDARY_FLOOR`, else at the last space past it, else hard.
pub fn truncate_feedback(feedback: &str) -> String {
    let feedback = feedback.trim();
    if feedback.chars().count() <= MAX_FEEDBACK_CHARS {
        return feedback.to_string();
    }

    let head: Vec<char> = feedback.chars().take(FEEDBACK_CUT_CHARS).collect();
    let last_period = head.iter().rposition(|&c| c == '.');
    let last_space = head.iter().rposition(|&c| c == ' ');

    let end = match (last_period, last_space) {
        (Some(p), _) if p > BOUNDARY_FLOOR => p,
        (_, Some(s)) if s > BOUNDARY_FLOOR => s,
        _ => FEEDBACK_CUT_CHARS,
    };

    head[..end].iter().collect()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text)
        .trim_start();
    text.strip_suffix("```").unwrap_or(text).trim()
}
