use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::MatchResult;

/// Why a model response could not be used at all.
#[derive(Debug, Error)]
pub enum MatchParseError {
    #[error("response is empty")]
    Empty,

    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON array at the top level, found {0}")]
    NotAnArray(&'static str),
}

/// Why a single array element was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryRejection {
    #[error("entry is not an object")]
    NotAnObject,

    #[error("missing or non-string job_id")]
    MissingJobId,

    #[error("job_id {0} was not in the shortlist")]
    UnknownJobId(String),

    #[error("job_id {0} appears more than once")]
    DuplicateJobId(String),

    #[error("missing or non-numeric match_score")]
    MissingScore,

    #[error("match_score {0} is outside 0..=100")]
    ScoreOutOfRange(String),

    #[error("missing or non-string reason")]
    MissingReason,
}

/// Removes a surrounding Markdown code fence, including any language tag on
/// the opening line. Text without a leading fence is returned trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // Drop the info string (e.g. `json`) up to the end of the opening line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parses a reasoning-model response into validated match results.
///
/// The top level must be a JSON array (optionally inside a code fence);
/// anything else is an error. Individual elements are validated one by one
/// and dropped when they fail: each needs a string `job_id` present in
/// `known_ids` and not seen earlier in the array, a numeric `match_score` in
/// `0..=100` (fractions are rounded), and a string `reason`.
///
/// Order is the order the model emitted.
pub fn parse_match_response(
    raw: &str,
    known_ids: &HashSet<&str>,
) -> Result<Vec<MatchResult>, MatchParseError> {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        return Err(MatchParseError::Empty);
    }

    let value: Value = serde_json::from_str(text)?;
    let entries = match value {
        Value::Array(entries) => entries,
        other => return Err(MatchParseError::NotAnArray(json_kind(&other))),
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut results = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        match validate_entry(entry, known_ids, &seen) {
            Ok(result) => {
                seen.insert(result.listing_id().to_string());
                results.push(result);
            }
            Err(rejection) => {
                warn!("Dropping match entry {}: {}", index, rejection);
            }
        }
    }

    debug!(
        "Parsed {} of {} match entries from model response",
        results.len(),
        entries.len()
    );

    Ok(results)
}

fn validate_entry(
    entry: &Value,
    known_ids: &HashSet<&str>,
    seen: &HashSet<String>,
) -> Result<MatchResult, EntryRejection> {
    let object = entry.as_object().ok_or(EntryRejection::NotAnObject)?;

    let job_id = object
        .get("job_id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(EntryRejection::MissingJobId)?;

    if !known_ids.contains(job_id) {
        return Err(EntryRejection::UnknownJobId(job_id.to_string()));
    }
    if seen.contains(job_id) {
        return Err(EntryRejection::DuplicateJobId(job_id.to_string()));
    }

    let score = object
        .get("match_score")
        .and_then(Value::as_f64)
        .ok_or(EntryRejection::MissingScore)?;
    if !(0.0..=100.0).contains(&score) {
        return Err(EntryRejection::ScoreOutOfRange(score.to_string()));
    }

    let reason = object
        .get("reason")
        .and_then(Value::as_str)
        .ok_or(EntryRejection::MissingReason)?;

    Ok(MatchResult::new(job_id, score.round() as u8, reason.trim()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
