//! Sanitizing and parsing the model's text answers.

use common::Error;

use crate::types::{AnalysisPayload, SearchPayload};

/// Strip an optional markdown code fence around a JSON answer.
///
/// Handles a leading ```` ```json ```` (or bare ```` ``` ````) and a trailing
/// ```` ``` ````, trimming whitespace around and inside. Text without a fence
/// is returned trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let mut out = text.trim();
    if let Some(rest) = out.strip_prefix("```json") {
        out = rest;
    } else if let Some(rest) = out.strip_prefix("```") {
        out = rest;
    }
    if let Some(rest) = out.strip_suffix("```") {
        out = rest;
    }
    out.trim()
}

/// Parse the web-search answer. Must be a JSON object after fence stripping.
pub fn parse_search_payload(raw: &str) -> Result<SearchPayload, Error> {
    let cleaned = strip_code_fence(raw);
    if !cleaned.starts_with('{') {
        return Err(Error::Parse(format!(
            "expected a JSON object, got {} chars starting with {:?}",
            cleaned.len(),
            cleaned.chars().take(20).collect::<String>()
        )));
    }
    Ok(serde_json::from_str(cleaned)?)
}

/// Parse the post-analysis answer. `scores` is mandatory here.
pub fn parse_analysis_payload(raw: &str) -> Result<AnalysisPayload, Error> {
    let cleaned = strip_code_fence(raw);
    Ok(serde_json::from_str(cleaned)?)
}
