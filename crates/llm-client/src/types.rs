use common::{Item, ScoreSet};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Maximum items the web-search pass may return.
pub const MAX_SEARCH_ITEMS: usize = 12;
/// Maximum items the post-analysis pass may return.
pub const MAX_ANALYSIS_ITEMS: usize = 8;

/// Strict JSON body the model returns from the web-search pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchPayload {
    /// At most 12 market-moving items.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Topic scores in [-1, 1]. When absent, null or `{}` they are derived
    /// from `items`.
    #[serde(default, deserialize_with = "non_empty_scores")]
    #[schemars(with = "Option<ScoreSet>")]
    pub scores: Option<ScoreSet>,
    #[serde(default)]
    pub notes: String,
}

/// Strict JSON body the model returns when analyzing feed posts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisPayload {
    #[serde(default)]
    pub items: Vec<Item>,
    pub scores: ScoreSet,
}

/// An empty `scores` object counts as no scores; a partial one keeps its
/// missing topics at 0.
fn non_empty_scores<'de, D>(deserializer: D) -> Result<Option<ScoreSet>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)? {
        Some(map) if !map.is_empty() => ScoreSet::deserialize(serde_json::Value::Object(map))
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

// ── Chat-completions wire types ───────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice; empty when the model returned none.
    pub fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_text_extraction() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{\"items\":[]}"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.into_text(), r#"{"items":[]}"#);
    }

    #[test]
    fn test_empty_scores_object_counts_as_missing() {
        let empty: SearchPayload =
            serde_json::from_str(r#"{"items": [], "scores": {}, "notes": ""}"#).unwrap();
        assert!(empty.scores.is_none());

        let null: SearchPayload = serde_json::from_str(r#"{"scores": null}"#).unwrap();
        assert!(null.scores.is_none());

        let partial: SearchPayload =
            serde_json::from_str(r#"{"scores": {"news": 0.4}}"#).unwrap();
        let scores = partial.scores.expect("partial scores are kept");
        assert!((scores.news - 0.4).abs() < 1e-12);
        assert_eq!(scores.macro_, 0.0);
    }

    #[test]
    fn test_completion_without_choices_is_empty() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(parsed.into_text(), "");

        let null_content: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        )
        .unwrap();
        assert_eq!(null_content.into_text(), "");
    }
}
