//! Domain types shared across the oracle.

use chrono::{DateTime, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

// ── Items & scores ────────────────────────────────────────────────────

/// A single market-moving headline, produced by either provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Item {
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub source: String,
    /// Publication time as reported upstream (usually ISO-8601).
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub time: String,
    /// Sentiment in [-1, 1].
    #[serde(default, deserialize_with = "lenient_f64")]
    #[schemars(with = "f64")]
    pub sentiment: f64,
    /// Impact in [0, 1].
    #[serde(default = "default_impact", deserialize_with = "lenient_impact")]
    #[schemars(with = "f64")]
    pub impact: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub reason: String,
}

fn default_impact() -> f64 {
    0.5
}

/// Model output sometimes quotes numbers or sends null. Accept both.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
    Null(()),
}

fn loose_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LooseNumber::deserialize(deserializer)? {
        LooseNumber::Number(n) => Some(n),
        LooseNumber::Text(s) => s.trim().parse().ok(),
        LooseNumber::Null(()) => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_f64(deserializer)?.unwrap_or(0.0))
}

/// Null becomes empty; numbers and booleans keep their JSON text.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_impact<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_f64(deserializer)?.unwrap_or_else(default_impact))
}

/// The four scored topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    News,
    Macro,
    Geopolitics,
    BtcEthContext,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::News,
        Topic::Macro,
        Topic::Geopolitics,
        Topic::BtcEthContext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::News => "news",
            Topic::Macro => "macro",
            Topic::Geopolitics => "geopolitics",
            Topic::BtcEthContext => "btc_eth_context",
        }
    }
}

/// Topic scores, each in [-1, 1], plus optional transparency fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreSet {
    #[serde(default, deserialize_with = "lenient_f64")]
    #[schemars(with = "f64")]
    pub news: f64,
    #[serde(rename = "macro", default, deserialize_with = "lenient_f64")]
    #[schemars(with = "f64")]
    pub macro_: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    #[schemars(with = "f64")]
    pub geopolitics: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    #[schemars(with = "f64")]
    pub btc_eth_context: f64,
    /// Raw secondary-feed news value before blending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(skip)]
    pub news_cp: Option<f64>,
    /// Primary-pass news value before blending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(skip)]
    pub news_openai: Option<f64>,
}

impl ScoreSet {
    pub fn new(news: f64, macro_: f64, geopolitics: f64, btc_eth_context: f64) -> Self {
        Self {
            news,
            macro_,
            geopolitics,
            btc_eth_context,
            news_cp: None,
            news_openai: None,
        }
    }

    pub fn get(&self, topic: Topic) -> f64 {
        match topic {
            Topic::News => self.news,
            Topic::Macro => self.macro_,
            Topic::Geopolitics => self.geopolitics,
            Topic::BtcEthContext => self.btc_eth_context,
        }
    }

    pub fn set(&mut self, topic: Topic, value: f64) {
        match topic {
            Topic::News => self.news = value,
            Topic::Macro => self.macro_ = value,
            Topic::Geopolitics => self.geopolitics = value,
            Topic::BtcEthContext => self.btc_eth_context = value,
        }
    }

    /// Copy with every topic clamped to [-1, 1]. Non-finite values become 0.
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        for topic in Topic::ALL {
            let v = self.get(topic);
            out.set(topic, if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 });
        }
        out
    }
}

// ── Regime & guidance ─────────────────────────────────────────────────

/// Discrete market-sentiment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    RiskOn,
    Neutral,
    RiskOff,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::RiskOn => "RISK_ON",
            Regime::Neutral => "NEUTRAL",
            Regime::RiskOff => "RISK_OFF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionBias {
    Both,
    LongOnly,
    ShortOnly,
}

/// Default risk guidance attached to a regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guidance {
    pub allow_new_trades: bool,
    pub direction_bias: DirectionBias,
    pub risk_budget_pct: f64,
    pub daily_dd_cap_pct: f64,
    pub max_leverage: f64,
    pub do_not_trade_until: Option<DateTime<Utc>>,
}

// ── Snapshot ──────────────────────────────────────────────────────────

/// How the secondary feed contributed to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryMode {
    /// The model analyzed the feed posts and returned full scores.
    Analysis,
    /// Local keyword heuristic over the feed posts.
    Heuristic,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCounts {
    pub openai_count: usize,
    pub cryptopanic_count: usize,
    /// Combined item count before the response cap.
    pub total_items: usize,
    pub cryptopanic_mode: SecondaryMode,
}

/// Response payload for one `/oracle/run` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub at: String,
    pub window: String,
    pub scores: ScoreSet,
    pub composite: f64,
    pub regime: Regime,
    pub guidance: Guidance,
    pub items: Vec<Item>,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<SourceCounts>,
}

/// Current UTC time, second precision with a `Z` suffix.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ── CryptoPanic feed ──────────────────────────────────────────────────

/// Vote counters attached to a post. Not every API tier returns them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Votes {
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub negative: f64,
    #[serde(default)]
    pub bullish: f64,
    #[serde(default)]
    pub bearish: f64,
    #[serde(default)]
    pub important: f64,
}

/// A post as returned by the CryptoPanic developer v2 posts endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CryptoPanicPost {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub votes: Option<Votes>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CryptoPanicPost {
    /// Raw timestamp: `published_at`, else `created_at`.
    pub fn timestamp(&self) -> Option<&str> {
        self.published_at
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.created_at.as_deref().filter(|s| !s.is_empty()))
    }

    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.timestamp()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Lower-cased title + description, the text scanned by keyword heuristics.
    pub fn text_lower(&self) -> String {
        format!(
            "{} {}",
            self.title,
            self.description.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_defaults_when_fields_missing() {
        let item: Item = serde_json::from_str(r#"{"title": "BTC pops"}"#).unwrap();
        assert_eq!(item.title, "BTC pops");
        assert_eq!(item.sentiment, 0.0);
        assert!((item.impact - 0.5).abs() < 1e-12);
        assert!(item.url.is_empty());
    }

    #[test]
    fn test_item_accepts_quoted_and_null_numbers() {
        let item: Item =
            serde_json::from_str(r#"{"title": "x", "sentiment": "-0.4", "impact": null}"#)
                .unwrap();
        assert!((item.sentiment + 0.4).abs() < 1e-12);
        assert!((item.impact - 0.5).abs() < 1e-12);

        let junk: Item = serde_json::from_str(r#"{"sentiment": "very bullish"}"#).unwrap();
        assert_eq!(junk.sentiment, 0.0);
    }

    #[test]
    fn test_item_accepts_null_text_fields() {
        let item: Item = serde_json::from_str(
            r#"{"title": "ETF inflows", "url": null, "source": null, "time": null, "reason": null}"#,
        )
        .unwrap();
        assert_eq!(item.title, "ETF inflows");
        assert!(item.url.is_empty());
        assert!(item.time.is_empty());
        assert!(item.reason.is_empty());

        let numeric_time: Item = serde_json::from_str(r#"{"time": 1760690000}"#).unwrap();
        assert_eq!(numeric_time.time, "1760690000");
    }

    #[test]
    fn test_score_set_accepts_null_topic() {
        let scores: ScoreSet =
            serde_json::from_str(r#"{"news": null, "macro": "0.3", "geopolitics": 0.1}"#).unwrap();
        assert_eq!(scores.news, 0.0);
        assert!((scores.macro_ - 0.3).abs() < 1e-12);
        assert_eq!(scores.btc_eth_context, 0.0);
    }

    #[test]
    fn test_post_accepts_null_title() {
        let post: CryptoPanicPost =
            serde_json::from_str(r#"{"title": null, "published_at": "2026-10-17T10:00:00Z"}"#)
                .unwrap();
        assert!(post.title.is_empty());
        assert!(post.published().is_some());
    }

    #[test]
    fn test_score_set_uses_macro_key() {
        let scores: ScoreSet = serde_json::from_str(
            r#"{"news": 0.1, "macro": -0.2, "geopolitics": 0.0, "btc_eth_context": 0.3}"#,
        )
        .unwrap();
        assert!((scores.macro_ + 0.2).abs() < 1e-12);

        let out = serde_json::to_value(&scores).unwrap();
        assert!(out.get("macro").is_some());
        assert!(out.get("news_cp").is_none());
    }

    #[test]
    fn test_score_set_clamped() {
        let scores = ScoreSet::new(3.0, -7.5, f64::NAN, 0.4).clamped();
        assert_eq!(scores.news, 1.0);
        assert_eq!(scores.macro_, -1.0);
        assert_eq!(scores.geopolitics, 0.0);
        assert_eq!(scores.btc_eth_context, 0.4);
    }

    #[test]
    fn test_regime_and_bias_serialization() {
        assert_eq!(serde_json::to_string(&Regime::RiskOff).unwrap(), "\"RISK_OFF\"");
        assert_eq!(
            serde_json::to_string(&DirectionBias::ShortOnly).unwrap(),
            "\"short_only\""
        );
        assert_eq!(Regime::Neutral.as_str(), "NEUTRAL");
    }

    #[test]
    fn test_timestamp_now_has_second_precision() {
        let at = timestamp_now();
        assert!(at.ends_with('Z'));
        assert!(!at.contains('.'));
        assert!(DateTime::parse_from_rfc3339(&at).is_ok());
    }

    #[test]
    fn test_post_timestamp_prefers_published_at() {
        let post = CryptoPanicPost {
            published_at: Some("2026-02-13T10:00:00Z".into()),
            created_at: Some("2026-02-13T09:00:00Z".into()),
            ..Default::default()
        };
        assert_eq!(post.timestamp(), Some("2026-02-13T10:00:00Z"));

        let fallback = CryptoPanicPost {
            published_at: Some(String::new()),
            created_at: Some("2026-02-13T09:00:00Z".into()),
            ..Default::default()
        };
        assert_eq!(fallback.timestamp(), Some("2026-02-13T09:00:00Z"));
        assert!(fallback.published().is_some());
    }

    #[test]
    fn test_post_text_lower() {
        let post = CryptoPanicPost {
            title: "ETF Approval".into(),
            description: Some("Bitcoin SURGE".into()),
            ..Default::default()
        };
        assert_eq!(post.text_lower(), "etf approval bitcoin surge");
    }
}
