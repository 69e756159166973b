//! One oracle run: primary web-search pass, optional CryptoPanic pass,
//! score merge, regime and guidance.

use std::sync::Arc;

use common::config::OracleConfig;
use common::{
    timestamp_now, truncate, CryptoPanicPost, Error, Item, Regime, ScoreSet, SecondaryMode,
    Snapshot, SourceCounts, Topic,
};
use cryptopanic_client::CryptoPanicClient;
use llm_client::types::MAX_ANALYSIS_ITEMS;
use llm_client::{parse_analysis_payload, parse_search_payload, OpenAiClient};
use scoring::cryptopanic::SOURCE_NAME;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::providers::{NewsFeed, SentimentModel};

/// Weight of the secondary signal in every blended topic.
pub const SECONDARY_WEIGHT: f64 = 0.6;
/// Items returned in a snapshot.
pub const MAX_SNAPSHOT_ITEMS: usize = 20;

const LOG_BODY_LIMIT: usize = 500;

/// What the secondary feed contributed to a run.
#[derive(Debug, Clone, PartialEq)]
pub enum SecondarySignal {
    /// The model analyzed the posts and returned a full score set.
    FullAnalysis {
        scores: ScoreSet,
        items: Vec<Item>,
        posts: usize,
    },
    /// Keyword heuristic over the posts; only the news topic is affected.
    HeuristicScore {
        subscore: f64,
        items: Vec<Item>,
        posts: usize,
    },
    NoSignal,
}

impl SecondarySignal {
    /// Raw secondary-derived news value, exposed as `news_cp`.
    pub fn news_value(&self) -> f64 {
        match self {
            SecondarySignal::FullAnalysis { scores, .. } => scores.news,
            SecondarySignal::HeuristicScore { subscore, .. } => *subscore,
            SecondarySignal::NoSignal => 0.0,
        }
    }

    pub fn mode(&self) -> SecondaryMode {
        match self {
            SecondarySignal::FullAnalysis { .. } => SecondaryMode::Analysis,
            SecondarySignal::HeuristicScore { .. } => SecondaryMode::Heuristic,
            SecondarySignal::NoSignal => SecondaryMode::None,
        }
    }

    fn post_count(&self) -> usize {
        match self {
            SecondarySignal::FullAnalysis { posts, .. }
            | SecondarySignal::HeuristicScore { posts, .. } => *posts,
            SecondarySignal::NoSignal => 0,
        }
    }

    fn into_items(self) -> Vec<Item> {
        match self {
            SecondarySignal::FullAnalysis { items, .. }
            | SecondarySignal::HeuristicScore { items, .. } => items,
            SecondarySignal::NoSignal => Vec::new(),
        }
    }
}

/// Blend primary and secondary scores.
///
/// A full analysis blends every topic 0.6·secondary + 0.4·primary. Otherwise
/// only `news` is blended against the heuristic subscore (0.0 without a
/// signal) and the other topics are copied from the primary pass.
pub fn merge_scores(primary: &ScoreSet, secondary: &SecondarySignal) -> ScoreSet {
    let mut merged = primary.clone();
    match secondary {
        SecondarySignal::FullAnalysis { scores, .. } => {
            for topic in Topic::ALL {
                merged.set(
                    topic,
                    scoring::blend(scores.get(topic), primary.get(topic), SECONDARY_WEIGHT),
                );
            }
        }
        SecondarySignal::HeuristicScore { .. } | SecondarySignal::NoSignal => {
            merged.news = scoring::blend(secondary.news_value(), primary.news, SECONDARY_WEIGHT);
        }
    }
    merged.news_cp = Some(secondary.news_value());
    merged.news_openai = Some(primary.news);
    merged
}

/// Fixed neutral snapshot returned when the primary answer cannot be parsed.
pub fn failsafe_snapshot(window: &str, reason: &str) -> Snapshot {
    let regime = Regime::Neutral;
    Snapshot {
        at: timestamp_now(),
        window: window.to_string(),
        scores: ScoreSet::default(),
        composite: 0.0,
        regime,
        guidance: scoring::default_guidance(regime),
        items: Vec::new(),
        notes: format!("Failsafe due to {reason}"),
        sources: None,
    }
}

/// Clamp an item's numeric fields into their documented ranges.
fn sanitize_item(mut item: Item) -> Item {
    item.sentiment = if item.sentiment.is_finite() {
        scoring::clamp(item.sentiment, -1.0, 1.0)
    } else {
        0.0
    };
    item.impact = if item.impact.is_finite() {
        scoring::clamp(item.impact, 0.0, 1.0)
    } else {
        0.5
    };
    item
}

pub struct Oracle {
    config: Arc<OracleConfig>,
    model: Arc<dyn SentimentModel>,
    feed: Option<Arc<dyn NewsFeed>>,
}

impl Oracle {
    pub fn new(
        config: Arc<OracleConfig>,
        model: Arc<dyn SentimentModel>,
        feed: Option<Arc<dyn NewsFeed>>,
    ) -> Self {
        Self {
            config,
            model,
            feed,
        }
    }

    /// Production wiring: OpenAI for the model, CryptoPanic when a token is set.
    pub fn from_config(config: Arc<OracleConfig>) -> Self {
        let model: Arc<dyn SentimentModel> = Arc::new(OpenAiClient::new(&config.openai));
        let feed: Option<Arc<dyn NewsFeed>> = if config.cryptopanic.enabled() {
            Some(Arc::new(CryptoPanicClient::new(&config.cryptopanic)))
        } else {
            None
        };
        Self::new(config, model, feed)
    }

    /// Explicit non-empty window, else the configured default.
    pub fn resolve_window(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .unwrap_or(self.config.default_window.as_str())
            .to_string()
    }

    /// Run one oracle pass.
    ///
    /// Only a transport/HTTP failure of the primary model call is an error.
    /// An unparseable primary answer yields the failsafe snapshot; the
    /// secondary pass can only reduce the signal, never fail the run.
    #[instrument(skip(self), fields(run_id = %Uuid::new_v4()))]
    pub async fn run(&self, window: Option<&str>) -> Result<Snapshot, Error> {
        let window = self.resolve_window(window);

        let raw = self
            .model
            .web_search(&window, &self.config.allowed_domains, &self.config.query_pack)
            .await?;

        let payload = match parse_search_payload(&raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    "JSON parse error: {}; raw response: {}",
                    e,
                    truncate(&raw, LOG_BODY_LIMIT)
                );
                return Ok(failsafe_snapshot(&window, "parse_error"));
            }
        };

        let primary_items: Vec<Item> = payload.items.into_iter().map(sanitize_item).collect();
        let primary_scores = match payload.scores {
            Some(scores) => scores.clamped(),
            None => {
                info!("model returned no scores, deriving from items");
                scoring::normalize_items(&primary_items)
            }
        };

        let secondary = self.secondary_pass(&window).await;
        let scores = merge_scores(&primary_scores, &secondary);
        let composite = scoring::composite_score(&scores);
        let regime = scoring::regime_from_composite(composite);

        let openai_count = primary_items.len();
        let cryptopanic_count = secondary.post_count();
        let cryptopanic_mode = secondary.mode();

        let mut items = primary_items;
        items.extend(secondary.into_items());
        let total_items = items.len();
        items.truncate(MAX_SNAPSHOT_ITEMS);

        info!(
            window = %window,
            composite,
            regime = regime.as_str(),
            mode = ?cryptopanic_mode,
            total_items,
            "oracle run complete"
        );

        Ok(Snapshot {
            at: timestamp_now(),
            window,
            scores,
            composite,
            regime,
            guidance: scoring::default_guidance(regime),
            items,
            notes: payload.notes,
            sources: Some(SourceCounts {
                openai_count,
                cryptopanic_count,
                total_items,
                cryptopanic_mode,
            }),
        })
    }

    /// Secondary feed pass. Prefers a model analysis of the posts, falls back
    /// to the keyword heuristic, and degrades to no signal on feed failure.
    async fn secondary_pass(&self, window: &str) -> SecondarySignal {
        let Some(feed) = &self.feed else {
            return SecondarySignal::NoSignal;
        };

        let posts = match feed
            .recent_posts(self.config.cryptopanic.window_minutes)
            .await
        {
            Ok(posts) => posts,
            Err(e) => {
                warn!("CryptoPanic error: {}", e);
                return SecondarySignal::NoSignal;
            }
        };
        if posts.is_empty() {
            info!("CryptoPanic returned no posts in window");
            return SecondarySignal::NoSignal;
        }

        match self.analyze_posts(window, &posts).await {
            Some((scores, items)) => SecondarySignal::FullAnalysis {
                scores,
                items,
                posts: posts.len(),
            },
            None => SecondarySignal::HeuristicScore {
                subscore: scoring::cryptopanic_subscore(&posts),
                items: scoring::heuristic_items(&posts, feed.filter()),
                posts: posts.len(),
            },
        }
    }

    async fn analyze_posts(
        &self,
        window: &str,
        posts: &[CryptoPanicPost],
    ) -> Option<(ScoreSet, Vec<Item>)> {
        let raw = match self.model.analyze_posts(window, posts).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("CryptoPanic analysis call failed, using heuristic: {}", e);
                return None;
            }
        };

        match parse_analysis_payload(&raw) {
            Ok(payload) => {
                let items = payload
                    .items
                    .into_iter()
                    .take(MAX_ANALYSIS_ITEMS)
                    .map(|item| {
                        sanitize_item(Item {
                            source: SOURCE_NAME.to_string(),
                            ..item
                        })
                    })
                    .collect();
                Some((payload.scores.clamped(), items))
            }
            Err(e) => {
                warn!(
                    "CryptoPanic analysis parse error, using heuristic: {}; raw response: {}",
                    e,
                    truncate(&raw, LOG_BODY_LIMIT)
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_full_analysis_blends_all_topics() {
        let primary = ScoreSet::new(0.5, -0.5, 0.0, 1.0);
        let secondary = SecondarySignal::FullAnalysis {
            scores: ScoreSet::new(-0.5, 0.5, 1.0, 1.0),
            items: vec![],
            posts: 3,
        };
        let merged = merge_scores(&primary, &secondary);

        assert!((merged.news - (-0.1)).abs() < 1e-12);
        assert!((merged.macro_ - 0.1).abs() < 1e-12);
        assert!((merged.geopolitics - 0.6).abs() < 1e-12);
        assert!((merged.btc_eth_context - 1.0).abs() < 1e-12);
        assert_eq!(merged.news_cp, Some(-0.5));
        assert_eq!(merged.news_openai, Some(0.5));
    }

    #[test]
    fn test_merge_heuristic_blends_news_only() {
        let primary = ScoreSet::new(0.5, -0.5, 0.2, 0.3);
        let secondary = SecondarySignal::HeuristicScore {
            subscore: 0.6,
            items: vec![],
            posts: 1,
        };
        let merged = merge_scores(&primary, &secondary);

        assert!((merged.news - (0.36 + 0.2)).abs() < 1e-12);
        assert_eq!(merged.macro_, -0.5);
        assert_eq!(merged.geopolitics, 0.2);
        assert_eq!(merged.btc_eth_context, 0.3);
        assert_eq!(merged.news_cp, Some(0.6));
    }

    #[test]
    fn test_merge_no_signal_scales_news() {
        let primary = ScoreSet::new(0.5, 0.1, 0.1, 0.1);
        let merged = merge_scores(&primary, &SecondarySignal::NoSignal);
        assert!((merged.news - 0.2).abs() < 1e-12);
        assert_eq!(merged.news_cp, Some(0.0));
    }

    #[test]
    fn test_failsafe_snapshot() {
        let snap = failsafe_snapshot("2h", "parse_error");
        assert_eq!(snap.regime, Regime::Neutral);
        assert_eq!(snap.composite, 0.0);
        assert!(snap.items.is_empty());
        assert_eq!(snap.scores, ScoreSet::default());
        assert_eq!(snap.guidance, scoring::default_guidance(Regime::Neutral));
        assert_eq!(snap.notes, "Failsafe due to parse_error");
        assert!(snap.sources.is_none());
    }

    #[test]
    fn test_sanitize_item() {
        let item = sanitize_item(Item {
            title: "x".into(),
            url: String::new(),
            source: String::new(),
            time: String::new(),
            sentiment: -4.0,
            impact: f64::NAN,
            reason: String::new(),
        });
        assert_eq!(item.sentiment, -1.0);
        assert_eq!(item.impact, 0.5);
    }
}
