//! Language-model-free sentiment over CryptoPanic posts.

use chrono::{DateTime, Utc};
use common::{CryptoPanicPost, Item, Votes};

use crate::keywords::{
    keyword_hits, KEYWORD_CAP, KEYWORD_STEP, NEGATIVE_KEYWORDS, POSITIVE_KEYWORDS, TAG_WEIGHTS,
};
use crate::topics::{clamp, weighted_mean};

/// Freshness half-life in minutes (6h).
const HALF_LIFE_MINUTES: f64 = 360.0;
/// Lower bound on a post's freshness weight.
const MIN_FRESHNESS_WEIGHT: f64 = 0.05;
/// Number of posts surfaced as snapshot items.
pub const MAX_HEURISTIC_ITEMS: usize = 8;
/// Impact assigned to heuristic feed items.
const HEURISTIC_ITEM_IMPACT: f64 = 0.6;

pub const SOURCE_NAME: &str = "CryptoPanic";

/// Keyword sentiment of one post: sign(pos − neg) · min(0.8, |pos − neg| · 0.2).
pub fn post_sentiment(post: &CryptoPanicPost) -> f64 {
    let text = post.text_lower();
    let net = keyword_hits(&text, POSITIVE_KEYWORDS) - keyword_hits(&text, NEGATIVE_KEYWORDS);
    if net == 0.0 {
        return 0.0;
    }
    net.signum() * (net.abs() * KEYWORD_STEP).min(KEYWORD_CAP)
}

/// 0.5^(minutes_since_publish / 360), floored at 0.05. Posts without a
/// parseable timestamp get full weight.
pub fn freshness_weight(post: &CryptoPanicPost, now: DateTime<Utc>) -> f64 {
    let weight = match post.published() {
        Some(published) => {
            let minutes = (now - published).num_milliseconds() as f64 / 60_000.0;
            0.5_f64.powf(minutes / HALF_LIFE_MINUTES)
        }
        None => 1.0,
    };
    weight.max(MIN_FRESHNESS_WEIGHT)
}

/// Freshness-weighted mean of post sentiments, clamped. 0.0 for no posts.
pub fn cryptopanic_subscore(posts: &[CryptoPanicPost]) -> f64 {
    cryptopanic_subscore_at(posts, Utc::now())
}

pub fn cryptopanic_subscore_at(posts: &[CryptoPanicPost], now: DateTime<Utc>) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    let pairs: Vec<(f64, f64)> = posts
        .iter()
        .map(|p| (clamp(post_sentiment(p), -1.0, 1.0), freshness_weight(p, now)))
        .collect();
    clamp(weighted_mean(&pairs), -1.0, 1.0)
}

/// Sum of fixed tag weights. Tags are matched case-insensitively; unknown
/// tags count as 0.
pub fn cp_tag_weight(tags: &[String]) -> f64 {
    tags.iter()
        .filter_map(|tag| {
            let tag = tag.to_lowercase();
            TAG_WEIGHTS
                .iter()
                .find(|(name, _)| *name == tag)
                .map(|(_, w)| *w)
        })
        .sum()
}

/// Net bullish share of votes in [-1, 1]; 0.0 without votes.
pub fn cp_vote_score(votes: &Votes) -> f64 {
    let bullish = votes.positive + votes.bullish;
    let bearish = votes.negative + votes.bearish;
    let total = bullish + bearish;
    if total <= 0.0 {
        return 0.0;
    }
    clamp((bullish - bearish) / total, -1.0, 1.0)
}

/// Convert the first few posts into snapshot items using keyword sentiment.
pub fn heuristic_items(posts: &[CryptoPanicPost], filter: &str) -> Vec<Item> {
    posts
        .iter()
        .take(MAX_HEURISTIC_ITEMS)
        .map(|post| Item {
            title: post.title.clone(),
            url: post.url.clone().unwrap_or_default(),
            source: SOURCE_NAME.into(),
            time: post.timestamp().unwrap_or_default().to_string(),
            sentiment: post_sentiment(post),
            impact: HEURISTIC_ITEM_IMPACT,
            reason: format!(
                "{} {} - {}",
                SOURCE_NAME,
                post.kind.as_deref().unwrap_or("news"),
                filter
            ),
        })
        .collect()
}
