//! Keyword tables consumed by the heuristic scorers.
//!
//! Matching is plain substring search over lower-cased text, so short
//! keywords like `up` also hit inside longer words. Tune weights here, not
//! in the scoring code.

use common::Topic;

/// Topic routing rules, checked in order. The first rule with any hit wins;
/// text matching none of them falls through to `Topic::News`.
pub const TOPIC_RULES: &[(Topic, &[&str])] = &[
    (
        Topic::Macro,
        &["cpi", "inflation", "fed", "pce", "jobs", "nfp", "unemployment"],
    ),
    (Topic::Geopolitics, &["war", "sanction", "geopolitic", "conflict"]),
    (
        Topic::BtcEthContext,
        &[
            "btc",
            "bitcoin",
            "eth",
            "ethereum",
            "funding",
            "open interest",
            "driver",
        ],
    ),
];

/// Bullish post keywords and the count each hit contributes.
pub const POSITIVE_KEYWORDS: &[(&str, f64)] = &[
    ("surge", 1.0),
    ("bullish", 1.0),
    ("rally", 1.0),
    ("breakout", 1.0),
    ("high", 1.0),
    ("gain", 1.0),
    ("up", 1.0),
    ("positive", 1.0),
    ("etf", 1.0),
    ("approval", 1.0),
    ("partnership", 1.0),
];

/// Bearish post keywords and the count each hit contributes.
pub const NEGATIVE_KEYWORDS: &[(&str, f64)] = &[
    ("drop", 1.0),
    ("bearish", 1.0),
    ("crash", 1.0),
    ("fall", 1.0),
    ("low", 1.0),
    ("loss", 1.0),
    ("down", 1.0),
    ("negative", 1.0),
    ("hack", 1.0),
    ("exploit", 1.0),
    ("breach", 1.0),
    ("delay", 1.0),
];

/// Sentiment per unit of net keyword count.
pub const KEYWORD_STEP: f64 = 0.2;

/// Magnitude cap for keyword sentiment.
pub const KEYWORD_CAP: f64 = 0.8;

/// Categorical tag weights for `cp_tag_weight`.
pub const TAG_WEIGHTS: &[(&str, f64)] = &[
    ("hack", -0.8),
    ("exploit", -0.7),
    ("scam", -0.6),
    ("delist", -0.6),
    ("halt", -0.6),
    ("lawsuit", -0.5),
    ("regulation", -0.3),
    ("ban", -0.4),
    ("upgrade", 0.3),
    ("partnership", 0.2),
    ("etf", 0.4),
    ("listing", 0.15),
];

/// Sum of weights of every table keyword present in `text`.
pub fn keyword_hits(text: &str, table: &[(&str, f64)]) -> f64 {
    table
        .iter()
        .filter(|(kw, _)| text.contains(kw))
        .map(|(_, w)| w)
        .sum()
}

/// Topic bucket for already lower-cased text.
pub fn route_topic(text: &str) -> Topic {
    TOPIC_RULES
        .iter()
        .find(|(_, kws)| kws.iter().any(|kw| text.contains(kw)))
        .map(|(topic, _)| *topic)
        .unwrap_or(Topic::News)
}
