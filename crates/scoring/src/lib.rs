//! Sentiment scoring: topic normalization, composite blend, regime
//! classification, default guidance and the CryptoPanic heuristics.
//!
//! Everything here is pure except `cryptopanic_subscore`, which reads the
//! wall clock for post freshness.

pub mod cryptopanic;
pub mod keywords;
pub mod regime;
pub mod topics;

pub use cryptopanic::{
    cp_tag_weight, cp_vote_score, cryptopanic_subscore, cryptopanic_subscore_at,
    freshness_weight, heuristic_items, post_sentiment,
};
pub use regime::{default_guidance, regime_from_composite};
pub use topics::{blend, clamp, composite_score, normalize_items, weighted_mean};
