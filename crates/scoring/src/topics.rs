//! Topic scores: weighted means over items and the composite blend.

use common::{Item, ScoreSet, Topic};

use crate::keywords::route_topic;

/// Denominator floor for `weighted_mean`.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Composite weights per topic. Sum to 1.0.
pub const COMPOSITE_WEIGHTS: [(Topic, f64); 4] = [
    (Topic::News, 0.40),
    (Topic::Macro, 0.20),
    (Topic::Geopolitics, 0.10),
    (Topic::BtcEthContext, 0.30),
];

pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

/// Σ(value·weight) / Σweight. A zero weight sum floors to a tiny epsilon,
/// so an empty or all-zero input yields ~0 instead of NaN.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> f64 {
    let num: f64 = pairs.iter().map(|(v, w)| v * w).sum();
    let den: f64 = pairs.iter().map(|(_, w)| w).sum();
    let den = if den.abs() < WEIGHT_EPSILON {
        WEIGHT_EPSILON
    } else {
        den
    };
    num / den
}

/// Derive topic scores from raw items when the model supplied none.
///
/// Each item lands in exactly one bucket (see `keywords::TOPIC_RULES`) and
/// contributes its clamped sentiment weighted by its clamped impact.
pub fn normalize_items(items: &[Item]) -> ScoreSet {
    let mut buckets: [Vec<(f64, f64)>; 4] = Default::default();

    for item in items {
        let sentiment = clamp(finite_or(item.sentiment, 0.0), -1.0, 1.0);
        let impact = clamp(finite_or(item.impact, 0.5), 0.0, 1.0);
        let text = format!("{} {}", item.title, item.reason).to_lowercase();

        let idx = topic_index(route_topic(&text));
        buckets[idx].push((sentiment, impact));
    }

    let mut scores = ScoreSet::default();
    for topic in Topic::ALL {
        let pairs = &buckets[topic_index(topic)];
        let value = if pairs.is_empty() {
            0.0
        } else {
            clamp(weighted_mean(pairs), -1.0, 1.0)
        };
        scores.set(topic, value);
    }
    scores
}

/// Fixed linear combination of the four topics, clamped to [-1, 1].
pub fn composite_score(scores: &ScoreSet) -> f64 {
    let raw: f64 = COMPOSITE_WEIGHTS
        .iter()
        .map(|(topic, w)| w * scores.get(*topic))
        .sum();
    clamp(raw, -1.0, 1.0)
}

/// `secondary_weight·secondary + (1 − secondary_weight)·primary`, clamped.
pub fn blend(secondary: f64, primary: f64, secondary_weight: f64) -> f64 {
    clamp(
        secondary_weight * secondary + (1.0 - secondary_weight) * primary,
        -1.0,
        1.0,
    )
}

fn topic_index(topic: Topic) -> usize {
    match topic {
        Topic::News => 0,
        Topic::Macro => 1,
        Topic::Geopolitics => 2,
        Topic::BtcEthContext => 3,
    }
}

fn finite_or(x: f64, fallback: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, reason: &str, sentiment: f64, impact: f64) -> Item {
        Item {
            title: title.into(),
            url: String::new(),
            source: "test".into(),
            time: String::new(),
            sentiment,
            impact,
            reason: reason.into(),
        }
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(2.0, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-2.0, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.3, -1.0, 1.0), 0.3);
    }

    #[test]
    fn test_weighted_mean_empty_is_finite_zero() {
        let mean = weighted_mean(&[]);
        assert!(mean.is_finite());
        assert!(mean.abs() < 1e-9);
    }

    #[test]
    fn test_weighted_mean_zero_weights() {
        let mean = weighted_mean(&[(0.9, 0.0), (-0.4, 0.0)]);
        assert!(mean.is_finite());
        assert!(mean.abs() < 1e-9);
    }

    #[test]
    fn test_weighted_mean_basic() {
        let mean = weighted_mean(&[(1.0, 3.0), (-1.0, 1.0)]);
        assert!((mean - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_items_cpi_routes_to_macro() {
        let scores = normalize_items(&[item("US CPI hotter than expected", "", -0.6, 0.9)]);
        assert!((scores.macro_ + 0.6).abs() < 1e-9);
        assert_eq!(scores.news, 0.0);
        assert_eq!(scores.geopolitics, 0.0);
        assert_eq!(scores.btc_eth_context, 0.0);
    }

    #[test]
    fn test_normalize_items_buckets_and_clamps() {
        let items = vec![
            item("Sanctions widen", "conflict escalates", -0.5, 1.0),
            item("ETH staking inflows", "", 0.8, 0.5),
            item("Bitcoin miners expand", "", 0.2, 0.5),
            item("Exchange lists token", "", 5.0, 2.0),
        ];
        let scores = normalize_items(&items);

        assert!((scores.geopolitics + 0.5).abs() < 1e-9);
        assert!((scores.btc_eth_context - 0.5).abs() < 1e-9);
        // out-of-range sentiment/impact clamp to 1.0
        assert!((scores.news - 1.0).abs() < 1e-9);
        assert_eq!(scores.macro_, 0.0);
    }

    #[test]
    fn test_normalize_items_empty() {
        assert_eq!(normalize_items(&[]), ScoreSet::default());
    }

    #[test]
    fn test_composite_matches_linear_combination() {
        let grid = [-1.0, -0.55, 0.0, 0.3, 1.0];
        for &n in &grid {
            for &m in &grid {
                for &g in &grid {
                    for &c in &grid {
                        let scores = ScoreSet::new(n, m, g, c);
                        let expected = 0.40 * n + 0.20 * m + 0.10 * g + 0.30 * c;
                        let got = composite_score(&scores);
                        assert!((got - expected).abs() < 1e-9);
                        assert!((-1.0..=1.0).contains(&got));
                    }
                }
            }
        }
    }

    #[test]
    fn test_composite_clamps_out_of_range_inputs() {
        let scores = ScoreSet::new(5.0, 5.0, 5.0, 5.0);
        assert_eq!(composite_score(&scores), 1.0);
    }

    #[test]
    fn test_blend() {
        assert!((blend(0.5, -0.5, 0.6) - 0.1).abs() < 1e-12);
        assert!((blend(0.0, 0.7, 0.6) - 0.28).abs() < 1e-12);
        assert_eq!(blend(3.0, 3.0, 0.6), 1.0);
    }
}
